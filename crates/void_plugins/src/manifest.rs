//! Manifest scanner - which library provides which identifier
//!
//! Every directory on the search path may contain manifest files (by default
//! `*.components`). They are read before any library is loaded, so the
//! registry knows where to find an identifier without opening every plugin.
//!
//! # Manifest Format
//!
//! ```text
//! # comment lines and blank lines are ignored
//! libPlugins.so Class1 1
//! libPlugins.so Class2 2
//! libOther.so:SomeComponent
//! ```
//!
//! A line is either `<library> <id> [<id> ...]` (whitespace separated) or the
//! single-token form `<library>:<id>`. Any other line is malformed: it is
//! reported with a warning and skipped.
//!
//! Directories earlier in the search order win: once an identifier is mapped
//! to a library, later mappings for it are ignored.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// One valid manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Library providing the identifiers
    pub library: String,
    /// Identifiers provided by the library
    pub ids: Vec<String>,
    /// 1-based line number in the source
    pub line: usize,
}

/// A manifest line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number in the source
    pub line: usize,
    /// The offending text
    pub text: String,
}

impl fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: '{}'", self.line, self.text)
    }
}

/// Parsed content of a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedManifest {
    /// Valid entries in file order
    pub entries: Vec<ManifestEntry>,
    /// Lines that were skipped
    pub malformed: Vec<MalformedLine>,
}

/// Parse a single manifest line
///
/// Returns `Ok(None)` for blank and comment lines.
fn parse_line(text: &str) -> Result<Option<(String, Vec<String>)>, ()> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = text.split_whitespace();
    let first = tokens.next().ok_or(())?;
    let ids: Vec<String> = tokens.map(str::to_string).collect();

    if !ids.is_empty() {
        return Ok(Some((first.to_string(), ids)));
    }

    // Single-token colon form
    match first.split_once(':') {
        Some((library, id)) if !library.is_empty() && !id.is_empty() => {
            Ok(Some((library.to_string(), vec![id.to_string()])))
        }
        _ => Err(()),
    }
}

/// Parse manifest text
pub fn parse_manifest(content: &str) -> ParsedManifest {
    let mut parsed = ParsedManifest::default();

    for (index, text) in content.lines().enumerate() {
        let line = index + 1;
        match parse_line(text) {
            Ok(Some((library, ids))) => parsed.entries.push(ManifestEntry { library, ids, line }),
            Ok(None) => {}
            Err(()) => parsed.malformed.push(MalformedLine {
                line,
                text: text.trim().to_string(),
            }),
        }
    }

    parsed
}

/// Mapping identifier -> library, filled from manifests
#[derive(Debug, Clone, Default)]
pub struct LibraryIndex {
    /// Identifier to owning library
    libraries: BTreeMap<String, String>,
    /// Manifest files that have been read, in read order
    sources: Vec<PathBuf>,
}

impl LibraryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` lives in `library`
    ///
    /// The first mapping wins. Returns `false` if the identifier was already
    /// mapped (to any library).
    pub fn insert(&mut self, id: &str, library: &str) -> bool {
        if let Some(existing) = self.libraries.get(id) {
            if existing != library {
                log::warn!(
                    "Identifier '{}' is provided by '{}' and '{}', keeping '{}'",
                    id,
                    existing,
                    library,
                    existing
                );
            } else {
                log::debug!("Identifier '{}' listed twice for '{}'", id, library);
            }
            return false;
        }

        self.libraries.insert(id.to_string(), library.to_string());
        true
    }

    /// Merge the entries of a parsed manifest, returning how many were new
    pub fn merge(&mut self, manifest: &ParsedManifest) -> usize {
        let mut added = 0;
        for entry in &manifest.entries {
            for id in &entry.ids {
                if self.insert(id, &entry.library) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Library owning an identifier
    pub fn library_for(&self, id: &str) -> Option<&str> {
        self.libraries.get(id).map(String::as_str)
    }

    /// Check if an identifier is known
    pub fn contains(&self, id: &str) -> bool {
        self.libraries.contains_key(id)
    }

    /// All indexed identifiers
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }

    /// Distinct libraries, in name order
    pub fn libraries(&self) -> Vec<&str> {
        let mut libs: Vec<&str> = self.libraries.values().map(String::as_str).collect();
        libs.sort_unstable();
        libs.dedup();
        libs
    }

    /// Identifiers provided by one library
    pub fn identifiers_for(&self, library: &str) -> Vec<&str> {
        self.libraries
            .iter()
            .filter(|(_, lib)| lib.as_str() == library)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Manifest files read so far
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Check if a manifest file has already been merged
    pub fn has_source(&self, path: &Path) -> bool {
        self.sources.iter().any(|p| p == path)
    }

    /// Number of indexed identifiers
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

/// Walks search directories and reads their manifests
#[derive(Debug, Clone)]
pub struct ManifestScanner {
    extension: String,
}

impl ManifestScanner {
    /// Create a scanner for manifests with the given extension
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Manifest extension this scanner looks for
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Build a fresh index from the directories
    pub fn scan(&self, dirs: &[PathBuf]) -> LibraryIndex {
        let mut index = LibraryIndex::new();
        self.scan_into(&mut index, dirs);
        index
    }

    /// Merge manifests from the directories into an existing index
    ///
    /// Manifest files already merged into `index` are not read again.
    /// Returns the number of identifiers added.
    pub fn scan_into(&self, index: &mut LibraryIndex, dirs: &[PathBuf]) -> usize {
        let mut added = 0;

        for dir in dirs {
            for path in self.manifests_in(dir) {
                if index.has_source(&path) {
                    continue;
                }

                let content = match std::fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        log::debug!("Skipping unreadable manifest {}: {}", path.display(), e);
                        continue;
                    }
                };

                let parsed = parse_manifest(&content);
                for bad in &parsed.malformed {
                    log::warn!("Malformed manifest line in {} {}", path.display(), bad);
                }

                let count = index.merge(&parsed);
                log::debug!("Read {} identifiers from {}", count, path.display());
                added += count;
                index.sources.push(path);
            }
        }

        added
    }

    /// Manifest files in a directory, sorted by name
    fn manifests_in(&self, dir: &Path) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .map(|ext| ext == self.extension.as_str())
                        .unwrap_or(false)
            })
            .collect();

        files.sort();
        files
    }
}

impl Default for ManifestScanner {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MANIFEST_EXTENSION)
    }
}
