//! Library loading for plugin components
//!
//! Maps plugin libraries into the process exactly once and hands their
//! registration tables to the registry. Libraries are never unloaded: the
//! factories they registered stay reachable for the whole process lifetime.

use crate::error::{PluginError, Result};
use crate::registration::{
    PluginDeclaration, RegistrationTable, CORE_VERSION, DECLARATION_SYMBOL, VOID_PLUGIN_API_VERSION,
};
use libloading::{Library, Symbol};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::mem::ManuallyDrop;
use std::path::{Path, PathBuf};

/// Result of asking a loader for a library
#[derive(Debug)]
pub enum LoadOutcome {
    /// The library was mapped earlier; nothing to register
    AlreadyLoaded,
    /// The library was mapped now; these registrations must be applied
    Loaded(RegistrationTable),
}

/// Source of plugin libraries
pub trait LibraryLoader: Send {
    /// Load a library by name
    ///
    /// Loading the same name twice succeeds with [`LoadOutcome::AlreadyLoaded`].
    /// A failed load is not remembered and may be retried.
    fn load(&mut self, library: &str) -> Result<LoadOutcome>;

    /// Check if a library is loaded
    fn is_loaded(&self, library: &str) -> bool;

    /// Names of loaded libraries
    fn loaded_libraries(&self) -> Vec<String>;

    /// Replace the directories searched for libraries
    ///
    /// The registry calls this with the directories it scans for manifests,
    /// so a library is looked up where its manifest was found.
    fn set_search_path(&mut self, _search_path: Vec<PathBuf>) {}
}

/// Loads plugin libraries from disk with `libloading`
pub struct DynamicLibraryLoader {
    /// Directories searched for bare library names
    search_path: Vec<PathBuf>,
    /// Loaded libraries by requested name, kept mapped for the process lifetime
    libraries: BTreeMap<String, ManuallyDrop<Library>>,
}

impl DynamicLibraryLoader {
    /// Create a loader searching the given directories in order
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path,
            libraries: BTreeMap::new(),
        }
    }

    /// Resolve a library name to the path handed to the system loader
    ///
    /// Names with a directory component are used as given. Bare names are
    /// looked up in the search directories, first as written and then, if
    /// they carry no extension, as the platform file name (`libNAME.so`,
    /// `NAME.dll`, ...). Unresolved names are left to the system search.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() || path.components().count() > 1 {
            return path.to_path_buf();
        }

        let mut candidates = vec![OsString::from(name)];
        if path.extension().is_none() {
            candidates.push(libloading::library_filename(name));
        }

        for dir in &self.search_path {
            for candidate in &candidates {
                let full = dir.join(candidate);
                if full.is_file() {
                    return full;
                }
            }
        }

        candidates.pop().map(PathBuf::from).unwrap_or_else(|| path.to_path_buf())
    }

    /// Map a library and collect its registrations
    fn open(name: &str, path: &Path) -> Result<(Library, RegistrationTable)> {
        // Safety: loading runs the library's initializers; plugin libraries are trusted
        let library = unsafe { Library::new(path) }
            .map_err(|e| PluginError::load_error(name, e.to_string()))?;

        // Safety: the symbol is the static produced by `declare_plugin!`
        let symbol: std::result::Result<Symbol<*const PluginDeclaration>, _> =
            unsafe { library.get(DECLARATION_SYMBOL) };

        let table = match symbol {
            Ok(symbol) => {
                // Safety: points into the mapped library, which outlives this call
                let declaration: &PluginDeclaration = unsafe { &**symbol };

                if declaration.api_version != VOID_PLUGIN_API_VERSION {
                    return Err(PluginError::VersionMismatch {
                        library: name.to_string(),
                        found: declaration.api_version.to_string(),
                        expected: VOID_PLUGIN_API_VERSION.to_string(),
                    });
                }

                if declaration.core_version != CORE_VERSION {
                    return Err(PluginError::VersionMismatch {
                        library: name.to_string(),
                        found: declaration.core_version.to_string(),
                        expected: CORE_VERSION.to_string(),
                    });
                }

                declaration.table()
            }
            Err(_) => {
                log::warn!("Library '{}' does not declare any plugin components", name);
                RegistrationTable::new()
            }
        };

        Ok((library, table))
    }
}

impl LibraryLoader for DynamicLibraryLoader {
    fn load(&mut self, library: &str) -> Result<LoadOutcome> {
        if self.libraries.contains_key(library) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let path = self.resolve(library);
        log::debug!("Loading library '{}' from {}", library, path.display());

        let (handle, table) = Self::open(library, &path)?;

        log::info!(
            "Loaded plugin library '{}' with {} registrations",
            library,
            table.len()
        );

        self.libraries.insert(library.to_string(), ManuallyDrop::new(handle));

        Ok(LoadOutcome::Loaded(table))
    }

    fn is_loaded(&self, library: &str) -> bool {
        self.libraries.contains_key(library)
    }

    fn loaded_libraries(&self) -> Vec<String> {
        self.libraries.keys().cloned().collect()
    }

    fn set_search_path(&mut self, search_path: Vec<PathBuf>) {
        log::debug!("Library search path: {:?}", search_path);
        self.search_path = search_path;
    }
}

impl Default for DynamicLibraryLoader {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Serves registration functions linked into the host as named libraries
///
/// Useful for components compiled into the executable and for tests: the
/// registry sees the same lazy-load behaviour as with shared libraries.
#[derive(Default)]
pub struct StaticLibraryLoader {
    /// Registration functions by library name
    libraries: BTreeMap<String, fn(&mut RegistrationTable)>,
    /// Libraries whose table has been handed out
    loaded: BTreeSet<String>,
}

impl StaticLibraryLoader {
    /// Create a loader without libraries
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named library
    pub fn with_library(mut self, name: impl Into<String>, register: fn(&mut RegistrationTable)) -> Self {
        self.add_library(name, register);
        self
    }

    /// Add a named library
    pub fn add_library(&mut self, name: impl Into<String>, register: fn(&mut RegistrationTable)) {
        self.libraries.insert(name.into(), register);
    }
}

impl std::fmt::Debug for StaticLibraryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticLibraryLoader")
            .field("libraries", &self.libraries.keys().collect::<Vec<_>>())
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl LibraryLoader for StaticLibraryLoader {
    fn load(&mut self, library: &str) -> Result<LoadOutcome> {
        if self.loaded.contains(library) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let register = self
            .libraries
            .get(library)
            .copied()
            .ok_or_else(|| PluginError::load_error(library, "no such static library"))?;

        self.loaded.insert(library.to_string());
        Ok(LoadOutcome::Loaded(RegistrationTable::from_fn(register)))
    }

    fn is_loaded(&self, library: &str) -> bool {
        self.loaded.contains(library)
    }

    fn loaded_libraries(&self) -> Vec<String> {
        self.loaded.iter().cloned().collect()
    }
}
