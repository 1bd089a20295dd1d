//! Registry configuration
//!
//! Decides where manifests and plugin libraries are searched for.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `VOID_PLUGINS_PATH_VAR`, `VOID_PLUGINS_MANIFEST_EXT`
//! 2. Config file named by `VOID_PLUGINS_CONFIG`
//! 3. Platform defaults
//!
//! # Example Config File
//!
//! ```toml
//! path_variable = "LD_LIBRARY_PATH"
//! extra_directories = ["/opt/void/plugins"]
//! manifest_extension = "components"
//! ```

use crate::error::{PluginError, Result};
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Environment variable naming a TOML config file
pub const CONFIG_ENV: &str = "VOID_PLUGINS_CONFIG";

/// Environment variable overriding the search path variable name
pub const PATH_VAR_ENV: &str = "VOID_PLUGINS_PATH_VAR";

/// Environment variable overriding the manifest extension
pub const MANIFEST_EXT_ENV: &str = "VOID_PLUGINS_MANIFEST_EXT";

/// Default manifest file extension
pub const DEFAULT_MANIFEST_EXTENSION: &str = "components";

/// Library search path variable of the current platform
#[cfg(target_os = "windows")]
pub const DEFAULT_PATH_VARIABLE: &str = "PATH";
#[cfg(target_os = "macos")]
pub const DEFAULT_PATH_VARIABLE: &str = "DYLD_LIBRARY_PATH";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const DEFAULT_PATH_VARIABLE: &str = "LD_LIBRARY_PATH";

/// Configuration for a [`Registry`](crate::Registry)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Environment variable listing search directories, highest priority first
    pub path_variable: String,
    /// Directories searched after the ones from `path_variable`
    pub extra_directories: Vec<PathBuf>,
    /// Extension of manifest files (without the dot)
    pub manifest_extension: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path_variable: DEFAULT_PATH_VARIABLE.to_string(),
            extra_directories: Vec::new(),
            manifest_extension: DEFAULT_MANIFEST_EXTENSION.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from all sources
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            match Self::load_from_file(&path) {
                Ok(loaded) => {
                    config = loaded;
                    log::info!("Loaded plugin registry config from {}", Path::new(&path).display());
                }
                Err(e) => log::warn!("Ignoring plugin registry config: {}", e),
            }
        }

        if let Ok(var) = std::env::var(PATH_VAR_ENV) {
            if !var.is_empty() {
                config.path_variable = var;
            }
        }

        if let Ok(ext) = std::env::var(MANIFEST_EXT_ENV) {
            if !ext.trim_start_matches('.').is_empty() {
                config = config.with_manifest_extension(ext);
            }
        }

        config
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            PluginError::Config { message, .. } => PluginError::Config {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(|e| PluginError::Config {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        config.manifest_extension = config.manifest_extension.trim_start_matches('.').to_string();
        Ok(config)
    }

    /// Add a directory searched after the environment path
    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extra_directories.push(dir.into());
        self
    }

    /// Set the manifest extension, with or without the leading dot
    pub fn with_manifest_extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.manifest_extension = ext.trim_start_matches('.').to_string();
        self
    }

    /// Search directories in priority order, read from the environment
    pub fn search_directories(&self) -> Vec<PathBuf> {
        let value = std::env::var_os(&self.path_variable);
        self.search_directories_from(value.as_deref())
    }

    /// Search directories in priority order for a given path variable value
    pub fn search_directories_from(&self, value: Option<&OsStr>) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();

        let from_env = value.map(|v| std::env::split_paths(v).collect::<Vec<_>>()).unwrap_or_default();

        for dir in from_env.into_iter().chain(self.extra_directories.iter().cloned()) {
            if dir.as_os_str().is_empty() || dirs.contains(&dir) {
                continue;
            }
            dirs.push(dir);
        }

        dirs
    }
}
