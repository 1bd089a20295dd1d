//! Error types for the plugin registry

use std::path::PathBuf;
use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// Errors that can occur while resolving or loading plugin factories
#[derive(Debug, Error)]
pub enum PluginError {
    /// No factory is known under this identifier, even after loading its library
    #[error("Unknown plugin identifier '{0}'")]
    UnknownIdentifier(String),

    /// The identifier exists but was registered with another call signature
    #[error("Plugin '{id}' is registered with signature '{registered}', requested '{requested}'")]
    SignatureMismatch {
        id: String,
        registered: String,
        requested: String,
    },

    /// Failed to load a dynamic library
    #[error("Failed to load library '{library}': {message}")]
    LibraryLoad {
        library: String,
        message: String,
    },

    /// The library was built against an incompatible plugin API
    #[error("Library '{library}' was built for plugin API {found}, expected {expected}")]
    VersionMismatch {
        library: String,
        found: String,
        expected: String,
    },

    /// Invalid configuration file
    #[error("Invalid configuration '{path}': {message}")]
    Config {
        path: PathBuf,
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Create a library load error
    pub fn load_error(library: impl Into<String>, message: impl Into<String>) -> Self {
        PluginError::LibraryLoad {
            library: library.into(),
            message: message.into(),
        }
    }

    /// Create a signature mismatch error
    pub fn signature_mismatch(
        id: impl Into<String>,
        registered: impl Into<String>,
        requested: impl Into<String>,
    ) -> Self {
        PluginError::SignatureMismatch {
            id: id.into(),
            registered: registered.into(),
            requested: requested.into(),
        }
    }

    /// Whether the requested component is simply unavailable
    ///
    /// Load failures count as unavailable: callers cannot tell a missing
    /// library from a missing identifier and should not need to.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            PluginError::UnknownIdentifier(_)
                | PluginError::LibraryLoad { .. }
                | PluginError::VersionMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PluginError::UnknownIdentifier("3".into());
        assert_eq!(err.to_string(), "Unknown plugin identifier '3'");

        let err = PluginError::signature_mismatch("1", "fn(A) -> R", "fn() -> R");
        assert!(err.to_string().contains("registered with signature 'fn(A) -> R'"));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_unavailable_kinds() {
        assert!(PluginError::UnknownIdentifier("x".into()).is_unavailable());
        assert!(PluginError::load_error("libX.so", "not found").is_unavailable());
    }
}
