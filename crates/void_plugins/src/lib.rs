//! # void_plugins - Plugin Factory Registry
//!
//! Process-wide registry of component factories published by independently
//! built shared libraries. The host constructs components by identifier and
//! call signature without linking against their implementations.
//!
//! ## Overview
//!
//! Every directory on the library search path may hold manifest files
//! (`*.components`) naming the identifiers each library provides. The
//! registry reads them on first use, loads a library the first time one of
//! its identifiers is requested and checks the requested signature against
//! the one the factory was registered with.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │   Factory<S>    │────▶│    Registry     │ ◀── one lock
//! │ (typed create)  │     │   (singleton)   │
//! └─────────────────┘     └───┬─────────┬───┘
//!                             │         │
//!                             ▼         ▼
//! ┌─────────────────┐     ┌─────────┐ ┌─────────────────┐
//! │ ManifestScanner │────▶│ Library │ │  LibraryLoader  │
//! │  (*.components) │     │  Index  │ │  (libloading)   │
//! └─────────────────┘     └─────────┘ └────────┬────────┘
//!                                              │
//!                                              ▼
//!                                     ┌─────────────────┐
//!                                     │RegistrationTable│ ◀── declare_plugin!
//!                                     │  (per library)  │
//!                                     └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use void_plugins::prelude::*;
//!
//! type WidgetFactory = fn(String) -> Box<dyn Widget>;
//!
//! // Loads the library listed for "Button" on first use
//! let button = Factory::<WidgetFactory>::create("Button", "OK".to_string())?;
//! ```
//!
//! ## Plugin Side
//!
//! ```ignore
//! use void_plugins::{declare_plugin, RegistrationTable};
//!
//! fn register(table: &mut RegistrationTable) {
//!     table.add::<Button, WidgetFactory>("Button", |label| Box::new(Button::new(label)));
//! }
//!
//! declare_plugin!(register);
//! ```
//!
//! And a manifest next to the library, e.g. `widgets.components`:
//!
//! ```text
//! libwidgets.so Button Slider
//! ```

mod config;
mod error;
mod factory;
mod library;
mod manifest;
mod properties;
mod registration;
mod registry;
mod signature;

pub mod logging;

#[cfg(feature = "capi")]
pub mod ffi;

pub use config::{
    RegistryConfig, CONFIG_ENV, DEFAULT_MANIFEST_EXTENSION, DEFAULT_PATH_VARIABLE, MANIFEST_EXT_ENV,
    PATH_VAR_ENV,
};
pub use error::{PluginError, Result};
pub use factory::Factory;
pub use library::{DynamicLibraryLoader, LibraryLoader, LoadOutcome, StaticLibraryLoader};
pub use manifest::{
    parse_manifest, LibraryIndex, MalformedLine, ManifestEntry, ManifestScanner, ParsedManifest,
};
pub use properties::FactoryProperties;
pub use registration::{
    PluginDeclaration, Registration, RegistrationTable, CORE_VERSION, DECLARATION_SYMBOL,
    VOID_PLUGIN_API_VERSION,
};
pub use registry::{DuplicateRegistration, FactoryInfo, FactoryRecord, Registry};
pub use signature::{Signature, SignatureTag};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::declare_plugin;
    pub use crate::error::{PluginError, Result};
    pub use crate::factory::Factory;
    pub use crate::registration::RegistrationTable;
    pub use crate::registry::Registry;
    pub use crate::signature::{Signature, SignatureTag};
}
