//! Plugin factory registry
//!
//! Central database of component factories. The registry reads manifests on
//! first use, loads the owning library of an identifier the first time that
//! identifier is requested, and checks every lookup against the signature the
//! factory was registered with.

use crate::config::RegistryConfig;
use crate::error::{PluginError, Result};
use crate::library::{DynamicLibraryLoader, LibraryLoader, LoadOutcome};
use crate::manifest::{LibraryIndex, ManifestScanner};
use crate::properties::FactoryProperties;
use crate::registration::{Registration, RegistrationTable};
use crate::signature::{Signature, SignatureTag};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Metadata of a registered factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryInfo {
    /// Identifier the factory is registered under
    pub id: String,
    /// Library that registered the factory
    pub library: String,
    /// Name of the factory signature type
    pub signature_type_name: String,
    /// Name of the type the factory returns
    pub return_type_name: String,
    /// Name of the constructed component type
    pub class_name: String,
    /// Properties attached at registration
    pub properties: FactoryProperties,
}

/// A registered factory: metadata plus the type-erased creator
pub struct FactoryRecord {
    info: FactoryInfo,
    signature: TypeId,
    creator: Arc<dyn Any + Send + Sync>,
}

impl FactoryRecord {
    fn from_registration(library: &str, registration: Registration) -> Self {
        Self {
            info: FactoryInfo {
                id: registration.id,
                library: library.to_string(),
                signature_type_name: registration.signature.type_name().to_string(),
                return_type_name: registration.signature.return_type_name().to_string(),
                class_name: registration.class_name.to_string(),
                properties: registration.properties,
            },
            signature: registration.signature.type_id(),
            creator: registration.creator,
        }
    }

    /// Full metadata
    pub fn info(&self) -> &FactoryInfo {
        &self.info
    }

    /// Identifier
    pub fn id(&self) -> &str {
        &self.info.id
    }

    /// Owning library
    pub fn library(&self) -> &str {
        &self.info.library
    }

    /// Name of the registered signature type
    pub fn signature_type_name(&self) -> &str {
        &self.info.signature_type_name
    }

    /// Name of the return type
    pub fn return_type_name(&self) -> &str {
        &self.info.return_type_name
    }

    /// Name of the component type
    pub fn class_name(&self) -> &str {
        &self.info.class_name
    }

    /// Attached properties
    pub fn properties(&self) -> &FactoryProperties {
        &self.info.properties
    }

    /// Whether the factory was registered with this signature
    pub fn accepts(&self, signature: &SignatureTag) -> bool {
        self.signature == signature.type_id()
    }

    /// The factory as its concrete signature type, if `S` matches
    pub fn creator<S: Signature>(&self) -> Option<S> {
        self.creator.downcast_ref::<S>().copied()
    }
}

impl fmt::Debug for FactoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRecord").field("info", &self.info).finish()
    }
}

/// An identifier registered twice; the later registration replaced the earlier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRegistration {
    /// The contested identifier
    pub id: String,
    /// Library of the replaced factory
    pub previous_library: String,
    /// Component type of the replaced factory
    pub previous_class: String,
    /// Library of the live factory
    pub library: String,
    /// Component type of the live factory
    pub class_name: String,
}

/// Mutable registry state, guarded by a single lock
struct RegistryState {
    config: RegistryConfig,
    initialized: bool,
    index: LibraryIndex,
    factories: BTreeMap<String, Arc<FactoryRecord>>,
    loader: Box<dyn LibraryLoader>,
    duplicates: Vec<DuplicateRegistration>,
}

impl RegistryState {
    fn initialize_if_needed(&mut self) {
        if self.initialized {
            return;
        }

        let dirs = self.config.search_directories();
        let added = self.scan(&dirs);

        log::debug!(
            "Plugin registry initialized: {} identifiers from {} directories",
            added,
            dirs.len()
        );
        self.initialized = true;
    }

    fn rescan(&mut self) -> usize {
        if !self.initialized {
            self.initialize_if_needed();
            return self.index.len();
        }

        let dirs = self.config.search_directories();
        self.scan(&dirs)
    }

    /// Merge manifests from `dirs` and point the loader at the same directories
    fn scan(&mut self, dirs: &[PathBuf]) -> usize {
        let added = ManifestScanner::new(self.config.manifest_extension.as_str()).scan_into(&mut self.index, dirs);
        self.loader.set_search_path(dirs.to_vec());
        added
    }

    fn add(&mut self, library: &str, registration: Registration) {
        let record = FactoryRecord::from_registration(library, registration);
        let id = record.info.id.clone();

        if let Some(previous) = self.factories.get(&id) {
            log::warn!(
                "Duplicate registration of '{}': '{}' from '{}' replaces '{}' from '{}'",
                id,
                record.info.class_name,
                library,
                previous.info.class_name,
                previous.info.library
            );
            self.duplicates.push(DuplicateRegistration {
                id: id.clone(),
                previous_library: previous.info.library.clone(),
                previous_class: previous.info.class_name.clone(),
                library: library.to_string(),
                class_name: record.info.class_name.clone(),
            });
        } else if let Some(indexed) = self.index.library_for(&id) {
            if indexed != library {
                log::debug!(
                    "'{}' registered by '{}' but manifests list it under '{}'",
                    id,
                    library,
                    indexed
                );
            }
        }

        self.factories.insert(id, Arc::new(record));
    }

    fn apply(&mut self, library: &str, table: RegistrationTable) -> usize {
        let mut applied = 0;
        for registration in table {
            self.add(library, registration);
            applied += 1;
        }
        applied
    }

    fn load_library(&mut self, library: &str) -> Result<usize> {
        match self.loader.load(library)? {
            LoadOutcome::AlreadyLoaded => Ok(0),
            LoadOutcome::Loaded(table) => Ok(self.apply(library, table)),
        }
    }

    fn resolve(&mut self, id: &str) -> Result<Arc<FactoryRecord>> {
        self.initialize_if_needed();

        if let Some(record) = self.factories.get(id) {
            return Ok(Arc::clone(record));
        }

        let library = match self.index.library_for(id) {
            Some(library) => library.to_string(),
            None => {
                log::debug!("No manifest provides '{}'", id);
                return Err(PluginError::UnknownIdentifier(id.to_string()));
            }
        };

        if let Err(e) = self.load_library(&library) {
            log::error!("Cannot load library '{}' providing '{}': {}", library, id, e);
            return Err(PluginError::UnknownIdentifier(id.to_string()));
        }

        match self.factories.get(id) {
            Some(record) => Ok(Arc::clone(record)),
            None => {
                log::error!("Library '{}' is loaded but does not register '{}'", library, id);
                Err(PluginError::UnknownIdentifier(id.to_string()))
            }
        }
    }
}

/// Central registry of plugin factories
///
/// Every operation runs under one lock: initialization, lookups, lazy
/// library loading and insertion never interleave. Factories are invoked
/// after the lock is released.
pub struct Registry {
    state: Mutex<RegistryState>,
}

static INSTANCE: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// Create a registry with its own configuration and loader
    pub fn new(config: RegistryConfig, loader: impl LibraryLoader + 'static) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                config,
                initialized: false,
                index: LibraryIndex::new(),
                factories: BTreeMap::new(),
                loader: Box::new(loader),
                duplicates: Vec::new(),
            }),
        }
    }

    /// The process-wide registry
    ///
    /// Built on first use from [`RegistryConfig::load`] with a
    /// [`DynamicLibraryLoader`] over the configured search directories.
    /// It is never torn down.
    pub fn instance() -> &'static Registry {
        INSTANCE.get_or_init(|| {
            let config = RegistryConfig::load();
            let loader = DynamicLibraryLoader::new(config.search_directories());
            Registry::new(config, loader)
        })
    }

    // ========== Initialization ==========

    /// Read the manifests of the search path, once
    pub fn initialize_if_needed(&self) {
        self.state.lock().initialize_if_needed();
    }

    /// Whether manifests have been read
    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    /// Read manifests that appeared since initialization
    ///
    /// Existing mappings are kept; returns the number of identifiers added.
    pub fn rescan(&self) -> usize {
        self.state.lock().rescan()
    }

    /// Current search directories, highest priority first
    pub fn search_path(&self) -> Vec<PathBuf> {
        self.state.lock().config.search_directories()
    }

    // ========== Lookup ==========

    /// Factory registered under `id`, checked against `signature`
    ///
    /// Loads the owning library on first request.
    pub fn get(&self, id: &str, signature: &SignatureTag) -> Result<Arc<FactoryRecord>> {
        let record = self.state.lock().resolve(id)?;

        if !record.accepts(signature) {
            log::debug!(
                "'{}' requested as '{}' but registered as '{}'",
                id,
                signature.type_name(),
                record.signature_type_name()
            );
            return Err(PluginError::signature_mismatch(
                id,
                record.signature_type_name(),
                signature.type_name(),
            ));
        }

        Ok(record)
    }

    /// Factory registered under `id`, whatever its signature
    pub fn get_info(&self, id: &str) -> Result<Arc<FactoryRecord>> {
        self.state.lock().resolve(id)
    }

    /// The factory for `id` as signature `S`
    pub fn resolve<S: Signature>(&self, id: &str) -> Result<S> {
        let tag = S::tag();
        let record = self.get(id, &tag)?;
        record.creator::<S>().ok_or_else(|| {
            PluginError::signature_mismatch(id, record.signature_type_name(), tag.type_name())
        })
    }

    /// Construct the component `id` through signature `S`
    pub fn create<S: Signature>(&self, id: &str, args: S::Args) -> Result<S::Return> {
        let factory = self.resolve::<S>(id)?;
        Ok(factory.invoke(args))
    }

    /// Already registered factory, without loading anything
    pub fn registered(&self, id: &str) -> Option<Arc<FactoryRecord>> {
        self.state.lock().factories.get(id).cloned()
    }

    /// Library owning `id`, from registrations or manifests
    pub fn library_for(&self, id: &str) -> Option<String> {
        let mut state = self.state.lock();
        state.initialize_if_needed();
        if let Some(record) = state.factories.get(id) {
            return Some(record.info.library.clone());
        }
        state.index.library_for(id).map(str::to_string)
    }

    // ========== Registration ==========

    /// Apply a registration table for components linked into the host
    ///
    /// Returns the number of registrations applied.
    pub fn register_table(&self, library: &str, table: RegistrationTable) -> usize {
        self.state.lock().apply(library, table)
    }

    /// Load a library now and apply its registrations
    ///
    /// Returns the number of registrations applied, 0 if it was already loaded.
    pub fn load_library(&self, library: &str) -> Result<usize> {
        let mut state = self.state.lock();
        state.initialize_if_needed();
        state.load_library(library)
    }

    /// Check if a library has been loaded
    pub fn is_library_loaded(&self, library: &str) -> bool {
        self.state.lock().loader.is_loaded(library)
    }

    /// Names of loaded libraries
    pub fn loaded_libraries(&self) -> Vec<String> {
        self.state.lock().loader.loaded_libraries()
    }

    /// Identifiers replaced by a later registration, oldest first
    pub fn duplicate_registrations(&self) -> Vec<DuplicateRegistration> {
        self.state.lock().duplicates.clone()
    }

    // ========== Enumeration ==========

    /// Identifiers with a registered factory
    ///
    /// Reads the manifests if needed but loads no library.
    pub fn list_identifiers(&self) -> BTreeSet<String> {
        let mut state = self.state.lock();
        state.initialize_if_needed();
        state.factories.keys().cloned().collect()
    }

    /// Registered identifiers plus those known from manifests
    pub fn known_identifiers(&self) -> BTreeSet<String> {
        let mut state = self.state.lock();
        state.initialize_if_needed();
        state
            .factories
            .keys()
            .cloned()
            .chain(state.index.identifiers().map(str::to_string))
            .collect()
    }

    /// Libraries listed in manifests
    pub fn manifest_libraries(&self) -> Vec<String> {
        let mut state = self.state.lock();
        state.initialize_if_needed();
        state.index.libraries().into_iter().map(str::to_string).collect()
    }

    /// Number of registered factories
    pub fn factory_count(&self) -> usize {
        let mut state = self.state.lock();
        state.initialize_if_needed();
        state.factories.len()
    }

    /// Registered factory at a position in identifier order
    pub fn factory_at(&self, index: usize) -> Option<Arc<FactoryRecord>> {
        let mut state = self.state.lock();
        state.initialize_if_needed();
        state.factories.values().nth(index).cloned()
    }

    /// Snapshot of all registered factories in identifier order
    pub fn factories(&self) -> Vec<Arc<FactoryRecord>> {
        let mut state = self.state.lock();
        state.initialize_if_needed();
        state.factories.values().cloned().collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Registry")
            .field("initialized", &state.initialized)
            .field("indexed", &state.index.len())
            .field("factories", &state.factories.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::StaticLibraryLoader;
    use std::path::Path;

    trait Shape {
        fn name(&self) -> String;
    }

    struct Circle {
        label: String,
        radius: u32,
    }

    impl Shape for Circle {
        fn name(&self) -> String {
            format!("{}:{}", self.label, self.radius)
        }
    }

    struct Square;

    impl Shape for Square {
        fn name(&self) -> String {
            "square".into()
        }
    }

    type LabeledShape = fn(String, u32) -> Box<dyn Shape>;
    type PlainShape = fn() -> Box<dyn Shape>;

    fn register_shapes(table: &mut RegistrationTable) {
        table
            .add::<Circle, LabeledShape>("Circle", |label, radius| Box::new(Circle { label, radius }))
            .property("doc", "a round shape");
        table.add::<Circle, LabeledShape>(1, |label, radius| Box::new(Circle { label, radius }));
        table.add::<Square, PlainShape>("Square", || Box::new(Square));
    }

    fn register_other(table: &mut RegistrationTable) {
        table.add::<Square, PlainShape>("Other", || Box::new(Square));
    }

    fn register_nothing(_table: &mut RegistrationTable) {}

    fn write_manifest(dir: &Path, content: &str) {
        std::fs::write(dir.join("test.components"), content).unwrap();
    }

    fn config_for(dir: &Path) -> RegistryConfig {
        RegistryConfig {
            path_variable: "VOID_PLUGINS_TEST_UNSET_VARIABLE".into(),
            ..RegistryConfig::default()
        }
        .with_directory(dir)
    }

    fn registry_for(dir: &Path) -> Registry {
        let loader = StaticLibraryLoader::new()
            .with_library("libShapes.so", register_shapes)
            .with_library("libOther.so", register_other)
            .with_library("libEmpty.so", register_nothing);
        Registry::new(config_for(dir), loader)
    }

    #[test]
    fn test_registry_creation() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_for(dir.path());

        assert!(!registry.is_initialized());
        assert!(registry.list_identifiers().is_empty());
        assert!(registry.is_initialized());
        assert!(registry.loaded_libraries().is_empty());
    }

    #[test]
    fn test_unknown_identifier() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "libShapes.so Circle 1 Square\n");
        let registry = registry_for(dir.path());

        let err = registry.get_info("3").unwrap_err();
        assert!(matches!(err, PluginError::UnknownIdentifier(ref id) if id == "3"));

        let err = registry.get("3", &SignatureTag::of::<PlainShape>()).unwrap_err();
        assert!(matches!(err, PluginError::UnknownIdentifier(_)));

        // Nothing was loaded for an identifier no manifest mentions
        assert!(registry.loaded_libraries().is_empty());
    }

    #[test]
    fn test_lazy_load_and_create() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "libShapes.so Circle 1 Square\nlibOther.so Other\n");
        let registry = registry_for(dir.path());

        assert!(registry.list_identifiers().is_empty());
        assert!(!registry.is_library_loaded("libShapes.so"));

        let shape = registry
            .create::<LabeledShape>("Circle", ("c".to_string(), 3))
            .unwrap();
        assert_eq!(shape.name(), "c:3");

        assert!(registry.is_library_loaded("libShapes.so"));
        assert!(!registry.is_library_loaded("libOther.so"));

        let ids: Vec<String> = registry.list_identifiers().into_iter().collect();
        assert_eq!(ids, vec!["1", "Circle", "Square"]);
    }

    #[test]
    fn test_signature_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "libShapes.so Circle 1 Square\n");
        let registry = registry_for(dir.path());

        match registry.get("1", &SignatureTag::of::<PlainShape>()) {
            Err(PluginError::SignatureMismatch { id, registered, requested }) => {
                assert_eq!(id, "1");
                assert_eq!(registered, SignatureTag::of::<LabeledShape>().type_name());
                assert_eq!(requested, SignatureTag::of::<PlainShape>().type_name());
            }
            other => panic!("expected signature mismatch, got {:?}", other),
        }

        assert!(registry.resolve::<fn(String) -> Box<dyn Shape>>("Circle").is_err());
        assert!(registry.resolve::<LabeledShape>("1").is_ok());
        assert!(registry.create::<PlainShape>("Square", ()).is_ok());
    }

    #[test]
    fn test_get_info_metadata() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "libShapes.so Circle\n");
        let registry = registry_for(dir.path());

        let record = registry.get_info("Circle").unwrap();
        assert_eq!(record.id(), "Circle");
        assert_eq!(record.library(), "libShapes.so");
        assert!(record.class_name().ends_with("Circle"));
        assert_eq!(record.signature_type_name(), SignatureTag::of::<LabeledShape>().type_name());
        assert_eq!(record.return_type_name(), SignatureTag::of::<LabeledShape>().return_type_name());
        assert_eq!(record.properties().get("doc"), Some("a round shape"));
        assert!(record.accepts(&SignatureTag::of::<LabeledShape>()));
        assert!(record.creator::<PlainShape>().is_none());
    }

    #[test]
    fn test_load_library_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_for(dir.path());

        assert_eq!(registry.load_library("libShapes.so").unwrap(), 3);
        let after_first = registry.list_identifiers();

        assert_eq!(registry.load_library("libShapes.so").unwrap(), 0);
        assert_eq!(registry.list_identifiers(), after_first);
        assert!(registry.duplicate_registrations().is_empty());
    }

    #[test]
    fn test_initialize_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "libShapes.so Circle\n");
        let registry = registry_for(dir.path());

        registry.initialize_if_needed();
        assert_eq!(registry.known_identifiers().len(), 1);

        std::fs::write(dir.path().join("late.components"), "libOther.so Other\n").unwrap();
        registry.initialize_if_needed();

        assert_eq!(registry.known_identifiers().len(), 1);
        assert!(registry.get_info("Other").is_err());

        assert_eq!(registry.rescan(), 1);
        assert_eq!(registry.library_for("Other").as_deref(), Some("libOther.so"));
        assert_eq!(registry.library_for("Circle").as_deref(), Some("libShapes.so"));
        assert!(registry.get_info("Other").is_ok());
    }

    #[test]
    fn test_duplicate_registration_last_wins() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_for(dir.path());

        let mut first = RegistrationTable::new();
        first.add::<Circle, LabeledShape>("Shape", |label, radius| Box::new(Circle { label, radius }));
        let mut second = RegistrationTable::new();
        second.add::<Square, PlainShape>("Shape", || Box::new(Square));

        registry.register_table("libA.so", first);
        registry.register_table("libB.so", second);

        let record = registry.get_info("Shape").unwrap();
        assert_eq!(record.library(), "libB.so");
        assert!(record.class_name().ends_with("Square"));
        assert_eq!(registry.factory_count(), 1);

        let duplicates = registry.duplicate_registrations();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].id, "Shape");
        assert_eq!(duplicates[0].previous_library, "libA.so");
        assert_eq!(duplicates[0].library, "libB.so");

        assert!(registry.create::<PlainShape>("Shape", ()).is_ok());
        assert!(registry.create::<LabeledShape>("Shape", ("x".into(), 1)).is_err());
    }

    #[test]
    fn test_library_load_failure_is_unknown_identifier() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "libMissing.so Ghost\nlibEmpty.so Phantom\n");
        let registry = registry_for(dir.path());

        let err = registry.get_info("Ghost").unwrap_err();
        assert!(matches!(err, PluginError::UnknownIdentifier(_)));
        assert!(!registry.is_library_loaded("libMissing.so"));

        // Loaded, but the library never registers the identifier
        let err = registry.get_info("Phantom").unwrap_err();
        assert!(matches!(err, PluginError::UnknownIdentifier(_)));
        assert!(registry.is_library_loaded("libEmpty.so"));

        let err = registry.load_library("libMissing.so").unwrap_err();
        assert!(matches!(err, PluginError::LibraryLoad { .. }));
    }

    #[test]
    fn test_lazy_load_only_adds_owning_library() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "libShapes.so Circle 1 Square\nlibOther.so Other\n");
        let registry = registry_for(dir.path());

        registry.get_info("Other").unwrap();
        let before = registry.list_identifiers();
        assert_eq!(before.iter().collect::<Vec<_>>(), vec!["Other"]);

        registry.get_info("Square").unwrap();
        let after = registry.list_identifiers();
        let added: Vec<&String> = after.difference(&before).collect();
        assert_eq!(added, vec!["1", "Circle", "Square"]);
        assert!(after.is_superset(&before));
    }

    /// Loader that finds a library only on the search path it was last given
    struct SearchPathLoader {
        search_path: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl LibraryLoader for SearchPathLoader {
        fn load(&mut self, library: &str) -> Result<LoadOutcome> {
            if self.search_path.lock().iter().any(|dir| dir.join(library).is_file()) {
                Ok(LoadOutcome::Loaded(RegistrationTable::from_fn(register_other)))
            } else {
                Err(PluginError::load_error(library, "not on the search path"))
            }
        }

        fn is_loaded(&self, _library: &str) -> bool {
            false
        }

        fn loaded_libraries(&self) -> Vec<String> {
            Vec::new()
        }

        fn set_search_path(&mut self, search_path: Vec<PathBuf>) {
            *self.search_path.lock() = search_path;
        }
    }

    #[test]
    fn test_rescan_points_loader_at_new_directories() {
        const VARIABLE: &str = "VOID_PLUGINS_TEST_RESCAN_PATH";
        std::env::set_var(VARIABLE, "/nonexistent");

        let config = RegistryConfig {
            path_variable: VARIABLE.into(),
            ..RegistryConfig::default()
        };
        let search_path = Arc::new(Mutex::new(Vec::new()));
        let registry = Registry::new(
            config,
            SearchPathLoader {
                search_path: Arc::clone(&search_path),
            },
        );

        registry.initialize_if_needed();
        assert_eq!(*search_path.lock(), vec![PathBuf::from("/nonexistent")]);

        let late = tempfile::tempdir().unwrap();
        std::fs::write(late.path().join("libLate.so"), b"").unwrap();
        std::fs::write(late.path().join("late.components"), "libLate.so Other\n").unwrap();
        std::env::set_var(VARIABLE, late.path());

        assert_eq!(registry.rescan(), 1);
        assert_eq!(registry.search_path(), vec![late.path().to_path_buf()]);
        assert_eq!(*search_path.lock(), registry.search_path());
        assert!(registry.create::<PlainShape>("Other", ()).is_ok());
    }

    #[test]
    fn test_enumeration_in_identifier_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_for(dir.path());
        registry.load_library("libShapes.so").unwrap();

        assert_eq!(registry.factory_count(), 3);
        assert_eq!(registry.factory_at(0).unwrap().id(), "1");
        assert_eq!(registry.factory_at(2).unwrap().id(), "Square");
        assert!(registry.factory_at(3).is_none());
        assert_eq!(registry.factories().len(), 3);
        assert!(registry.registered("Circle").is_some());
        assert!(registry.registered("Other").is_none());
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "libShapes.so Circle 1 Square\n");
        let registry = Arc::new(registry_for(dir.path()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .create::<LabeledShape>("Circle", (format!("t{}", i), i))
                        .map(|shape| shape.name())
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert!(registry.duplicate_registrations().is_empty());
        assert_eq!(registry.loaded_libraries(), vec!["libShapes.so".to_string()]);
    }
}
