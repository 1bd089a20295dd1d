//! Self-registration of plugin components
//!
//! A plugin library describes its components in a [`RegistrationTable`] and
//! exports it through [`declare_plugin!`]. When the registry loads the
//! library it reads the exported [`PluginDeclaration`], builds the table and
//! applies every registration. Host code never calls into the plugin itself.
//!
//! ```ignore
//! use void_plugins::{declare_plugin, RegistrationTable};
//!
//! pub type WidgetFactory = fn(String) -> Box<dyn Widget>;
//!
//! fn register(table: &mut RegistrationTable) {
//!     table
//!         .add::<Button, WidgetFactory>("Button", |label| Box::new(Button::new(label)))
//!         .property("category", "input");
//! }
//!
//! declare_plugin!(register);
//! ```

use crate::properties::FactoryProperties;
use crate::signature::{Signature, SignatureTag};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Version of the plugin declaration layout
pub const VOID_PLUGIN_API_VERSION: u32 = 1;

/// Version of this crate, compiled into every plugin declaration
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the symbol exported by [`declare_plugin!`]
pub const DECLARATION_SYMBOL: &[u8] = b"VOID_PLUGIN_DECLARATION\0";

/// One component factory published under an identifier
pub struct Registration {
    pub(crate) id: String,
    pub(crate) creator: Arc<dyn Any + Send + Sync>,
    pub(crate) signature: SignatureTag,
    pub(crate) class_name: &'static str,
    pub(crate) properties: FactoryProperties,
}

impl Registration {
    /// Register `factory` as the constructor of component type `T`
    ///
    /// The identifier is formatted with `Display`, so numeric identifiers
    /// such as `1` are stored as `"1"`.
    pub fn new<T: ?Sized, S: Signature>(id: impl fmt::Display, factory: S) -> Self {
        Self {
            id: id.to_string(),
            creator: Arc::new(factory),
            signature: S::tag(),
            class_name: type_name::<T>(),
            properties: FactoryProperties::new(),
        }
    }

    /// Attach a property to the factory
    pub fn property(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.properties.insert(key, value);
        self
    }

    /// Identifier of the factory
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Signature the factory was registered with
    pub fn signature(&self) -> SignatureTag {
        self.signature
    }

    /// Name of the constructed component type
    pub fn class_name(&self) -> &str {
        self.class_name
    }

    /// Properties attached so far
    pub fn properties(&self) -> &FactoryProperties {
        &self.properties
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("class_name", &self.class_name)
            .field("properties", &self.properties.len())
            .finish()
    }
}

/// Registrations published by one library
#[derive(Debug, Default)]
pub struct RegistrationTable {
    entries: Vec<Registration>,
}

impl RegistrationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table by running a registration function
    pub fn from_fn(register: fn(&mut RegistrationTable)) -> Self {
        let mut table = Self::new();
        register(&mut table);
        table
    }

    /// Register component `T` under `id` with the factory signature `S`
    pub fn add<T: ?Sized, S: Signature>(&mut self, id: impl fmt::Display, factory: S) -> &mut Registration {
        self.push(Registration::new::<T, S>(id, factory))
    }

    /// Append a prepared registration
    pub fn push(&mut self, registration: Registration) -> &mut Registration {
        self.entries.push(registration);
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    /// Identifiers in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.id.as_str())
    }

    /// Iterate over registrations
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.entries.iter()
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for RegistrationTable {
    type Item = Registration;
    type IntoIter = std::vec::IntoIter<Registration>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Declaration exported by a plugin library
///
/// Produced by [`declare_plugin!`]; the host checks both versions before
/// running `register`. Host and plugin must be built by the same compiler.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PluginDeclaration {
    /// Must equal [`VOID_PLUGIN_API_VERSION`]
    pub api_version: u32,
    /// Must equal [`CORE_VERSION`]
    pub core_version: &'static str,
    /// Fills the library's registration table
    pub register: fn(&mut RegistrationTable),
}

impl fmt::Debug for PluginDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDeclaration")
            .field("api_version", &self.api_version)
            .field("core_version", &self.core_version)
            .finish()
    }
}

impl PluginDeclaration {
    /// Whether the declaration was built against this crate
    pub fn is_compatible(&self) -> bool {
        self.api_version == VOID_PLUGIN_API_VERSION && self.core_version == CORE_VERSION
    }

    /// Run the registration function
    pub fn table(&self) -> RegistrationTable {
        RegistrationTable::from_fn(self.register)
    }
}

/// Export the registration function of a plugin library
///
/// Expands to the `VOID_PLUGIN_DECLARATION` static that the dynamic library
/// loader looks up after mapping the library. Use it once per library.
#[macro_export]
macro_rules! declare_plugin {
    ($register:path) => {
        #[no_mangle]
        pub static VOID_PLUGIN_DECLARATION: $crate::PluginDeclaration = $crate::PluginDeclaration {
            api_version: $crate::VOID_PLUGIN_API_VERSION,
            core_version: $crate::CORE_VERSION,
            register: $register,
        };
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gadget(String);

    type GadgetFactory = fn(String) -> Box<Gadget>;

    fn register(table: &mut RegistrationTable) {
        table
            .add::<Gadget, GadgetFactory>("Gadget", |name| Box::new(Gadget(name)))
            .property("doc", "a gadget")
            .property("version", "2");
        table.add::<Gadget, GadgetFactory>(42, |name| Box::new(Gadget(name)));
    }

    #[test]
    fn test_table_from_fn() {
        let table = RegistrationTable::from_fn(register);

        assert_eq!(table.len(), 2);
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["Gadget", "42"]);

        let first = table.iter().next().unwrap();
        assert!(first.class_name().ends_with("Gadget"));
        assert_eq!(first.signature(), SignatureTag::of::<GadgetFactory>());
        assert_eq!(first.properties().get("version"), Some("2"));
    }

    #[test]
    fn test_creator_holds_factory() {
        let table = RegistrationTable::from_fn(register);
        let reg = table.into_iter().next().unwrap();

        let factory = reg.creator.downcast_ref::<GadgetFactory>().copied().unwrap();
        assert_eq!(factory("x".into()).0, "x");
        assert!(reg.creator.downcast_ref::<fn() -> Box<Gadget>>().is_none());
    }

    #[test]
    fn test_declaration_compatibility() {
        let decl = PluginDeclaration {
            api_version: VOID_PLUGIN_API_VERSION,
            core_version: CORE_VERSION,
            register,
        };
        assert!(decl.is_compatible());
        assert_eq!(decl.table().len(), 2);

        let old = PluginDeclaration { api_version: 0, ..decl };
        assert!(!old.is_compatible());

        let other = PluginDeclaration { core_version: "0.0.0-other", ..decl };
        assert!(!other.is_compatible());
    }
}
