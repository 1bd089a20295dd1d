//! # void_plugins_demo - Sample Plugin Library
//!
//! Two components behind one interface, published under class names and
//! under numeric aliases:
//!
//! | Identifier | Component |
//! |------------|-----------|
//! | `Class1`, `1` | [`Class1`] |
//! | `Class2`, `2` | [`Class2`] |
//!
//! Built as a `cdylib` this crate is a loadable plugin; the `rlib` lets tests
//! register the same table with a [`StaticLibraryLoader`](void_plugins::StaticLibraryLoader).

use void_plugins::{declare_plugin, RegistrationTable};

/// Interface implemented by the demo components
pub trait DemoComponent: Send {
    /// Instance name given at construction
    fn name(&self) -> &str;

    /// Extra argument given at construction
    fn argument(&self) -> &str;

    /// Do the component's work, returning a description of it
    fn the_method(&self) -> String;
}

/// Factory signature of the demo components: `(name, argument)`
pub type DemoFactory = fn(String, String) -> Box<dyn DemoComponent>;

/// Identifiers published by this library
pub const IDENTIFIERS: [&str; 4] = ["Class1", "1", "Class2", "2"];

/// First demo component
#[derive(Debug, Clone)]
pub struct Class1 {
    name: String,
    argument: String,
}

impl Class1 {
    pub fn new(name: String, argument: String) -> Self {
        Self { name, argument }
    }
}

impl DemoComponent for Class1 {
    fn name(&self) -> &str {
        &self.name
    }

    fn argument(&self) -> &str {
        &self.argument
    }

    fn the_method(&self) -> String {
        log::info!("Class1 '{}' doing its work with '{}'", self.name, self.argument);
        format!("Class1({}, {})", self.name, self.argument)
    }
}

/// Second demo component
#[derive(Debug, Clone)]
pub struct Class2 {
    name: String,
    argument: String,
}

impl Class2 {
    pub fn new(name: String, argument: String) -> Self {
        Self { name, argument }
    }
}

impl DemoComponent for Class2 {
    fn name(&self) -> &str {
        &self.name
    }

    fn argument(&self) -> &str {
        &self.argument
    }

    fn the_method(&self) -> String {
        log::info!("Class2 '{}' doing its work with '{}'", self.name, self.argument);
        format!("Class2({}, {})", self.name, self.argument)
    }
}

/// Publish the demo components
pub fn register(table: &mut RegistrationTable) {
    table
        .add::<Class1, DemoFactory>("Class1", |name, arg| Box::new(Class1::new(name, arg)))
        .property("doc", "first demo component");
    table.add::<Class1, DemoFactory>(1, |name, arg| Box::new(Class1::new(name, arg)));

    table
        .add::<Class2, DemoFactory>("Class2", |name, arg| Box::new(Class2::new(name, arg)))
        .property("doc", "second demo component");
    table.add::<Class2, DemoFactory>(2, |name, arg| Box::new(Class2::new(name, arg)));
}

/// Manifest text announcing this library's identifiers under `library`
pub fn manifest(library: &str) -> String {
    format!(
        "# void_plugins_demo\n{} Class1 1\n{}:Class2\n{}:2\n",
        library, library, library
    )
}

declare_plugin!(register);
