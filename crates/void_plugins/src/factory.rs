//! Typed factory dispatch
//!
//! `Factory<S>` is the caller-facing entry point: name the signature once as a
//! type, then construct components by identifier with plain arguments.
//!
//! ```ignore
//! type WidgetFactory = fn(String) -> Box<dyn Widget>;
//!
//! let button = Factory::<WidgetFactory>::create("Button", "OK".to_string())?;
//! ```

use crate::error::Result;
use crate::registry::Registry;
use crate::signature::{Signature, SignatureTag};
use std::fmt;
use std::marker::PhantomData;

/// Constructs components through the factory signature `S`
pub struct Factory<S>(PhantomData<S>);

impl<S: Signature> Factory<S> {
    /// Tag the registry checks lookups against
    pub fn tag() -> SignatureTag {
        S::tag()
    }

    /// Whether `id` can be constructed with this signature, loading its library if needed
    pub fn is_available(id: &str) -> bool {
        Self::is_available_in(Registry::instance(), id)
    }

    /// Like [`Factory::is_available`] against an explicit registry
    pub fn is_available_in(registry: &Registry, id: &str) -> bool {
        registry.get(id, &S::tag()).is_ok()
    }
}

macro_rules! impl_factory {
    ($($arg:ident $val:ident),*) => {
        impl<R: 'static, $($arg: 'static),*> Factory<fn($($arg),*) -> R> {
            /// Construct the component `id` through the process-wide registry
            pub fn create(id: &str $(, $val: $arg)*) -> Result<R> {
                Self::create_in(Registry::instance(), id $(, $val)*)
            }

            /// Construct the component `id` through `registry`
            ///
            /// The registry lock is released before the factory runs.
            pub fn create_in(registry: &Registry, id: &str $(, $val: $arg)*) -> Result<R> {
                let factory = registry.resolve::<fn($($arg),*) -> R>(id)?;
                Ok(factory($($val),*))
            }
        }
    };
}

impl_factory!();
impl_factory!(A1 a1);
impl_factory!(A1 a1, A2 a2);
impl_factory!(A1 a1, A2 a2, A3 a3);

impl<S: Signature> fmt::Debug for Factory<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Factory").field(&S::tag()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::error::PluginError;
    use crate::library::StaticLibraryLoader;
    use crate::registration::RegistrationTable;

    trait Greeter {
        fn greet(&self) -> String;
    }

    struct Plain;

    impl Greeter for Plain {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    struct Named(String, u8, bool);

    impl Greeter for Named {
        fn greet(&self) -> String {
            if self.2 {
                format!("{}x{}", self.0, self.1)
            } else {
                self.0.clone()
            }
        }
    }

    type NoArgs = fn() -> Box<dyn Greeter>;
    type OneArg = fn(String) -> Box<dyn Greeter>;
    type TwoArgs = fn(String, u8) -> Box<dyn Greeter>;
    type ThreeArgs = fn(String, u8, bool) -> Box<dyn Greeter>;

    fn registry() -> Registry {
        let config = RegistryConfig {
            path_variable: "VOID_PLUGINS_TEST_UNSET_VARIABLE".into(),
            ..RegistryConfig::default()
        };
        let registry = Registry::new(config, StaticLibraryLoader::new());

        let mut table = RegistrationTable::new();
        table.add::<Plain, NoArgs>("Plain", || Box::new(Plain));
        table.add::<Named, OneArg>("One", |name| Box::new(Named(name, 0, false)));
        table.add::<Named, TwoArgs>("Two", |name, n| Box::new(Named(name, n, true)));
        table.add::<Named, ThreeArgs>("Three", |name, n, flag| Box::new(Named(name, n, flag)));
        registry.register_table("host", table);

        registry
    }

    #[test]
    fn test_create_each_arity() {
        let registry = registry();

        let plain = Factory::<NoArgs>::create_in(&registry, "Plain").unwrap();
        assert_eq!(plain.greet(), "hello");

        let one = Factory::<OneArg>::create_in(&registry, "One", "a".into()).unwrap();
        assert_eq!(one.greet(), "a");

        let two = Factory::<TwoArgs>::create_in(&registry, "Two", "b".into(), 2).unwrap();
        assert_eq!(two.greet(), "bx2");

        let three = Factory::<ThreeArgs>::create_in(&registry, "Three", "c".into(), 3, false).unwrap();
        assert_eq!(three.greet(), "c");
    }

    #[test]
    fn test_wrong_signature_is_rejected() {
        let registry = registry();

        let err = Factory::<NoArgs>::create_in(&registry, "One").err().unwrap();
        assert!(matches!(err, PluginError::SignatureMismatch { .. }));

        let err = Factory::<fn(String, u16) -> Box<dyn Greeter>>::create_in(&registry, "Two", "x".into(), 1)
            .err()
            .unwrap();
        assert!(matches!(err, PluginError::SignatureMismatch { .. }));

        assert!(!Factory::<TwoArgs>::is_available_in(&registry, "Three"));
        assert!(Factory::<ThreeArgs>::is_available_in(&registry, "Three"));
    }

    #[test]
    fn test_unknown_identifier() {
        let registry = registry();
        let err = Factory::<NoArgs>::create_in(&registry, "Missing").err().unwrap();
        assert!(matches!(err, PluginError::UnknownIdentifier(_)));
    }

    #[test]
    fn test_factory_may_use_registry() {
        // The lock is not held while the factory body runs
        fn nested() -> Box<dyn Greeter> {
            let inner = Factory::<NoArgs>::create("FactoryTestInner").unwrap();
            Box::new(Named(inner.greet(), 1, true))
        }

        let mut table = RegistrationTable::new();
        table.add::<Plain, NoArgs>("FactoryTestInner", || Box::new(Plain));
        table.add::<Named, NoArgs>("FactoryTestOuter", nested);
        Registry::instance().register_table("host", table);

        let outer = Factory::<NoArgs>::create("FactoryTestOuter").unwrap();
        assert_eq!(outer.greet(), "hellox1");
    }

    #[test]
    fn test_tag_matches_signature() {
        assert_eq!(Factory::<TwoArgs>::tag(), SignatureTag::of::<TwoArgs>());
        assert_eq!(Factory::<TwoArgs>::tag().arity(), 2);
    }
}
