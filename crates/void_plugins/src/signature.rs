//! Factory signatures
//!
//! A signature is described by the plain function pointer type of the
//! factory, e.g. `fn(String, u32) -> Box<dyn Widget>`. Factories are stored
//! type-erased in the registry together with the [`SignatureTag`] of their
//! signature; a lookup only succeeds when the requested tag is identical.

use std::any::{type_name, TypeId};
use std::fmt;

/// A factory call signature: a function pointer type with 0 to 3 arguments
///
/// Implemented for `fn() -> R`, `fn(A1) -> R`, `fn(A1, A2) -> R` and
/// `fn(A1, A2, A3) -> R` where every type is `'static`. Arguments are passed
/// by value, so borrowed data should be handed over as owned or shared
/// handles (`String`, `Arc<T>`, ...).
pub trait Signature: Copy + Send + Sync + 'static {
    /// Argument tuple
    type Args: 'static;
    /// Value produced by the factory
    type Return: 'static;
    /// Number of arguments
    const ARITY: usize;

    /// Call the factory
    fn invoke(self, args: Self::Args) -> Self::Return;

    /// Runtime tag of this signature
    fn tag() -> SignatureTag {
        SignatureTag {
            type_id: TypeId::of::<Self>(),
            type_name: type_name::<Self>(),
            return_type_name: type_name::<Self::Return>(),
            arity: Self::ARITY,
        }
    }
}

macro_rules! impl_signature {
    ($arity:expr; $($arg:ident $val:ident),*) => {
        impl<R: 'static, $($arg: 'static),*> Signature for fn($($arg),*) -> R {
            type Args = ($($arg,)*);
            type Return = R;
            const ARITY: usize = $arity;

            fn invoke(self, ($($val,)*): Self::Args) -> R {
                self($($val),*)
            }
        }
    };
}

impl_signature!(0;);
impl_signature!(1; A1 a1);
impl_signature!(2; A1 a1, A2 a2);
impl_signature!(3; A1 a1, A2 a2, A3 a3);

/// Runtime description of a [`Signature`]
///
/// Two tags are equal when they describe the same function pointer type.
#[derive(Clone, Copy)]
pub struct SignatureTag {
    type_id: TypeId,
    type_name: &'static str,
    return_type_name: &'static str,
    arity: usize,
}

impl SignatureTag {
    /// Tag of a signature type
    pub fn of<S: Signature>() -> Self {
        S::tag()
    }

    /// The `TypeId` of the function pointer type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Readable name of the function pointer type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Readable name of the return type
    pub fn return_type_name(&self) -> &'static str {
        self.return_type_name
    }

    /// Number of arguments
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl PartialEq for SignatureTag {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for SignatureTag {}

impl fmt::Debug for SignatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureTag")
            .field("type_name", &self.type_name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl fmt::Display for SignatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type NoArgs = fn() -> Box<u32>;
    type OneArg = fn(String) -> Box<u32>;
    type TwoArgs = fn(String, i64) -> Box<u32>;
    type ThreeArgs = fn(String, i64, bool) -> Box<u32>;

    #[test]
    fn test_tags_distinguish_arity_and_types() {
        assert_eq!(SignatureTag::of::<TwoArgs>(), SignatureTag::of::<TwoArgs>());
        assert_ne!(SignatureTag::of::<OneArg>(), SignatureTag::of::<TwoArgs>());
        assert_ne!(
            SignatureTag::of::<fn(String, i32) -> Box<u32>>(),
            SignatureTag::of::<TwoArgs>()
        );
        assert_ne!(SignatureTag::of::<fn() -> Box<u64>>(), SignatureTag::of::<NoArgs>());
    }

    #[test]
    fn test_tag_metadata() {
        let tag = SignatureTag::of::<ThreeArgs>();
        assert_eq!(tag.arity(), 3);
        assert!(tag.type_name().starts_with("fn("));
        assert!(tag.return_type_name().contains("Box"));
        assert_eq!(tag.to_string(), tag.type_name());
        assert_eq!(SignatureTag::of::<NoArgs>().arity(), 0);
    }

    #[test]
    fn test_invoke_each_arity() {
        let zero: NoArgs = || Box::new(7);
        let one: OneArg = |s| Box::new(s.len() as u32);
        let two: TwoArgs = |s, n| Box::new(s.len() as u32 + n as u32);
        let three: ThreeArgs = |s, n, b| Box::new(if b { s.len() as u32 } else { n as u32 });

        assert_eq!(*zero.invoke(()), 7);
        assert_eq!(*one.invoke(("abc".to_string(),)), 3);
        assert_eq!(*two.invoke(("ab".to_string(), 5)), 7);
        assert_eq!(*three.invoke(("ab".to_string(), 9, false)), 9);
    }
}
