//! Capability keys for the injection container.

use std::any::TypeId;

/// Key identifying a capability in an [`Injector`](crate::Injector).
///
/// # Key Types
///
/// - **Type**: concrete types (structs, enums, primitives)
/// - **Trait**: trait objects such as `dyn BaseStorage`
/// - **Named**: a string tag that may be bound to a value of any type
///
/// # Examples
///
/// ```rust
/// use ferrous_profile::{Injector, Inject, Key, key_of_type};
/// use std::any::TypeId;
///
/// let injector = Injector::new();
/// injector.bind_instance(42u32);
/// injector.bind_named("listen.port", 8080u16);
///
/// assert!(injector.has_binding(&key_of_type::<u32>()));
/// assert!(injector.has_binding(&Key::Named("listen.port")));
/// assert_eq!(*injector.inject_named::<u16>("listen.port").unwrap(), 8080);
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Trait object key, by trait name
    Trait(&'static str),
    /// Free-form capability tag
    Named(&'static str),
}

impl Key {
    /// Get the type, trait or tag name for display
    ///
    /// ```rust
    /// use ferrous_profile::Key;
    /// use std::any::TypeId;
    ///
    /// let type_key = Key::Type(TypeId::of::<String>(), "alloc::string::String");
    /// assert_eq!(type_key.display_name(), "alloc::string::String");
    /// assert_eq!(Key::Named("wallet").display_name(), "wallet");
    /// ```
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
            Key::Named(name) => name,
        }
    }
}

// TypeId-only comparison for concrete types
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            (Key::Named(a), Key::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
            Key::Named(name) => {
                2u8.hash(state);
                name.hash(state);
            }
        }
    }
}

#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

#[inline(always)]
pub fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}

/// A resolution request: the capability plus the type the caller expects back.
///
/// Trait capabilities are stored as `Arc<dyn Trait>` inside the type-erased
/// slot, so their expected type is `Arc<T>` rather than `T`.
#[derive(Debug, Clone, Copy)]
pub struct Request {
    pub key: Key,
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl Request {
    pub fn of_type<T: 'static>() -> Self {
        Self {
            key: key_of_type::<T>(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn of_trait<T: ?Sized + 'static>() -> Self {
        Self {
            key: key_of_trait::<T>(),
            type_id: TypeId::of::<std::sync::Arc<T>>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn named<T: 'static>(name: &'static str) -> Self {
        Self {
            key: Key::Named(name),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}
