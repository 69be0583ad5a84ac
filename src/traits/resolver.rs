//! Injection traits for capability resolution.

use std::any::Any;
use std::sync::Arc;

use crate::error::InjectionError;
use crate::key::Request;

/// Type-erased shared value as stored in a container.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Core injection trait.
///
/// Implementors resolve a [`Request`] to a type-erased value, returning
/// `Ok(None)` when nothing in scope is bound to the capability. The
/// associated error lets session-scoped resolvers report lifecycle misuse
/// alongside ordinary [`InjectionError`]s.
///
/// Most callers use [`Inject`], which is implemented for every `InjectCore`.
pub trait InjectCore {
    type Error: From<InjectionError>;

    /// Resolves a request against this resolver and whatever it falls back to.
    ///
    /// A returned value always has the `TypeId` named by `request.type_id`.
    fn resolve_any(&self, request: &Request) -> Result<Option<AnyArc>, Self::Error>;
}

fn downcast<T: Send + Sync + 'static>(any: AnyArc, request: &Request) -> Result<Arc<T>, InjectionError> {
    any.downcast::<T>().map_err(|_| InjectionError::TypeMismatch {
        key: request.key.display_name(),
        requested: request.type_name,
        bound: "<unknown>",
    })
}

/// Typed injection helpers.
///
/// Every method comes in a required flavour, which fails with
/// [`InjectionError::NotFound`] when nothing is bound, and an `_optional`
/// flavour, which returns `Ok(None)` instead.
///
/// # Examples
///
/// ```
/// use ferrous_profile::{Injector, Inject};
/// use std::sync::Arc;
///
/// trait Ledger: Send + Sync {
///     fn pool(&self) -> &str;
/// }
///
/// struct TestLedger;
/// impl Ledger for TestLedger {
///     fn pool(&self) -> &str { "test-pool" }
/// }
///
/// let injector = Injector::new();
/// injector.bind_instance(42usize);
/// injector.bind_trait::<dyn Ledger>(Arc::new(TestLedger));
///
/// assert_eq!(*injector.inject::<usize>().unwrap(), 42);
/// assert_eq!(injector.inject_trait::<dyn Ledger>().unwrap().pool(), "test-pool");
/// assert!(injector.inject_optional::<String>().unwrap().is_none());
/// assert!(injector.inject::<String>().is_err());
/// ```
pub trait Inject: InjectCore {
    fn inject<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Self::Error> {
        self.inject_optional::<T>()?
            .ok_or_else(|| InjectionError::NotFound(std::any::type_name::<T>()).into())
    }

    fn inject_optional<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, Self::Error> {
        let request = Request::of_type::<T>();
        match self.resolve_any(&request)? {
            Some(any) => Ok(Some(downcast::<T>(any, &request)?)),
            None => Ok(None),
        }
    }

    fn inject_trait<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Self::Error> {
        self.inject_trait_optional::<T>()?
            .ok_or_else(|| InjectionError::NotFound(std::any::type_name::<T>()).into())
    }

    fn inject_trait_optional<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, Self::Error> {
        let request = Request::of_trait::<T>();
        match self.resolve_any(&request)? {
            // Trait objects are stored as Arc<Arc<dyn Trait>>
            Some(any) => Ok(Some((*downcast::<Arc<T>>(any, &request)?).clone())),
            None => Ok(None),
        }
    }

    fn inject_named<T: Send + Sync + 'static>(&self, name: &'static str) -> Result<Arc<T>, Self::Error> {
        self.inject_named_optional::<T>(name)?
            .ok_or_else(|| InjectionError::NotFound(name).into())
    }

    fn inject_named_optional<T: Send + Sync + 'static>(
        &self,
        name: &'static str,
    ) -> Result<Option<Arc<T>>, Self::Error> {
        let request = Request::named::<T>(name);
        match self.resolve_any(&request)? {
            Some(any) => Ok(Some(downcast::<T>(any, &request)?)),
            None => Ok(None),
        }
    }
}

impl<R: InjectCore + ?Sized> Inject for R {}
