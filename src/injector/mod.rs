//! The injection container.
//!
//! An [`Injector`] maps capabilities to bound instances or providers and
//! falls back to an optional parent when a capability is not bound locally.
//! Chains of injectors model the global → profile → session overlay.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{InjectResult, InjectionError};
use crate::internal::StackGuard;
use crate::key::{key_of_trait, key_of_type, Key, Request};
use crate::lifetime::Lifetime;
use crate::registration::{Binding, Ctor, Registry, Target};
use crate::settings::Settings;
use crate::traits::{AnyArc, InjectCore, Provider};

pub mod context;
pub use context::InjectionContext;

/// Dependency injection container.
///
/// Bindings are unique per container: binding a key again replaces the
/// previous binding here and never touches the parent. Binding methods take
/// `&self`, so a container shared behind an `Arc` can still be configured.
///
/// # Resolution
///
/// A request is looked up locally, then in each ancestor in turn. Providers
/// always run against the injector the request was made on, so a provider
/// bound in a parent sees the child's settings and bindings.
///
/// # Typing
///
/// Every binding records the type of the value it produces. When a
/// [`Key::Named`] binding holds a different type than requested, a strict
/// injector (the default) fails with [`InjectionError::TypeMismatch`]; a
/// lenient one skips that binding and keeps searching the parents.
///
/// # Examples
///
/// ```
/// use ferrous_profile::{Injector, Inject};
/// use std::sync::Arc;
///
/// struct Pool { url: String }
///
/// let root = Arc::new(Injector::new());
/// root.bind_instance(Pool { url: "sqlite://agent.db".to_string() });
///
/// let child = Injector::child_of(root.clone(), None);
/// child.bind_instance(7u8);
///
/// assert_eq!(child.inject::<Pool>().unwrap().url, "sqlite://agent.db");
/// assert_eq!(*child.inject::<u8>().unwrap(), 7);
/// assert!(root.inject_optional::<u8>().unwrap().is_none());
/// ```
pub struct Injector {
    settings: Settings,
    registry: RwLock<Registry>,
    /// Values of scoped providers resolved through this injector
    scoped: Mutex<HashMap<Key, AnyArc>>,
    parent: Option<Arc<Injector>>,
    enforce_typing: bool,
}

impl Injector {
    /// Creates an empty, strictly typed root injector.
    pub fn new() -> Self {
        Self::with_settings(Settings::new(), true)
    }

    pub fn with_settings(settings: Settings, enforce_typing: bool) -> Self {
        Self {
            settings,
            registry: RwLock::new(Registry::default()),
            scoped: Mutex::new(HashMap::new()),
            parent: None,
            enforce_typing,
        }
    }

    /// Creates a child that falls back to `parent`.
    ///
    /// The child's settings are the parent's settings extended by `overlay`;
    /// it inherits the parent's typing mode.
    pub fn child_of(parent: Arc<Injector>, overlay: Option<&Settings>) -> Self {
        let settings = match overlay {
            Some(overlay) => parent.settings.extend(overlay),
            None => parent.settings.clone(),
        };
        Self {
            settings,
            registry: RwLock::new(Registry::default()),
            scoped: Mutex::new(HashMap::new()),
            enforce_typing: parent.enforce_typing,
            parent: Some(parent),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn enforce_typing(&self) -> bool {
        self.enforce_typing
    }

    pub fn set_enforce_typing(&mut self, enforce_typing: bool) {
        self.enforce_typing = enforce_typing;
    }

    pub fn parent(&self) -> Option<&Arc<Injector>> {
        self.parent.as_ref()
    }

    /// Number of bindings held locally (parents excluded).
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is bound in this container (parents excluded).
    pub fn has_binding(&self, key: &Key) -> bool {
        self.registry.read().contains_key(key)
    }

    /// Removes the local binding for `key`, returning whether one existed.
    pub fn clear_binding(&self, key: &Key) -> bool {
        self.scoped.lock().remove(key);
        self.registry.write().remove(key).is_some()
    }

    fn insert(&self, key: Key, binding: Binding) {
        debug!(capability = key.display_name(), kind = binding.describe(), "binding capability");
        self.scoped.lock().remove(&key);
        self.registry.write().insert(key, binding);
    }

    /// Binds a concrete value.
    pub fn bind_instance<T: Send + Sync + 'static>(&self, value: T) {
        self.bind_shared(Arc::new(value));
    }

    /// Binds an already shared concrete value.
    pub fn bind_shared<T: Send + Sync + 'static>(&self, value: Arc<T>) {
        self.insert(
            key_of_type::<T>(),
            Binding::instance(value, TypeId::of::<T>(), std::any::type_name::<T>()),
        );
    }

    /// Binds a trait object.
    pub fn bind_trait<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>) {
        self.insert(
            key_of_trait::<T>(),
            Binding::instance(Arc::new(value), TypeId::of::<Arc<T>>(), std::any::type_name::<T>()),
        );
    }

    /// Binds a value under a free-form tag.
    pub fn bind_named<T: Send + Sync + 'static>(&self, name: &'static str, value: T) {
        self.insert(
            Key::Named(name),
            Binding::instance(Arc::new(value), TypeId::of::<T>(), std::any::type_name::<T>()),
        );
    }

    /// Binds a provider for a concrete type.
    pub fn bind_provider<T, F>(&self, lifetime: Lifetime, provider: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Settings, &Injector) -> InjectResult<Arc<T>> + Send + Sync + 'static,
    {
        let ctor: Ctor = Arc::new(move |settings: &Settings, injector: &Injector| -> InjectResult<AnyArc> {
            provider(settings, injector).map(|value| value as AnyArc)
        });
        self.insert(
            key_of_type::<T>(),
            Binding::provider(lifetime, ctor, TypeId::of::<T>(), std::any::type_name::<T>()),
        );
    }

    /// Binds a closure provider for a trait object.
    pub fn bind_trait_provider<T, F>(&self, lifetime: Lifetime, provider: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Settings, &Injector) -> InjectResult<Arc<T>> + Send + Sync + 'static,
    {
        self.bind_trait_provider_with::<T, F>(lifetime, provider);
    }

    /// Binds a [`Provider`] implementation for a trait object.
    pub fn bind_trait_provider_with<T, P>(&self, lifetime: Lifetime, provider: P)
    where
        T: ?Sized + Send + Sync + 'static,
        P: Provider<T>,
    {
        let ctor: Ctor = Arc::new(move |settings: &Settings, injector: &Injector| -> InjectResult<AnyArc> {
            provider
                .provide(settings, injector)
                .map(|value| Arc::new(value) as AnyArc)
        });
        self.insert(
            key_of_trait::<T>(),
            Binding::provider(lifetime, ctor, TypeId::of::<Arc<T>>(), std::any::type_name::<T>()),
        );
    }

    /// Walks this injector and its ancestors for the first usable binding.
    fn find_binding(&self, request: &Request) -> InjectResult<Option<Binding>> {
        let mut current = Some(self);
        while let Some(injector) = current {
            // Clone out of the lock; providers must never run while it is held
            let found = injector.registry.read().get(&request.key).cloned();
            if let Some(binding) = found {
                if binding.type_id == request.type_id {
                    return Ok(Some(binding));
                }
                if self.enforce_typing {
                    return Err(InjectionError::TypeMismatch {
                        key: request.key.display_name(),
                        requested: request.type_name,
                        bound: binding.type_name,
                    });
                }
            }
            current = injector.parent.as_deref();
        }
        Ok(None)
    }

    fn materialize(&self, key: &Key, binding: Binding) -> InjectResult<AnyArc> {
        match binding.target {
            Target::Instance(value) => Ok(value),
            Target::Provider { lifetime: Lifetime::Transient, ctor, .. } => ctor(&self.settings, self),
            Target::Provider { lifetime: Lifetime::Singleton, ctor, cell } => {
                if let Some(cached) = cell.lock().as_ref() {
                    return Ok(cached.clone());
                }
                // Double-checked: build without holding the lock
                let value = ctor(&self.settings, self)?;
                let mut slot = cell.lock();
                Ok(slot.get_or_insert(value).clone())
            }
            Target::Provider { lifetime: Lifetime::Scoped, ctor, .. } => {
                if let Some(cached) = self.scoped.lock().get(key) {
                    return Ok(cached.clone());
                }
                let value = ctor(&self.settings, self)?;
                let mut scoped = self.scoped.lock();
                Ok(scoped.entry(*key).or_insert(value).clone())
            }
        }
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

// Copies bindings and settings; scoped values are not carried over.
impl Clone for Injector {
    fn clone(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            registry: RwLock::new(self.registry.read().clone()),
            scoped: Mutex::new(HashMap::new()),
            parent: self.parent.clone(),
            enforce_typing: self.enforce_typing,
        }
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.read();
        let bindings: Vec<(&'static str, &'static str)> = registry
            .iter()
            .map(|(key, binding)| (key.display_name(), binding.describe()))
            .collect();
        f.debug_struct("Injector")
            .field("bindings", &bindings)
            .field("settings", &self.settings.len())
            .field("has_parent", &self.parent.is_some())
            .field("enforce_typing", &self.enforce_typing)
            .finish()
    }
}

impl InjectCore for Injector {
    type Error = InjectionError;

    fn resolve_any(&self, request: &Request) -> InjectResult<Option<AnyArc>> {
        let _guard = StackGuard::enter(self as *const Injector as usize, request.key.display_name())?;
        match self.find_binding(request)? {
            Some(binding) => self.materialize(&request.key, binding).map(Some),
            None => Ok(None),
        }
    }
}
