//! Injection scopes.
//!
//! An [`InjectionContext`] pairs a scope name with a shared [`Injector`].
//! Starting a scope creates a child whose injector falls back to the parent's.

use std::sync::Arc;

use crate::error::{InjectResult, InjectionError};
use crate::key::Request;
use crate::settings::Settings;
use crate::traits::{AnyArc, InjectCore};

use super::Injector;

/// Scope of settings and bindings.
///
/// Cloning a context is cheap and shares the injector. Mutating the settings
/// of a shared context copies the injector first, so the other holders never
/// observe the change.
///
/// # Examples
///
/// ```
/// use ferrous_profile::{InjectionContext, Inject, Settings};
///
/// let mut root = InjectionContext::new();
/// root.settings_mut().set("wallet.type", "in_memory");
/// root.injector().bind_instance(1u64);
///
/// let overlay: Settings = [("wallet.name", "alice")].into_iter().collect();
/// let session = root.start_scope("session", Some(&overlay));
/// session.injector().bind_instance(2u32);
///
/// assert_eq!(session.settings().get_str("wallet.type"), Some("in_memory"));
/// assert_eq!(session.settings().get_str("wallet.name"), Some("alice"));
/// assert_eq!(*session.inject::<u64>().unwrap(), 1);
/// assert!(root.inject_optional::<u32>().unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct InjectionContext {
    scope_name: String,
    injector: Arc<Injector>,
}

impl InjectionContext {
    pub const ROOT_SCOPE: &'static str = "application";

    /// Root context with empty settings and strict typing.
    pub fn new() -> Self {
        Self::with_settings(Settings::new(), true)
    }

    pub fn with_settings(settings: Settings, enforce_typing: bool) -> Self {
        Self {
            scope_name: Self::ROOT_SCOPE.to_string(),
            injector: Arc::new(Injector::with_settings(settings, enforce_typing)),
        }
    }

    /// Root context with lenient typing.
    pub fn lenient() -> Self {
        Self::with_settings(Settings::new(), false)
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    pub fn settings(&self) -> &Settings {
        self.injector.settings()
    }

    /// Mutable settings, copying the injector if it is shared.
    pub fn settings_mut(&mut self) -> &mut Settings {
        Arc::make_mut(&mut self.injector).settings_mut()
    }

    /// Layer `settings` over the current settings.
    pub fn update_settings(&mut self, settings: &Settings) {
        self.settings_mut().merge(settings);
    }

    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    pub fn injector_arc(&self) -> &Arc<Injector> {
        &self.injector
    }

    /// Child context falling back to this one.
    pub fn start_scope(&self, scope_name: &str, settings: Option<&Settings>) -> InjectionContext {
        Self {
            scope_name: scope_name.to_string(),
            injector: Arc::new(Injector::child_of(self.injector.clone(), settings)),
        }
    }
}

impl Default for InjectionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl InjectCore for InjectionContext {
    type Error = InjectionError;

    fn resolve_any(&self, request: &Request) -> InjectResult<Option<AnyArc>> {
        self.injector.resolve_any(request)
    }
}
