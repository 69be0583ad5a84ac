//! Provider trait for lazily constructed capabilities.

use std::sync::Arc;

use crate::error::InjectResult;
use crate::injector::Injector;
use crate::settings::Settings;

/// Factory for a capability.
///
/// `provide` receives the settings and the injector the request was made
/// against, so a provider bound on a profile can still resolve dependencies
/// that only exist in the requesting session.
///
/// Closures with the matching signature implement this trait.
///
/// # Examples
///
/// ```
/// use ferrous_profile::{Injector, Inject, InjectResult, Lifetime, Provider, Settings};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct Labelled(String);
/// impl Greeter for Labelled {
///     fn greet(&self) -> String { format!("hello from {}", self.0) }
/// }
///
/// struct GreeterProvider;
/// impl Provider<dyn Greeter> for GreeterProvider {
///     fn provide(&self, settings: &Settings, _: &Injector) -> InjectResult<Arc<dyn Greeter>> {
///         let label = settings.get_str("default_label").unwrap_or("agent");
///         Ok(Arc::new(Labelled(label.to_string())))
///     }
/// }
///
/// let mut injector = Injector::new();
/// injector.settings_mut().set("default_label", "alice");
/// injector.bind_trait_provider_with(Lifetime::Transient, GreeterProvider);
///
/// assert_eq!(injector.inject_trait::<dyn Greeter>().unwrap().greet(), "hello from alice");
/// ```
pub trait Provider<T: ?Sized>: Send + Sync + 'static {
    fn provide(&self, settings: &Settings, injector: &Injector) -> InjectResult<Arc<T>>;
}

impl<T, F> Provider<T> for F
where
    T: ?Sized,
    F: Fn(&Settings, &Injector) -> InjectResult<Arc<T>> + Send + Sync + 'static,
{
    fn provide(&self, settings: &Settings, injector: &Injector) -> InjectResult<Arc<T>> {
        (self)(settings, injector)
    }
}
