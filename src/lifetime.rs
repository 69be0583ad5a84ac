//! Provider lifetime definitions.

/// Caching policy for provider bindings.
///
/// Instance bindings are always shared; the lifetime only matters for
/// providers. The default is [`Lifetime::Transient`]: a provider is invoked on
/// every resolution unless it declares otherwise.
///
/// # Examples
///
/// ```rust
/// use ferrous_profile::{Injector, Inject, Lifetime, Settings};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct Connection(usize);
///
/// let opened = Arc::new(AtomicUsize::new(0));
/// let counter = opened.clone();
///
/// let root = Arc::new(Injector::new());
/// root.bind_provider(Lifetime::Scoped, move |_: &Settings, _: &Injector| {
///     Ok(Arc::new(Connection(counter.fetch_add(1, Ordering::SeqCst))))
/// });
///
/// let first = Injector::child_of(root.clone(), None);
/// let a = first.inject::<Connection>().unwrap();
/// let b = first.inject::<Connection>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b)); // same scope, same instance
///
/// let second = Injector::child_of(root, None);
/// let c = second.inject::<Connection>().unwrap();
/// assert!(!Arc::ptr_eq(&a, &c)); // different scope
/// assert_eq!(opened.load(Ordering::SeqCst), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// New value per resolution, never cached
    #[default]
    Transient,
    /// Created on first resolution and cached in the binding itself
    ///
    /// Every container that resolves the binding (including child scopes)
    /// sees the same instance.
    Singleton,
    /// Created once per requesting container
    ///
    /// A provider bound on a profile and resolved through two sessions yields
    /// one instance per session.
    Scoped,
}
