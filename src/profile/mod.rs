//! Profiles: long-lived handles to a backend and its injection context.
//!
//! A [`Profile`] owns the context that every session over it is layered on.
//! Sessions are created inactive by [`Profile::session`] and
//! [`Profile::transaction`] and activated explicitly.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{InjectResult, InjectionError, ProfileResult};
use crate::injector::InjectionContext;
use crate::key::Request;
use crate::settings::Settings;
use crate::traits::{AnyArc, InjectCore};

pub mod manager;
pub mod session;

pub use manager::{BackendKind, ProfileManager, ProfileManagerProvider, WALLET_TYPE_SETTING};
pub use session::{ProfileSession, SessionGuard, SessionState};

/// Storage backend behind a profile.
///
/// Backends without session state can rely on the default `open_session`,
/// which hands out a [`NoopSessionBackend`].
#[async_trait]
pub trait ProfileBackend: Send + Sync + 'static {
    /// Short backend identifier, e.g. `"in_memory"`.
    fn name(&self) -> &'static str;

    /// Whether transactions buffer writes until commit.
    fn supports_transactions(&self) -> bool {
        false
    }

    /// Prepare the backend side of a session.
    ///
    /// `context` is the fresh session-local scope; backends bind their
    /// session capabilities (storage handles and the like) into it.
    async fn open_session(
        &self,
        context: &InjectionContext,
        transaction: bool,
    ) -> ProfileResult<Box<dyn SessionBackend>> {
        let _ = (context, transaction);
        Ok(Box::new(NoopSessionBackend))
    }

    async fn close(&self) -> ProfileResult<()> {
        Ok(())
    }

    async fn remove(&self) -> ProfileResult<()> {
        Ok(())
    }
}

/// Backend half of an active session.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Persist buffered changes. Must either apply everything or nothing.
    async fn commit(&mut self) -> ProfileResult<()>;

    /// Drop buffered changes.
    async fn rollback(&mut self) -> ProfileResult<()>;

    /// Plain exit without commit; buffered changes are dropped.
    async fn close(&mut self) -> ProfileResult<()>;

    /// Synchronous teardown for drop paths.
    fn discard(&mut self);
}

/// Session backend for stores without transaction support.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionBackend;

#[async_trait]
impl SessionBackend for NoopSessionBackend {
    async fn commit(&mut self) -> ProfileResult<()> {
        Ok(())
    }

    async fn rollback(&mut self) -> ProfileResult<()> {
        Ok(())
    }

    async fn close(&mut self) -> ProfileResult<()> {
        Ok(())
    }

    fn discard(&mut self) {}
}

struct ProfileInner {
    name: String,
    created: bool,
    context: InjectionContext,
    backend: Arc<dyn ProfileBackend>,
}

/// Long-lived handle to a backend.
///
/// Cloning is cheap; clones share the same context and backend.
///
/// # Examples
///
/// ```
/// use ferrous_profile::{InjectionContext, Inject, Profile, ProfileBackend};
///
/// struct NullBackend;
/// impl ProfileBackend for NullBackend {
///     fn name(&self) -> &'static str { "null" }
/// }
///
/// let context = InjectionContext::new();
/// context.injector().bind_instance(String::from("agent-label"));
///
/// let profile = Profile::builder(NullBackend).name("alice").context(context).build();
/// assert_eq!(profile.name(), "alice");
/// assert_eq!(profile.backend_name(), "null");
/// assert_eq!(profile.inject::<String>().unwrap().as_str(), "agent-label");
/// assert!(!profile.session().is_active());
/// ```
#[derive(Clone)]
pub struct Profile {
    inner: Arc<ProfileInner>,
}

impl Profile {
    pub const DEFAULT_NAME: &'static str = "default";

    pub fn builder<B: ProfileBackend>(backend: B) -> ProfileBuilder {
        ProfileBuilder::new(Arc::new(backend))
    }

    pub fn new<B: ProfileBackend>(backend: B, context: InjectionContext) -> Self {
        Self::builder(backend).context(context).build()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether the profile was newly provisioned rather than opened.
    pub fn created(&self) -> bool {
        self.inner.created
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.backend.name()
    }

    pub fn supports_transactions(&self) -> bool {
        self.inner.backend.supports_transactions()
    }

    pub fn context(&self) -> &InjectionContext {
        &self.inner.context
    }

    pub fn settings(&self) -> &Settings {
        self.inner.context.settings()
    }

    pub(crate) fn backend(&self) -> &Arc<dyn ProfileBackend> {
        &self.inner.backend
    }

    /// New inactive session without transaction semantics.
    pub fn session(&self) -> ProfileSession {
        ProfileSession::new(self)
    }

    /// New inactive session with commit and rollback support.
    ///
    /// If the backend does not support transactions, commit and rollback
    /// have no effect.
    pub fn transaction(&self) -> ProfileSession {
        ProfileSession::new_transaction(self)
    }

    /// Like [`Profile::session`], with extra settings layered on the session scope.
    pub fn session_with(&self, settings: Settings) -> ProfileSession {
        ProfileSession::new(self).with_settings(settings)
    }

    pub fn transaction_with(&self, settings: Settings) -> ProfileSession {
        ProfileSession::new_transaction(self).with_settings(settings)
    }

    /// Close the backend. Sessions opened afterwards are backend-defined.
    pub async fn close(&self) -> ProfileResult<()> {
        debug!(profile = %self.name(), backend = self.backend_name(), "closing profile");
        self.inner.backend.close().await
    }

    /// Remove the profile's backing data.
    pub async fn remove(&self) -> ProfileResult<()> {
        debug!(profile = %self.name(), backend = self.backend_name(), "removing profile");
        self.inner.backend.remove().await
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.inner.name)
            .field("backend", &self.backend_name())
            .field("created", &self.inner.created)
            .finish()
    }
}

// Direct, non-transactional lookups against the profile scope only.
impl InjectCore for Profile {
    type Error = InjectionError;

    fn resolve_any(&self, request: &Request) -> InjectResult<Option<AnyArc>> {
        self.inner.context.resolve_any(request)
    }
}

/// Builder for [`Profile`].
pub struct ProfileBuilder {
    backend: Arc<dyn ProfileBackend>,
    context: Option<InjectionContext>,
    name: Option<String>,
    created: bool,
}

impl ProfileBuilder {
    fn new(backend: Arc<dyn ProfileBackend>) -> Self {
        Self {
            backend,
            context: None,
            name: None,
            created: false,
        }
    }

    pub fn context(mut self, context: InjectionContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Optional name; `None` keeps the default.
    pub fn maybe_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn created(mut self, created: bool) -> Self {
        self.created = created;
        self
    }

    pub fn build(self) -> Profile {
        Profile {
            inner: Arc::new(ProfileInner {
                name: self.name.unwrap_or_else(|| Profile::DEFAULT_NAME.to_string()),
                created: self.created,
                context: self.context.unwrap_or_default(),
                backend: self.backend,
            }),
        }
    }
}
