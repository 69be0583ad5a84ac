//! Short-lived sessions over a profile.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::error::{ProfileError, ProfileResult};
use crate::injector::InjectionContext;
use crate::key::Request;
use crate::settings::Settings;
use crate::traits::{AnyArc, InjectCore};

use super::{Profile, SessionBackend};

/// Lifecycle state of a [`ProfileSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Constructed, not yet activated
    Inactive,
    Active,
    /// Committed, rolled back or exited; the session cannot be reused
    Closed,
}

/// An explicitly activated unit of work bound to one [`Profile`].
///
/// A session starts [`SessionState::Inactive`]. While active it owns a child
/// context of the profile's context, so bindings made on the session never
/// reach the profile. Committing, rolling back or exiting closes it for good.
///
/// # Examples
///
/// ```
/// use ferrous_profile::{InMemoryProfile, Inject, ProfileError};
///
/// # tokio_test_block(async {
/// let profile = InMemoryProfile::test_profile();
/// let mut session = profile.session();
/// assert!(matches!(session.inject::<u8>(), Err(ProfileError::SessionInactive)));
///
/// session.activate().await?;
/// session.context()?.injector().bind_instance(7u8);
/// assert_eq!(*session.inject::<u8>()?, 7);
/// assert!(profile.inject_optional::<u8>()?.is_none());
///
/// session.commit().await?;
/// assert!(!session.is_active());
/// # Ok::<(), ProfileError>(())
/// # }).unwrap();
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct ProfileSession {
    profile: Profile,
    transaction: bool,
    overlay: Option<Settings>,
    state: SessionState,
    context: Option<InjectionContext>,
    backend: Option<Box<dyn SessionBackend>>,
}

impl ProfileSession {
    pub const SCOPE_NAME: &'static str = "session";

    /// Inactive, non-transactional session.
    pub fn new(profile: &Profile) -> Self {
        Self::build(profile, false)
    }

    /// Inactive transaction.
    pub fn new_transaction(profile: &Profile) -> Self {
        Self::build(profile, true)
    }

    fn build(profile: &Profile, transaction: bool) -> Self {
        Self {
            profile: profile.clone(),
            transaction,
            overlay: None,
            state: SessionState::Inactive,
            context: None,
            backend: None,
        }
    }

    /// Settings layered over the profile settings on activation.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.overlay = Some(settings);
        self
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn is_transaction(&self) -> bool {
        self.transaction
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Activate the session.
    ///
    /// Calling this on an active session does nothing. A closed session
    /// fails with [`ProfileError::SessionClosed`]. If the backend fails to
    /// open, the session stays inactive.
    pub async fn activate(&mut self) -> ProfileResult<()> {
        match self.state {
            SessionState::Active => return Ok(()),
            SessionState::Closed => return Err(ProfileError::SessionClosed),
            SessionState::Inactive => {}
        }

        let context = self
            .profile
            .context()
            .start_scope(Self::SCOPE_NAME, self.overlay.as_ref());
        let backend = self
            .profile
            .backend()
            .open_session(&context, self.transaction)
            .await?;

        self.context = Some(context);
        self.backend = Some(backend);
        self.state = SessionState::Active;
        debug!(
            profile = %self.profile.name(),
            transaction = self.transaction,
            "session activated"
        );
        Ok(())
    }

    /// Activate and hand the session back.
    pub async fn open(mut self) -> ProfileResult<Self> {
        self.activate().await?;
        Ok(self)
    }

    /// Activate and borrow the session for a scoped block of work.
    ///
    /// If the returned guard is dropped while the session is still active,
    /// pending work is discarded and the session is closed.
    pub async fn enter(&mut self) -> ProfileResult<SessionGuard<'_>> {
        self.activate().await?;
        Ok(SessionGuard { session: self })
    }

    /// The session-local context.
    pub fn context(&self) -> ProfileResult<&InjectionContext> {
        match (&self.state, &self.context) {
            (SessionState::Active, Some(context)) => Ok(context),
            _ => Err(ProfileError::SessionInactive),
        }
    }

    pub fn settings(&self) -> ProfileResult<&Settings> {
        self.context().map(InjectionContext::settings)
    }

    fn active_backend(&mut self) -> ProfileResult<&mut Box<dyn SessionBackend>> {
        if self.state != SessionState::Active {
            return Err(ProfileError::SessionInactive);
        }
        self.backend.as_mut().ok_or(ProfileError::SessionInactive)
    }

    /// Persist pending changes and close the session.
    ///
    /// On a plain session this behaves as [`ProfileSession::deactivate`].
    /// If the backend fails, the session remains active and unchanged.
    pub async fn commit(&mut self) -> ProfileResult<()> {
        let transaction = self.transaction;
        let backend = self.active_backend()?;
        if transaction {
            backend.commit().await?;
        } else {
            backend.close().await?;
        }
        self.finish("commit");
        Ok(())
    }

    /// Discard pending changes and close the session.
    pub async fn rollback(&mut self) -> ProfileResult<()> {
        let transaction = self.transaction;
        let backend = self.active_backend()?;
        if transaction {
            backend.rollback().await?;
        } else {
            backend.close().await?;
        }
        self.finish("rollback");
        Ok(())
    }

    /// Exit without commit or rollback. Does nothing unless active.
    pub async fn deactivate(&mut self) -> ProfileResult<()> {
        if self.state != SessionState::Active {
            return Ok(());
        }
        let backend = self.backend.take();
        self.finish("exit");
        match backend {
            Some(mut backend) => backend.close().await,
            None => Ok(()),
        }
    }

    fn finish(&mut self, how: &'static str) {
        self.state = SessionState::Closed;
        self.context = None;
        self.backend = None;
        debug!(profile = %self.profile.name(), how, "session closed");
    }

    /// Synchronous close for drop paths.
    fn discard(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.discard();
        }
        self.finish("discard");
    }
}

impl InjectCore for ProfileSession {
    type Error = ProfileError;

    fn resolve_any(&self, request: &Request) -> ProfileResult<Option<AnyArc>> {
        Ok(self.context()?.resolve_any(request)?)
    }
}

impl fmt::Debug for ProfileSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileSession")
            .field("profile", &self.profile.name())
            .field("transaction", &self.transaction)
            .field("state", &self.state)
            .finish()
    }
}

impl Drop for ProfileSession {
    fn drop(&mut self) {
        if self.state == SessionState::Active {
            warn!(
                profile = %self.profile.name(),
                transaction = self.transaction,
                "active session dropped without exit; discarding pending work"
            );
            self.discard();
        }
    }
}

/// Scoped handle returned by [`ProfileSession::enter`].
///
/// Derefs to the session. `commit` and `rollback` end the session on success
/// and leave it active on failure so the caller can retry or roll back.
/// `exit` consumes the guard. Dropping it discards any pending work.
pub struct SessionGuard<'a> {
    session: &'a mut ProfileSession,
}

impl SessionGuard<'_> {
    pub async fn commit(&mut self) -> ProfileResult<()> {
        self.session.commit().await
    }

    pub async fn rollback(&mut self) -> ProfileResult<()> {
        self.session.rollback().await
    }

    pub async fn exit(self) -> ProfileResult<()> {
        self.session.deactivate().await
    }
}

impl Deref for SessionGuard<'_> {
    type Target = ProfileSession;

    fn deref(&self) -> &ProfileSession {
        self.session
    }
}

impl DerefMut for SessionGuard<'_> {
    fn deref_mut(&mut self) -> &mut ProfileSession {
        self.session
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if self.session.is_active() {
            debug!(profile = %self.session.profile.name(), "session guard released");
            self.session.discard();
        }
    }
}
