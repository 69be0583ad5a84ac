//! Axum web framework integration for ferrous-profile.
//!
//! This module provides:
//! - [`RequestProfile`] to hand the shared profile to a handler
//! - [`RequestSession`], an active per-request session over that profile
//! - An HTTP mapping of [`ProfileError`] so handlers can return it directly
//!
//! Sessions extracted per request are closed when the handler drops them
//! unless the handler commits or rolls back first.

use std::ops::{Deref, DerefMut};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Extension, Router,
};

use crate::error::ProfileError;
use crate::profile::{Profile, ProfileSession};
use crate::storage::StorageError;

/// Axum application state wrapper for a profile
///
/// Routers built with `with_state(ProfileState::new(profile))` can take the
/// profile through `State<Profile>` instead of the extension-based extractors.
#[derive(Debug, Clone)]
pub struct ProfileState {
    profile: Profile,
}

impl ProfileState {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}

impl FromRef<ProfileState> for Profile {
    fn from_ref(state: &ProfileState) -> Self {
        state.profile.clone()
    }
}

fn profile_from_parts(parts: &Parts) -> Result<Profile, ProfileRejection> {
    parts
        .extensions
        .get::<Profile>()
        .cloned()
        .ok_or(ProfileRejection::MissingProfile)
}

/// Extractor for the application profile
///
/// Use it for direct, non-transactional lookups with
/// [`Inject`](crate::Inject).
#[derive(Debug, Clone)]
pub struct RequestProfile(pub Profile);

#[async_trait]
impl<S> FromRequestParts<S> for RequestProfile
where
    S: Send + Sync,
{
    type Rejection = ProfileRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        profile_from_parts(parts).map(RequestProfile)
    }
}

impl Deref for RequestProfile {
    type Target = Profile;

    fn deref(&self) -> &Profile {
        &self.0
    }
}

/// Extractor for an active, non-transactional session
///
/// The session is activated before the handler runs. Dropping it without
/// an explicit exit discards whatever it had pending.
#[derive(Debug)]
pub struct RequestSession(pub ProfileSession);

#[async_trait]
impl<S> FromRequestParts<S> for RequestSession
where
    S: Send + Sync,
{
    type Rejection = ProfileRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let profile = profile_from_parts(parts)?;
        let session = profile.session().open().await.map_err(ProfileRejection::Session)?;
        Ok(RequestSession(session))
    }
}

impl RequestSession {
    pub fn into_inner(self) -> ProfileSession {
        self.0
    }
}

impl Deref for RequestSession {
    type Target = ProfileSession;

    fn deref(&self) -> &ProfileSession {
        &self.0
    }
}

impl DerefMut for RequestSession {
    fn deref_mut(&mut self) -> &mut ProfileSession {
        &mut self.0
    }
}

/// Rejection type for profile extraction failures
#[derive(Debug)]
pub enum ProfileRejection {
    /// The router was built without a profile extension
    MissingProfile,
    /// The session could not be opened
    Session(ProfileError),
}

impl IntoResponse for ProfileRejection {
    fn into_response(self) -> Response {
        match self {
            ProfileRejection::MissingProfile => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Profile not found in extensions. Make sure to use create_app_with_profile()",
            )
                .into_response(),
            ProfileRejection::Session(err) => err.into_response(),
        }
    }
}

impl ProfileError {
    /// HTTP status a handler should answer with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProfileError::Storage(StorageError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ProfileError::Storage(_) => StatusCode::BAD_REQUEST,
            ProfileError::Injection(_) | ProfileError::SessionInactive | ProfileError::SessionClosed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Build a router whose handlers can extract the profile and sessions over it.
///
/// ```rust
/// use axum::routing::get;
/// use ferrous_profile::axum_integration::{create_app_with_profile, RequestProfile};
/// use ferrous_profile::InMemoryProfile;
///
/// async fn name(RequestProfile(profile): RequestProfile) -> String {
///     profile.name().to_string()
/// }
///
/// let app = create_app_with_profile(InMemoryProfile::test_profile(), |router| {
///     router.route("/profile", get(name))
/// });
/// # let _ = app;
/// ```
pub fn create_app_with_profile<F>(profile: Profile, configure: F) -> Router
where
    F: FnOnce(Router) -> Router,
{
    configure(Router::new()).layer(Extension(profile))
}
