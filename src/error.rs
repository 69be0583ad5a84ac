//! Error types for injection, profiles and sessions.

use thiserror::Error;

use crate::storage::StorageError;

/// Dependency injection errors
///
/// Raised when a capability cannot be resolved from an [`Injector`](crate::Injector)
/// chain, or when a provider rejects the configuration it was handed.
///
/// # Examples
///
/// ```rust
/// use ferrous_profile::{InjectionError, Injector, Inject};
///
/// let injector = Injector::new();
/// match injector.inject::<String>() {
///     Err(InjectionError::NotFound(name)) => {
///         assert_eq!(name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    /// No binding for the capability anywhere in the chain
    #[error("No binding found for: {0}")]
    NotFound(&'static str),
    /// A named binding holds a value of a different type than requested
    #[error("Type mismatch for {key}: requested {requested}, bound {bound}")]
    TypeMismatch {
        key: &'static str,
        requested: &'static str,
        bound: &'static str,
    },
    /// Circular provider dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// Maximum recursion depth exceeded
    #[error("Max resolution depth {0} exceeded")]
    DepthExceeded(usize),
    /// A provider needed a setting that is not present
    #[error("Missing required setting: {0}")]
    MissingSetting(String),
    /// A setting holds a value the provider does not recognize
    #[error("Invalid value for setting {key}: {value:?}")]
    InvalidSetting { key: String, value: String },
    /// A provider failed for another reason
    #[error("Provider for {key} failed: {message}")]
    Provider { key: &'static str, message: String },
}

/// Profile and session errors
///
/// Lifecycle misuse (`SessionInactive`, `SessionClosed`) is kept apart from
/// resolution failures and from backend failures, which pass through unwrapped.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Capability resolution failed
    #[error(transparent)]
    Injection(#[from] InjectionError),
    /// A session-scoped operation was called while the session was not active
    #[error("Profile session is not active")]
    SessionInactive,
    /// The session was already closed and cannot be activated again
    #[error("Profile session has already been closed")]
    SessionClosed,
    /// The backing store failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ProfileError {
    /// Returns true for the lifecycle misuse errors.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, ProfileError::SessionInactive | ProfileError::SessionClosed)
    }
}

/// Result type for injection operations
pub type InjectResult<T> = Result<T, InjectionError>;

/// Result type for profile and session operations
pub type ProfileResult<T> = Result<T, ProfileError>;
