//! # ferrous-profile
//!
//! Profiles, sessions and a typed dependency injection container.
//!
//! ## Features
//!
//! - **Layered injection**: session → profile → global container chains
//! - **Provider lifetimes**: Transient, Singleton and Scoped providers
//! - **Strict typing**: named bindings are checked against the requested type
//! - **Explicit sessions**: activate, commit, rollback, with scoped release
//! - **Backend selection**: the `wallet.type` setting picks a profile backend
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_profile::{BaseStorage, InMemoryProfile, Inject, ProfileError, StorageRecord};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let profile = InMemoryProfile::test_profile();
//!
//! let mut txn = profile.transaction();
//! let mut guard = txn.enter().await?;
//! let storage = guard.inject_trait::<dyn BaseStorage>()?;
//! storage.add_record(StorageRecord::new("connection", "{}").with_id("c1")).await?;
//! guard.commit().await?;
//!
//! let session = profile.session().open().await?;
//! let storage = session.inject_trait::<dyn BaseStorage>()?;
//! assert_eq!(storage.get_record("connection", "c1").await?.value, "{}");
//! # Ok::<(), ProfileError>(())
//! # }).unwrap();
//! ```
//!
//! ## Injection Scopes
//!
//! ```rust
//! use ferrous_profile::{InjectionContext, Inject, Lifetime, Settings};
//! use std::sync::Arc;
//!
//! struct RequestId(String);
//!
//! let root = InjectionContext::new();
//! root.injector().bind_provider(Lifetime::Scoped, |settings, _| {
//!     let label = settings.get_str("label").unwrap_or("none");
//!     Ok(Arc::new(RequestId(format!("req-{label}"))))
//! });
//!
//! let overlay: Settings = [("label", "a")].into_iter().collect();
//! let scope = root.start_scope("request", Some(&overlay));
//! let first = scope.inject::<RequestId>().unwrap();
//! let second = scope.inject::<RequestId>().unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! assert_eq!(first.0, "req-a");
//! ```

// Module declarations
pub mod error;
pub mod in_memory;
pub mod injector;
pub mod key;
pub mod lifetime;
pub mod profile;
pub mod settings;
pub mod storage;
pub mod traits;

#[cfg(feature = "axum-integration")]
pub mod axum_integration;

// Internal modules
mod internal;
mod registration;

// Re-exports
pub use error::{InjectResult, InjectionError, ProfileError, ProfileResult};
pub use in_memory::{InMemoryBackend, InMemoryProfile, InMemoryProfileManager, InMemoryStorage};
pub use injector::{InjectionContext, Injector};
pub use key::{key_of_trait, key_of_type, Key, Request};
pub use lifetime::Lifetime;
pub use profile::{
    BackendKind, NoopSessionBackend, Profile, ProfileBackend, ProfileBuilder, ProfileManager,
    ProfileManagerProvider, ProfileSession, SessionBackend, SessionGuard, SessionState,
    WALLET_TYPE_SETTING,
};
pub use settings::{ConfigValue, Settings};
pub use storage::{BaseStorage, StorageError, StorageRecord, StorageResult, TagQuery};
pub use traits::{AnyArc, Inject, InjectCore, Provider};
