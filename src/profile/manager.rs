//! Backend selection for profiles.
//!
//! The `wallet.type` setting names a [`BackendKind`]. [`ProfileManagerProvider`]
//! parses it once, normalizing aliases, and hands out the matching
//! [`ProfileManager`] from a fixed constructor table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{InjectResult, InjectionError, ProfileResult};
use crate::in_memory::InMemoryProfileManager;
use crate::injector::{InjectionContext, Injector};
use crate::lifetime::Lifetime;
use crate::settings::{ConfigValue, Settings};
use crate::traits::Provider;

use super::Profile;

/// Setting naming the backend kind.
pub const WALLET_TYPE_SETTING: &str = "wallet.type";

/// Creates and opens profiles for one backend kind.
#[async_trait]
pub trait ProfileManager: Send + Sync {
    fn backend(&self) -> BackendKind;

    /// Create a new profile.
    async fn provision(&self, context: InjectionContext, config: &Settings) -> ProfileResult<Profile>;

    /// Open an existing profile.
    async fn open(&self, context: InjectionContext, config: &Settings) -> ProfileResult<Profile>;
}

/// Known profile backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BackendKind {
    InMemory,
}

impl BackendKind {
    pub const ALL: &'static [BackendKind] = &[BackendKind::InMemory];

    /// Canonical setting value.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::InMemory => "in_memory",
        }
    }

    /// Every accepted setting value, canonical name first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            BackendKind::InMemory => &["in_memory", "in-memory", "basic"],
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = InjectionError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        BackendKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.aliases().iter().any(|alias| *alias == normalized))
            .ok_or_else(|| InjectionError::InvalidSetting {
                key: WALLET_TYPE_SETTING.to_string(),
                value: value.to_string(),
            })
    }
}

type ManagerCtor = fn() -> Arc<dyn ProfileManager>;

fn in_memory_manager() -> Arc<dyn ProfileManager> {
    Arc::new(InMemoryProfileManager)
}

const MANAGERS: &[(BackendKind, ManagerCtor)] = &[(BackendKind::InMemory, in_memory_manager)];

/// Provides the [`ProfileManager`] selected by `wallet.type`.
///
/// One manager is built per backend kind and reused, so every alias of a
/// kind yields the same instance.
///
/// # Examples
///
/// ```
/// use ferrous_profile::{BackendKind, Injector, Inject, ProfileManager, ProfileManagerProvider};
///
/// let mut injector = Injector::new();
/// injector.settings_mut().set("wallet.type", "basic");
/// ProfileManagerProvider::bind(&injector);
///
/// let manager = injector.inject_trait::<dyn ProfileManager>().unwrap();
/// assert_eq!(manager.backend(), BackendKind::InMemory);
/// ```
#[derive(Default)]
pub struct ProfileManagerProvider {
    managers: Mutex<HashMap<BackendKind, Arc<dyn ProfileManager>>>,
}

impl ProfileManagerProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a fresh provider for `dyn ProfileManager` into `injector`.
    pub fn bind(injector: &Injector) {
        injector.bind_trait_provider_with::<dyn ProfileManager, _>(Lifetime::Transient, Self::new());
    }

    /// The manager for `kind`, built on first use.
    pub fn manager_for(&self, kind: BackendKind) -> InjectResult<Arc<dyn ProfileManager>> {
        let mut managers = self.managers.lock();
        if let Some(manager) = managers.get(&kind) {
            return Ok(manager.clone());
        }
        let ctor = MANAGERS
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, ctor)| *ctor)
            .ok_or_else(|| InjectionError::Provider {
                key: "ProfileManager",
                message: format!("no manager registered for backend {kind}"),
            })?;
        debug!(backend = %kind, "creating profile manager");
        let manager = ctor();
        managers.insert(kind, manager.clone());
        Ok(manager)
    }
}

impl Provider<dyn ProfileManager> for ProfileManagerProvider {
    fn provide(&self, settings: &Settings, _injector: &Injector) -> InjectResult<Arc<dyn ProfileManager>> {
        let kind: BackendKind = match settings.get(WALLET_TYPE_SETTING) {
            None => return Err(InjectionError::MissingSetting(WALLET_TYPE_SETTING.to_string())),
            Some(ConfigValue::String(value)) => value.parse()?,
            Some(other) => {
                return Err(InjectionError::InvalidSetting {
                    key: WALLET_TYPE_SETTING.to_string(),
                    value: format!("{other:?}"),
                })
            }
        };
        self.manager_for(kind)
    }
}

impl fmt::Debug for ProfileManagerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached: Vec<BackendKind> = self.managers.lock().keys().copied().collect();
        f.debug_struct("ProfileManagerProvider")
            .field("cached", &cached)
            .finish()
    }
}
