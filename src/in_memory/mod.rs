//! In-memory profile backend, used mainly for tests.
//!
//! Every session binds an [`InMemoryStorage`] as `dyn BaseStorage` into its
//! context. Transactions buffer writes and apply them on commit.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::ProfileResult;
use crate::injector::InjectionContext;
use crate::profile::{BackendKind, Profile, ProfileBackend, ProfileManager, ProfileSession, SessionBackend};
use crate::settings::Settings;
use crate::storage::BaseStorage;

mod storage;

pub use storage::InMemoryStorage;
use storage::{SharedBuffer, SharedRecords, WriteBuffer};

/// Backend holding records in process memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    records: SharedRecords,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed records.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl ProfileBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        InMemoryProfile::BACKEND_NAME
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    async fn open_session(
        &self,
        context: &InjectionContext,
        transaction: bool,
    ) -> ProfileResult<Box<dyn SessionBackend>> {
        let buffer: SharedBuffer = Arc::new(Mutex::new(WriteBuffer::new()));
        let storage = InMemoryStorage::new(self.records.clone(), buffer.clone(), transaction);
        context.injector().bind_trait::<dyn BaseStorage>(Arc::new(storage));
        Ok(Box::new(InMemorySession {
            records: self.records.clone(),
            buffer,
        }))
    }

    async fn remove(&self) -> ProfileResult<()> {
        self.records.write().await.clear();
        Ok(())
    }
}

/// Session half of [`InMemoryBackend`].
struct InMemorySession {
    records: SharedRecords,
    buffer: SharedBuffer,
}

#[async_trait]
impl SessionBackend for InMemorySession {
    async fn commit(&mut self) -> ProfileResult<()> {
        // Hold the record lock while draining so no reader sees a partial commit
        let mut records = self.records.write().await;
        let ops = {
            let mut buffer = self.buffer.lock();
            buffer.open = false;
            std::mem::take(&mut buffer.ops)
        };
        debug!(writes = ops.len(), "committing in-memory transaction");
        for (id, op) in ops {
            match op {
                Some(record) => {
                    records.insert(id, record);
                }
                None => {
                    records.remove(&id);
                }
            }
        }
        Ok(())
    }

    async fn rollback(&mut self) -> ProfileResult<()> {
        self.discard();
        Ok(())
    }

    async fn close(&mut self) -> ProfileResult<()> {
        self.discard();
        Ok(())
    }

    fn discard(&mut self) {
        self.buffer.lock().close();
    }
}

/// Constructors for in-memory profiles.
pub struct InMemoryProfile;

impl InMemoryProfile {
    pub const BACKEND_NAME: &'static str = "in_memory";
    pub const TEST_PROFILE_NAME: &'static str = "test-profile";

    /// Profile over a fresh, empty in-memory backend.
    pub fn open(context: InjectionContext, name: Option<String>) -> Profile {
        Profile::builder(InMemoryBackend::new())
            .context(context)
            .maybe_name(name)
            .build()
    }

    /// Standard test profile: lenient typing, named `test-profile`.
    pub fn test_profile() -> Profile {
        Self::open(
            InjectionContext::lenient(),
            Some(Self::TEST_PROFILE_NAME.to_string()),
        )
    }

    /// Active session over a new test profile.
    pub async fn test_session(settings: Option<Settings>) -> ProfileResult<ProfileSession> {
        let profile = Self::test_profile();
        let session = match settings {
            Some(settings) => profile.session_with(settings),
            None => profile.session(),
        };
        session.open().await
    }
}

/// [`ProfileManager`] for [`BackendKind::InMemory`].
///
/// Reads the optional `name` key from the config it is handed.
#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryProfileManager;

#[async_trait]
impl ProfileManager for InMemoryProfileManager {
    fn backend(&self) -> BackendKind {
        BackendKind::InMemory
    }

    async fn provision(&self, context: InjectionContext, config: &Settings) -> ProfileResult<Profile> {
        Ok(Profile::builder(InMemoryBackend::new())
            .context(context)
            .maybe_name(config.get_str("name").map(str::to_string))
            .created(true)
            .build())
    }

    async fn open(&self, context: InjectionContext, config: &Settings) -> ProfileResult<Profile> {
        Ok(InMemoryProfile::open(
            context,
            config.get_str("name").map(str::to_string),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageError, StorageRecord};
    use crate::traits::Inject;

    #[test]
    fn test_test_profile_defaults() {
        let profile = InMemoryProfile::test_profile();
        assert_eq!(profile.name(), InMemoryProfile::TEST_PROFILE_NAME);
        assert_eq!(profile.backend_name(), "in_memory");
        assert!(profile.supports_transactions());
        assert!(!profile.context().injector().enforce_typing());
    }

    #[tokio::test]
    async fn test_session_binds_storage() {
        let session = InMemoryProfile::test_session(None).await.unwrap();
        assert!(session.is_active());
        let storage = session.inject_trait::<dyn BaseStorage>().unwrap();
        storage.add_record(StorageRecord::new("connection", "{}")).await.unwrap();
        assert!(session.profile().inject_trait_optional::<dyn BaseStorage>().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_provision_reads_name() {
        let manager = InMemoryProfileManager;
        let config: Settings = [("name", "alice")].into_iter().collect();
        let profile = manager.provision(InjectionContext::new(), &config).await.unwrap();
        assert_eq!(profile.name(), "alice");
        assert!(profile.created());

        let opened = manager.open(InjectionContext::new(), &Settings::new()).await.unwrap();
        assert_eq!(opened.name(), Profile::DEFAULT_NAME);
        assert!(!opened.created());
    }

    #[tokio::test]
    async fn test_storage_handle_closes_with_session() {
        let profile = InMemoryProfile::test_profile();
        let mut session = profile.session().open().await.unwrap();
        let storage = session.inject_trait::<dyn BaseStorage>().unwrap();
        session.deactivate().await.unwrap();
        assert_eq!(
            storage.add_record(StorageRecord::new("connection", "{}")).await,
            Err(StorageError::Closed)
        );
    }

    #[tokio::test]
    async fn test_remove_clears_records() {
        let backend = InMemoryBackend::new();
        let profile = Profile::new(backend.clone(), InjectionContext::new());
        let mut session = profile.session().open().await.unwrap();
        session
            .inject_trait::<dyn BaseStorage>()
            .unwrap()
            .add_record(StorageRecord::new("connection", "{}"))
            .await
            .unwrap();
        session.commit().await.unwrap();
        assert_eq!(backend.record_count().await, 1);

        profile.remove().await.unwrap();
        assert_eq!(backend.record_count().await, 0);
    }
}
