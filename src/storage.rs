//! Record storage exposed by profile sessions.
//!
//! Backends bind a [`BaseStorage`] implementation into each session context;
//! callers resolve it with `session.inject_trait::<dyn BaseStorage>()`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exact-match tag filter used by [`BaseStorage::find_all_records`].
pub type TagQuery = BTreeMap<String, String>;

/// A typed record with searchable tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub id: String,
}

impl StorageRecord {
    /// New record with a random hex id.
    pub fn new(record_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            value: value.into(),
            tags: BTreeMap::new(),
            id: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Whether every pair in `query` is present in this record's tags.
    pub fn matches(&self, record_type: &str, query: &TagQuery) -> bool {
        self.record_type == record_type
            && query.iter().all(|(name, value)| self.tags.get(name) == Some(value))
    }
}

/// Storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Record not found: {record_type}/{id}")]
    NotFound { record_type: String, id: String },
    #[error("Duplicate record id: {0}")]
    Duplicate(String),
    /// The session or transaction behind this storage handle has finished
    #[error("Storage handle used after its session was closed")]
    Closed,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Abstract record storage.
#[async_trait]
pub trait BaseStorage: Send + Sync {
    async fn add_record(&self, record: StorageRecord) -> StorageResult<()>;

    async fn get_record(&self, record_type: &str, record_id: &str) -> StorageResult<StorageRecord>;

    /// Replace the value and tags of an existing record.
    async fn update_record(
        &self,
        record: &StorageRecord,
        value: &str,
        tags: BTreeMap<String, String>,
    ) -> StorageResult<()>;

    async fn delete_record(&self, record: &StorageRecord) -> StorageResult<()>;

    /// All records of `record_type` whose tags contain `query`, ordered by id.
    async fn find_all_records(&self, record_type: &str, query: &TagQuery) -> StorageResult<Vec<StorageRecord>>;
}
