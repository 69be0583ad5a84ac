//! Record storage for the in-memory backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::RwLock;

use crate::storage::{BaseStorage, StorageError, StorageRecord, StorageResult, TagQuery};

/// Records shared by every session of one in-memory profile, keyed by id.
pub(crate) type SharedRecords = Arc<RwLock<BTreeMap<String, StorageRecord>>>;

/// Pending writes of one session. `None` marks a deletion.
#[derive(Debug)]
pub(crate) struct WriteBuffer {
    pub(crate) ops: BTreeMap<String, Option<StorageRecord>>,
    pub(crate) open: bool,
}

impl WriteBuffer {
    pub(crate) fn new() -> Self {
        Self {
            ops: BTreeMap::new(),
            open: true,
        }
    }

    /// Drop pending writes and refuse further use.
    pub(crate) fn close(&mut self) {
        self.ops.clear();
        self.open = false;
    }
}

pub(crate) type SharedBuffer = Arc<Mutex<WriteBuffer>>;

/// [`BaseStorage`] over an in-memory profile.
///
/// Handles created for a transaction keep writes in a buffer until the
/// transaction commits; reads through the same handle see those writes.
/// Handles for plain sessions write straight through. Either kind fails
/// with [`StorageError::Closed`] once its session has finished.
#[derive(Debug)]
pub struct InMemoryStorage {
    records: SharedRecords,
    buffer: SharedBuffer,
    transactional: bool,
}

impl InMemoryStorage {
    pub(crate) fn new(records: SharedRecords, buffer: SharedBuffer, transactional: bool) -> Self {
        Self {
            records,
            buffer,
            transactional,
        }
    }

    pub fn is_transactional(&self) -> bool {
        self.transactional
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.buffer.lock().open {
            Ok(())
        } else {
            Err(StorageError::Closed)
        }
    }

    /// Current view of one record, pending writes included.
    async fn lookup(&self, id: &str) -> StorageResult<Option<StorageRecord>> {
        {
            let buffer = self.buffer.lock();
            if !buffer.open {
                return Err(StorageError::Closed);
            }
            if let Some(pending) = buffer.ops.get(id) {
                return Ok(pending.clone());
            }
        }
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn lookup_typed(&self, record_type: &str, id: &str) -> StorageResult<StorageRecord> {
        require_type(self.lookup(id).await?, record_type, id)
    }

    /// Read-modify-write of one record; `apply` returns the new value or `None` to delete.
    ///
    /// Plain sessions check and write under a single lock on the shared records.
    async fn modify<F>(&self, id: &str, apply: F) -> StorageResult<()>
    where
        F: FnOnce(Option<StorageRecord>) -> StorageResult<Option<StorageRecord>> + Send,
    {
        if self.transactional {
            let next = apply(self.lookup(id).await?)?;
            let mut buffer = self.buffer.lock();
            if !buffer.open {
                return Err(StorageError::Closed);
            }
            buffer.ops.insert(id.to_string(), next);
            return Ok(());
        }

        self.ensure_open()?;
        let mut records = self.records.write().await;
        match apply(records.get(id).cloned())? {
            Some(record) => {
                records.insert(id.to_string(), record);
            }
            None => {
                records.remove(id);
            }
        }
        Ok(())
    }
}

fn require_type(current: Option<StorageRecord>, record_type: &str, id: &str) -> StorageResult<StorageRecord> {
    match current {
        Some(record) if record.record_type == record_type => Ok(record),
        _ => Err(StorageError::NotFound {
            record_type: record_type.to_string(),
            id: id.to_string(),
        }),
    }
}

#[async_trait]
impl BaseStorage for InMemoryStorage {
    async fn add_record(&self, record: StorageRecord) -> StorageResult<()> {
        let id = record.id.clone();
        self.modify(&id, move |current| match current {
            Some(_) => Err(StorageError::Duplicate(record.id)),
            None => Ok(Some(record)),
        })
        .await
    }

    async fn get_record(&self, record_type: &str, record_id: &str) -> StorageResult<StorageRecord> {
        self.lookup_typed(record_type, record_id).await
    }

    async fn update_record(
        &self,
        record: &StorageRecord,
        value: &str,
        tags: BTreeMap<String, String>,
    ) -> StorageResult<()> {
        let record_type = record.record_type.as_str();
        let id = record.id.as_str();
        self.modify(id, move |current| {
            let mut updated = require_type(current, record_type, id)?;
            updated.value = value.to_string();
            updated.tags = tags;
            Ok(Some(updated))
        })
        .await
    }

    async fn delete_record(&self, record: &StorageRecord) -> StorageResult<()> {
        let record_type = record.record_type.as_str();
        let id = record.id.as_str();
        self.modify(id, move |current| {
            require_type(current, record_type, id)?;
            Ok(None)
        })
        .await
    }

    async fn find_all_records(&self, record_type: &str, query: &TagQuery) -> StorageResult<Vec<StorageRecord>> {
        self.ensure_open()?;
        let mut view: BTreeMap<String, StorageRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|(_, record)| record.matches(record_type, query))
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect();

        let buffer = self.buffer.lock();
        if !buffer.open {
            return Err(StorageError::Closed);
        }
        for (id, op) in &buffer.ops {
            match op {
                Some(record) if record.matches(record_type, query) => {
                    view.insert(id.clone(), record.clone());
                }
                _ => {
                    view.remove(id);
                }
            }
        }
        Ok(view.into_values().collect())
    }
}
