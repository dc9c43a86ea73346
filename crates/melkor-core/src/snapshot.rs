use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::value::{Record, Value};

/// The complete set of records for one resource kind as of one crawl.
///
/// Immutable once built. The record count is derived from `records`, so a
/// reader can never observe a count that disagrees with the records.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    records: Vec<Record>,
    last_crawled: Option<DateTime<Utc>>,
    identifier_field: String,
}

impl Snapshot {
    /// The state before any crawl has succeeded.
    pub fn empty(identifier_field: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            last_crawled: None,
            identifier_field: identifier_field.into(),
        }
    }

    pub fn new(
        records: Vec<Record>,
        last_crawled: DateTime<Utc>,
        identifier_field: impl Into<String>,
    ) -> Self {
        Self {
            records,
            last_crawled: Some(last_crawled),
            identifier_field: identifier_field.into(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn last_crawled(&self) -> Option<DateTime<Utc>> {
        self.last_crawled
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    /// The identifier of `record`, if it carries a string identifier field.
    pub fn identifier<'a>(&self, record: &'a Record) -> Option<&'a str> {
        record.get(&self.identifier_field).and_then(Value::as_str)
    }

    /// Identifiers in crawl order. Records without one are skipped.
    pub fn identifiers(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|r| self.identifier(r))
            .collect()
    }

    /// First record in crawl order whose identifier equals `id`.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| self.identifier(r) == Some(id))
    }
}

/// Holds the latest [`Snapshot`] for one resource kind.
///
/// Writers build a complete snapshot privately and [`publish`](Self::publish)
/// it in one swap; readers [`load`](Self::load) an `Arc` and keep a
/// consistent view for as long as they hold it.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn load(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovered from poisoned snapshot lock");
            poisoned.into_inner()
        });
        Arc::clone(&*guard)
    }

    pub fn publish(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovered from poisoned snapshot lock");
            poisoned.into_inner()
        });
        *guard = next;
    }
}
