use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::snapshot::Snapshot;
use crate::value::Record;

/// Talks to one upstream provider endpoint and converts its objects to records.
///
/// The conversion must be total: a field the provider leaves out becomes a
/// null value instead of failing the fetch.
pub trait ResourceProvider: Send + Sync + 'static {
    /// Stable, human-readable name of the resource kind (e.g. "Instances").
    fn resource(&self) -> &str;

    /// Name of the field that identifies a record (e.g. "InstanceId").
    fn identifier_field(&self) -> &str;

    /// Poll the provider once and return every record, in provider order.
    ///
    /// Implementations should stop early with [`AppError::Cancelled`] when
    /// `cancel` fires between provider round-trips.
    fn fetch(
        &self,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Vec<Record>, AppError>> + Send;
}

/// One crawled resource kind, as seen by the scheduler and the serving layer.
///
/// All read accessors are answered from a single [`Snapshot`], so a caller
/// that needs several of them consistently should call
/// [`snapshot`](Crawler::snapshot) once and read from that.
#[async_trait]
pub trait Crawler: Send + Sync {
    fn resource(&self) -> &str;

    /// Poll the provider and replace the stored snapshot.
    ///
    /// On error the previous snapshot stays in place.
    async fn do_crawl(&self, cancel: &CancellationToken) -> Result<(), AppError>;

    fn snapshot(&self) -> Arc<Snapshot>;

    fn list(&self) -> Vec<String> {
        self.snapshot()
            .identifiers()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn list_expanded(&self) -> Vec<Record> {
        self.snapshot().records().to_vec()
    }

    fn get(&self, id: &str) -> Option<Record> {
        self.snapshot().get(id).cloned()
    }

    fn last_crawled(&self) -> Option<DateTime<Utc>> {
        self.snapshot().last_crawled()
    }

    fn count(&self) -> usize {
        self.snapshot().count()
    }
}

pub type SharedCrawler = Arc<dyn Crawler>;
