use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::tags::normalize_tags;
use crate::traits::{Crawler, ResourceProvider};

/// A [`Crawler`] that keeps the last good provider result in a [`SnapshotStore`].
///
/// Each successful crawl builds a brand new snapshot (tag-normalized, stamped
/// with the crawl time) and publishes it in one swap. A failed crawl leaves
/// the previous snapshot, timestamp and count exactly as they were.
pub struct SnapshotCrawler<P: ResourceProvider> {
    provider: P,
    store: SnapshotStore,
}

impl<P: ResourceProvider> SnapshotCrawler<P> {
    pub fn new(provider: P) -> Self {
        let store = SnapshotStore::new(Snapshot::empty(provider.identifier_field()));
        Self { provider, store }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: ResourceProvider> Crawler for SnapshotCrawler<P> {
    fn resource(&self) -> &str {
        self.provider.resource()
    }

    async fn do_crawl(&self, cancel: &CancellationToken) -> Result<(), AppError> {
        tracing::info!(resource = %self.resource(), "Crawling");

        let mut records = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AppError::Cancelled),
            result = self.provider.fetch(cancel) => result?,
        };

        for record in &mut records {
            normalize_tags(record);
        }

        let snapshot = Snapshot::new(records, Utc::now(), self.provider.identifier_field());
        let count = snapshot.count();
        self.store.publish(snapshot);

        tracing::info!(resource = %self.resource(), %count, "Done crawling");
        Ok(())
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.store.load()
    }
}
