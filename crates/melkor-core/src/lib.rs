pub mod crawler;
pub mod error;
pub mod filter;
pub mod query;
pub mod registry;
pub mod scheduler;
pub mod snapshot;
pub mod tags;
pub mod traits;
pub mod value;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use crawler::SnapshotCrawler;
pub use error::AppError;
pub use filter::{Filter, FilterError, apply_filter};
pub use query::{ListQuery, Projection};
pub use registry::{CrawlerRegistry, canonical_name};
pub use scheduler::{
    CrawlScheduler, RoundSummary, SchedulerEvent, SchedulerReporter, TracingSchedulerReporter,
};
pub use snapshot::{Snapshot, SnapshotStore};
pub use tags::normalize_tags;
pub use traits::{Crawler, ResourceProvider, SharedCrawler};
pub use value::{Record, Value};
