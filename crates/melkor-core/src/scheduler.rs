use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::registry::CrawlerRegistry;

/// Events emitted by the scheduler for monitoring/logging.
#[derive(Debug, Clone)]
pub enum SchedulerEvent<'a> {
    Started {
        crawlers: usize,
        interval: Duration,
    },
    CrawlStarted {
        resource: &'a str,
    },
    CrawlSucceeded {
        resource: &'a str,
        count: usize,
    },
    CrawlFailed {
        resource: &'a str,
        error: &'a AppError,
    },
    RoundFinished {
        summary: RoundSummary,
    },
    Sleeping {
        interval: Duration,
    },
    Stopped,
}

/// Trait for receiving scheduler events (decoupled logging).
pub trait SchedulerReporter: Send + Sync {
    fn report(&self, event: SchedulerEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSchedulerReporter;

impl SchedulerReporter for TracingSchedulerReporter {
    fn report(&self, event: SchedulerEvent<'_>) {
        match event {
            SchedulerEvent::Started { crawlers, interval } => {
                tracing::info!(%crawlers, interval_secs = interval.as_secs(), "Scheduler started");
            }
            SchedulerEvent::CrawlStarted { resource } => {
                tracing::info!(%resource, "Crawl started");
            }
            SchedulerEvent::CrawlSucceeded { resource, count } => {
                tracing::info!(%resource, %count, "Crawl succeeded");
            }
            SchedulerEvent::CrawlFailed { resource, error } => {
                tracing::error!(%resource, %error, "Error while crawling");
            }
            SchedulerEvent::RoundFinished { summary } => {
                tracing::debug!(
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    "Crawl round finished"
                );
            }
            SchedulerEvent::Sleeping { interval } => {
                tracing::debug!(interval_secs = interval.as_secs(), "Sleeping until next round");
            }
            SchedulerEvent::Stopped => {
                tracing::info!("Scheduler stopped");
            }
        }
    }
}

/// Outcome of one pass over every registered crawler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Background loop that crawls every registered resource once per interval.
///
/// Crawlers run sequentially in registration order. A failing crawler is
/// reported and skipped; it never stops the others or the loop.
pub struct CrawlScheduler {
    registry: Arc<CrawlerRegistry>,
    interval: Duration,
}

impl CrawlScheduler {
    pub fn new(registry: Arc<CrawlerRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Crawl every registered resource once.
    pub async fn run_round<R: SchedulerReporter>(
        &self,
        cancel: &CancellationToken,
        reporter: &R,
    ) -> RoundSummary {
        let mut summary = RoundSummary::default();

        for crawler in self.registry.iter() {
            let resource = crawler.resource();
            reporter.report(SchedulerEvent::CrawlStarted { resource });

            match crawler.do_crawl(cancel).await {
                Ok(()) => {
                    summary.succeeded += 1;
                    reporter.report(SchedulerEvent::CrawlSucceeded {
                        resource,
                        count: crawler.count(),
                    });
                }
                Err(error) => {
                    summary.failed += 1;
                    reporter.report(SchedulerEvent::CrawlFailed {
                        resource,
                        error: &error,
                    });
                }
            }
        }

        reporter.report(SchedulerEvent::RoundFinished { summary });
        summary
    }

    /// Run rounds forever, sleeping `interval` between them, until `cancel` fires.
    pub async fn run<R: SchedulerReporter>(&self, cancel: CancellationToken, reporter: &R) {
        reporter.report(SchedulerEvent::Started {
            crawlers: self.registry.len(),
            interval: self.interval,
        });

        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.run_round(&cancel, reporter).await;

            reporter.report(SchedulerEvent::Sleeping {
                interval: self.interval,
            });
            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = cancel.cancelled() => break,
            }
        }

        reporter.report(SchedulerEvent::Stopped);
    }
}
