use std::sync::Arc;

use melkor_core::CrawlerRegistry;

use crate::config::Config;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub registry: Arc<CrawlerRegistry>,
    pub owner: String,
    pub aws_region: String,
}

impl AppState {
    pub fn new(registry: Arc<CrawlerRegistry>, config: &Config) -> Self {
        Self {
            registry,
            owner: config.owner.clone(),
            aws_region: config.aws_region.clone(),
        }
    }
}
