//! REST API server: configuration, logging, routes, DTOs, and OpenAPI documentation.

use std::sync::Arc;

use melkor_aws::instances_crawler;
use melkor_core::{AppError, CrawlerRegistry};

use crate::config::Config;

pub mod config;
pub mod dto;
pub mod error;
pub mod logging;
pub mod openapi;
pub mod routes;
pub mod state;

/// Register every crawler melkor serves, in the order they are crawled.
pub async fn build_registry(config: &Config) -> Result<CrawlerRegistry, AppError> {
    let mut registry = CrawlerRegistry::new();
    registry.register(Arc::new(instances_crawler(&config.aws_region).await))?;
    Ok(registry)
}
