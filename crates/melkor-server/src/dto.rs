use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Query parameters accepted by the resource listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Maximum number of entries to return; 0 or absent means all
    #[serde(rename = "_limit")]
    pub limit: Option<String>,
    /// `true` returns full records instead of identifiers
    #[serde(rename = "_expand")]
    pub expand: Option<String>,
    /// Filter expression of the form `(Path.To.Field:value)`
    #[serde(rename = "_filter")]
    pub filter: Option<String>,
}

// ---------------------------------------------------------------------------
// Service metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CrawlerMetadata {
    pub resource: String,
    /// Completion time of the last successful crawl; null before the first
    pub last_crawled: Option<DateTime<Utc>>,
    pub count: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ServiceMetadataResponse {
    pub owner: String,
    pub description: &'static str,
    pub service_name: &'static str,
    pub service_version: &'static str,
    pub aws_region: String,
    pub crawlers: Vec<CrawlerMetadata>,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub crawlers: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
