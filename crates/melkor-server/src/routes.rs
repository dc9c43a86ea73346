use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use melkor_core::error::AppError;
use melkor_core::query::ListQuery;
use melkor_core::traits::SharedCrawler;

use crate::dto::{
    CrawlerMetadata, ErrorResponse, HealthResponse, ListParams, ServiceMetadataResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "melkor";
pub const SERVICE_DESCRIPTION: &str = "AWS caching layer";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the full router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/aws/{resource}", get(list_resources))
        .route("/api/v1/aws/{resource}/{id}", get(get_resource))
        .route("/service-metadata", get(service_metadata))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

fn find_crawler<'a>(state: &'a AppState, resource: &str) -> Result<&'a SharedCrawler, ApiError> {
    state.registry.get(resource).ok_or_else(|| {
        tracing::debug!(%resource, "Not Found");
        ApiError(AppError::NotFound)
    })
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/aws/{resource}",
    params(
        ("resource" = String, Path, description = "Resource kind, case-insensitive (e.g. instances)"),
        ListParams,
    ),
    responses(
        (status = 200, description = "Identifiers, or full records with `_expand=true`", body = Vec<serde_json::Value>),
        (status = 400, description = "Bad `_limit` or `_filter`", body = ErrorResponse),
        (status = 404, description = "Unknown resource", body = ErrorResponse),
    ),
    tag = "resources"
)]
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let query = ListQuery::from_params(
        params.limit.as_deref(),
        params.expand.as_deref(),
        params.filter.as_deref(),
    )?;
    let crawler = find_crawler(&state, &resource)?;

    tracing::debug!(
        %resource,
        limit = query.limit,
        expand = query.expand,
        filter = ?params.filter,
        "Listing resources"
    );

    let snapshot = crawler.snapshot();
    Ok(axum::Json(query.run(&snapshot)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/aws/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Resource kind, case-insensitive"),
        ("id" = String, Path, description = "Resource identifier (e.g. an instance id)"),
    ),
    responses(
        (status = 200, description = "Full record", body = serde_json::Value),
        (status = 404, description = "Unknown resource or identifier", body = ErrorResponse),
    ),
    tag = "resources"
)]
pub async fn get_resource(
    State(state): State<Arc<AppState>>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let crawler = find_crawler(&state, &resource)?;
    tracing::debug!(%resource, %id, "Fetching single resource");

    let snapshot = crawler.snapshot();
    match snapshot.get(&id) {
        Some(record) => Ok(axum::Json(record).into_response()),
        None => {
            tracing::debug!(%resource, %id, "Not Found");
            Err(AppError::NotFound.into())
        }
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/service-metadata",
    responses(
        (status = 200, description = "Service description and crawler status", body = ServiceMetadataResponse),
    ),
    tag = "system"
)]
pub async fn service_metadata(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let crawlers = state
        .registry
        .iter()
        .map(|crawler| {
            let snapshot = crawler.snapshot();
            CrawlerMetadata {
                resource: crawler.resource().to_string(),
                last_crawled: snapshot.last_crawled(),
                count: snapshot.count(),
            }
        })
        .collect();

    axum::Json(ServiceMetadataResponse {
        owner: state.owner.clone(),
        description: SERVICE_DESCRIPTION,
        service_name: SERVICE_NAME,
        service_version: SERVICE_VERSION,
        aws_region: state.aws_region.clone(),
        crawlers,
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "ok",
        crawlers: state.registry.len(),
    })
}
