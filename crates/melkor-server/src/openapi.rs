use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Melkor API",
        description = "AWS caching layer: crawled AWS resources served from memory."
    ),
    paths(
        crate::routes::list_resources,
        crate::routes::get_resource,
        crate::routes::service_metadata,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::ServiceMetadataResponse,
        crate::dto::CrawlerMetadata,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "resources", description = "Cached AWS resources"),
        (name = "system", description = "Service metadata and health"),
    )
)]
pub struct ApiDoc;
