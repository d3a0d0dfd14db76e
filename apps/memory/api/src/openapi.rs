use utoipa::OpenApi;

/// Main API documentation
///
/// Domain documents are nested under the same prefixes their routers are
/// mounted at in `api::routes`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Memory API",
        version = "0.1.0",
        description = "Scoped vector memory: store embeddings per session, actor or workflow and search them by similarity"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/memory", api = domain_vector_memory::handlers::ApiDoc),
    )
)]
pub struct ApiDoc;
