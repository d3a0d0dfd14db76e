use axum::{Json, Router, extract::State, routing::post};
use axum_helpers::{ErrorResponse, JsonBody};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::VectorMemoryResult;
use crate::models::{
    DeletePrefixRequest, DeletePrefixResponse, DeleteVectorRequest, DeleteVectorResponse,
    ScopeKind, SearchVectorsRequest, SetVectorRequest, SetVectorResponse, VectorSearchResult,
};
use crate::repository::VectorMemoryRepository;
use crate::scope::HeaderScope;
use crate::service::VectorMemoryService;

pub const TAG: &str = "vector-memory";

/// OpenAPI documentation for the vector memory API
#[derive(OpenApi)]
#[openapi(
    paths(set_vector, search_vectors, delete_vector, delete_prefix),
    components(schemas(
        ScopeKind,
        SetVectorRequest,
        SetVectorResponse,
        SearchVectorsRequest,
        VectorSearchResult,
        DeleteVectorRequest,
        DeleteVectorResponse,
        DeletePrefixRequest,
        DeletePrefixResponse,
        ErrorResponse
    )),
    tags(
        (name = TAG, description = "Scoped embedding storage and similarity search")
    )
)]
pub struct ApiDoc;

/// Create the vector memory router with all HTTP endpoints
pub fn router<R: VectorMemoryRepository + 'static>(service: VectorMemoryService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/vectors/set", post(set_vector))
        .route("/vectors/search", post(search_vectors))
        .route("/vectors/delete", post(delete_vector))
        .route("/vectors/delete-prefix", post(delete_prefix))
        .with_state(shared_service)
}

/// Store a vector in the caller's scope
#[utoipa::path(
    post,
    path = "/vectors/set",
    tag = TAG,
    params(
        ("X-Session-ID" = Option<String>, Header, description = "Session scope (highest precedence)"),
        ("X-Actor-ID" = Option<String>, Header, description = "Actor scope"),
        ("X-Workflow-ID" = Option<String>, Header, description = "Workflow scope")
    ),
    request_body = SetVectorRequest,
    responses(
        (status = 200, description = "Vector stored", body = SetVectorResponse),
        (status = 400, description = "Malformed body, empty embedding or bad scope", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn set_vector<R: VectorMemoryRepository>(
    State(service): State<Arc<VectorMemoryService<R>>>,
    HeaderScope(scope): HeaderScope,
    JsonBody(input): JsonBody<SetVectorRequest>,
) -> VectorMemoryResult<Json<SetVectorResponse>> {
    let stored = service.set_vector(scope, input).await?;
    Ok(Json(stored))
}

/// Search the caller's scope for similar vectors
#[utoipa::path(
    post,
    path = "/vectors/search",
    tag = TAG,
    params(
        ("X-Session-ID" = Option<String>, Header, description = "Session scope (highest precedence)"),
        ("X-Actor-ID" = Option<String>, Header, description = "Actor scope"),
        ("X-Workflow-ID" = Option<String>, Header, description = "Workflow scope")
    ),
    request_body = SearchVectorsRequest,
    responses(
        (status = 200, description = "Matches, best first", body = Vec<VectorSearchResult>),
        (status = 400, description = "Malformed body or empty query embedding", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn search_vectors<R: VectorMemoryRepository>(
    State(service): State<Arc<VectorMemoryService<R>>>,
    HeaderScope(scope): HeaderScope,
    JsonBody(input): JsonBody<SearchVectorsRequest>,
) -> VectorMemoryResult<Json<Vec<VectorSearchResult>>> {
    let results = service.search_similar(scope, input).await?;
    Ok(Json(results))
}

/// Delete a vector from the caller's scope
#[utoipa::path(
    post,
    path = "/vectors/delete",
    tag = TAG,
    params(
        ("X-Session-ID" = Option<String>, Header, description = "Session scope (highest precedence)"),
        ("X-Actor-ID" = Option<String>, Header, description = "Actor scope"),
        ("X-Workflow-ID" = Option<String>, Header, description = "Workflow scope")
    ),
    request_body = DeleteVectorRequest,
    responses(
        (status = 200, description = "Delete outcome", body = DeleteVectorResponse),
        (status = 400, description = "Malformed body or bad scope", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn delete_vector<R: VectorMemoryRepository>(
    State(service): State<Arc<VectorMemoryService<R>>>,
    HeaderScope(scope): HeaderScope,
    JsonBody(input): JsonBody<DeleteVectorRequest>,
) -> VectorMemoryResult<Json<DeleteVectorResponse>> {
    let outcome = service.delete_vector(scope, input).await?;
    Ok(Json(outcome))
}

/// Delete every vector in the caller's scope whose key starts with a prefix
#[utoipa::path(
    post,
    path = "/vectors/delete-prefix",
    tag = TAG,
    params(
        ("X-Session-ID" = Option<String>, Header, description = "Session scope (highest precedence)"),
        ("X-Actor-ID" = Option<String>, Header, description = "Actor scope"),
        ("X-Workflow-ID" = Option<String>, Header, description = "Workflow scope")
    ),
    request_body = DeletePrefixRequest,
    responses(
        (status = 200, description = "Number of vectors deleted", body = DeletePrefixResponse),
        (status = 400, description = "Malformed body, empty prefix or bad scope", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn delete_prefix<R: VectorMemoryRepository>(
    State(service): State<Arc<VectorMemoryService<R>>>,
    HeaderScope(scope): HeaderScope,
    JsonBody(input): JsonBody<DeletePrefixRequest>,
) -> VectorMemoryResult<Json<DeletePrefixResponse>> {
    let outcome = service.delete_by_prefix(scope, input).await?;
    Ok(Json(outcome))
}
