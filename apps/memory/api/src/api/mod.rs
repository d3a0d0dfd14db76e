use axum::Router;

pub mod vector_memory;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
///
/// Returns a stateless Router (all sub-routers have state already applied).
pub fn routes() -> Router {
    Router::new().nest("/memory", vector_memory::router()) // Vector memory at /api/memory
}
