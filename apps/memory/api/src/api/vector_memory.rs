use axum::Router;
use domain_vector_memory::{InMemoryVectorMemoryRepository, VectorMemoryService, handlers};

pub fn router() -> Router {
    let repository = InMemoryVectorMemoryRepository::new();
    let service = VectorMemoryService::new(repository);
    handlers::router(service)
}
