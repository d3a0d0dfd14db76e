//! Vector Memory Domain
//!
//! Scoped storage of embedding vectors with similarity search, exposed over HTTP.
//! Every vector lives in exactly one scope (session, actor, workflow or global)
//! chosen from the `X-Session-ID`, `X-Actor-ID` and `X-Workflow-ID` headers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, header scope extraction
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, scope resolution, top_k defaulting
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Storage + ranking (trait + in-memory implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Records, queries, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_vector_memory::{
//!     handlers,
//!     repository::InMemoryVectorMemoryRepository,
//!     service::VectorMemoryService,
//! };
//!
//! let repository = InMemoryVectorMemoryRepository::new();
//! let service = VectorMemoryService::new(repository);
//!
//! // Serves POST /vectors/set, /vectors/search, /vectors/delete and /vectors/delete-prefix
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod scope;
pub mod service;

// Re-export commonly used types
pub use error::{StoreError, VectorMemoryError, VectorMemoryResult};
pub use models::{
    DeletePrefixRequest, DeletePrefixResponse, DeleteVectorRequest, DeleteVectorResponse,
    Metadata, Scope, ScopeKind, SearchVectorsRequest, SetVectorRequest, SetVectorResponse,
    VectorRecord, VectorSearchQuery, VectorSearchResult,
};
pub use repository::{InMemoryVectorMemoryRepository, VectorMemoryRepository};
pub use scope::HeaderScope;
pub use service::VectorMemoryService;
