use std::sync::Arc;
use tracing::instrument;

use crate::error::VectorMemoryResult;
use crate::models::{
    DeletePrefixRequest, DeletePrefixResponse, DeleteVectorRequest, DeleteVectorResponse, Scope,
    SearchVectorsRequest, SetVectorRequest, SetVectorResponse, VectorRecord, VectorSearchQuery,
    VectorSearchResult,
};
use crate::repository::VectorMemoryRepository;
use crate::scope;

/// Service layer for scoped vector memory
///
/// Every operation runs decode-checked input through validation, then scope
/// resolution, then exactly one repository call. Nothing is retried or cached.
#[derive(Clone)]
pub struct VectorMemoryService<R: VectorMemoryRepository> {
    repository: Arc<R>,
}

impl<R: VectorMemoryRepository> VectorMemoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Store a vector under the resolved scope
    #[instrument(skip(self, header_scope, request), fields(key = %request.key))]
    pub async fn set_vector(
        &self,
        header_scope: Option<Scope>,
        request: SetVectorRequest,
    ) -> VectorMemoryResult<SetVectorResponse> {
        request.check()?;
        let scope = scope::resolve(
            header_scope,
            request.scope.as_deref(),
            request.scope_id.as_deref(),
        )?;

        let SetVectorRequest {
            key,
            embedding,
            metadata,
            ..
        } = request;

        // The record owns its embedding and metadata outright
        let record = VectorRecord {
            scope: scope.kind,
            scope_id: scope.id.clone(),
            key: key.clone(),
            embedding,
            metadata: metadata.clone(),
        };

        self.repository.set_vector(record).await?;
        tracing::info!(scope = %scope, "Stored vector");

        Ok(SetVectorResponse {
            key,
            scope: scope.kind,
            scope_id: scope.id,
            metadata,
        })
    }

    /// Rank stored vectors of the header scope against a query embedding
    #[instrument(skip(self, header_scope, request), fields(top_k = request.top_k))]
    pub async fn search_similar(
        &self,
        header_scope: Option<Scope>,
        request: SearchVectorsRequest,
    ) -> VectorMemoryResult<Vec<VectorSearchResult>> {
        request.check()?;
        let scope = header_scope.unwrap_or_else(Scope::global);
        let top_k = request.effective_top_k();

        let query = VectorSearchQuery {
            scope: scope.kind,
            scope_id: scope.id,
            query_embedding: request.query_embedding,
            top_k,
            filters: request.filters,
        };

        let results = self.repository.similarity_search(query).await?;
        tracing::debug!(matches = results.len(), top_k, "Similarity search finished");

        Ok(results)
    }

    /// Delete a vector from the resolved scope
    #[instrument(skip(self, header_scope, request), fields(key = %request.key))]
    pub async fn delete_vector(
        &self,
        header_scope: Option<Scope>,
        request: DeleteVectorRequest,
    ) -> VectorMemoryResult<DeleteVectorResponse> {
        request.check()?;
        let scope = scope::resolve(
            header_scope,
            request.scope.as_deref(),
            request.scope_id.as_deref(),
        )?;

        let deleted = self.repository.delete_vector(&scope, &request.key).await?;
        tracing::info!(scope = %scope, deleted, "Deleted vector");

        Ok(DeleteVectorResponse {
            key: request.key,
            scope: scope.kind,
            scope_id: scope.id,
            deleted,
        })
    }

    /// Delete every vector of the resolved scope whose key starts with the prefix
    #[instrument(skip(self, header_scope, request), fields(prefix = %request.prefix))]
    pub async fn delete_by_prefix(
        &self,
        header_scope: Option<Scope>,
        request: DeletePrefixRequest,
    ) -> VectorMemoryResult<DeletePrefixResponse> {
        request.check()?;
        let scope = scope::resolve(
            header_scope,
            request.scope.as_deref(),
            request.scope_id.as_deref(),
        )?;

        let deleted = self
            .repository
            .delete_vectors_by_prefix(&scope, &request.prefix)
            .await?;
        tracing::info!(scope = %scope, deleted, "Deleted vectors by prefix");

        Ok(DeletePrefixResponse {
            prefix: request.prefix,
            scope: scope.kind,
            scope_id: scope.id,
            deleted,
        })
    }
}
