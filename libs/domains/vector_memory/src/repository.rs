use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{
    Metadata, Scope, ScopeKind, VectorRecord, VectorSearchQuery, VectorSearchResult,
};

/// Storage backend for scoped vectors.
///
/// Implementations own ranking, filter interpretation, retries and their own
/// concurrency discipline. Callers never pass an empty or non-finite embedding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorMemoryRepository: Send + Sync {
    /// Insert or replace the record stored under (scope, scope_id, key)
    async fn set_vector(&self, record: VectorRecord) -> Result<(), StoreError>;

    /// Return at most `query.top_k` records of the query's scope, best match first
    async fn similarity_search(
        &self,
        query: VectorSearchQuery,
    ) -> Result<Vec<VectorSearchResult>, StoreError>;

    /// Delete a record, reporting whether it existed
    async fn delete_vector(&self, scope: &Scope, key: &str) -> Result<bool, StoreError>;

    /// Delete every record of the scope whose key starts with `prefix`, returning the count
    async fn delete_vectors_by_prefix(
        &self,
        scope: &Scope,
        prefix: &str,
    ) -> Result<usize, StoreError>;
}

type RecordKey = (ScopeKind, String, String);

/// In-memory implementation of VectorMemoryRepository (for development/testing)
///
/// Ranks by cosine similarity. Filters match when every filter entry equals
/// the record's metadata value under the same key.
#[derive(Debug, Default, Clone)]
pub struct InMemoryVectorMemoryRepository {
    records: Arc<RwLock<HashMap<RecordKey, VectorRecord>>>,
}

impl InMemoryVectorMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VectorMemoryRepository for InMemoryVectorMemoryRepository {
    async fn set_vector(&self, record: VectorRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let key = (record.scope, record.scope_id.clone(), record.key.clone());

        tracing::debug!(
            scope = %record.scope,
            scope_id = %record.scope_id,
            key = %record.key,
            dimension = record.embedding.len(),
            "Stored vector"
        );
        records.insert(key, record);
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: VectorSearchQuery,
    ) -> Result<Vec<VectorSearchResult>, StoreError> {
        let records = self.records.read().await;

        let mut results: Vec<VectorSearchResult> = records
            .values()
            .filter(|r| r.scope == query.scope && r.scope_id == query.scope_id)
            .filter(|r| matches_filters(r.metadata.as_ref(), query.filters.as_ref()))
            .filter_map(|r| {
                let score = cosine_similarity(&query.query_embedding, &r.embedding)
                    .filter(|s| s.is_finite())?;
                Some(VectorSearchResult {
                    scope: r.scope,
                    scope_id: r.scope_id.clone(),
                    key: r.key.clone(),
                    score,
                    metadata: r.metadata.clone(),
                })
            })
            .collect();

        // Best first; ties broken by key so output is deterministic
        results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.key.cmp(&b.key)));
        results.truncate(query.top_k);

        Ok(results)
    }

    async fn delete_vector(&self, scope: &Scope, key: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let removed = records
            .remove(&(scope.kind, scope.id.clone(), key.to_string()))
            .is_some();

        if removed {
            tracing::debug!(scope = %scope, key, "Deleted vector");
        }
        Ok(removed)
    }

    async fn delete_vectors_by_prefix(
        &self,
        scope: &Scope,
        prefix: &str,
    ) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|(kind, scope_id, key), _| {
            !(*kind == scope.kind && *scope_id == scope.id && key.starts_with(prefix))
        });
        let removed = before - records.len();

        tracing::debug!(scope = %scope, prefix, removed, "Deleted vectors by prefix");
        Ok(removed)
    }
}

fn matches_filters(metadata: Option<&Metadata>, filters: Option<&Metadata>) -> bool {
    let Some(filters) = filters else {
        return true;
    };
    filters.iter().all(|(key, expected)| {
        metadata
            .and_then(|m| m.get(key))
            .is_some_and(|actual| actual == expected)
    })
}

/// `None` when dimensions differ; zero-norm vectors score 0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(kind: ScopeKind, scope_id: &str, key: &str, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord {
            scope: kind,
            scope_id: scope_id.to_string(),
            key: key.to_string(),
            embedding,
            metadata: None,
        }
    }

    fn query(kind: ScopeKind, scope_id: &str, embedding: Vec<f32>, top_k: usize) -> VectorSearchQuery {
        VectorSearchQuery {
            scope: kind,
            scope_id: scope_id.to_string(),
            query_embedding: embedding,
            top_k,
            filters: None,
        }
    }

    #[tokio::test]
    async fn test_search_ranks_by_cosine_similarity() {
        let repo = InMemoryVectorMemoryRepository::new();
        repo.set_vector(record(ScopeKind::Session, "s1", "far", vec![0.0, 1.0]))
            .await
            .unwrap();
        repo.set_vector(record(ScopeKind::Session, "s1", "near", vec![1.0, 0.1]))
            .await
            .unwrap();
        repo.set_vector(record(ScopeKind::Session, "s1", "exact", vec![2.0, 0.0]))
            .await
            .unwrap();

        let results = repo
            .similarity_search(query(ScopeKind::Session, "s1", vec![1.0, 0.0], 10))
            .await
            .unwrap();

        let keys: Vec<&str> = results.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["exact", "near", "far"]);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_search_honors_top_k() {
        let repo = InMemoryVectorMemoryRepository::new();
        for i in 0..5 {
            repo.set_vector(record(ScopeKind::Actor, "a1", &format!("k{i}"), vec![1.0, i as f32]))
                .await
                .unwrap();
        }

        let results = repo
            .similarity_search(query(ScopeKind::Actor, "a1", vec![1.0, 0.0], 2))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].key, "k0");
    }

    #[tokio::test]
    async fn test_scopes_are_isolated() {
        let repo = InMemoryVectorMemoryRepository::new();
        repo.set_vector(record(ScopeKind::Session, "s1", "k", vec![1.0]))
            .await
            .unwrap();
        repo.set_vector(record(ScopeKind::Actor, "s1", "k", vec![1.0]))
            .await
            .unwrap();
        repo.set_vector(record(ScopeKind::Session, "s2", "k", vec![1.0]))
            .await
            .unwrap();
        assert_eq!(repo.len().await, 3);

        let results = repo
            .similarity_search(query(ScopeKind::Session, "s1", vec![1.0], 10))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].scope, ScopeKind::Session);
        assert_eq!(results[0].scope_id, "s1");
    }

    #[tokio::test]
    async fn test_set_replaces_existing_key() {
        let repo = InMemoryVectorMemoryRepository::new();
        repo.set_vector(record(ScopeKind::Workflow, "w", "k", vec![1.0, 0.0]))
            .await
            .unwrap();
        repo.set_vector(record(ScopeKind::Workflow, "w", "k", vec![0.0, 1.0]))
            .await
            .unwrap();
        assert_eq!(repo.len().await, 1);

        let results = repo
            .similarity_search(query(ScopeKind::Workflow, "w", vec![0.0, 1.0], 10))
            .await
            .unwrap();
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_filters_match_metadata_values() {
        let repo = InMemoryVectorMemoryRepository::new();
        let mut doc = record(ScopeKind::Session, "s", "doc", vec![1.0]);
        doc.metadata = Some(json!({"source": "doc", "page": 2}).as_object().unwrap().clone());
        let mut web = record(ScopeKind::Session, "s", "web", vec![1.0]);
        web.metadata = Some(json!({"source": "web"}).as_object().unwrap().clone());
        let bare = record(ScopeKind::Session, "s", "bare", vec![1.0]);
        for r in [doc, web, bare] {
            repo.set_vector(r).await.unwrap();
        }

        let mut q = query(ScopeKind::Session, "s", vec![1.0], 10);
        q.filters = Some(json!({"source": "doc"}).as_object().unwrap().clone());
        let results = repo.similarity_search(q).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "doc");

        let mut q = query(ScopeKind::Session, "s", vec![1.0], 10);
        q.filters = Some(Metadata::new());
        assert_eq!(repo.similarity_search(q).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_mismatched_dimensions_are_skipped() {
        let repo = InMemoryVectorMemoryRepository::new();
        repo.set_vector(record(ScopeKind::Session, "s", "3d", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();
        repo.set_vector(record(ScopeKind::Session, "s", "2d", vec![1.0, 0.0]))
            .await
            .unwrap();

        let results = repo
            .similarity_search(query(ScopeKind::Session, "s", vec![1.0, 0.0], 10))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "2d");
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let repo = InMemoryVectorMemoryRepository::new();
        repo.set_vector(record(ScopeKind::Actor, "a", "k", vec![1.0]))
            .await
            .unwrap();

        let scope = Scope::new(ScopeKind::Actor, "a");
        assert!(repo.delete_vector(&scope, "k").await.unwrap());
        assert!(!repo.delete_vector(&scope, "k").await.unwrap());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_non_finite_records_never_outrank_real_matches() {
        let repo = InMemoryVectorMemoryRepository::new();
        for i in 0..12 {
            let embedding = if i % 3 == 0 {
                vec![f32::INFINITY, 1.0]
            } else {
                vec![1.0, i as f32]
            };
            repo.set_vector(record(ScopeKind::Session, "s", &format!("k{i:02}"), embedding))
                .await
                .unwrap();
        }

        let results = repo
            .similarity_search(query(ScopeKind::Session, "s", vec![1.0, 1.0], 50))
            .await
            .unwrap();

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.score.is_finite()));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(results[0].key, "k01");
    }

    #[tokio::test]
    async fn test_delete_by_prefix_stays_in_scope() {
        let repo = InMemoryVectorMemoryRepository::new();
        for key in ["doc:1", "doc:2", "note:1"] {
            repo.set_vector(record(ScopeKind::Workflow, "w1", key, vec![1.0]))
                .await
                .unwrap();
        }
        repo.set_vector(record(ScopeKind::Workflow, "w2", "doc:1", vec![1.0]))
            .await
            .unwrap();

        let scope = Scope::new(ScopeKind::Workflow, "w1");
        assert_eq!(repo.delete_vectors_by_prefix(&scope, "doc:").await.unwrap(), 2);
        assert_eq!(repo.delete_vectors_by_prefix(&scope, "doc:").await.unwrap(), 0);
        assert_eq!(repo.len().await, 2);

        let other = repo
            .similarity_search(query(ScopeKind::Workflow, "w2", vec![1.0], 10))
            .await
            .unwrap();
        assert_eq!(other[0].key, "doc:1");
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
    }
}
