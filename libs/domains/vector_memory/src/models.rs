use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{VectorMemoryError, VectorMemoryResult};

/// Schema-less JSON object carried through untouched (metadata and filters).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Number of results returned when the caller asks for zero or fewer.
pub const DEFAULT_TOP_K: usize = 10;

/// Identifier of the global scope.
pub const GLOBAL_SCOPE_ID: &str = "global";

const NON_FINITE: &str = "non_finite";

/// Rejects infinities and NaN, including out-of-range JSON numbers decoded to `inf`.
fn validate_finite(values: &[f32]) -> Result<(), validator::ValidationError> {
    if !values.iter().all(|v| v.is_finite()) {
        return Err(validator::ValidationError::new(NON_FINITE));
    }
    Ok(())
}

/// True when any validation error on `field` came from the finiteness check.
fn has_non_finite(errors: &validator::ValidationErrors, field: &str) -> bool {
    errors
        .field_errors()
        .get(field)
        .is_some_and(|errs| errs.iter().any(|e| e.code == NON_FINITE))
}

/// Kind of memory namespace a vector belongs to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScopeKind {
    Session,
    Actor,
    Workflow,
    Global,
}

/// A resolved (kind, id) pair partitioning vector storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub kind: ScopeKind,
    pub id: String,
}

impl Scope {
    pub fn new(kind: ScopeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn global() -> Self {
        Self::new(ScopeKind::Global, GLOBAL_SCOPE_ID)
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A vector as handed to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VectorRecord {
    pub scope: ScopeKind,
    pub scope_id: String,
    pub key: String,
    pub embedding: Vec<f32>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

/// Similarity search parameters as handed to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VectorSearchQuery {
    pub scope: ScopeKind,
    pub scope_id: String,
    pub query_embedding: Vec<f32>,
    pub top_k: usize,
    /// `None` means no filtering; `Some(empty)` is passed through as-is.
    #[schema(value_type = Option<Object>)]
    pub filters: Option<Metadata>,
}

/// A ranked match returned by storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VectorSearchResult {
    pub scope: ScopeKind,
    pub scope_id: String,
    pub key: String,
    pub score: f32,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

// ===== Request/Response DTOs =====

/// Request to store a vector
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct SetVectorRequest {
    #[validate(length(min = 1, message = "key is required"))]
    pub key: String,
    #[validate(
        length(min = 1, message = "embedding cannot be empty"),
        custom(function = "validate_finite")
    )]
    pub embedding: Vec<f32>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
    /// Used only when no scope header is present
    #[serde(default)]
    pub scope: Option<String>,
    /// Used only when no scope header is present
    #[serde(default)]
    pub scope_id: Option<String>,
}

impl SetVectorRequest {
    /// Rejects a missing key before an empty embedding.
    pub fn check(&self) -> VectorMemoryResult<()> {
        self.validate().map_err(|errors| {
            let fields = errors.field_errors();
            if fields.contains_key("key") {
                VectorMemoryError::InvalidRequest("key is required".to_string())
            } else if has_non_finite(&errors, "embedding") {
                VectorMemoryError::InvalidRequest("embedding values must be finite".to_string())
            } else if fields.contains_key("embedding") {
                VectorMemoryError::EmptyEmbedding
            } else {
                VectorMemoryError::InvalidRequest(errors.to_string())
            }
        })
    }
}

/// Summary of a stored vector, echoing what was sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SetVectorResponse {
    pub key: String,
    pub scope: ScopeKind,
    pub scope_id: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

/// Request to search for similar vectors
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct SearchVectorsRequest {
    #[validate(
        length(min = 1, message = "query_embedding cannot be empty"),
        custom(function = "validate_finite")
    )]
    pub query_embedding: Vec<f32>,
    /// Values of zero or below fall back to the default of 10
    #[serde(default)]
    pub top_k: i64,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub filters: Option<Metadata>,
}

impl SearchVectorsRequest {
    pub fn check(&self) -> VectorMemoryResult<()> {
        self.validate().map_err(|errors| {
            if has_non_finite(&errors, "query_embedding") {
                VectorMemoryError::InvalidRequest(
                    "query_embedding values must be finite".to_string(),
                )
            } else {
                VectorMemoryError::EmptyQueryEmbedding
            }
        })
    }

    pub fn effective_top_k(&self) -> usize {
        normalize_top_k(self.top_k)
    }
}

/// Request to delete a vector
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct DeleteVectorRequest {
    #[validate(length(min = 1, message = "key is required"))]
    pub key: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub scope_id: Option<String>,
}

impl DeleteVectorRequest {
    pub fn check(&self) -> VectorMemoryResult<()> {
        self.validate()
            .map_err(|_| VectorMemoryError::InvalidRequest("key is required".to_string()))
    }
}

/// Outcome of a delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteVectorResponse {
    pub key: String,
    pub scope: ScopeKind,
    pub scope_id: String,
    pub deleted: bool,
}

/// Request to delete every vector whose key starts with `prefix`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct DeletePrefixRequest {
    /// Must be non-empty; an empty prefix would match the whole scope
    #[validate(length(min = 1, message = "prefix is required"))]
    pub prefix: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub scope_id: Option<String>,
}

impl DeletePrefixRequest {
    pub fn check(&self) -> VectorMemoryResult<()> {
        self.validate()
            .map_err(|_| VectorMemoryError::InvalidRequest("prefix is required".to_string()))
    }
}

/// Outcome of a prefix delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeletePrefixResponse {
    pub prefix: String,
    pub scope: ScopeKind,
    pub scope_id: String,
    pub deleted: usize,
}

/// Substitutes [`DEFAULT_TOP_K`] for non-positive values.
pub fn normalize_top_k(requested: i64) -> usize {
    if requested <= 0 {
        DEFAULT_TOP_K
    } else {
        usize::try_from(requested).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set_request(value: serde_json::Value) -> SetVectorRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_scope_kind_wire_format() {
        assert_eq!(serde_json::to_value(ScopeKind::Workflow).unwrap(), json!("workflow"));
        assert_eq!("actor".parse::<ScopeKind>().unwrap(), ScopeKind::Actor);
        assert_eq!(ScopeKind::Session.to_string(), "session");
        assert!("tenant".parse::<ScopeKind>().is_err());
    }

    #[test]
    fn test_set_request_missing_key_wins_over_empty_embedding() {
        let request = set_request(json!({"key": "", "embedding": []}));
        let err = request.check().unwrap_err();
        assert!(matches!(err, VectorMemoryError::InvalidRequest(msg) if msg == "key is required"));
    }

    #[test]
    fn test_set_request_empty_embedding() {
        let request = set_request(json!({"key": "vec-empty", "embedding": []}));
        assert!(matches!(request.check(), Err(VectorMemoryError::EmptyEmbedding)));
    }

    #[test]
    fn test_set_request_rejects_out_of_range_components() {
        let request: SetVectorRequest =
            serde_json::from_str(r#"{"key": "big", "embedding": [1e40, 1.0]}"#).unwrap();
        let err = request.check().unwrap_err();
        assert!(matches!(err, VectorMemoryError::InvalidRequest(msg) if msg.contains("finite")));
    }

    #[test]
    fn test_search_request_rejects_out_of_range_components() {
        let request: SearchVectorsRequest =
            serde_json::from_str(r#"{"query_embedding": [0.5, -1e40]}"#).unwrap();
        let err = request.check().unwrap_err();
        assert!(matches!(err, VectorMemoryError::InvalidRequest(msg) if msg.contains("finite")));
    }

    #[test]
    fn test_delete_prefix_request_requires_prefix() {
        let request: DeletePrefixRequest = serde_json::from_value(json!({"prefix": ""})).unwrap();
        assert!(matches!(request.check(), Err(VectorMemoryError::InvalidRequest(_))));
    }

    #[test]
    fn test_set_request_valid() {
        let request = set_request(json!({
            "key": "vec-1",
            "embedding": [0.1, 0.2],
            "metadata": {"source": "doc"}
        }));
        assert!(request.check().is_ok());
        assert_eq!(request.metadata.unwrap()["source"], json!("doc"));
    }

    #[test]
    fn test_search_request_empty_query_embedding() {
        let request: SearchVectorsRequest =
            serde_json::from_value(json!({"query_embedding": []})).unwrap();
        assert!(matches!(
            request.check(),
            Err(VectorMemoryError::EmptyQueryEmbedding)
        ));
    }

    #[test]
    fn test_search_request_defaults() {
        let request: SearchVectorsRequest =
            serde_json::from_value(json!({"query_embedding": [0.3]})).unwrap();
        assert_eq!(request.top_k, 0);
        assert_eq!(request.effective_top_k(), DEFAULT_TOP_K);
        assert!(request.filters.is_none());
    }

    #[test]
    fn test_search_request_distinguishes_empty_filters_from_absent() {
        let request: SearchVectorsRequest =
            serde_json::from_value(json!({"query_embedding": [0.3], "filters": {}})).unwrap();
        assert_eq!(request.filters, Some(Metadata::new()));
    }

    #[test]
    fn test_normalize_top_k() {
        assert_eq!(normalize_top_k(0), 10);
        assert_eq!(normalize_top_k(-5), 10);
        assert_eq!(normalize_top_k(1), 1);
        assert_eq!(normalize_top_k(3), 3);
        assert_eq!(normalize_top_k(250), 250);
    }
}
