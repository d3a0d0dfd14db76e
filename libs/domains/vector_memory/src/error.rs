use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Failure reported by a [`VectorMemoryRepository`](crate::repository::VectorMemoryRepository)
/// implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum VectorMemoryError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("embedding cannot be empty")]
    EmptyEmbedding,

    #[error("query_embedding cannot be empty")]
    EmptyQueryEmbedding,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type VectorMemoryResult<T> = Result<T, VectorMemoryError>;

/// Convert VectorMemoryError to AppError for standardized error responses
impl From<VectorMemoryError> for AppError {
    fn from(err: VectorMemoryError) -> Self {
        match err {
            VectorMemoryError::InvalidRequest(msg) => AppError::InvalidRequest(msg),
            VectorMemoryError::EmptyEmbedding | VectorMemoryError::EmptyQueryEmbedding => {
                AppError::InvalidRequest(err.to_string())
            }
            VectorMemoryError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}

impl IntoResponse for VectorMemoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_empty_embedding_is_client_error() {
        let response = VectorMemoryError::EmptyEmbedding.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_failure_is_server_error() {
        let err: VectorMemoryError = StoreError::Unavailable("timeout".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
