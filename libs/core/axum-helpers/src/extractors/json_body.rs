//! JSON body extractor that reports rejections as `invalid_request` errors.

use crate::errors::AppError;
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

/// JSON extractor with standardized rejections.
///
/// Axum's `Json` rejects undecodable bodies with 415/422 and a plain-text
/// body. `JsonBody` maps every rejection (missing content type, syntax
/// error, missing field, wrong type) to a 400 [`AppError`] so clients always
/// receive the standard error envelope.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::JsonBody;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct SetRequest {
///     key: String,
/// }
///
/// async fn set(JsonBody(payload): JsonBody<SetRequest>) -> String {
///     payload.key
/// }
///
/// let app = Router::new().route("/set", post(set));
/// ```
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::JsonExtractorRejection(e).into_response())?;

        Ok(JsonBody(data))
    }
}
