use axum::http::{HeaderName, HeaderValue, Method};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Scope headers a browser client must be allowed to send.
const SCOPE_HEADERS: [&str; 3] = ["x-session-id", "x-actor-id", "x-workflow-id"];

/// Creates a CORS layer for the given origins.
///
/// Returns `Ok(None)` when `origins` is empty so callers can skip the layer.
///
/// The layer allows:
/// - GET, POST, OPTIONS
/// - Content-Type, Accept and the memory scope headers
/// - 1 hour max age
pub fn create_cors_layer(origins: &[String]) -> io::Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }

    let allowed_origins = origins
        .iter()
        .map(|s| s.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    let mut headers = vec![
        axum::http::header::CONTENT_TYPE,
        axum::http::header::ACCEPT,
    ];
    headers.extend(SCOPE_HEADERS.iter().map(|h| HeaderName::from_static(h)));

    let layer = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(headers)
        .max_age(Duration::from_secs(3600));

    Ok(Some(layer))
}
