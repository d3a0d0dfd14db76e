//! Scope resolution from request headers and body fields.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

use crate::error::{VectorMemoryError, VectorMemoryResult};
use crate::models::{Scope, ScopeKind};

pub const SESSION_ID_HEADER: &str = "x-session-id";
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const WORKFLOW_ID_HEADER: &str = "x-workflow-id";

/// Resolves the scope carried by transport headers.
///
/// Precedence: session, then actor, then workflow. Blank values count as
/// absent. Returns `None` when no scope header is set.
pub fn from_headers(headers: &HeaderMap) -> Option<Scope> {
    if let Some(id) = header_value(headers, SESSION_ID_HEADER) {
        return Some(Scope::new(ScopeKind::Session, id));
    }
    if let Some(id) = header_value(headers, ACTOR_ID_HEADER) {
        return Some(Scope::new(ScopeKind::Actor, id));
    }
    if let Some(id) = header_value(headers, WORKFLOW_ID_HEADER) {
        return Some(Scope::new(ScopeKind::Workflow, id));
    }
    None
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Picks the scope for a write or delete.
///
/// A header scope always wins. Otherwise the body's `scope`/`scope_id` pair
/// is used, and with neither the request lands in the global scope.
pub fn resolve(
    header_scope: Option<Scope>,
    body_scope: Option<&str>,
    body_scope_id: Option<&str>,
) -> VectorMemoryResult<Scope> {
    if let Some(scope) = header_scope {
        return Ok(scope);
    }

    let Some(raw_kind) = non_blank(body_scope) else {
        return Ok(Scope::global());
    };

    let kind: ScopeKind = raw_kind
        .trim()
        .parse()
        .map_err(|_| VectorMemoryError::InvalidRequest(format!("unknown scope '{}'", raw_kind)))?;

    if kind == ScopeKind::Global {
        return Ok(Scope::global());
    }

    match non_blank(body_scope_id) {
        Some(id) => Ok(Scope::new(kind, id)),
        None => Err(VectorMemoryError::InvalidRequest(format!(
            "scope_id is required for {} scope",
            kind
        ))),
    }
}

/// Scope ids are opaque: blank values count as absent, anything else is kept verbatim.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Extractor exposing the header-derived scope, if any.
///
/// Never rejects: a request without scope headers yields `HeaderScope(None)`.
pub struct HeaderScope(pub Option<Scope>);

impl<S> FromRequestParts<S> for HeaderScope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(HeaderScope(from_headers(&parts.headers)))
    }
}
