//! HTTP middleware module.
//!
//! This module provides HTTP-level middleware for:
//! - CORS configuration
//! - Security headers

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::security_headers;
