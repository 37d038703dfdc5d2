//! Caller identity middleware
//!
//! The tracker has no authentication layer: any caller may perform any
//! operation. The `x-user` header names the caller for the audit trail
//! only and carries no authorization effect.

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Header carrying the caller's display name
pub const USER_HEADER: &str = "x-user";

/// Fallback identity when the header is absent or blank
pub const ANONYMOUS: &str = "anonymous";

/// Caller name attached to every request
#[derive(Clone, Debug)]
pub struct CallerIdentity(pub String);

/// Resolve the caller name from request headers
pub fn caller_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string()
}

/// Middleware that attaches a [`CallerIdentity`] extension to the request
pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let name = caller_from_headers(request.headers());
    request.extensions_mut().insert(CallerIdentity(name));
    next.run(request).await
}
