//! Visitor credentials carried in headers, for GET endpoints without a body.

use axum::http::HeaderMap;

use spaceshare_service::VisitorContext;

use super::client::client_ip;

/// Header carrying the link password.
pub const PASSWORD_HEADER: &str = "x-share-password";
/// Header carrying the visitor email.
pub const EMAIL_HEADER: &str = "x-visitor-email";
/// Header carrying the visitor session ID.
pub const SESSION_HEADER: &str = "x-session-id";

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Build a visitor context from request headers.
pub fn visitor_from_headers(headers: &HeaderMap) -> VisitorContext {
    VisitorContext {
        password: header(headers, PASSWORD_HEADER),
        email: header(headers, EMAIL_HEADER),
        session_id: header(headers, SESSION_HEADER),
        ip_address: client_ip(headers),
    }
}
