//! Request/response logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

/// Logs request method, path, status, and duration.
///
/// Visitor tokens are path segments, so only the route prefix is logged for
/// `/api/s/` requests.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = redact_token(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "HTTP request"
    );

    response
}

fn redact_token(path: &str) -> String {
    match path.strip_prefix("/api/s/") {
        Some(rest) => match rest.split_once('/') {
            Some((_, tail)) => format!("/api/s/:token/{tail}"),
            None => "/api/s/:token".to_string(),
        },
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visitor_tokens_are_redacted() {
        assert_eq!(redact_token("/api/s/abc123/access"), "/api/s/:token/access");
        assert_eq!(redact_token("/api/s/abc123"), "/api/s/:token");
        assert_eq!(redact_token("/api/links/42"), "/api/links/42");
    }
}
