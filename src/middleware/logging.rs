//! Logging middleware

use axum::{
    body::Body,
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

use crate::constants::CALLBACK_PATH;

/// Request path with the callback secret masked
pub fn redacted_path(path: &str) -> String {
    match path
        .strip_prefix(CALLBACK_PATH)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        Some(rest) => match rest.split_once('/') {
            Some((_secret, tail)) => format!("{}/***/{}", CALLBACK_PATH, tail),
            None => format!("{}/***", CALLBACK_PATH),
        },
        None => path.to_string(),
    }
}

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method: Method = request.method().clone();
    let path = redacted_path(request.uri().path());

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    if status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %format!("{:.2}", duration_ms),
            "Request completed with server error"
        );
    } else if status.is_client_error() && status != StatusCode::NOT_FOUND {
        warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %format!("{:.2}", duration_ms),
            "Request completed with client error"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %format!("{:.2}", duration_ms),
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_path_masks_callback_secret() {
        assert_eq!(
            redacted_path("/api/v1/judge/callback/s3cret/12/0/1700000000000"),
            "/api/v1/judge/callback/***/12/0/1700000000000"
        );
        assert_eq!(
            redacted_path("/api/v1/submissions/abc/score"),
            "/api/v1/submissions/abc/score"
        );
    }
}
