// src/logging_middleware.rs
//! Per-request logging: one summary line per request, bodies at debug level

use axum::body::to_bytes;
use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Largest body that is buffered for logging
const MAX_LOGGED_BODY: usize = 64 * 1024;

pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let started = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    let bytes = to_bytes(body, MAX_LOGGED_BODY)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;
    log_body("request", &bytes);

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    log_body("response", &bytes);

    let elapsed_ms = started.elapsed().as_millis() as u64;
    if parts.status.is_server_error() {
        warn!(%method, %path, status = %parts.status, elapsed_ms, "Request failed");
    } else {
        info!(%method, %path, status = %parts.status, elapsed_ms, "Request handled");
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn log_body(direction: &str, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }

    if let Ok(body_str) = std::str::from_utf8(bytes) {
        debug!(direction, body = %body_str, "HTTP body");
    }
}
