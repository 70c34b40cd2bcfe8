//! Global interceptors: request logging and response shaping.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Innermost interceptor: observes the raw dispatch path and logs method,
/// path, status and latency.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let res = next.run(req).await;
    tracing::info!(
        %method,
        path,
        status = res.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request handled"
    );
    res
}

/// Outermost interceptor: wraps successful JSON bodies in a `data` envelope.
/// The last transform applied before the response leaves the instance;
/// errors and non-JSON responses pass through untouched.
pub async fn shape_response(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    if !res.status().is_success() {
        return res;
    }
    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return res;
    }

    let (mut parts, body) = res.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };
    if bytes.is_empty() {
        return Response::from_parts(parts, Body::empty());
    }
    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(value) => {
            let shaped = serde_json::json!({ "data": value }).to_string();
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(shaped))
        }
        Err(_) => Response::from_parts(parts, Body::from(bytes)),
    }
}
