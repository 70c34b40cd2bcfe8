//! Request entry point over an abstract transport.

use crate::config::AppConfig;
use crate::error::{EntryError, ErrorBody};
use crate::lifecycle::Lifecycle;
use axum::body::{to_bytes, Body};
use axum::http::Request;

/// Capability view of the host's raw request/response pair. Keeps the entry
/// point independent of the concrete HTTP host library.
pub trait Transport {
    fn method(&self) -> &str;
    fn uri(&self) -> &str;
    fn headers(&self) -> Vec<(String, String)>;
    fn take_body(&mut self) -> Vec<u8>;
    fn write_status(&mut self, status: u16);
    fn write_header(&mut self, name: &str, value: &str);
    fn write_body(&mut self, body: Vec<u8>);
}

/// Handle one invocation: obtain the (possibly cached) application
/// instance, delegate the raw pair to its dispatch capability, and convert
/// any failure into the fixed 500 body. Never propagates; every other
/// status decision belongs to the router.
pub async fn handle<T: Transport>(lifecycle: &Lifecycle, config: &AppConfig, transport: &mut T) {
    if let Err(err) = dispatch_raw(lifecycle, config, transport).await {
        tracing::error!(error = %err, "request failed at entry boundary");
        let body = ErrorBody::internal(err.to_string());
        transport.write_status(500);
        transport.write_header("content-type", "application/json");
        transport.write_body(serde_json::to_vec(&body).unwrap_or_default());
    }
}

async fn dispatch_raw<T: Transport>(
    lifecycle: &Lifecycle,
    config: &AppConfig,
    transport: &mut T,
) -> Result<(), EntryError> {
    let app = lifecycle.get_or_init(config).await?;

    let mut builder = Request::builder()
        .method(transport.method())
        .uri(transport.uri());
    for (name, value) in transport.headers() {
        builder = builder.header(name, value);
    }
    let req = builder
        .body(Body::from(transport.take_body()))
        .map_err(|e| EntryError::Dispatch(e.to_string()))?;

    let res = app.dispatch(req).await;
    let (parts, body) = res.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| EntryError::Dispatch(e.to_string()))?;

    transport.write_status(parts.status.as_u16());
    for (name, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            transport.write_header(name.as_str(), value);
        }
    }
    transport.write_body(bytes.to_vec());
    Ok(())
}
