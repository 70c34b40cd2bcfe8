//! Serverless entry point. The static lifecycle cache survives warm
//! invocations, so only the first request in a container pays the build.

use lambda_http::{service_fn, Body as LambdaBody, Error as LambdaError, Request, Response};
use student_api::{handle, AppConfig, Lifecycle, Transport};

static LIFECYCLE: Lifecycle = Lifecycle::new();

/// Adapter between lambda's request/response types and the entry point's
/// transport capabilities.
struct LambdaTransport {
    method: String,
    uri: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    status: u16,
    response_headers: Vec<(String, String)>,
    response_body: Vec<u8>,
}

impl LambdaTransport {
    fn from_request(req: Request) -> Self {
        let (parts, body) = req.into_parts();
        let headers = parts
            .headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = match body {
            LambdaBody::Empty => Vec::new(),
            LambdaBody::Text(s) => s.into_bytes(),
            LambdaBody::Binary(b) => b,
        };
        Self {
            method: parts.method.to_string(),
            uri: parts.uri.to_string(),
            headers,
            body,
            status: 200,
            response_headers: Vec::new(),
            response_body: Vec::new(),
        }
    }

    fn into_response(self) -> Result<Response<LambdaBody>, LambdaError> {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in &self.response_headers {
            builder = builder.header(name, value);
        }
        let body = match String::from_utf8(self.response_body) {
            Ok(text) => LambdaBody::Text(text),
            Err(raw) => LambdaBody::Binary(raw.into_bytes()),
        };
        Ok(builder.body(body)?)
    }
}

impl Transport for LambdaTransport {
    fn method(&self) -> &str {
        &self.method
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.body)
    }

    fn write_status(&mut self, status: u16) {
        self.status = status;
    }

    fn write_header(&mut self, name: &str, value: &str) {
        self.response_headers.push((name.into(), value.into()));
    }

    fn write_body(&mut self, body: Vec<u8>) {
        self.response_body = body;
    }
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();

    lambda_http::run(service_fn(move |req: Request| {
        let config = config.clone();
        async move {
            let mut transport = LambdaTransport::from_request(req);
            handle(&LIFECYCLE, &config, &mut transport).await;
            transport.into_response()
        }
    }))
    .await
}
