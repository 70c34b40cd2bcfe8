//! Router-level tests over the built application and the entry boundary.
//! Lifecycle tests use a production-environment config: schema sync derives
//! to false there, so the full init sequence completes without a database.

use axum::body::{to_bytes, Body};
use axum::extract::{Path, State};
use axum::http::{header, Method, Request, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use student_api::handlers::students::{create_student, update_student};
use student_api::{
    handle, AppConfig, AppHandle, AppState, Lifecycle, Transport, ValidationPolicy,
};
use uuid::Uuid;

fn config_from(vars: &[(&str, &str)]) -> AppConfig {
    AppConfig::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
}

fn production_config() -> AppConfig {
    config_from(&[("NODE_ENV", "production")])
}

/// State over a lazy pool: handler paths that fail before their first query
/// never touch a database.
fn lazy_state(config: &AppConfig) -> AppState {
    AppState {
        pool: PgPoolOptions::new().connect_lazy_with(config.database.connect_options()),
        policy: ValidationPolicy::default(),
    }
}

async fn body_json(res: axum::response::Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[derive(Default)]
struct MockTransport {
    method: String,
    uri: String,
    request_body: Vec<u8>,
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl MockTransport {
    fn get(uri: &str) -> Self {
        Self {
            method: "GET".into(),
            uri: uri.into(),
            ..Default::default()
        }
    }

    fn body_json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

impl Transport for MockTransport {
    fn method(&self) -> &str {
        &self.method
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.request_body)
    }

    fn write_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn write_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.into(), value.into()));
    }

    fn write_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }
}

#[tokio::test]
async fn repeated_calls_return_the_same_instance() {
    let config = production_config();
    let lifecycle = Lifecycle::new();
    assert!(lifecycle.cached().is_none());

    let first = lifecycle.get_or_init(&config).await.unwrap() as *const AppHandle;
    let second = lifecycle.get_or_init(&config).await.unwrap() as *const AppHandle;
    assert_eq!(first, second);
    assert!(lifecycle.cached().is_some());
}

#[tokio::test]
async fn concurrent_first_calls_share_one_instance() {
    let config = production_config();
    let lifecycle = Lifecycle::new();

    let (a, b) = tokio::join!(
        lifecycle.get_or_init(&config),
        lifecycle.get_or_init(&config)
    );
    let a = a.unwrap() as *const AppHandle;
    let b = b.unwrap() as *const AppHandle;
    assert_eq!(a, b);
}

#[tokio::test]
async fn failed_init_caches_nothing_and_is_retryable() {
    let bad = config_from(&[("NODE_ENV", "production"), ("CORS_CREDENTIALS", "true")]);
    let lifecycle = Lifecycle::new();

    assert!(lifecycle.get_or_init(&bad).await.is_err());
    assert!(lifecycle.cached().is_none());

    // Environment fixed before the next invocation: the retry succeeds.
    let good = production_config();
    assert!(lifecycle.get_or_init(&good).await.is_ok());
    assert!(lifecycle.cached().is_some());
}

#[tokio::test]
async fn entry_converts_init_failure_into_uniform_500() {
    let bad = config_from(&[("NODE_ENV", "production"), ("CORS_CREDENTIALS", "true")]);
    let lifecycle = Lifecycle::new();
    let mut transport = MockTransport::get("/api/health");

    handle(&lifecycle, &bad, &mut transport).await;

    assert!(lifecycle.cached().is_none());
    assert_eq!(transport.status, Some(500));
    let body = transport.body_json();
    assert_eq!(body["statusCode"], json!(500));
    assert_eq!(body["message"], json!("Internal Server Error"));
    assert!(body["error"].as_str().unwrap().contains("wildcard origin"));
}

#[tokio::test]
async fn health_response_is_shaped_by_the_outermost_interceptor() {
    let config = production_config();
    let lifecycle = Lifecycle::new();
    let mut transport = MockTransport::get("/api/health");

    handle(&lifecycle, &config, &mut transport).await;

    assert_eq!(transport.status, Some(200));
    assert_eq!(transport.body_json(), json!({"data": {"status": "ok"}}));
    assert!(transport
        .headers
        .iter()
        .any(|(name, value)| name == "x-content-type-options" && value == "nosniff"));
}

#[tokio::test]
async fn unknown_routes_are_the_routers_decision_not_a_500() {
    let config = production_config();
    let lifecycle = Lifecycle::new();
    let mut transport = MockTransport::get("/api/nope");

    handle(&lifecycle, &config, &mut transport).await;

    assert_eq!(transport.status, Some(404));
}

#[tokio::test]
async fn docs_are_mounted_outside_production() {
    let config = config_from(&[("NODE_ENV", "staging")]);
    let app = AppHandle::build(&config).unwrap();

    let res = app
        .dispatch(Request::get("/api/docs").body(Body::empty()).unwrap())
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let doc = body_json(res).await;
    assert_eq!(doc["info"]["title"], json!("Student Management API"));
    assert_eq!(doc["info"]["version"], json!("1.0"));
    assert!(doc["paths"]["/api/students"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
}

#[tokio::test]
async fn docs_are_skipped_in_production_without_the_flag() {
    let app = AppHandle::build(&production_config()).unwrap();
    let res = app
        .dispatch(Request::get("/api/docs").body(Body::empty()).unwrap())
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn docs_flag_overrides_production() {
    let config = config_from(&[("NODE_ENV", "production"), ("SWAGGER_ENABLED", "true")]);
    let app = AppHandle::build(&config).unwrap();
    let res = app
        .dispatch(Request::get("/api/docs").body(Body::empty()).unwrap())
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn docs_path_is_fixed_under_a_custom_prefix() {
    let config = config_from(&[("NODE_ENV", "staging"), ("API_PREFIX", "v1")]);
    let app = AppHandle::build(&config).unwrap();

    let health = app
        .dispatch(Request::get("/v1/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_json(health).await, json!({"data": {"status": "ok"}}));

    let docs = app
        .dispatch(Request::get("/api/docs").body(Body::empty()).unwrap())
        .await;
    assert_eq!(docs.status(), StatusCode::OK);

    // Documented paths follow the mounted prefix.
    let doc = body_json(docs).await;
    assert!(doc["paths"]["/v1/students"].is_object());
    assert!(doc["paths"]["/api/students"].is_null());
}

#[tokio::test]
async fn docs_metadata_comes_from_the_environment() {
    let config = config_from(&[
        ("NODE_ENV", "staging"),
        ("SWAGGER_TITLE", "Custom Title"),
        ("SWAGGER_VERSION", "2.3"),
        ("SWAGGER_TAG", "records"),
    ]);
    let app = AppHandle::build(&config).unwrap();
    let res = app
        .dispatch(Request::get("/api/docs").body(Body::empty()).unwrap())
        .await;
    let doc = body_json(res).await;
    assert_eq!(doc["info"]["title"], json!("Custom Title"));
    assert_eq!(doc["info"]["version"], json!("2.3"));
    assert_eq!(doc["tags"][0]["name"], json!("records"));
}

#[tokio::test]
async fn create_rejects_integers_that_overflow_the_age_column() {
    let config = production_config();
    let body = json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "age": 2_147_483_648_i64
    });
    let err = create_student(State(lazy_state(&config)), Json(body))
        .await
        .err()
        .expect("out-of-range age must fail validation");
    assert!(err.to_string().contains("32-bit"));
}

#[tokio::test]
async fn update_rejects_explicit_null_for_required_fields() {
    let config = production_config();
    let err = update_student(
        State(lazy_state(&config)),
        Path(Uuid::nil()),
        Json(json!({"firstName": null})),
    )
    .await
    .err()
    .expect("null for a required field must fail");
    assert!(err.to_string().contains("firstName cannot be null"));
}

#[tokio::test]
async fn preflight_reflects_the_permissive_default_origin() {
    let app = AppHandle::build(&production_config()).unwrap();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/students")
        .header(header::ORIGIN, "https://anywhere.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let res = app.dispatch(req).await;
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let allowed = res
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    for method in ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"] {
        assert!(allowed.contains(method), "missing {} in {}", method, allowed);
    }
}

#[tokio::test]
async fn configured_origin_is_echoed_with_credentials() {
    let config = config_from(&[
        ("NODE_ENV", "production"),
        ("CORS_ORIGIN", "https://app.example.com"),
        ("CORS_CREDENTIALS", "true"),
    ]);
    let app = AppHandle::build(&config).unwrap();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/students")
        .header(header::ORIGIN, "https://app.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let res = app.dispatch(req).await;
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://app.example.com")
    );
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}
