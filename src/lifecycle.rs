//! Cold-start / warm-start application lifecycle.
//!
//! [`Lifecycle`] owns the single process-wide application instance. The
//! first call runs a fixed initialization sequence and caches the handle;
//! every later call returns the cached handle with no side effects. A
//! failed build caches nothing, so the next invocation retries from
//! scratch. Concurrent first calls collapse into one build through the
//! once-cell.

use crate::config::AppConfig;
use crate::docs::build_openapi;
use crate::error::InitError;
use crate::middleware::{log_requests, shape_response};
use crate::routes::api_routes;
use crate::schema::ensure_entity_tables;
use crate::state::AppState;
use crate::validation::ValidationPolicy;
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn,
    response::Response,
    routing::get,
    Json, Router,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

/// Documentation endpoint path, fixed regardless of the route prefix.
const DOCS_PATH: &str = "/api/docs";

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Fully initialized, request-ready server handle. Lives for the rest of
/// the process; never torn down explicitly.
#[derive(Clone)]
pub struct AppHandle {
    router: Router,
    pool: PgPool,
}

impl AppHandle {
    /// Assemble the instance: base router over the module graph, security
    /// and compression layers, CORS, route prefix, validation policy,
    /// interceptors, and the conditional documentation mount. Performs no
    /// I/O; the pool connects on first use.
    pub fn build(config: &AppConfig) -> Result<Self, InitError> {
        init_tracing();
        tracing::info!("initializing application");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(config.database.connect_options());
        let state = AppState {
            pool: pool.clone(),
            policy: ValidationPolicy::default(),
        };

        // Interceptors: logging observes the raw dispatch path, shaping is
        // the last transform on the way out, so shaping wraps logging.
        let mut api = api_routes(state)
            .layer(from_fn(log_requests))
            .layer(from_fn(shape_response));

        let prefix = prefix_path(&config.api_prefix);
        let docs_route = if config.swagger.enabled {
            let doc = build_openapi(&config.swagger, prefix.as_deref().unwrap_or(""));
            Some(get(move || {
                let doc = doc.clone();
                async move { Json(doc) }
            }))
        } else {
            None
        };

        // The docs mount sits outside the interceptor chain. When the
        // prefix is the default "api" it has to live inside the nested
        // router to keep the fixed /api/docs path.
        let prefix_is_api = prefix.as_deref() == Some("/api");
        if prefix_is_api {
            if let Some(route) = docs_route.clone() {
                api = api.route("/docs", route);
            }
        }
        let mut app = match &prefix {
            Some(p) => Router::new().nest(p, api),
            None => api,
        };
        if !prefix_is_api {
            if let Some(route) = docs_route {
                app = app.route(DOCS_PATH, route);
            }
        }

        let router = app
            .layer(cors_layer(config)?)
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("SAMEORIGIN"),
            ))
            .layer(CompressionLayer::new());

        Ok(Self { router, pool })
    }

    /// Final readiness step: schema sync when enabled. Only after this
    /// returns is the handle allowed into the cache.
    pub async fn finalize(&self, config: &AppConfig) -> Result<(), InitError> {
        if config.database.synchronize {
            ensure_entity_tables(&self.pool).await?;
        }
        tracing::info!("application ready");
        Ok(())
    }

    /// Dispatch capability: route one raw request through the full chain.
    pub async fn dispatch(&self, req: Request<Body>) -> Response {
        match self.router.clone().oneshot(req).await {
            Ok(res) => res,
            Err(never) => match never {},
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Owner of the process-wide instance cache.
pub struct Lifecycle {
    cell: OnceCell<AppHandle>,
}

impl Lifecycle {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Return the cached instance, or run the full build-and-finalize
    /// sequence and cache the result. The cache is only populated after
    /// every step has succeeded.
    pub async fn get_or_init(&self, config: &AppConfig) -> Result<&AppHandle, InitError> {
        self.cell
            .get_or_try_init(|| async {
                let handle = AppHandle::build(config)?;
                handle.finalize(config).await?;
                Ok(handle)
            })
            .await
    }

    /// Current cache state; `None` until a build has fully succeeded.
    pub fn cached(&self) -> Option<&AppHandle> {
        self.cell.get()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Restricted directive set for constrained execution environments; the
/// host can widen it through `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("student_api=info,tower_http=warn,sqlx=warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn prefix_path(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}

fn cors_layer(config: &AppConfig) -> Result<CorsLayer, InitError> {
    let cors = &config.cors;
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    if cors.origin == "*" {
        // tower-http panics on wildcard-with-credentials; surface it as an
        // init failure instead.
        if cors.credentials {
            return Err(InitError::CorsCredentialsWithWildcard);
        }
        Ok(layer.allow_origin(Any))
    } else {
        let origin = cors
            .origin
            .parse::<HeaderValue>()
            .map_err(|_| InitError::InvalidCorsOrigin(cors.origin.clone()))?;
        Ok(layer
            .allow_origin(AllowOrigin::exact(origin))
            .allow_credentials(cors.credentials))
    }
}
