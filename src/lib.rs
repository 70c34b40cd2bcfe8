//! Student API: serverless bootstrap for the student management backend.
//!
//! The interesting part of this crate is the cold-start / warm-start
//! lifecycle: [`Lifecycle`] owns the single process-wide application
//! instance and builds it exactly once, [`entry::handle`] delegates raw
//! requests to it over an abstract [`Transport`], and [`config`] resolves
//! every recognized environment variable into plain value objects up front.

pub mod config;
pub mod docs;
pub mod entry;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod routes;
pub mod schema;
pub mod state;
pub mod validation;

pub use config::{AppConfig, CorsConfig, DatabaseOptions, Environment, SwaggerConfig, TlsMode};
pub use entry::{handle, Transport};
pub use error::{AppError, EntryError, ErrorBody, InitError};
pub use lifecycle::{AppHandle, Lifecycle};
pub use state::AppState;
pub use validation::ValidationPolicy;
