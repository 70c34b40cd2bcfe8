//! Shared application state for all routes.

use crate::validation::ValidationPolicy;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Global validation policy applied to every JSON body.
    pub policy: ValidationPolicy,
}
