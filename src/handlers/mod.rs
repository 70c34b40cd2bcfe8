//! Request handlers grouped by entity.

pub mod health;
pub mod students;
pub mod users;

use crate::error::AppError;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Page window for list endpoints.
#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    pub fn window(&self) -> (i64, i64) {
        (self.limit.unwrap_or(50).clamp(1, 200), self.offset.unwrap_or(0).max(0))
    }
}

pub(crate) fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Field already validated as a 32-bit integer; out-of-range values never
/// reach this point.
pub(crate) fn int_field(map: &Map<String, Value>, key: &str) -> Option<i32> {
    map.get(key)
        .and_then(Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
}

/// Field already validated as a uuid string; a parse failure here means the
/// value was absent or null.
pub(crate) fn uuid_field(map: &Map<String, Value>, key: &str) -> Option<Uuid> {
    map.get(key)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// Map a unique-constraint violation to a conflict error.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return AppError::Conflict(format!("{} already exists", what));
        }
    }
    AppError::Db(e)
}
