//! Fixed entity set and idempotent DDL for schema synchronization.

use crate::error::InitError;
use sqlx::PgPool;

/// API entities backed by tables. Order matters: students references users.
pub const ENTITIES: &[&str] = &["users", "students"];

const USERS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const STUDENTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    age INTEGER,
    user_id UUID REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Create the entity tables when schema sync is on. No migration framework
/// is registered; this is the only DDL the service runs.
pub async fn ensure_entity_tables(pool: &PgPool) -> Result<(), InitError> {
    for ddl in [USERS_DDL, STUDENTS_DDL] {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}
