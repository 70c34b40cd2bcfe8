//! Database connection descriptor resolved from environment variables.

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::ConnectOptions;

use super::Environment;

/// TLS policy for the database connection. `RequireRelaxed` encrypts but
/// skips certificate verification (managed-database setups with provider
/// certs); used only in production.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TlsMode {
    Disabled,
    RequireRelaxed,
}

/// Immutable connection descriptor. Resolved once at startup and consumed by
/// the pool during application construction. Re-resolving with the same
/// environment yields an equal value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseOptions {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    /// Create entity tables at startup. On unless the environment is
    /// exactly "production".
    pub synchronize: bool,
    /// Statement logging. On only when the environment is exactly
    /// "development".
    pub logging: bool,
    pub tls: TlsMode,
}

const DEFAULT_PORT: u16 = 5432;

impl DatabaseOptions {
    pub fn from_env(environment: &Environment) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), environment)
    }

    /// Pure resolution from a key lookup. A malformed `DATABASE_PORT` falls
    /// back to the default rather than failing resolution.
    pub fn from_lookup<F>(lookup: F, environment: &Environment) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("DATABASE_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        Self {
            host: lookup("DATABASE_HOST").unwrap_or_else(|| "localhost".into()),
            port,
            username: lookup("DATABASE_USERNAME").unwrap_or_else(|| "student_api".into()),
            password: lookup("DATABASE_PASSWORD").unwrap_or_else(|| "password".into()),
            database: lookup("DATABASE_NAME").unwrap_or_else(|| "student_db".into()),
            synchronize: !environment.is_production(),
            logging: environment.is_development(),
            tls: if environment.is_production() {
                TlsMode::RequireRelaxed
            } else {
                TlsMode::Disabled
            },
        }
    }

    /// Driver-level options for pool construction. No migrations are wired
    /// in here; schema sync is the only DDL path.
    pub fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = match self.tls {
            TlsMode::RequireRelaxed => PgSslMode::Require,
            TlsMode::Disabled => PgSslMode::Disable,
        };
        let opts = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(ssl_mode);
        if self.logging {
            opts
        } else {
            opts.disable_statement_logging()
        }
    }
}
