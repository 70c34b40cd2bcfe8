//! Application options resolved from environment variables.

use super::DatabaseOptions;

/// Deployment environment from `NODE_ENV`. Derivation rules compare for the
/// exact names "production" and "development"; anything else (including an
/// unset variable) is neither.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Named(String),
    Unspecified,
}

impl Environment {
    pub fn from_value(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("production") => Self::Production,
            Some("development") => Self::Development,
            Some(name) => Self::Named(name.to_string()),
            None => Self::Unspecified,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origin. "*" means any origin.
    pub origin: String,
    /// Only true when `CORS_CREDENTIALS` is exactly "true".
    pub credentials: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwaggerConfig {
    /// Derived: explicit `SWAGGER_ENABLED=true`, or any non-production
    /// environment.
    pub enabled: bool,
    pub title: String,
    pub description: String,
    pub version: String,
    pub tag: String,
}

/// Every recognized option, resolved once and passed by value into the
/// lifecycle. No component reads the environment after this point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub environment: Environment,
    pub cors: CorsConfig,
    /// Global route prefix, without slashes.
    pub api_prefix: String,
    pub swagger: SwaggerConfig,
    pub database: DatabaseOptions,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_value(lookup("NODE_ENV"));
        let swagger_flag = lookup("SWAGGER_ENABLED").as_deref() == Some("true");
        Self {
            cors: CorsConfig {
                origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "*".into()),
                credentials: lookup("CORS_CREDENTIALS").as_deref() == Some("true"),
            },
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "api".into()),
            swagger: SwaggerConfig {
                enabled: swagger_flag || !environment.is_production(),
                title: lookup("SWAGGER_TITLE").unwrap_or_else(|| "Student Management API".into()),
                description: lookup("SWAGGER_DESCRIPTION")
                    .unwrap_or_else(|| "API for managing students".into()),
                version: lookup("SWAGGER_VERSION").unwrap_or_else(|| "1.0".into()),
                tag: lookup("SWAGGER_TAG").unwrap_or_else(|| "students".into()),
            },
            database: DatabaseOptions::from_lookup(&lookup, &environment),
            environment,
        }
    }
}
