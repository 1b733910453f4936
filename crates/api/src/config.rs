use std::str::FromStr;

/// Error raised when an environment variable is missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// Built once at startup and shared through `AppState`; nothing reads the
/// environment after that.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PostgreSQL connection string (required).
    pub database_url: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for the pool to close, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Maximum pooled database connections (default: `10`).
    pub db_max_connections: u32,
    /// How long a request waits for a free connection, in seconds (default: `5`).
    pub db_acquire_timeout_secs: u64,
    /// Largest accepted request body, which bounds CSV uploads (default: 10 MiB).
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `DATABASE_URL`            | (required)                 |
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `5000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                       |
    /// | `DB_MAX_CONNECTIONS`      | `10`                       |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                        |
    /// | `MAX_UPLOAD_BYTES`        | `10485760`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url,
            host,
            port: parse_var("PORT", "u16", 5000)?,
            cors_origins,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", "u64", 30)?,
            shutdown_timeout_secs: parse_var("SHUTDOWN_TIMEOUT_SECS", "u64", 30)?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", "u32", 10)?,
            db_acquire_timeout_secs: parse_var("DB_ACQUIRE_TIMEOUT_SECS", "u64", 5)?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", "usize", 10 * 1024 * 1024)?,
        })
    }
}

fn parse_var<T: FromStr>(
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}
