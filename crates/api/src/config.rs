use std::time::Duration;

use tflow_core::retry::RetryPolicy;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Lifetime of cached per-user project listings (default: `300`).
    pub project_cache_ttl_secs: u64,
    /// Attempts per read, first try included (default: `3`).
    pub read_retry_attempts: u32,
    /// Delay before the first read retry in milliseconds (default: `200`).
    pub read_retry_delay_ms: u64,
    /// Emit logs as JSON lines (`LOG_FORMAT=json`).
    pub log_json: bool,
    /// Identity-token configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `PROJECT_CACHE_TTL_SECS`| `300`                      |
    /// | `READ_RETRY_ATTEMPTS`   | `3`                        |
    /// | `READ_RETRY_DELAY_MS`   | `200`                      |
    /// | `LOG_FORMAT`            | `text` (`json` to switch)  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let project_cache_ttl_secs: u64 = std::env::var("PROJECT_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("PROJECT_CACHE_TTL_SECS must be a valid u64");

        let read_retry_attempts: u32 = std::env::var("READ_RETRY_ATTEMPTS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("READ_RETRY_ATTEMPTS must be a valid u32");

        let read_retry_delay_ms: u64 = std::env::var("READ_RETRY_DELAY_MS")
            .unwrap_or_else(|_| "200".into())
            .parse()
            .expect("READ_RETRY_DELAY_MS must be a valid u64");

        let log_json = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            project_cache_ttl_secs,
            read_retry_attempts,
            read_retry_delay_ms,
            log_json,
            jwt,
        }
    }

    /// Retry policy applied to database reads.
    pub fn read_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.read_retry_attempts.max(1),
            initial_delay: Duration::from_millis(self.read_retry_delay_ms),
            ..RetryPolicy::default()
        }
    }

    pub fn project_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.project_cache_ttl_secs)
    }
}
