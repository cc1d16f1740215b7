use std::{env, sync::Arc};

use crate::auth::EndpointTokens;

/// Database used when running locally without `DATABASE_URL`.
const LOCAL_DATABASE_URL: &str = "sqlite://workwise.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// AppConfig
///
/// Holds the application's configuration. Immutable once loaded and shared with
/// handlers and the token gate through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // SQLite connection string, e.g. `sqlite://workwise.db`.
    pub db_url: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Runtime environment marker. Selects the log format and how strict loading is.
    pub env: Env,
    // The static (endpoint, secret) table consulted by the token gate.
    pub endpoint_tokens: Arc<EndpointTokens>,
}

/// Env
///
/// Runtime context: `Local` for development, `Production` for deployments.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Test-friendly configuration: in-memory database and the shipped token table.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            env: Env::Local,
            endpoint_tokens: Arc::new(EndpointTokens::default()),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (call `dotenv` first).
    ///
    /// # Panics
    /// Panics in `production` when `DATABASE_URL` is not set, so the service never
    /// starts against an accidental local database file.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = match env {
            Env::Production => {
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL must be set in production.")
            }
            Env::Local => {
                env::var("DATABASE_URL").unwrap_or_else(|_| LOCAL_DATABASE_URL.to_string())
            }
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let endpoint_tokens = EndpointTokens::with_overrides(|key| env::var(key).ok());

        Self {
            db_url,
            bind_addr,
            env,
            endpoint_tokens: Arc::new(endpoint_tokens),
        }
    }
}
