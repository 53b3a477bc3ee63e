//! Environment-driven configuration
//!
//! Settings come from the process environment (a `.env` file is honored when
//! present). Defaults target a local SQLite database.

use tracing_subscriber::EnvFilter;

const DEFAULT_DATABASE_URL: &str = "sqlite://url-db.sqlite";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub log_level: String,
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from the environment, applying defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let log_level =
            std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        Self {
            database_url,
            log_level,
            max_connections,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Initialize tracing output. `RUST_LOG` wins over the configured level;
/// repeated calls are no-ops so tests can call this freely.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database_url, "sqlite://url-db.sqlite");
        assert_eq!(config.max_connections, 10);
    }
}
