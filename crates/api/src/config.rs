//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration that cannot be used to start the server.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set; set it, or set STORE=memory for a single-process demo store")]
    MissingDatabaseUrl,

    #[error("Unknown STORE value {0:?}, expected \"postgres\" or \"memory\"")]
    UnknownStore(String),
}

/// Where bookings are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres(String),
    /// Process-local tables. Inventory is only protected within one process,
    /// so this must never back more than one server instance.
    Memory,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables (a `.env` file is loaded first if present):
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `"json"` for JSON logs, anything else for text
/// - `DATABASE_URL`: PostgreSQL URL, required unless `STORE=memory`
/// - `STORE`: `postgres` (default) or `memory` for a single-process demo store
/// - `DB_MAX_CONNECTIONS` / `DB_MIN_CONNECTIONS`: pool bounds (default: `5` / `1`)
/// - `DB_ACQUIRE_TIMEOUT_SECS`: wait for a pooled connection (default: `5`)
/// - `JWT_SECRET`: HS256 signing key (default: `"change-me"`)
/// - `JWT_TOKEN_EXPIRY_MINUTES`: access token lifetime (default: `30`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub json_logs: bool,
    pub database_url: Option<String>,
    pub store: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub jwt_secret: String,
    pub jwt_expiry_minutes: i64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(lookup("PORT"), defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            json_logs: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            store: lookup("STORE").filter(|store| !store.is_empty()),
            db_max_connections: parse_or(
                lookup("DB_MAX_CONNECTIONS"),
                defaults.db_max_connections,
            ),
            db_min_connections: parse_or(
                lookup("DB_MIN_CONNECTIONS"),
                defaults.db_min_connections,
            ),
            db_acquire_timeout_secs: parse_or(
                lookup("DB_ACQUIRE_TIMEOUT_SECS"),
                defaults.db_acquire_timeout_secs,
            ),
            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiry_minutes: parse_or(
                lookup("JWT_TOKEN_EXPIRY_MINUTES"),
                defaults.jwt_expiry_minutes,
            ),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn db_acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs)
    }

    /// Resolves the store to serve from. PostgreSQL is required unless the
    /// in-memory store is asked for explicitly.
    pub fn store_backend(&self) -> Result<StoreBackend, ConfigError> {
        match self.store.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("memory") => Ok(StoreBackend::Memory),
            None | Some("postgres") => self
                .database_url
                .clone()
                .map(StoreBackend::Postgres)
                .ok_or(ConfigError::MissingDatabaseUrl),
            Some(_) => Err(ConfigError::UnknownStore(
                self.store.clone().unwrap_or_default(),
            )),
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            json_logs: false,
            database_url: None,
            store: None,
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
            jwt_secret: "change-me".to_string(),
            jwt_expiry_minutes: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_expiry_minutes, 30);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let config = from_pairs(&[
            ("PORT", "8081"),
            ("LOG_FORMAT", "JSON"),
            ("DATABASE_URL", "postgres://localhost/booking"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "2"),
            ("JWT_TOKEN_EXPIRY_MINUTES", "15"),
        ]);
        assert_eq!(config.port, 8081);
        assert!(config.json_logs);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/booking")
        );
        assert_eq!(config.db_max_connections, 12);
        assert_eq!(config.db_acquire_timeout(), Duration::from_secs(2));
        assert_eq!(config.jwt_expiry_minutes, 15);
    }

    #[test]
    fn test_database_url_is_required_by_default() {
        let config = from_pairs(&[]);
        assert!(matches!(
            config.store_backend(),
            Err(ConfigError::MissingDatabaseUrl)
        ));

        let config = from_pairs(&[("STORE", "postgres")]);
        assert!(config.store_backend().is_err());
    }

    #[test]
    fn test_store_backend_selection() {
        let config = from_pairs(&[("DATABASE_URL", "postgres://localhost/booking")]);
        assert_eq!(
            config.store_backend().unwrap(),
            StoreBackend::Postgres("postgres://localhost/booking".to_string())
        );

        let config = from_pairs(&[("STORE", "Memory")]);
        assert_eq!(config.store_backend().unwrap(), StoreBackend::Memory);

        let config = from_pairs(&[("STORE", "sqlite")]);
        assert!(matches!(
            config.store_backend(),
            Err(ConfigError::UnknownStore(name)) if name == "sqlite"
        ));
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = from_pairs(&[("PORT", "eighty"), ("DATABASE_URL", "")]);
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
    }
}
