//! Process configuration, read once at startup and passed down explicitly.
//!
//! | Variable             | Default        | Meaning                                   |
//! |----------------------|----------------|-------------------------------------------|
//! | `BIND_ADDR`          | `0.0.0.0:8080` | HTTP listen address                       |
//! | `DATABASE_URL`       | unset          | Postgres URL; unset selects in-memory     |
//! | `DB_MAX_CONNECTIONS` | `5`            | Pool size (one connection per request)    |
//! | `LIST_TIMEOUT_MS`    | `1000`         | Deadline for list operations              |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Runtime configuration for the HTTP service and its store.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub list_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            list_timeout: DEFAULT_LIST_TIMEOUT,
        }
    }
}

// Keeps credentials in `DATABASE_URL` out of logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .field("list_timeout", &self.list_timeout)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (environment, test map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("BIND_ADDR") {
            config.bind_addr = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("BIND_ADDR", &raw, e))?;
        }

        config.database_url = lookup("DATABASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        if let Some(raw) = lookup("DB_MAX_CONNECTIONS") {
            config.max_connections = parse_positive("DB_MAX_CONNECTIONS", &raw)?;
        }

        if let Some(raw) = lookup("LIST_TIMEOUT_MS") {
            let millis = parse_positive("LIST_TIMEOUT_MS", &raw)?;
            config.list_timeout = Duration::from_millis(u64::from(millis));
        }

        Ok(config)
    }

    /// Short backend label for startup logs.
    pub fn store_kind(&self) -> &'static str {
        if self.database_url.is_some() {
            "postgres"
        } else {
            "in-memory"
        }
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(key, raw, e))?;
    if value == 0 {
        return Err(ConfigError::invalid(key, raw, "must be greater than zero"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_select_in_memory_store() {
        let config = load(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.store_kind(), "in-memory");
    }

    #[test]
    fn reads_all_variables() {
        let config = load(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://app:secret@db/stockroom"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("LIST_TIMEOUT_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.store_kind(), "postgres");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.list_timeout, Duration::from_millis(250));
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let config = load(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = load(&[("DB_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", .. }));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(load(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(load(&[("LIST_TIMEOUT_MS", "soon")]).is_err());
    }

    #[test]
    fn debug_output_redacts_database_url() {
        let config = load(&[("DATABASE_URL", "postgres://app:secret@db/stockroom")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
