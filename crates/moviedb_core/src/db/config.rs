//! Store configuration.
//!
//! # Invariants
//! - Timeouts are interpreted as milliseconds and must be greater than zero.
//! - Missing fields fall back to their defaults.

use super::{DbError, DbResult};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_QUERY_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 3_000;

/// Tunables applied when a connection is opened and when a repository runs a
/// statement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Deadline applied independently to every repository operation.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    /// How long a statement waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> DbResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| DbError::InvalidConfig(format!("malformed config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DbResult<()> {
        if self.query_timeout_ms == 0 {
            return Err(DbError::InvalidConfig(
                "query_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.busy_timeout_ms == 0 {
            return Err(DbError::InvalidConfig(
                "busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

const fn default_query_timeout_ms() -> u64 {
    DEFAULT_QUERY_TIMEOUT_MS
}

const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;
    use crate::db::DbError;
    use std::time::Duration;

    #[test]
    fn missing_fields_use_defaults() {
        let config = StoreConfig::from_json_str("{}").expect("empty object should parse");
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.query_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let config = StoreConfig::from_json_str(r#"{"query_timeout_ms": 250}"#)
            .expect("partial config should parse");
        assert_eq!(config.query_timeout(), Duration::from_millis(250));
        assert_eq!(config.busy_timeout_ms, 3_000);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = StoreConfig::from_json_str(r#"{"busy_timeout_ms": 0}"#)
            .expect_err("zero busy timeout must be rejected");
        assert!(matches!(err, DbError::InvalidConfig(message) if message.contains("busy_timeout_ms")));
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let err = StoreConfig::from_json_str("{").expect_err("truncated json must fail");
        assert!(matches!(err, DbError::InvalidConfig(_)));
    }
}
