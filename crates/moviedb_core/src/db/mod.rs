//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the movie store.
//! - Apply schema migrations in deterministic order.
//! - Define the store-level error kinds surfaced by every layer above.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write movie rows before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod config;
pub mod migrations;
mod open;

pub use config::StoreConfig;
pub use open::{open_db, open_db_in_memory, open_db_in_memory_with_config, open_db_with_config};

pub type DbResult<T> = Result<T, DbError>;

/// Store-level failure. Everything here is transient from the domain's point of
/// view: the cause is preserved and never retried internally.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The per-operation deadline elapsed and the statement was aborted.
    DeadlineExceeded {
        timeout: Duration,
    },
    /// The statement was aborted through the connection interrupt handle.
    Interrupted,
    /// A persisted row could not be decoded into a domain record.
    CorruptRow(String),
    SchemaNotReady {
        expected_version: u32,
        actual_version: u32,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    InvalidConfig(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::DeadlineExceeded { timeout } => {
                write!(f, "store operation exceeded {}ms deadline", timeout.as_millis())
            }
            Self::Interrupted => write!(f, "store operation was interrupted"),
            Self::CorruptRow(message) => write!(f, "invalid persisted movie data: {message}"),
            Self::SchemaNotReady {
                expected_version,
                actual_version,
            } => write!(
                f,
                "database schema version {actual_version} is not ready; expected {expected_version}"
            ),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidConfig(message) => write!(f, "invalid store config: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
