//! Schema migrations for the movie store.
//!
//! # Responsibility
//! - Keep the ordered list of schema steps shipped with this crate.
//! - Bring a connection up to the newest schema in one transaction.
//!
//! # Invariants
//! - Step versions start at 1 and grow by exactly 1.
//! - `PRAGMA user_version` always names the last applied step.
//! - A database newer than this crate is refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "movies",
        sql: include_str!("0001_movies.sql"),
    },
    SchemaStep {
        version: 2,
        name: "movies_title_fts",
        sql: include_str!("0002_movies_title_fts.sql"),
    },
    SchemaStep {
        version: 3,
        name: "movies_title_fts_marks",
        sql: include_str!("0003_movies_title_fts_marks.sql"),
    },
];

/// Schema version written by the newest step this crate ships.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Runs every step newer than the database's recorded version.
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the database is newer than
///   [`latest_version`].
/// - Any SQLite failure; the transaction is rolled back and the recorded
///   version is left untouched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let to_version = latest_version();

    if from_version > to_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }

    let pending = pending_steps(from_version);
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        run_step(&tx, step)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={to_version}");
    Ok(())
}

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

fn pending_steps(from_version: u32) -> &'static [SchemaStep] {
    let first_pending = SCHEMA_STEPS
        .iter()
        .position(|step| step.version > from_version)
        .unwrap_or(SCHEMA_STEPS.len());
    &SCHEMA_STEPS[first_pending..]
}

fn run_step(tx: &Transaction<'_>, step: &SchemaStep) -> DbResult<()> {
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", step.version)?;
    debug!(
        "event=db_migrate_step module=db status=ok version={} name={}",
        step.version, step.name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps, SCHEMA_STEPS};

    #[test]
    fn step_versions_are_contiguous_from_one() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
    }

    #[test]
    fn pending_steps_skip_applied_versions() {
        assert_eq!(pending_steps(0).len(), SCHEMA_STEPS.len());
        let after_first = pending_steps(1);
        assert_eq!(after_first.first().map(|step| step.version), Some(2));
        assert!(pending_steps(latest_version()).is_empty());
        assert!(pending_steps(latest_version() + 1).is_empty());
    }
}
