//! Per-operation statement deadline.
//!
//! # Invariants
//! - A `Deadline` is armed for exactly one repository operation and disarmed on drop.
//! - Interrupts raised after the deadline elapsed are reported as
//!   `DbError::DeadlineExceeded`; earlier interrupts came from the interrupt
//!   handle and are reported as `DbError::Interrupted`.

use crate::db::DbError;
use rusqlite::{Connection, ErrorCode};
use std::time::{Duration, Instant};

/// VM instructions between deadline checks.
const PROGRESS_CHECK_INTERVAL: i32 = 1_000;

pub(crate) struct Deadline<'conn> {
    conn: &'conn Connection,
    started_at: Instant,
    timeout: Duration,
}

impl<'conn> Deadline<'conn> {
    /// Installs a progress handler that aborts statements on `conn` once
    /// `timeout` has elapsed.
    pub(crate) fn arm(conn: &'conn Connection, timeout: Duration) -> Self {
        let started_at = Instant::now();
        conn.progress_handler(
            PROGRESS_CHECK_INTERVAL,
            Some(move || started_at.elapsed() >= timeout),
        );
        Self {
            conn,
            started_at,
            timeout,
        }
    }

    pub(crate) fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }

    /// Maps a driver error raised while this deadline was armed.
    pub(crate) fn classify(&self, err: rusqlite::Error) -> DbError {
        if !is_interrupt(&err) {
            return DbError::Sqlite(err);
        }
        if self.started_at.elapsed() >= self.timeout {
            DbError::DeadlineExceeded {
                timeout: self.timeout,
            }
        } else {
            DbError::Interrupted
        }
    }
}

impl Drop for Deadline<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}

fn is_interrupt(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::OperationInterrupted
    )
}

#[cfg(test)]
mod tests {
    use super::Deadline;
    use crate::db::DbError;
    use rusqlite::Connection;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    const LONG_QUERY: &str = "WITH RECURSIVE counter(x) AS (
            SELECT 1
            UNION ALL
            SELECT x + 1 FROM counter LIMIT 2000000000
        )
        SELECT count(*) FROM counter;";

    fn run_long_query(conn: &Connection) -> rusqlite::Result<i64> {
        conn.query_row(LONG_QUERY, [], |row| row.get(0))
    }

    #[test]
    fn elapsed_deadline_aborts_statement() {
        let conn = Connection::open_in_memory().unwrap();
        let deadline = Deadline::arm(&conn, Duration::from_millis(20));

        let err = run_long_query(&conn).unwrap_err();
        let mapped = deadline.classify(err);
        assert!(matches!(
            mapped,
            DbError::DeadlineExceeded { timeout } if timeout == Duration::from_millis(20)
        ));
    }

    #[test]
    fn interrupt_handle_aborts_before_deadline() {
        let conn = Connection::open_in_memory().unwrap();
        let handle = conn.get_interrupt_handle();
        let done = Arc::new(AtomicBool::new(false));
        let done_flag = Arc::clone(&done);
        let interrupter = thread::spawn(move || {
            while !done_flag.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(10));
                handle.interrupt();
            }
        });

        let deadline = Deadline::arm(&conn, Duration::from_secs(60));
        let err = run_long_query(&conn).unwrap_err();
        done.store(true, Ordering::SeqCst);
        interrupter.join().unwrap();

        assert!(matches!(deadline.classify(err), DbError::Interrupted));
    }

    #[test]
    fn dropped_deadline_no_longer_interrupts() {
        let conn = Connection::open_in_memory().unwrap();
        {
            let _deadline = Deadline::arm(&conn, Duration::ZERO);
        }

        let count: i64 = conn
            .query_row(
                "WITH RECURSIVE counter(x) AS (
                    SELECT 1 UNION ALL SELECT x + 1 FROM counter LIMIT 50000
                 )
                 SELECT count(*) FROM counter;",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 50_000);
    }

    #[test]
    fn non_interrupt_errors_pass_through() {
        let conn = Connection::open_in_memory().unwrap();
        let deadline = Deadline::arm(&conn, Duration::from_secs(1));
        let err = conn.execute("SELECT * FROM missing_table", []).unwrap_err();
        assert!(matches!(deadline.classify(err), DbError::Sqlite(_)));
    }
}
