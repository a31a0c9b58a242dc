//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Run migrations and the reconciliation pass before returning a usable
//!   connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations applied and natural-key unique
//!   indexes installed.

use super::migrations::apply_migrations;
use super::reconcile::{reconcile_store, ReconcileReport};
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file and brings it to a serviceable state.
///
/// # Side effects
/// - Creates the schema when absent and merges legacy duplicate rows.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with_report(path).map(|(conn, _)| conn)
}

/// Same as [`open_db`], also returning what the reconciliation pass merged.
pub fn open_db_with_report(path: impl AsRef<Path>) -> DbResult<(Connection, ReconcileReport)> {
    open_with("file", || Connection::open(path))
}

/// Opens an in-memory SQLite database and brings it to a serviceable state.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory).map(|(conn, _)| conn)
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<(Connection, ReconcileReport)> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(report) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={} merged={}",
                mode,
                started_at.elapsed().as_millis(),
                report.total()
            );
            Ok((conn, report))
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<ReconcileReport> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    reconcile_store(conn)
}
