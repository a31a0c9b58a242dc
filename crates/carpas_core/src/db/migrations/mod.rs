//! Schema migrations for the records store.
//!
//! # Responsibility
//! - Keep the ordered list of schema steps for students, courses,
//!   enrollments, attendance and marks.
//! - Bring a store from its recorded version to the latest one in a single
//!   transaction, logging each step.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly one.
//! - The applied version lives in `PRAGMA user_version`, written after each
//!   step inside the same transaction.
//! - Steps never create the natural-key unique indexes; see
//!   [`crate::db::reconcile`].

use super::tx::with_transaction;
use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::time::Instant;

/// One schema step.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "records_tables",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "lookup_indexes",
        sql: include_str!("0002_lookup_indexes.sql"),
    },
];

/// Schema version a fully migrated store reports.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Applies every step newer than the store's recorded version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store is newer than this build.
/// - `Sqlite` when a step fails; no step of the run is kept in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let steps = pending_steps(from_version);
    if steps.is_empty() {
        return Ok(());
    }

    with_transaction(conn, |tx| -> DbResult<()> {
        for step in steps {
            let started_at = Instant::now();
            tx.execute_batch(step.sql)?;
            tx.pragma_update(None, "user_version", step.version)?;
            info!(
                "event=db_migrate_step module=db status=ok version={} name={} duration_ms={}",
                step.version,
                step.name,
                started_at.elapsed().as_millis()
            );
        }
        Ok(())
    })?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        from_version,
        latest,
        steps.len()
    );
    Ok(())
}

fn pending_steps(from_version: u32) -> &'static [SchemaStep] {
    let applied = SCHEMA_STEPS
        .iter()
        .take_while(|step| step.version <= from_version)
        .count();
    &SCHEMA_STEPS[applied..]
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
