//! SQLite storage bootstrap, schema migration, and transaction entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for CARPAS core.
//! - Apply schema migrations in deterministic order.
//! - Repair legacy duplicates and install uniqueness constraints.
//! - Provide the single transaction boundary used by every operation.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations and
//!   reconciliation succeed.

pub mod migrations;
mod open;
pub mod reconcile;
mod tx;

pub use open::{open_db, open_db_in_memory, open_db_with_report};
pub use reconcile::{reconcile_store, reset_store, ReconcileReport};
pub use tx::with_transaction;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(
        "database schema version {db_version} is newer than supported {latest_supported}"
    )]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
