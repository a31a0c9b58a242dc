//! Transaction boundary shared by services, analytics and maintenance.
//!
//! # Invariants
//! - Exactly one commit on success; rollback on any error from the body or
//!   from the commit itself.
//! - The body only sees `&Transaction`, so it cannot open a nested boundary
//!   (that needs `&mut Connection`).

use log::debug;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `body` inside one immediate transaction.
///
/// Errors raised by `body` or by the commit are returned unchanged after the
/// transaction has been rolled back. The transaction handle is released on
/// every path.
pub fn with_transaction<T, E, F>(conn: &mut Connection, body: F) -> Result<T, E>
where
    E: From<rusqlite::Error>,
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    match body(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            // The body's error wins over a rollback failure.
            if let Err(rollback_err) = tx.rollback() {
                debug!(
                    "event=tx_rollback module=db status=error error={}",
                    rollback_err
                );
            }
            Err(err)
        }
    }
}
