//! Database schema set up and shared connection helpers.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    category::create_category_table,
    deadline::deadline_passed,
    domain_error::StorageError,
    record::{RecordKind, create_record_table},
    user::create_user_table,
};

/// Create the tables for every model in the application.
///
/// Foreign key enforcement is switched on for `connection` first, since
/// SQLite leaves it off by default and it cannot be changed inside a
/// transaction.
///
/// # Errors
///
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;

    for kind in RecordKind::ALL {
        create_record_table(&transaction, kind)?;
    }

    transaction.commit()?;

    Ok(())
}

/// Acquire the shared database connection.
///
/// # Errors
///
/// Returns [StorageError::Lock] if another thread panicked while holding the
/// connection, or [StorageError::DeadlineExceeded] if the request running on
/// this thread ran out of time while waiting for it.
pub(crate) fn lock_connection(
    connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, StorageError> {
    let guard = connection.lock().map_err(|error| {
        tracing::error!("could not acquire the database lock: {error}");
        StorageError::Lock
    })?;

    if deadline_passed() {
        tracing::warn!("request deadline passed while waiting for the database lock");
        return Err(StorageError::DeadlineExceeded);
    }

    Ok(guard)
}
