//! Classifies storage failures into the small set of errors callers can act on.
//!
//! Stores report failures as a [StorageError], a thin reading of the SQLite
//! result code. Services turn those into a [DomainError] with [classify], which
//! is the only place that decides what a constraint violation means for the
//! caller.

use std::fmt::Display;

use rusqlite::ffi::{
    SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_NOTNULL, SQLITE_CONSTRAINT_TRIGGER,
    SQLITE_CONSTRAINT_UNIQUE,
};
use serde::Serialize;

use crate::{Error, database_id::DatabaseId, money::MoneyError};

/// The kinds of resource a [DomainError::NotFound] can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A user-defined category.
    Category,
    /// An expense.
    Transaction,
    /// An income.
    Income,
    /// An investment.
    Investment,
    /// A registered user.
    User,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Category => "category",
            ResourceKind::Transaction => "transaction",
            ResourceKind::Income => "income",
            ResourceKind::Investment => "investment",
            ResourceKind::User => "user",
        };

        write!(f, "{name}")
    }
}

/// An error that explains to the caller why an operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A value that must be unique already exists.
    #[error("{column} already exists")]
    DuplicateData {
        /// The value that clashed with an existing row.
        column: String,
    },

    /// A required column was missing when the row reached storage.
    #[error("{column} can't be null")]
    NotNullConstraint {
        /// The column that was null.
        column: String,
    },

    /// Referential integrity blocked the operation.
    ///
    /// The message is written for the end user, e.g. explaining that a
    /// category is still in use.
    #[error("{message}")]
    ForeignKeyViolation {
        /// The message shown to the user.
        message: String,
    },

    /// No row with `id` is owned by the caller.
    #[error("{kind} {id} not found")]
    NotFound {
        /// The kind of resource that was looked up.
        kind: ResourceKind,
        /// The ID that was looked up.
        id: DatabaseId,
    },

    /// The input was malformed or broke a business rule.
    #[error("{message}")]
    ValidationError {
        /// Explains what was wrong with the input.
        message: String,
    },
}

impl DomainError {
    /// Shortcut for creating a [DomainError::ValidationError].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

impl From<MoneyError> for DomainError {
    fn from(error: MoneyError) -> Self {
        Self::validation(error.to_string())
    }
}

/// A raw failure reported by a store.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum StorageError {
    /// A UNIQUE constraint failed. `detail` is the message from SQLite, e.g.
    /// "UNIQUE constraint failed: category.user_id, category.name".
    #[error("unique constraint failed: {detail}")]
    UniqueViolation {
        /// The message from SQLite.
        detail: String,
    },

    /// A NOT NULL constraint failed on `column`.
    #[error("not null constraint failed on column {column}")]
    NotNullViolation {
        /// The column named by SQLite.
        column: String,
    },

    /// A FOREIGN KEY constraint failed.
    #[error("foreign key constraint failed: {detail}")]
    ForeignKeyViolation {
        /// The message from SQLite.
        detail: String,
    },

    /// The statement matched no rows.
    #[error("no matching row")]
    NoRows,

    /// The connection mutex was poisoned.
    #[error("could not acquire the database lock")]
    Lock,

    /// The request's deadline passed before the connection was free.
    #[error("deadline passed before the database was available")]
    DeadlineExceeded,

    /// Any other SQLite error, passed through as is.
    #[error("an unexpected SQL error occurred: {0}")]
    Other(rusqlite::Error),
}

const FOREIGN_KEY_FAILED: &str = "FOREIGN KEY constraint failed";

impl From<rusqlite::Error> for StorageError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: SQLITE_CONSTRAINT_UNIQUE,
                },
                detail,
            ) => StorageError::UniqueViolation {
                detail: detail.unwrap_or_default(),
            },
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: SQLITE_CONSTRAINT_NOTNULL,
                },
                detail,
            ) => StorageError::NotNullViolation {
                column: last_column(detail.as_deref().unwrap_or_default()),
            },
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                detail,
            ) => StorageError::ForeignKeyViolation {
                detail: detail.unwrap_or_default(),
            },
            // ON DELETE RESTRICT is enforced as a trigger, so SQLite reports it
            // with the trigger code.
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: SQLITE_CONSTRAINT_TRIGGER,
                },
                Some(detail),
            ) if detail.starts_with(FOREIGN_KEY_FAILED) => {
                StorageError::ForeignKeyViolation { detail }
            }
            rusqlite::Error::QueryReturnedNoRows => StorageError::NoRows,
            error => StorageError::Other(error),
        }
    }
}

/// Extract the last column name from a SQLite constraint message, e.g.
/// "NOT NULL constraint failed: income.name" gives "name".
fn last_column(detail: &str) -> String {
    let columns = detail.rsplit(':').next().unwrap_or(detail);
    let column = columns.rsplit(',').next().unwrap_or(columns).trim();

    column
        .rsplit('.')
        .next()
        .unwrap_or(column)
        .to_owned()
}

/// What the caller was doing when a [StorageError] occurred.
///
/// Only the parts relevant to an operation need to be set, e.g. an insert has
/// no `id` yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    kind: ResourceKind,
    id: Option<DatabaseId>,
    conflicting_field: Option<String>,
    foreign_key_message: Option<String>,
}

impl ErrorContext {
    /// Create a context for an operation on a `kind` of resource.
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            id: None,
            conflicting_field: None,
            foreign_key_message: None,
        }
    }

    /// Set the ID of the row the operation targets.
    pub fn id(mut self, id: DatabaseId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the value reported by [DomainError::DuplicateData] when a unique
    /// constraint fails.
    pub fn conflicting_field(mut self, field: &str) -> Self {
        self.conflicting_field = Some(field.to_owned());
        self
    }

    /// Set the message reported by [DomainError::ForeignKeyViolation].
    pub fn foreign_key_message(mut self, message: &str) -> Self {
        self.foreign_key_message = Some(message.to_owned());
        self
    }
}

/// Turn a raw storage failure into the error returned to the caller.
///
/// Recognised constraint failures become a [DomainError]. Anything else,
/// including a missing row when `context` has no ID, is returned unchanged as
/// [Error::Storage].
pub fn classify(error: StorageError, context: &ErrorContext) -> Error {
    match (error, context.id) {
        (StorageError::UniqueViolation { detail }, _) => {
            let column = context
                .conflicting_field
                .clone()
                .unwrap_or_else(|| last_column(&detail));

            DomainError::DuplicateData { column }.into()
        }
        (StorageError::NotNullViolation { column }, _) => {
            DomainError::NotNullConstraint { column }.into()
        }
        (StorageError::ForeignKeyViolation { detail }, _) => {
            tracing::warn!("foreign key violation on {}: {detail}", context.kind);
            let message = context.foreign_key_message.clone().unwrap_or(detail);

            DomainError::ForeignKeyViolation { message }.into()
        }
        (StorageError::DeadlineExceeded, _) => Error::Timeout,
        (StorageError::NoRows, Some(id)) => {
            tracing::warn!("{} {id} not found", context.kind);

            DomainError::NotFound {
                kind: context.kind,
                id,
            }
            .into()
        }
        (error, _) => {
            tracing::error!(
                "an unhandled storage error occurred for {}: {error}",
                context.kind
            );
            Error::Storage(error)
        }
    }
}


#[cfg(test)]
mod storage_error_tests {
    use rusqlite::Connection;

    use super::StorageError;

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().expect("Could not open database");
        connection
            .execute_batch(
                "PRAGMA foreign_keys = ON;
                CREATE TABLE parent (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
                CREATE TABLE child (
                    id INTEGER PRIMARY KEY,
                    parent_id INTEGER NOT NULL REFERENCES parent(id)
                );
                CREATE TABLE restricted_child (
                    id INTEGER PRIMARY KEY,
                    parent_id INTEGER NOT NULL REFERENCES parent(id) ON DELETE RESTRICT
                );
                INSERT INTO parent (id, name) VALUES (1, 'foo'), (2, 'bar');
                INSERT INTO child (parent_id) VALUES (1);
                INSERT INTO restricted_child (parent_id) VALUES (2);",
            )
            .expect("Could not create test tables");
        connection
    }

    #[test]
    fn unique_failure_is_unique_violation() {
        let connection = get_test_connection();

        let error = connection
            .execute("INSERT INTO parent (name) VALUES ('foo')", ())
            .expect_err("duplicate insert should fail");

        assert!(matches!(
            StorageError::from(error),
            StorageError::UniqueViolation { .. }
        ));
    }

    #[test]
    fn not_null_failure_names_column() {
        let connection = get_test_connection();

        let error = connection
            .execute("INSERT INTO parent (name) VALUES (NULL)", ())
            .expect_err("null insert should fail");

        assert_eq!(
            StorageError::from(error),
            StorageError::NotNullViolation {
                column: "name".to_owned()
            }
        );
    }

    #[test]
    fn foreign_key_failure_is_foreign_key_violation() {
        let connection = get_test_connection();

        let error = connection
            .execute("DELETE FROM parent WHERE id = 1", ())
            .expect_err("delete of referenced row should fail");

        assert!(matches!(
            StorageError::from(error),
            StorageError::ForeignKeyViolation { .. }
        ));
    }

    #[test]
    fn restrict_failure_is_foreign_key_violation() {
        let connection = get_test_connection();

        let error = connection
            .execute("DELETE FROM parent WHERE id = 2", ())
            .expect_err("delete of restricted row should fail");

        assert!(matches!(
            StorageError::from(error),
            StorageError::ForeignKeyViolation { .. }
        ));
    }

    #[test]
    fn missing_row_is_no_rows() {
        let connection = get_test_connection();

        let error = connection
            .query_row("SELECT id FROM parent WHERE id = 99", [], |row| {
                row.get::<_, i64>(0)
            })
            .expect_err("query should return no rows");

        assert_eq!(StorageError::from(error), StorageError::NoRows);
    }
}
