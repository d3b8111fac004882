//! Implements a SQLite backed record store with one table per record kind.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, types::Type};

use crate::{
    UserID,
    database_id::RecordId,
    db::lock_connection,
    domain_error::StorageError,
    money::StoredAmount,
    record::{RecordFields, RecordKind, RecordRow, RecordStore},
};

const RECORD_COLUMNS: &str =
    "id, name, amount_mantissa, amount_exponent, category_id, date, note, user_id";

/// Create the table for records of `kind`.
///
/// The mantissa is stored as text since it can be wider than a SQLite
/// integer. Categories cannot be deleted while a record refers to them.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_record_table(connection: &Connection, kind: RecordKind) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                amount_mantissa TEXT NOT NULL,
                amount_exponent INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                note TEXT,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
            kind.table_name()
        ),
        (),
    )?;

    Ok(())
}

/// Creates, retrieves, updates and deletes one kind of record in a SQLite
/// database.
#[derive(Debug, Clone)]
pub struct SQLiteRecordStore {
    connection: Arc<Mutex<Connection>>,
    kind: RecordKind,
}

impl SQLiteRecordStore {
    /// Create a new store for records of `kind` with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>, kind: RecordKind) -> Self {
        Self { connection, kind }
    }

    fn table(&self) -> &'static str {
        self.kind.table_name()
    }

    fn map_row(row: &Row) -> Result<RecordRow, rusqlite::Error> {
        let raw_mantissa: Option<String> = row.get(2)?;
        let exponent: Option<i32> = row.get(3)?;

        let amount = match (raw_mantissa, exponent) {
            (Some(raw_mantissa), Some(exponent)) => Some(
                StoredAmount::from_parts(&raw_mantissa, exponent).map_err(|error| {
                    rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(error))
                })?,
            ),
            _ => None,
        };

        let raw_user_id = row.get(7)?;

        Ok(RecordRow {
            id: row.get(0)?,
            name: row.get(1)?,
            amount,
            category_id: row.get(4)?,
            date: row.get(5)?,
            note: row.get(6)?,
            user_id: UserID::new(raw_user_id),
        })
    }
}

impl RecordStore for SQLiteRecordStore {
    fn list_by_user(&self, user_id: UserID) -> Result<Vec<RecordRow>, StorageError> {
        let connection = lock_connection(&self.connection)?;
        let mut statement = connection.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE user_id = :user_id ORDER BY date DESC, id DESC",
            self.table()
        ))?;

        let rows = statement
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn get_by_id(&self, id: RecordId, user_id: UserID) -> Result<RecordRow, StorageError> {
        let connection = lock_connection(&self.connection)?;

        connection
            .prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM {} WHERE id = :id AND user_id = :user_id",
                self.table()
            ))?
            .query_row(
                &[(":id", &id), (":user_id", &user_id.as_i64())],
                Self::map_row,
            )
            .map_err(StorageError::from)
    }

    fn insert(&self, user_id: UserID, fields: &RecordFields) -> Result<RecordRow, StorageError> {
        let connection = lock_connection(&self.connection)?;

        connection
            .prepare(&format!(
                "INSERT INTO {} (name, amount_mantissa, amount_exponent, category_id, date, note, user_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                RETURNING {RECORD_COLUMNS}",
                self.table()
            ))?
            .query_row(
                (
                    &fields.name,
                    fields.amount.mantissa.to_string(),
                    fields.amount.exponent,
                    fields.category_id,
                    fields.date,
                    &fields.note,
                    user_id.as_i64(),
                ),
                Self::map_row,
            )
            .map_err(StorageError::from)
    }

    fn update(
        &self,
        id: RecordId,
        user_id: UserID,
        fields: &RecordFields,
    ) -> Result<RecordRow, StorageError> {
        let connection = lock_connection(&self.connection)?;

        connection
            .prepare(&format!(
                "UPDATE {} SET name = ?1, amount_mantissa = ?2, amount_exponent = ?3,
                category_id = ?4, date = ?5, note = ?6
                WHERE id = ?7 AND user_id = ?8
                RETURNING {RECORD_COLUMNS}",
                self.table()
            ))?
            .query_row(
                (
                    &fields.name,
                    fields.amount.mantissa.to_string(),
                    fields.amount.exponent,
                    fields.category_id,
                    fields.date,
                    &fields.note,
                    id,
                    user_id.as_i64(),
                ),
                Self::map_row,
            )
            .map_err(StorageError::from)
    }

    fn delete(&self, id: RecordId, user_id: UserID) -> Result<usize, StorageError> {
        let connection = lock_connection(&self.connection)?;

        connection
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", self.table()),
                (id, user_id.as_i64()),
            )
            .map_err(StorageError::from)
    }
}
