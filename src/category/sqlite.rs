//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    UserID,
    category::{Category, CategoryFields, CategoryLookup, CategoryName, CategoryStore},
    database_id::CategoryId,
    db::lock_connection,
    domain_error::StorageError,
};

const CATEGORY_COLUMNS: &str = "id, name, type, description, user_id, created_at";

/// Create the category table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                description TEXT,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(user_id, name),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Creates, retrieves, updates and deletes categories in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
        let raw_name: String = row.get(1)?;
        let raw_user_id = row.get(4)?;

        Ok(Category {
            id: row.get(0)?,
            name: CategoryName::new_unchecked(&raw_name),
            category_type: row.get(2)?,
            description: row.get(3)?,
            user_id: UserID::new(raw_user_id),
            created_at: row.get(5)?,
        })
    }
}

impl CategoryLookup for SQLiteCategoryStore {
    fn get_category(&self, id: CategoryId, user_id: UserID) -> Result<Category, StorageError> {
        let connection = lock_connection(&self.connection)?;

        connection
            .prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(
                &[(":id", &id), (":user_id", &user_id.as_i64())],
                Self::map_row,
            )
            .map_err(StorageError::from)
    }
}

impl CategoryStore for SQLiteCategoryStore {
    fn list_by_user(&self, user_id: UserID) -> Result<Vec<Category>, StorageError> {
        let connection = lock_connection(&self.connection)?;
        let mut statement = connection.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE user_id = :user_id ORDER BY name"
        ))?;

        let categories = statement
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    fn insert(&self, user_id: UserID, fields: &CategoryFields) -> Result<Category, StorageError> {
        let connection = lock_connection(&self.connection)?;

        connection
            .prepare(&format!(
                "INSERT INTO category (name, type, description, user_id, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                RETURNING {CATEGORY_COLUMNS}"
            ))?
            .query_row(
                (
                    fields.name.as_ref(),
                    fields.category_type,
                    &fields.description,
                    user_id.as_i64(),
                    OffsetDateTime::now_utc(),
                ),
                Self::map_row,
            )
            .map_err(StorageError::from)
    }

    fn update(
        &self,
        id: CategoryId,
        user_id: UserID,
        fields: &CategoryFields,
    ) -> Result<Category, StorageError> {
        let connection = lock_connection(&self.connection)?;

        connection
            .prepare(&format!(
                "UPDATE category SET name = ?1, type = ?2, description = ?3
                WHERE id = ?4 AND user_id = ?5
                RETURNING {CATEGORY_COLUMNS}"
            ))?
            .query_row(
                (
                    fields.name.as_ref(),
                    fields.category_type,
                    &fields.description,
                    id,
                    user_id.as_i64(),
                ),
                Self::map_row,
            )
            .map_err(StorageError::from)
    }

    fn delete(&self, id: CategoryId, user_id: UserID) -> Result<usize, StorageError> {
        let connection = lock_connection(&self.connection)?;

        connection
            .execute(
                "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
                (id, user_id.as_i64()),
            )
            .map_err(StorageError::from)
    }
}
