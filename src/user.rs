//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{PasswordHash, domain_error::StorageError};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name shown to the user.
    pub name: String,
    /// The unique name the user logs in with.
    pub username: String,
    /// A link to the user's profile picture, if they set one.
    pub image: Option<String>,
    /// The user's password hash.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                image TEXT,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a [StorageError::UniqueViolation] if `username` is taken, or
/// another [StorageError] if the insert failed.
pub fn create_user(
    name: &str,
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, StorageError> {
    connection.execute(
        "INSERT INTO user (name, username, password, created_at) VALUES (?1, ?2, ?3, ?4)",
        (
            name,
            username,
            password_hash.to_string(),
            OffsetDateTime::now_utc(),
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: name.to_owned(),
        username: username.to_owned(),
        image: None,
        password_hash,
    })
}

/// Get the user who logs in with `username`.
///
/// # Errors
///
/// Returns [StorageError::NoRows] if no user has that username.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, StorageError> {
    connection
        .prepare(&format!(
            "SELECT {USER_COLUMNS} FROM user WHERE username = :username"
        ))?
        .query_row(&[(":username", username)], map_user_row)
        .map_err(StorageError::from)
}

/// Get the user with `id`.
///
/// # Errors
///
/// Returns [StorageError::NoRows] if there is no such user.
pub fn get_user_by_id(id: UserID, connection: &Connection) -> Result<User, StorageError> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = :id"))?
        .query_row(&[(":id", &id.as_i64())], map_user_row)
        .map_err(StorageError::from)
}

/// Set the display name and profile picture of the user with `id`.
///
/// The username and password are left as they are.
///
/// # Errors
///
/// Returns [StorageError::NoRows] if there is no such user.
pub fn update_user_profile(
    id: UserID,
    name: &str,
    image: Option<&str>,
    connection: &Connection,
) -> Result<User, StorageError> {
    connection
        .prepare(&format!(
            "UPDATE user SET name = ?1, image = ?2 WHERE id = ?3 RETURNING {USER_COLUMNS}"
        ))?
        .query_row((name, image, id.as_i64()), map_user_row)
        .map_err(StorageError::from)
}

const USER_COLUMNS: &str = "id, name, username, password, image";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = UserID::new(row.get(0)?);
    let name = row.get(1)?;
    let username = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;
    let image = row.get(4)?;

    Ok(User {
        id,
        name,
        username,
        image,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{PasswordHash, UserID, domain_error::StorageError};

    use super::{
        create_user, create_user_table, get_user_by_id, get_user_by_username,
        update_user_profile,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().expect("Could not open database");
        create_user_table(&connection).expect("Could not create user table");
        connection
    }

    #[test]
    fn create_user_succeeds() {
        let connection = get_test_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let user = create_user("Alice", "alice", password_hash.clone(), &connection)
            .expect("Could not create user");

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, password_hash);
    }

    #[test]
    fn create_user_fails_on_duplicate_username() {
        let connection = get_test_connection();
        create_user("Alice", "alice", PasswordHash::new_unchecked("a"), &connection)
            .expect("Could not create user");

        let result = create_user("Other", "alice", PasswordHash::new_unchecked("b"), &connection);

        assert!(matches!(result, Err(StorageError::UniqueViolation { .. })));
    }

    #[test]
    fn get_user_by_username_succeeds() {
        let connection = get_test_connection();
        let want = create_user("Bob", "bob", PasswordHash::new_unchecked("x"), &connection)
            .expect("Could not create user");

        let got = get_user_by_username("bob", &connection);

        assert_eq!(got, Ok(want));
    }

    #[test]
    fn get_missing_user_returns_no_rows() {
        let connection = get_test_connection();

        let got = get_user_by_username("nobody", &connection);

        assert_eq!(got, Err(StorageError::NoRows));
    }

    #[test]
    fn get_user_by_id_succeeds() {
        let connection = get_test_connection();
        let want = create_user("Bob", "bob", PasswordHash::new_unchecked("x"), &connection)
            .expect("Could not create user");

        let got = get_user_by_id(want.id, &connection);

        assert_eq!(got, Ok(want));
    }

    #[test]
    fn update_profile_changes_name_and_image_only() {
        let connection = get_test_connection();
        let user = create_user("Bob", "bob", PasswordHash::new_unchecked("x"), &connection)
            .expect("Could not create user");

        let updated = update_user_profile(
            user.id,
            "Robert",
            Some("https://example.com/bob.png"),
            &connection,
        )
        .expect("Could not update user");

        assert_eq!(updated.name, "Robert");
        assert_eq!(updated.image.as_deref(), Some("https://example.com/bob.png"));
        assert_eq!(updated.username, user.username);
        assert_eq!(updated.password_hash, user.password_hash);
        assert_eq!(get_user_by_id(user.id, &connection), Ok(updated));
    }

    #[test]
    fn update_profile_can_clear_image() {
        let connection = get_test_connection();
        let user = create_user("Bob", "bob", PasswordHash::new_unchecked("x"), &connection)
            .expect("Could not create user");
        update_user_profile(user.id, "Bob", Some("bob.png"), &connection)
            .expect("Could not update user");

        let updated = update_user_profile(user.id, "Bob", None, &connection)
            .expect("Could not update user");

        assert_eq!(updated.image, None);
    }

    #[test]
    fn update_missing_user_returns_no_rows() {
        let connection = get_test_connection();

        let got = update_user_profile(UserID::new(42), "Nobody", None, &connection);

        assert_eq!(got, Err(StorageError::NoRows));
    }
}
