//! Registration route handler that creates new users.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, PasswordHash, User, ValidatedPassword,
    db::lock_connection,
    deadline::with_deadline,
    domain_error::{DomainError, ErrorContext, ResourceKind, classify},
    user::create_user,
};

/// The state needed to register a new user.
#[derive(Debug, Clone)]
pub struct RegisterState {
    /// The bcrypt cost used when hashing the new password.
    pub password_hash_cost: u32,
    /// How long the request may spend hashing the password and storing the user.
    pub request_timeout: Duration,
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegisterState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_hash_cost: state.password_hash_cost,
            request_timeout: state.request_timeout,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data needed to create a user.
#[derive(Clone, Deserialize)]
pub struct RegisterForm {
    /// The name shown to the user.
    pub name: String,
    /// The unique name the user logs in with.
    pub username: String,
    /// The plain text password, checked for strength before hashing.
    pub password: String,
}

/// A route handler for registering a new user.
///
/// # Errors
///
/// Returns a validation error if the name or username is blank,
/// [Error::TooWeak] if the password is easy to guess, or
/// [DomainError::DuplicateData] if the username is already taken.
pub async fn register_user(
    State(state): State<RegisterState>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<User>), Error> {
    let RegisterState {
        password_hash_cost,
        request_timeout,
        db_connection,
    } = state;

    let user = with_deadline(request_timeout, move || -> Result<User, Error> {
        let name = form.name.trim();
        let username = form.username.trim();

        if name.is_empty() || username.is_empty() {
            return Err(DomainError::validation("name and username must not be empty").into());
        }

        let password_hash =
            PasswordHash::new(ValidatedPassword::new(&form.password)?, password_hash_cost)?;

        lock_connection(&db_connection)
            .and_then(|connection| create_user(name, username, password_hash, &connection))
            .map_err(|error| {
                classify(
                    error,
                    &ErrorContext::new(ResourceKind::User).conflicting_field(username),
                )
            })
    })
    .await?;

    tracing::info!("registered user {} with ID {}", user.username, user.id);

    Ok((StatusCode::CREATED, Json(user)))
}
