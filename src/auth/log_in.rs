//! Log-in route handler that checks a user's credentials and sets the auth cookie.

use std::{
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use axum::{
    Json,
    extract::{FromRef, State},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, User,
    auth::cookie::set_auth_cookie,
    db::lock_connection,
    deadline::with_deadline,
    domain_error::{ErrorContext, ResourceKind, StorageError, classify},
    user::get_user_by_username,
};

/// The state needed to process a log-in request.
#[derive(Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// How long the request may spend looking up and verifying the user.
    pub request_timeout: StdDuration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            request_timeout: state.request_timeout,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials entered by the user.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password in the database, which has been verified.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// The name the user registered with.
    pub username: String,
    /// Password entered during log-in.
    pub password: String,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the user is
/// returned.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if there is no user with the username or
/// the password is wrong, or an internal error if the password could not be
/// verified.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Json(user_data): Json<LogInData>,
) -> Result<(PrivateCookieJar, Json<User>), Error> {
    let LogInState {
        cookie_duration,
        request_timeout,
        db_connection,
        ..
    } = state;

    let user = with_deadline(request_timeout, move || {
        verify_credentials(&user_data, &db_connection)
    })
    .await?;

    let jar = set_auth_cookie(jar, user.id, cookie_duration)?;

    Ok((jar, Json(user)))
}

fn verify_credentials(user_data: &LogInData, connection: &Mutex<Connection>) -> Result<User, Error> {
    let lookup = lock_connection(connection)
        .and_then(|connection| get_user_by_username(&user_data.username, &connection));

    let user = match lookup {
        Ok(user) => user,
        Err(StorageError::NoRows) => {
            tracing::debug!("log-in attempt for unknown user {}", user_data.username);
            return Err(Error::InvalidCredentials);
        }
        Err(error) => return Err(classify(error, &ErrorContext::new(ResourceKind::User))),
    };

    let is_password_valid = user.password_hash.verify(&user_data.password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_valid {
        tracing::debug!("wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    Ok(user)
}
