//! Route handlers for viewing and editing the logged-in user's profile.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, User, UserID,
    db::lock_connection,
    deadline::with_deadline,
    domain_error::{DomainError, ErrorContext, ResourceKind, classify},
    user::{get_user_by_id, update_user_profile},
};

/// The state needed by the profile endpoints.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// How long a request may wait for the database.
    pub request_timeout: Duration,
    /// The database connection for reading and updating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            request_timeout: state.request_timeout,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields of a profile the user may change.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileInput {
    /// The new display name.
    pub name: String,
    /// A link to a profile picture. A missing or blank value removes it.
    #[serde(default)]
    pub image: Option<String>,
}

/// A route handler for getting the logged-in user.
pub async fn get_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<User>, Error> {
    let ProfileState {
        request_timeout,
        db_connection,
    } = state;

    with_deadline(request_timeout, move || {
        lock_connection(&db_connection)
            .and_then(|connection| get_user_by_id(user_id, &connection))
            .map_err(|error| classify(error, &user_context(user_id)))
    })
    .await
    .map(Json)
}

/// A route handler for changing the logged-in user's name and profile picture.
///
/// # Errors
///
/// Returns a validation error if the name is blank.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<User>, Error> {
    let ProfileState {
        request_timeout,
        db_connection,
    } = state;

    let name = input.name.trim().to_owned();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty").into());
    }
    let image = input
        .image
        .map(|image| image.trim().to_owned())
        .filter(|image| !image.is_empty());

    let user = with_deadline(request_timeout, move || {
        lock_connection(&db_connection)
            .and_then(|connection| {
                update_user_profile(user_id, &name, image.as_deref(), &connection)
            })
            .map_err(|error| classify(error, &user_context(user_id)))
    })
    .await?;

    tracing::info!("updated profile of user {}", user.id);

    Ok(Json(user))
}

fn user_context(user_id: UserID) -> ErrorContext {
    ErrorContext::new(ResourceKind::User).id(user_id.as_i64())
}
