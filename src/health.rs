//! Health check route for load balancers and uptime monitors.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{AppState, Error, db::lock_connection, deadline::with_deadline};

/// The state needed by the health check.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// How long the check may wait for the database.
    pub request_timeout: Duration,
    /// The database connection to check.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HealthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            request_timeout: state.request_timeout,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Report whether the server can reach its database.
///
/// Responds with 200 and `{"status": "up"}` when a trivial query succeeds,
/// otherwise 503 and `{"status": "down"}`.
pub async fn get_health(State(state): State<HealthState>) -> Response {
    let HealthState {
        request_timeout,
        db_connection,
    } = state;

    let check = with_deadline(request_timeout, move || {
        let connection = lock_connection(&db_connection).map_err(Error::Storage)?;

        connection
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|error| Error::Storage(error.into()))
    })
    .await;

    match check {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({"status": "up", "message": "It's healthy"})),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("health check failed: {error}");

            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "down", "error": "the database is unavailable"})),
            )
                .into_response()
        }
    }
}
