//! Expenser is a backend for tracking personal finances.
//!
//! This library provides a JSON REST API for managing a user's categories,
//! transactions (expenses), incomes and investments.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod database_id;
mod db;
mod deadline;
mod display_date;
mod domain_error;
mod endpoints;
mod health;
mod logging;
mod money;
mod password;
mod profile;
mod record;
mod routing;
mod timestamp;
mod user;

pub use app_state::{AppState, create_cookie_key};
pub use db::initialize as initialize_db;
pub use domain_error::{DomainError, ResourceKind, StorageError};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserID};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A classified error that explains to the client why the request was
    /// rejected.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A storage failure that could not be classified.
    ///
    /// The details should only be logged on the server.
    #[error("{0}")]
    Storage(StorageError),

    /// The request did not finish before its deadline.
    #[error("the request timed out")]
    Timeout,

    /// The request did not carry a valid auth cookie.
    #[error("you must be logged in to access this resource")]
    Unauthenticated,

    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// Any other unexpected error, e.g. a background task panicked.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Domain(DomainError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Error::Domain(_) | Error::TooWeak(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);

                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "An unexpected error occurred, check the server logs for more details.",
                    })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{DomainError, Error, ResourceKind, StorageError};

    #[test]
    fn domain_errors_map_to_client_errors() {
        let cases = [
            (
                DomainError::validation("invalid date"),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::DuplicateData {
                    column: "Rent".to_owned(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::NotNullConstraint {
                    column: "name".to_owned(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::ForeignKeyViolation {
                    message: "category \"Rent\" is in use by existing records".to_owned(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::NotFound {
                    kind: ResourceKind::Income,
                    id: 3,
                },
                StatusCode::NOT_FOUND,
            ),
        ];

        for (error, want) in cases {
            let response = Error::from(error.clone()).into_response();

            assert_eq!(response.status(), want, "wrong status for {error:?}");
        }
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        assert_eq!(
            Error::Timeout.into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn auth_errors_are_unauthorized() {
        assert_eq!(
            Error::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn unclassified_storage_error_is_internal() {
        let response = Error::Storage(StorageError::Lock).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
