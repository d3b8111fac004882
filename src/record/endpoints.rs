//! HTTP handlers shared by the transaction, income and investment routes.
//!
//! Each kind of record is served by the same handlers with a different
//! [RecordState].

use std::time::Duration;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState, Error, UserID,
    category::SQLiteCategoryStore,
    database_id::RecordId,
    deadline::with_deadline,
    record::{FinancialRecord, RecordInput, RecordKind, RecordService, SQLiteRecordStore},
};

/// The state needed by the record endpoints for one kind of record.
#[derive(Debug, Clone)]
pub struct RecordState {
    /// The record operations backed by the app database.
    pub service: RecordService<SQLiteRecordStore, SQLiteCategoryStore>,
    /// How long a request may wait for the database.
    pub request_timeout: Duration,
}

impl RecordState {
    /// Create the state for the routes of `kind` from the app state.
    pub fn new(kind: RecordKind, state: &AppState) -> Self {
        Self {
            service: RecordService::new(
                kind,
                SQLiteRecordStore::new(state.db_connection.clone(), kind),
                SQLiteCategoryStore::new(state.db_connection.clone()),
            ),
            request_timeout: state.request_timeout,
        }
    }
}

/// A route handler for getting the current user's records.
pub async fn list_records_endpoint(
    State(state): State<RecordState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<FinancialRecord>>, Error> {
    let RecordState {
        service,
        request_timeout,
    } = state;

    with_deadline(request_timeout, move || service.list(user_id))
        .await
        .map(Json)
}

/// A route handler for creating a new record.
pub async fn create_record_endpoint(
    State(state): State<RecordState>,
    Extension(user_id): Extension<UserID>,
    Json(input): Json<RecordInput>,
) -> Result<(StatusCode, Json<FinancialRecord>), Error> {
    let RecordState {
        service,
        request_timeout,
    } = state;

    let record = with_deadline(request_timeout, move || service.create(user_id, input)).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// A route handler for updating a record.
pub async fn update_record_endpoint(
    State(state): State<RecordState>,
    Extension(user_id): Extension<UserID>,
    Path(record_id): Path<RecordId>,
    Json(input): Json<RecordInput>,
) -> Result<Json<FinancialRecord>, Error> {
    let RecordState {
        service,
        request_timeout,
    } = state;

    with_deadline(request_timeout, move || {
        service.update(record_id, user_id, input)
    })
    .await
    .map(Json)
}

/// A route handler for deleting a record.
pub async fn delete_record_endpoint(
    State(state): State<RecordState>,
    Extension(user_id): Extension<UserID>,
    Path(record_id): Path<RecordId>,
) -> Result<StatusCode, Error> {
    let RecordState {
        service,
        request_timeout,
    } = state;

    with_deadline(request_timeout, move || service.delete(record_id, user_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
