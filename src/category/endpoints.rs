//! HTTP handlers for listing, creating, updating and deleting categories.

use std::time::Duration;

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};

use crate::{
    AppState, Error, UserID,
    category::{Category, CategoryInput, CategoryService, SQLiteCategoryStore},
    database_id::CategoryId,
    deadline::with_deadline,
};

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The category operations backed by the app database.
    pub service: CategoryService<SQLiteCategoryStore>,
    /// How long a request may wait for the database.
    pub request_timeout: Duration,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            service: CategoryService::new(SQLiteCategoryStore::new(state.db_connection.clone())),
            request_timeout: state.request_timeout,
        }
    }
}

/// A route handler for getting the current user's categories.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Category>>, Error> {
    let CategoryState {
        service,
        request_timeout,
    } = state;

    with_deadline(request_timeout, move || service.list(user_id))
        .await
        .map(Json)
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let CategoryState {
        service,
        request_timeout,
    } = state;

    let category = with_deadline(request_timeout, move || service.create(user_id, input)).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// A route handler for updating a category.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, Error> {
    let CategoryState {
        service,
        request_timeout,
    } = state;

    with_deadline(request_timeout, move || {
        service.update(category_id, user_id, input)
    })
    .await
    .map(Json)
}

/// A route handler for deleting a category.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Result<StatusCode, Error> {
    let CategoryState {
        service,
        request_timeout,
    } = state;

    with_deadline(request_timeout, move || service.delete(category_id, user_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
