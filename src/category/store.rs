//! Defines the category store traits.

use crate::{
    UserID,
    category::{Category, CategoryFields},
    database_id::CategoryId,
    domain_error::StorageError,
};

/// Reads a single category owned by a user.
///
/// Split out from [CategoryStore] since the record services only ever need to
/// look up the category a record refers to.
pub trait CategoryLookup {
    /// Get the category with `id` if it is owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [StorageError::NoRows] if the user has no such category.
    fn get_category(&self, id: CategoryId, user_id: UserID) -> Result<Category, StorageError>;
}

/// Creates, retrieves, updates and deletes a user's categories.
pub trait CategoryStore: CategoryLookup {
    /// Get all of a user's categories, ordered by name.
    fn list_by_user(&self, user_id: UserID) -> Result<Vec<Category>, StorageError>;

    /// Add a new category for `user_id` and return it as stored.
    fn insert(&self, user_id: UserID, fields: &CategoryFields) -> Result<Category, StorageError>;

    /// Overwrite the category with `id` owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [StorageError::NoRows] if the user has no such category.
    fn update(
        &self,
        id: CategoryId,
        user_id: UserID,
        fields: &CategoryFields,
    ) -> Result<Category, StorageError>;

    /// Delete the category with `id` owned by `user_id` and return the number
    /// of rows deleted.
    fn delete(&self, id: CategoryId, user_id: UserID) -> Result<usize, StorageError>;
}
