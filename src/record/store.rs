//! Defines the record store trait.

use crate::{
    UserID,
    database_id::RecordId,
    domain_error::StorageError,
    record::{RecordFields, RecordRow},
};

/// Creates, retrieves, updates and deletes one kind of financial record.
///
/// Every method is scoped to a user, a record owned by another user behaves
/// as if it does not exist.
pub trait RecordStore {
    /// Get all of a user's records.
    fn list_by_user(&self, user_id: UserID) -> Result<Vec<RecordRow>, StorageError>;

    /// Get the record with `id` owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [StorageError::NoRows] if the user has no such record.
    fn get_by_id(&self, id: RecordId, user_id: UserID) -> Result<RecordRow, StorageError>;

    /// Add a new record for `user_id` and return it as stored.
    fn insert(&self, user_id: UserID, fields: &RecordFields) -> Result<RecordRow, StorageError>;

    /// Overwrite the record with `id` owned by `user_id` and return it as
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns [StorageError::NoRows] if the user has no such record.
    fn update(
        &self,
        id: RecordId,
        user_id: UserID,
        fields: &RecordFields,
    ) -> Result<RecordRow, StorageError>;

    /// Delete the record with `id` owned by `user_id` and return the number of
    /// rows deleted.
    fn delete(&self, id: RecordId, user_id: UserID) -> Result<usize, StorageError>;
}
