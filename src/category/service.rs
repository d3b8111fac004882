//! Validates category requests and classifies category store failures.

use crate::{
    Error, UserID,
    category::{Category, CategoryFields, CategoryInput, CategoryStore},
    database_id::CategoryId,
    domain_error::{DomainError, ErrorContext, ResourceKind, classify},
};

/// Category operations for a single user at a time.
#[derive(Debug, Clone)]
pub struct CategoryService<S> {
    store: S,
}

impl<S> CategoryService<S>
where
    S: CategoryStore,
{
    /// Create a service that persists categories in `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get all of the categories owned by `user_id`, ordered by name.
    pub fn list(&self, user_id: UserID) -> Result<Vec<Category>, Error> {
        self.store
            .list_by_user(user_id)
            .map_err(|error| classify(error, &ErrorContext::new(ResourceKind::Category)))
    }

    /// Create a category for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a [DomainError::ValidationError] for an invalid name, or
    /// [DomainError::DuplicateData] if the user already has a category with
    /// the same name.
    pub fn create(&self, user_id: UserID, input: CategoryInput) -> Result<Category, Error> {
        let fields = CategoryFields::try_from(input)?;

        self.store.insert(user_id, &fields).map_err(|error| {
            classify(
                error,
                &ErrorContext::new(ResourceKind::Category).conflicting_field(fields.name.as_ref()),
            )
        })
    }

    /// Update the category `id` owned by `user_id`.
    ///
    /// The type of a category cannot be changed, otherwise records already
    /// filed under it would end up with a category of the wrong type.
    ///
    /// # Errors
    ///
    /// Returns a [DomainError::NotFound] if the user has no such category, a
    /// [DomainError::ValidationError] for an invalid name or changed type, or
    /// [DomainError::DuplicateData] if the new name is taken.
    pub fn update(
        &self,
        id: CategoryId,
        user_id: UserID,
        input: CategoryInput,
    ) -> Result<Category, Error> {
        let fields = CategoryFields::try_from(input)?;
        let context = ErrorContext::new(ResourceKind::Category)
            .id(id)
            .conflicting_field(fields.name.as_ref());

        let existing = self
            .store
            .get_category(id, user_id)
            .map_err(|error| classify(error, &context))?;

        if existing.category_type != fields.category_type {
            return Err(DomainError::validation(format!(
                "the type of category \"{}\" cannot be changed from {} to {}",
                existing.name, existing.category_type, fields.category_type
            ))
            .into());
        }

        self.store
            .update(id, user_id, &fields)
            .map_err(|error| classify(error, &context))
    }

    /// Delete the category `id` owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a [DomainError::NotFound] if the user has no such category, or
    /// a [DomainError::ForeignKeyViolation] naming the category if records
    /// still refer to it. The category is kept in the latter case.
    pub fn delete(&self, id: CategoryId, user_id: UserID) -> Result<(), Error> {
        let context = ErrorContext::new(ResourceKind::Category).id(id);

        let existing = self
            .store
            .get_category(id, user_id)
            .map_err(|error| classify(error, &context))?;

        let context = context.foreign_key_message(&format!(
            "category \"{}\" is in use by existing records",
            existing.name
        ));

        let rows_deleted = self
            .store
            .delete(id, user_id)
            .map_err(|error| classify(error, &context))?;

        if rows_deleted == 0 {
            tracing::warn!("category {id} disappeared before user {user_id} could delete it");
            return Err(DomainError::NotFound {
                kind: ResourceKind::Category,
                id,
            }
            .into());
        }

        Ok(())
    }
}
