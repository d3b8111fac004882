//! Checks that a record's category may be used for that kind of record.

use crate::{
    Error, UserID,
    category::{Category, CategoryLookup, CategoryType},
    database_id::CategoryId,
    domain_error::{DomainError, ErrorContext, ResourceKind, classify},
};

/// Get the category with `category_id` owned by `user_id` and check that its
/// type is `required_type`.
///
/// This only reads from `categories`. Call it before writing a record, never
/// after.
///
/// # Errors
///
/// Returns:
/// - [DomainError::NotFound] if the user has no category with `category_id`,
/// - [DomainError::ValidationError] naming both types if the category has a
///   different type,
/// - [Error::Storage] if the lookup failed for another reason.
pub fn ensure_category_type<L>(
    categories: &L,
    category_id: CategoryId,
    user_id: UserID,
    required_type: CategoryType,
) -> Result<Category, Error>
where
    L: CategoryLookup + ?Sized,
{
    let category = categories
        .get_category(category_id, user_id)
        .map_err(|error| {
            classify(
                error,
                &ErrorContext::new(ResourceKind::Category).id(category_id),
            )
        })?;

    if category.category_type != required_type {
        tracing::debug!(
            "rejected category {category_id} of type {} where {required_type} is required",
            category.category_type
        );

        return Err(DomainError::validation(format!(
            "category \"{}\" has type {}, expected a category with type {required_type}",
            category.name, category.category_type
        ))
        .into());
    }

    Ok(category)
}
