//! The record service validates and stores transactions, incomes and
//! investments.
//!
//! All three kinds go through the same [RecordService], so every kind checks
//! its category type and classifies storage failures the same way.

use crate::{
    Error, UserID,
    category::{CategoryLookup, ensure_category_type},
    database_id::RecordId,
    display_date::parse_display_date,
    domain_error::{DomainError, ErrorContext, classify},
    money,
    record::{FinancialRecord, RecordFields, RecordInput, RecordKind, RecordRow, RecordStore},
};

const INVALID_CATEGORY_MESSAGE: &str = "provide a valid category";

/// Record operations for one kind of record.
///
/// `records` persists the records and `categories` is used to check the
/// category each record refers to.
#[derive(Debug, Clone)]
pub struct RecordService<S, C> {
    kind: RecordKind,
    records: S,
    categories: C,
}

impl<S, C> RecordService<S, C>
where
    S: RecordStore,
    C: CategoryLookup,
{
    /// Create a service for records of `kind`.
    pub fn new(kind: RecordKind, records: S, categories: C) -> Self {
        Self {
            kind,
            records,
            categories,
        }
    }

    /// Get all of the records owned by `user_id`.
    ///
    /// A user without records gets an empty list, not an error.
    pub fn list(&self, user_id: UserID) -> Result<Vec<FinancialRecord>, Error> {
        self.records
            .list_by_user(user_id)
            .map_err(|error| classify(error, &self.context()))?
            .into_iter()
            .map(decode_row)
            .collect()
    }

    /// Validate `input` and store it as a new record for `user_id`.
    ///
    /// The returned record is decoded from the stored row.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [DomainError::ValidationError] for a bad date, empty name or a
    ///   category of the wrong type,
    /// - [DomainError::NotFound] if the user has no such category,
    /// - any other classified storage failure.
    ///
    /// Nothing is stored if an error is returned.
    pub fn create(&self, user_id: UserID, input: RecordInput) -> Result<FinancialRecord, Error> {
        let fields = self.validate(user_id, input)?;

        let row = self.records.insert(user_id, &fields).map_err(|error| {
            classify(
                error,
                &self.context().foreign_key_message(INVALID_CATEGORY_MESSAGE),
            )
        })?;

        decode_row(row)
    }

    /// Validate `input` and overwrite the record `id` owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [RecordService::create], plus
    /// [DomainError::NotFound] if the user has no record with `id`.
    pub fn update(
        &self,
        id: RecordId,
        user_id: UserID,
        input: RecordInput,
    ) -> Result<FinancialRecord, Error> {
        let fields = self.validate(user_id, input)?;

        let row = self
            .records
            .update(id, user_id, &fields)
            .map_err(|error| {
                classify(
                    error,
                    &self
                        .context()
                        .id(id)
                        .foreign_key_message(INVALID_CATEGORY_MESSAGE),
                )
            })?;

        decode_row(row)
    }

    /// Delete the record `id` owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [DomainError::NotFound] if the user has no record with `id`.
    pub fn delete(&self, id: RecordId, user_id: UserID) -> Result<(), Error> {
        let rows_deleted = self
            .records
            .delete(id, user_id)
            .map_err(|error| classify(error, &self.context().id(id)))?;

        if rows_deleted == 0 {
            tracing::warn!("{} {id} not found for user {user_id}", self.kind.resource_kind());
            return Err(DomainError::NotFound {
                kind: self.kind.resource_kind(),
                id,
            }
            .into());
        }

        Ok(())
    }

    /// Check `input` in order: date, amount, name and then the category.
    /// Only the category check touches storage.
    fn validate(&self, user_id: UserID, input: RecordInput) -> Result<RecordFields, Error> {
        let date = parse_display_date(&input.date)?;
        let amount = money::encode(input.amount);

        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty").into());
        }

        ensure_category_type(
            &self.categories,
            input.category_id,
            user_id,
            self.kind.required_category_type(),
        )?;

        Ok(RecordFields {
            name: name.to_owned(),
            amount,
            category_id: input.category_id,
            date,
            note: input.note,
        })
    }

    fn context(&self) -> ErrorContext {
        ErrorContext::new(self.kind.resource_kind())
    }
}

fn decode_row(row: RecordRow) -> Result<FinancialRecord, Error> {
    let id = row.id;

    FinancialRecord::try_from(row).map_err(|error| {
        tracing::error!("could not decode the amount of record {id}: {error}");
        DomainError::from(error).into()
    })
}
