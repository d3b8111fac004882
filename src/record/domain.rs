//! Core financial record domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    UserID,
    database_id::{CategoryId, RecordId},
    money::{MoneyError, StoredAmount, decode_or_zero},
};

/// The request body for creating or updating a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordInput {
    pub name: String,
    /// A decimal amount, sent as a string to keep every digit.
    ///
    /// JSON numbers are rejected since they pass through `f64`.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(rename = "category")]
    pub category_id: CategoryId,
    /// The date as `DD/MM/YYYY`.
    pub date: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// The validated fields that are written to a record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub name: String,
    pub amount: StoredAmount,
    pub category_id: CategoryId,
    pub date: Date,
    pub note: Option<String>,
}

/// A record as it is read back from a record store, before its amount is
/// decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: RecordId,
    pub name: String,
    /// `None` if the amount is missing from storage.
    pub amount: Option<StoredAmount>,
    pub category_id: CategoryId,
    pub date: Date,
    pub note: Option<String>,
    pub user_id: UserID,
}

/// A transaction, income or investment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// The id of the record, unique within its kind.
    pub id: RecordId,

    /// A short description of the record, e.g. 'Weekly groceries'.
    pub name: String,

    /// The exact amount of money.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,

    /// The category the record is filed under.
    #[serde(rename = "category")]
    pub category_id: CategoryId,

    /// The day the record happened.
    #[serde(with = "crate::display_date::display_date_format")]
    pub date: Date,

    /// Optional free text about the record.
    pub note: Option<String>,

    /// The user that owns the record.
    pub user_id: UserID,
}

impl TryFrom<RecordRow> for FinancialRecord {
    type Error = MoneyError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            amount: decode_or_zero(row.amount)?,
            category_id: row.category_id,
            date: row.date,
            note: row.note,
            user_id: row.user_id,
        })
    }
}
