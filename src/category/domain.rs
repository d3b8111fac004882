//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{UserID, database_id::CategoryId, domain_error::DomainError};

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 50;

/// The kind of record a category may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryType {
    /// Categories for transactions, e.g. 'Groceries'.
    Expense,
    /// Categories for incomes, e.g. 'Salary'.
    Income,
    /// Categories for investments, e.g. 'Index Funds'.
    Investment,
}

impl CategoryType {
    fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Expense => "Expense",
            CategoryType::Income => "Income",
            CategoryType::Investment => "Investment",
        }
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Expense" => Ok(CategoryType::Expense),
            "Income" => Ok(CategoryType::Income),
            "Investment" => Ok(CategoryType::Investment),
            other => Err(DomainError::validation(format!(
                "invalid category type \"{other}\", expected one of Expense, Income or Investment"
            ))),
        }
    }
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return a [DomainError::ValidationError] if `name` is
    /// empty or longer than [MAX_CATEGORY_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, DomainError> {
        let name = name.trim();

        if name.is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }

        if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "category name cannot be longer than {MAX_CATEGORY_NAME_LENGTH} characters"
            )));
        }

        Ok(Self(name.to_string()))
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's category for their records, e.g., 'Groceries' or 'Salary'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The id of the category.
    pub id: CategoryId,

    /// The name of the category, unique per user.
    pub name: CategoryName,

    /// The kind of record this category may be used for.
    #[serde(rename = "type")]
    pub category_type: CategoryType,

    /// Optional notes about the category.
    pub description: Option<String>,

    /// The user that owns the category.
    pub user_id: UserID,

    /// When the category was created.
    #[serde(with = "crate::timestamp")]
    pub created_at: OffsetDateTime,
}

/// The request body for creating or updating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(default)]
    pub description: Option<String>,
}

/// The validated fields that are written to the category store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub name: CategoryName,
    pub category_type: CategoryType,
    pub description: Option<String>,
}

impl TryFrom<CategoryInput> for CategoryFields {
    type Error = DomainError;

    fn try_from(input: CategoryInput) -> Result<Self, Self::Error> {
        Ok(Self {
            name: CategoryName::new(&input.name)?,
            category_type: input.category_type,
            description: input.description,
        })
    }
}


#[cfg(test)]
mod category_type_tests {
    use rusqlite::Connection;

    use super::CategoryType;

    #[test]
    fn parses_display_text() {
        for category_type in [
            CategoryType::Expense,
            CategoryType::Income,
            CategoryType::Investment,
        ] {
            assert_eq!(category_type.to_string().parse::<CategoryType>(), Ok(category_type));
        }
    }

    #[test]
    fn parse_rejects_unknown_type() {
        assert!("Savings".parse::<CategoryType>().is_err());
        assert!("income".parse::<CategoryType>().is_err());
    }

    #[test]
    fn deserialize_rejects_unknown_type() {
        let result = serde_json::from_str::<CategoryType>(r#""Savings""#);

        assert!(result.is_err());
    }

    #[test]
    fn stored_as_text() {
        let connection = Connection::open_in_memory().unwrap();

        let text: String = connection
            .query_row("SELECT ?1", [CategoryType::Investment], |row| row.get(0))
            .unwrap();
        let category_type: CategoryType = connection
            .query_row("SELECT 'Income'", [], |row| row.get(0))
            .unwrap();

        assert_eq!(text, "Investment");
        assert_eq!(category_type, CategoryType::Income);
    }

    #[test]
    fn reading_unknown_type_fails() {
        let connection = Connection::open_in_memory().unwrap();

        let result = connection.query_row("SELECT 'Savings'", [], |row| row.get::<_, CategoryType>(0));

        assert!(result.is_err());
    }
}
