//! The kinds of financial record a user can keep.

use crate::{category::CategoryType, domain_error::ResourceKind, endpoints};

/// Transactions, incomes and investments share the same shape and differ only
/// in where they are stored and which type of category they may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Money spent, filed under an [CategoryType::Expense] category.
    Transaction,
    /// Money earned, filed under an [CategoryType::Income] category.
    Income,
    /// Money invested, filed under an [CategoryType::Investment] category.
    Investment,
}

impl RecordKind {
    /// Every record kind.
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Transaction,
        RecordKind::Income,
        RecordKind::Investment,
    ];

    /// The type a category must have for a record of this kind to use it.
    pub fn required_category_type(self) -> CategoryType {
        match self {
            RecordKind::Transaction => CategoryType::Expense,
            RecordKind::Income => CategoryType::Income,
            RecordKind::Investment => CategoryType::Investment,
        }
    }

    /// The database table that holds records of this kind.
    pub fn table_name(self) -> &'static str {
        match self {
            RecordKind::Transaction => "expense",
            RecordKind::Income => "income",
            RecordKind::Investment => "investment",
        }
    }

    /// The name used for this kind in error messages.
    pub fn resource_kind(self) -> ResourceKind {
        match self {
            RecordKind::Transaction => ResourceKind::Transaction,
            RecordKind::Income => ResourceKind::Income,
            RecordKind::Investment => ResourceKind::Investment,
        }
    }

    /// The route for listing and creating records of this kind.
    pub fn collection_path(self) -> &'static str {
        match self {
            RecordKind::Transaction => endpoints::TRANSACTIONS,
            RecordKind::Income => endpoints::INCOMES,
            RecordKind::Investment => endpoints::INVESTMENTS,
        }
    }

    /// The route for updating and deleting a single record of this kind.
    pub fn item_path(self) -> &'static str {
        match self {
            RecordKind::Transaction => endpoints::TRANSACTION,
            RecordKind::Income => endpoints::INCOME,
            RecordKind::Investment => endpoints::INVESTMENT,
        }
    }
}

#[cfg(test)]
mod record_kind_tests {
    use std::collections::HashSet;

    use crate::category::CategoryType;

    use super::RecordKind;

    #[test]
    fn transactions_require_expense_categories() {
        assert_eq!(
            RecordKind::Transaction.required_category_type(),
            CategoryType::Expense
        );
    }

    #[test]
    fn each_kind_has_its_own_table_and_routes() {
        let tables: HashSet<_> = RecordKind::ALL.iter().map(|kind| kind.table_name()).collect();
        let paths: HashSet<_> = RecordKind::ALL
            .iter()
            .map(|kind| kind.collection_path())
            .collect();

        assert_eq!(tables.len(), RecordKind::ALL.len());
        assert_eq!(paths.len(), RecordKind::ALL.len());
    }

    #[test]
    fn item_path_extends_collection_path() {
        for kind in RecordKind::ALL {
            assert!(kind.item_path().starts_with(kind.collection_path()));
        }
    }
}
