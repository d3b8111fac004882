//! Categories group a user's records, e.g. 'Groceries' for transactions or
//! 'Salary' for incomes. Each category has a type that decides which kind of
//! record may use it.

mod domain;
mod endpoints;
mod guard;
mod service;
mod sqlite;
mod store;

pub use domain::{Category, CategoryFields, CategoryInput, CategoryName, CategoryType};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, list_categories_endpoint,
    update_category_endpoint,
};
pub use guard::ensure_category_type;
pub use service::CategoryService;
pub use sqlite::{SQLiteCategoryStore, create_category_table};
pub use store::{CategoryLookup, CategoryStore};
