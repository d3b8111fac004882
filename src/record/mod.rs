//! Transactions, incomes and investments: the financial records a user keeps.
//!
//! The three kinds are stored in separate tables but share one service, one
//! store implementation and one set of HTTP handlers.

mod domain;
mod endpoints;
mod kind;
mod service;
mod sqlite;
mod store;

pub use domain::{FinancialRecord, RecordFields, RecordInput, RecordRow};
pub use endpoints::{
    RecordState, create_record_endpoint, delete_record_endpoint, list_records_endpoint,
    update_record_endpoint,
};
pub use kind::RecordKind;
pub use service::RecordService;
pub use sqlite::{SQLiteRecordStore, create_record_table};
pub use store::RecordStore;
