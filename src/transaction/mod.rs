//! Transactions are dated movements of money, each tied to one of the user's
//! categories. A transaction's kind always mirrors its category's kind; the
//! write path enforces this through an explicit coercion policy.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod query;

pub use core::{NewTransaction, Transaction, create_transaction, create_transaction_table};
pub(crate) use core::{delete_transaction, get_transaction, update_transaction};
pub(crate) use create_endpoint::{TransactionForm, create_transaction_endpoint};
pub(crate) use delete_endpoint::delete_transaction_endpoint;
pub(crate) use edit_endpoint::edit_transaction_endpoint;
pub(crate) use list_endpoint::{get_transaction_endpoint, list_transactions_endpoint};
pub(crate) use query::{
    TransactionFilter, TransactionRecord, get_transaction_record, query_transactions,
};
