//! The route handlers for reading transactions.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::DbState,
    category::CategoryKind,
    database_id::DatabaseId,
    transaction::query::{
        TransactionFilter, TransactionRecord, get_transaction_record, query_transactions,
    },
    user::UserID,
};

/// The optional filters for a transaction list request.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TransactionListParams {
    /// Include transactions on or after this date.
    pub start_date: Option<Date>,
    /// Include transactions on or before this date.
    pub end_date: Option<Date>,
    /// Include only income or only expense transactions.
    #[serde(rename = "type")]
    pub kind: Option<CategoryKind>,
    /// Include only transactions in this category.
    pub category: Option<DatabaseId>,
}

impl TransactionListParams {
    fn into_filter(self) -> TransactionFilter {
        let date_range = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(start..=end),
            (Some(start), None) => Some(start..=Date::MAX),
            (None, Some(end)) => Some(Date::MIN..=end),
            (None, None) => None,
        };

        TransactionFilter {
            date_range,
            kind: self.kind,
            category_id: self.category,
        }
    }
}

/// A route handler for listing a user's transactions, newest first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_transactions_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<Vec<TransactionRecord>>, Error> {
    let connection = state.db_connection.lock().unwrap();
    let records = query_transactions(user_id, &params.into_filter(), &connection)?;

    Ok(Json(records))
}

/// A route handler for fetching a single transaction with its category
/// metadata.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<DatabaseId>,
) -> Result<Json<TransactionRecord>, Error> {
    let connection = state.db_connection.lock().unwrap();
    let record = get_transaction_record(transaction_id, user_id, &connection)?;

    Ok(Json(record))
}
