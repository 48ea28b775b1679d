//! The route handler for editing transactions.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error,
    app_state::DbState,
    database_id::DatabaseId,
    transaction::core::{Transaction, update_transaction},
    transaction::create_endpoint::TransactionForm,
    user::UserID,
};

/// A route handler for overwriting a transaction's mutable fields.
///
/// The kind is re-derived from the (possibly new) category, and the creation
/// timestamp is preserved.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn edit_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<DatabaseId>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.db_connection.lock().unwrap();
    let transaction = update_transaction(transaction_id, form.into(), user_id, &connection)?;

    Ok(Json(transaction))
}
