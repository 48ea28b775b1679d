//! The route handler for deleting budgets.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error, app_state::DbState, budget::core::delete_budget, database_id::DatabaseId, user::UserID,
};

/// A route handler for deleting a budget.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_budget_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<DatabaseId>,
) -> Result<StatusCode, Error> {
    let connection = state.db_connection.lock().unwrap();
    delete_budget(budget_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
