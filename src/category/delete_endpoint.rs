//! The route handler for deleting categories.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error, app_state::DbState, category::core::delete_category, database_id::DatabaseId,
    user::UserID,
};

/// A route handler for deleting a category.
///
/// Deleting a category also deletes its transactions and budgets.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_category_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<DatabaseId>,
) -> Result<StatusCode, Error> {
    let connection = state.db_connection.lock().unwrap();
    delete_category(category_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
