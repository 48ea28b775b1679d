//! The route handler for editing categories.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error,
    app_state::DbState,
    category::core::{Category, update_category},
    category::create_endpoint::CategoryForm,
    database_id::DatabaseId,
    user::UserID,
};

/// A route handler for overwriting a category's name, kind and colour.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn edit_category_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<DatabaseId>,
    Json(form): Json<CategoryForm>,
) -> Result<Json<Category>, Error> {
    let new_category = form.into_new_category(user_id)?;

    let connection = state.db_connection.lock().unwrap();
    let category = update_category(category_id, new_category, &connection)?;

    Ok(Json(category))
}
