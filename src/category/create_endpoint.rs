//! The route handler for creating categories.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    Error,
    app_state::DbState,
    category::core::{Category, CategoryKind, CategoryName, Color, NewCategory, create_category},
    user::UserID,
};

/// The fields a client sends to create or edit a category.
#[derive(Debug, Deserialize)]
pub(crate) struct CategoryForm {
    /// The name of the category.
    pub name: String,
    /// Whether the category records income or expenses.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// The colour used when charting the category. Defaults to the app's
    /// standard blue when omitted.
    pub color: Option<String>,
}

impl CategoryForm {
    /// Validate the form fields into a [NewCategory] owned by `user_id`.
    pub(crate) fn into_new_category(self, user_id: UserID) -> Result<NewCategory, Error> {
        let color = match self.color {
            Some(raw_color) => Color::new(&raw_color)?,
            None => Color::default(),
        };

        Ok(NewCategory {
            name: CategoryName::new(&self.name)?,
            kind: self.kind,
            color,
            user_id,
        })
    }
}

/// A route handler for creating a new category.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_category_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<CategoryForm>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let new_category = form.into_new_category(user_id)?;

    let connection = state.db_connection.lock().unwrap();
    let category = create_category(new_category, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}
