//! The route handler for creating budgets.

use axum::{Extension, Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::DbState,
    budget::core::{Budget, NewBudget, create_budget},
    database_id::DatabaseId,
    user::UserID,
};

/// The fields a client sends to create or edit a budget.
#[derive(Debug, Deserialize)]
pub(crate) struct BudgetForm {
    /// The amount of money budgeted for the month.
    pub amount: Decimal,
    /// The month the budget applies to, ISO `YYYY-MM-DD`. Any day of the
    /// month is accepted.
    pub month: Date,
    /// The ID of the category the budget applies to.
    pub category: DatabaseId,
}

impl From<BudgetForm> for NewBudget {
    fn from(form: BudgetForm) -> Self {
        Self {
            amount: form.amount,
            month: form.month,
            category_id: form.category,
        }
    }
}

/// A route handler for creating a new budget.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_budget_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<BudgetForm>,
) -> Result<(StatusCode, Json<Budget>), Error> {
    let connection = state.db_connection.lock().unwrap();
    let budget = create_budget(form.into(), user_id, &connection)?;

    Ok((StatusCode::CREATED, Json(budget)))
}
