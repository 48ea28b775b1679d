//! The route handler for editing budgets.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error,
    app_state::DbState,
    budget::core::{Budget, update_budget},
    budget::create_endpoint::BudgetForm,
    database_id::DatabaseId,
    user::UserID,
};

/// A route handler for overwriting a budget's amount, month and category.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn edit_budget_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<DatabaseId>,
    Json(form): Json<BudgetForm>,
) -> Result<Json<Budget>, Error> {
    let connection = state.db_connection.lock().unwrap();
    let budget = update_budget(budget_id, form.into(), user_id, &connection)?;

    Ok(Json(budget))
}

#[cfg(test)]
mod edit_budget_endpoint_tests {
    use axum::{Extension, Router, http::StatusCode, routing::put};
    use axum_test::TestServer;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        budget::core::{NewBudget, create_budget},
        category::{CategoryKind, CategoryName, Color, NewCategory, create_category},
        endpoints::{self, format_endpoint},
        test_utils::test_state,
    };

    use super::edit_budget_endpoint;

    fn get_test_server() -> (TestServer, i64, i64) {
        let (state, user_id) = test_state();

        let (budget_id, category_id) = {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                NewCategory {
                    name: CategoryName::new_unchecked("Groceries"),
                    kind: CategoryKind::Expense,
                    color: Color::default(),
                    user_id,
                },
                &connection,
            )
            .unwrap();

            let budget = create_budget(
                NewBudget {
                    amount: dec!(300.00),
                    month: date!(2024 - 03 - 01),
                    category_id: category.id,
                },
                user_id,
                &connection,
            )
            .unwrap();

            (budget.id, category.id)
        };

        let app = Router::new()
            .route(endpoints::BUDGET, put(edit_budget_endpoint))
            .layer(Extension(user_id))
            .with_state(state);

        let server = TestServer::new(app);

        (server, budget_id, category_id)
    }

    #[tokio::test]
    async fn edits_budget() {
        let (server, budget_id, category_id) = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::BUDGET, budget_id))
            .json(&json!({
                "amount": "450.00",
                "month": "2024-03-10",
                "category": category_id,
            }))
            .await;

        response.assert_status_ok();
        let budget: Value = response.json();
        assert_eq!(budget["amount"], json!("450.00"));
        assert_eq!(budget["month"], json!("2024-03-01"));
    }

    #[tokio::test]
    async fn edit_fails_on_unknown_id() {
        let (server, budget_id, category_id) = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::BUDGET, budget_id + 1337))
            .json(&json!({
                "amount": "450.00",
                "month": "2024-03-10",
                "category": category_id,
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
