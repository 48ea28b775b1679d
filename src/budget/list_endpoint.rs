//! The route handler for listing budgets with their derived utilization.
//!
//! The stored budget row only has an amount; the interesting fields
//! (`actual_spent`, `remaining_budget`, `percentage_used`, `is_over_budget`)
//! are computed on read by the utilization calculator and merged with the
//! category metadata here.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    app_state::DbState,
    budget::core::{BudgetRecord, get_budgets_by_user, get_matching_expense_amounts},
    budget::utilization::utilization,
    database_id::DatabaseId,
    user::UserID,
};

/// The optional filters for a budget list request.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct BudgetListParams {
    /// Restrict the list to budgets for this calendar month. Any day of the
    /// month is accepted.
    pub month: Option<Date>,
}

/// A budget as presented to the client: the stored fields plus category
/// metadata and utilization figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BudgetView {
    /// The ID of the budget.
    pub id: DatabaseId,
    /// The ID of the budget's category.
    pub category: DatabaseId,
    /// The name of the budget's category.
    pub category_name: String,
    /// The display colour of the budget's category.
    pub category_color: String,
    /// The amount of money budgeted for the month.
    pub amount: Decimal,
    /// The month the budget applies to, normalized to the first day.
    pub month: Date,
    /// The summed expense amounts charged against the budget this month.
    pub actual_spent: Decimal,
    /// The budgeted amount minus the actual spend.
    pub remaining_budget: Decimal,
    /// The actual spend as a percentage of the budgeted amount, rounded to
    /// two decimal places for display.
    pub percentage_used: Decimal,
    /// Whether the actual spend strictly exceeds the budgeted amount.
    pub is_over_budget: bool,
}

/// A route handler for listing a user's budgets with utilization figures,
/// newest month first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_budgets_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<BudgetListParams>,
) -> Result<Json<Vec<BudgetView>>, Error> {
    let connection = state.db_connection.lock().unwrap();
    let records = get_budgets_by_user(user_id, params.month, &connection)?;

    let views = records
        .into_iter()
        .map(|record| {
            let BudgetRecord {
                budget,
                category_name,
                category_color,
            } = record;

            let expenses = get_matching_expense_amounts(
                user_id,
                budget.category_id,
                budget.month,
                &connection,
            )?;
            let status = utilization(budget.amount, &expenses);

            Ok(BudgetView {
                id: budget.id,
                category: budget.category_id,
                category_name,
                category_color,
                amount: budget.amount,
                month: budget.month,
                actual_spent: status.actual_spent,
                remaining_budget: status.remaining,
                percentage_used: status.percentage_used.round_dp(2),
                is_over_budget: status.is_over_budget,
            })
        })
        .collect::<Result<Vec<BudgetView>, Error>>()?;

    Ok(Json(views))
}

#[cfg(test)]
mod list_budgets_endpoint_tests {
    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        AppState,
        budget::core::{NewBudget, create_budget},
        category::{CategoryKind, CategoryName, Color, NewCategory, create_category},
        endpoints,
        test_utils::test_state,
        transaction::{NewTransaction, create_transaction},
        user::UserID,
    };

    use super::list_budgets_endpoint;

    fn get_test_server() -> TestServer {
        let (state, user_id) = test_state();
        seed(&state, user_id);

        let app = Router::new()
            .route(endpoints::BUDGETS, get(list_budgets_endpoint))
            .layer(Extension(user_id))
            .with_state(state);

        TestServer::new(app)
    }

    fn seed(state: &AppState, user_id: UserID) {
        let connection = state.db_connection.lock().unwrap();

        let groceries = create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                kind: CategoryKind::Expense,
                color: Color::new_unchecked("#ef4444"),
                user_id,
            },
            &connection,
        )
        .unwrap();
        let travel = create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Travel"),
                kind: CategoryKind::Expense,
                color: Color::default(),
                user_id,
            },
            &connection,
        )
        .unwrap();

        create_budget(
            NewBudget {
                amount: dec!(300.00),
                month: date!(2024 - 03 - 01),
                category_id: groceries.id,
            },
            user_id,
            &connection,
        )
        .unwrap();
        create_budget(
            NewBudget {
                amount: dec!(200.00),
                month: date!(2024 - 02 - 01),
                category_id: travel.id,
            },
            user_id,
            &connection,
        )
        .unwrap();

        let insert = |amount, date, category_id| {
            create_transaction(
                NewTransaction {
                    amount,
                    description: "Test".to_owned(),
                    kind: None,
                    date,
                    category_id,
                },
                user_id,
                &connection,
            )
            .unwrap()
        };

        // 350 against the March groceries budget, nothing against travel.
        insert(dec!(200.00), date!(2024 - 03 - 05), groceries.id);
        insert(dec!(150.00), date!(2024 - 03 - 20), groceries.id);
        // A different month, so it must not count.
        insert(dec!(75.00), date!(2024 - 02 - 10), groceries.id);
    }

    #[tokio::test]
    async fn lists_budgets_with_utilization() {
        let server = get_test_server();

        let response = server.get(endpoints::BUDGETS).await;

        response.assert_status_ok();
        let budgets: Value = response.json();
        let budgets = budgets.as_array().unwrap();

        assert_eq!(budgets.len(), 2);

        // Newest month first: the over-spent March groceries budget.
        assert_eq!(budgets[0]["category_name"], json!("Groceries"));
        assert_eq!(budgets[0]["category_color"], json!("#ef4444"));
        assert_eq!(budgets[0]["actual_spent"], json!("350.00"));
        assert_eq!(budgets[0]["remaining_budget"], json!("-50.00"));
        assert_eq!(budgets[0]["percentage_used"], json!("116.67"));
        assert_eq!(budgets[0]["is_over_budget"], json!(true));

        // The untouched February travel budget.
        assert_eq!(budgets[1]["category_name"], json!("Travel"));
        assert_eq!(budgets[1]["actual_spent"], json!("0"));
        assert_eq!(budgets[1]["remaining_budget"], json!("200.00"));
        let percentage: f64 = budgets[1]["percentage_used"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(percentage, 0.0);
        assert_eq!(budgets[1]["is_over_budget"], json!(false));
    }

    #[tokio::test]
    async fn filters_by_month() {
        let server = get_test_server();

        let response = server
            .get(endpoints::BUDGETS)
            .add_query_param("month", "2024-03-15")
            .await;

        response.assert_status_ok();
        let budgets: Value = response.json();
        let budgets = budgets.as_array().unwrap();

        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0]["category_name"], json!("Groceries"));
    }
}
