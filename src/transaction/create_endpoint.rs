//! The route handler for creating transactions.

use axum::{Extension, Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::DbState,
    category::CategoryKind,
    database_id::DatabaseId,
    transaction::core::{NewTransaction, Transaction, create_transaction},
    user::UserID,
};

/// The fields a client sends to create or edit a transaction.
#[derive(Debug, Deserialize)]
pub(crate) struct TransactionForm {
    /// The amount of money spent or earned.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The kind the client selected, if any. The category's kind wins on a
    /// mismatch, so clients should treat this as advisory.
    #[serde(rename = "type")]
    pub kind: Option<CategoryKind>,
    /// When the transaction happened, ISO `YYYY-MM-DD`.
    pub date: Date,
    /// The ID of the category the transaction belongs to.
    pub category: DatabaseId,
}

impl From<TransactionForm> for NewTransaction {
    fn from(form: TransactionForm) -> Self {
        Self {
            amount: form.amount,
            description: form.description,
            kind: form.kind,
            date: form.date,
            category_id: form.category,
        }
    }
}

/// A route handler for creating a new transaction.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = state.db_connection.lock().unwrap();
    let transaction = create_transaction(form.into(), user_id, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use axum::{Extension, Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        category::{CategoryKind, CategoryName, Color, NewCategory, create_category},
        endpoints,
        test_utils::test_state,
    };

    use super::create_transaction_endpoint;

    fn get_test_server() -> (TestServer, i64) {
        let (state, user_id) = test_state();

        let category_id = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                NewCategory {
                    name: CategoryName::new_unchecked("Groceries"),
                    kind: CategoryKind::Expense,
                    color: Color::default(),
                    user_id,
                },
                &connection,
            )
            .unwrap()
            .id
        };

        let app = Router::new()
            .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
            .layer(Extension(user_id))
            .with_state(state);

        let server = TestServer::new(app);

        (server, category_id)
    }

    #[tokio::test]
    async fn creates_transaction() {
        let (server, category_id) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "42.50",
                "description": "Weekly shop",
                "date": "2024-03-15",
                "category": category_id,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction: Value = response.json();
        assert_eq!(transaction["amount"], json!("42.50"));
        assert_eq!(transaction["type"], json!("expense"));
        assert_eq!(transaction["date"], json!("2024-03-15"));
        assert_eq!(transaction["category"], json!(category_id));
    }

    #[tokio::test]
    async fn kind_is_coerced_to_the_category_kind() {
        let (server, category_id) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "42.50",
                "description": "Weekly shop",
                "type": "income",
                "date": "2024-03-15",
                "category": category_id,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction: Value = response.json();
        assert_eq!(transaction["type"], json!("expense"));
    }

    #[tokio::test]
    async fn rejects_invalid_amount() {
        let (server, category_id) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "0.00",
                "description": "Free lunch",
                "date": "2024-03-15",
                "category": category_id,
            }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn rejects_unknown_category() {
        let (server, category_id) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "42.50",
                "description": "Weekly shop",
                "date": "2024-03-15",
                "category": category_id + 1337,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
