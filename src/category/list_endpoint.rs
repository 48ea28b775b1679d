//! The route handlers for reading categories.
//!
//! Listed categories carry usage statistics (how many transactions and how
//! much money they account for), so the client can show them without another
//! round trip.

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    Error,
    app_state::DbState,
    category::core::{Category, get_categories_by_user, get_category},
    database_id::DatabaseId,
    transaction::{TransactionFilter, query_transactions},
    user::UserID,
};

/// A category plus its usage statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CategoryView {
    /// The stored category.
    #[serde(flatten)]
    pub category: Category,
    /// How many of the user's transactions use the category.
    pub transaction_count: usize,
    /// The sum of those transactions' amounts.
    pub total_amount: Decimal,
}

fn with_stats(
    categories: Vec<Category>,
    user_id: UserID,
    state: &DbState,
) -> Result<Vec<CategoryView>, Error> {
    let connection = state.db_connection.lock().unwrap();
    let records = query_transactions(user_id, &TransactionFilter::default(), &connection)?;

    let mut stats: HashMap<DatabaseId, (usize, Decimal)> = HashMap::new();

    for record in records {
        let (count, total) = stats
            .entry(record.category_id)
            .or_insert((0, Decimal::ZERO));
        *count += 1;
        *total += record.amount;
    }

    Ok(categories
        .into_iter()
        .map(|category| {
            let (transaction_count, total_amount) =
                stats.get(&category.id).copied().unwrap_or((0, Decimal::ZERO));

            CategoryView {
                category,
                transaction_count,
                total_amount,
            }
        })
        .collect())
}

/// A route handler for listing all of a user's categories, ordered by kind
/// then name.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_categories_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<CategoryView>>, Error> {
    let categories = {
        let connection = state.db_connection.lock().unwrap();
        get_categories_by_user(user_id, &connection)?
    };

    Ok(Json(with_stats(categories, user_id, &state)?))
}

/// A route handler for fetching a single category.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_category_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<DatabaseId>,
) -> Result<Json<CategoryView>, Error> {
    let category = {
        let connection = state.db_connection.lock().unwrap();
        get_category(category_id, user_id, &connection)?
    };

    let mut views = with_stats(vec![category], user_id, &state)?;

    Ok(Json(views.remove(0)))
}
