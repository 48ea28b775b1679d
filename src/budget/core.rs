//! Defines the core data model and database queries for budgets.

use std::ops::RangeInclusive;

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    category::{CategoryKind, get_category},
    database_id::DatabaseId,
    money::{amount_from_column, validate_amount},
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// A spending ceiling for one category in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: DatabaseId,
    /// The amount of money budgeted for the month.
    pub amount: Decimal,
    /// The month the budget applies to, normalized to the first day.
    pub month: Date,
    /// The ID of the category the budget applies to.
    #[serde(rename = "category")]
    pub category_id: DatabaseId,
    /// The ID of the user that owns the budget.
    #[serde(skip_serializing)]
    pub user_id: UserID,
}

/// The data needed to create a budget, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The amount of money budgeted for the month. Must be at least one cent
    /// and at currency scale.
    pub amount: Decimal,
    /// The month the budget applies to. Any day of the month may be given;
    /// it is normalized to the first.
    pub month: Date,
    /// The ID of the category the budget applies to. Must be owned by the
    /// same user.
    pub category_id: DatabaseId,
}

/// A budget joined with the name and colour of its category.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRecord {
    /// The stored budget.
    pub budget: Budget,
    /// The name of the budget's category.
    pub category_name: String,
    /// The display colour of the budget's category.
    pub category_color: String,
}

/// Normalize a date to the first day of its month, the canonical form for
/// budget months.
pub(crate) fn normalize_month(date: Date) -> Date {
    date.replace_day(1).unwrap()
}

/// The first and last day of `month` (inclusive).
pub(crate) fn month_bounds(month: Date) -> RangeInclusive<Date> {
    let first_day = normalize_month(month);
    let last_day = first_day
        .replace_day(time::util::days_in_year_month(
            first_day.year(),
            first_day.month(),
        ))
        .unwrap();

    first_day..=last_day
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the budget table.
///
/// At most one budget may exist per user, category and month.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                amount TEXT NOT NULL,
                month TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                UNIQUE(user_id, category_id, month)
                )",
        (),
    )?;

    Ok(())
}

fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_amount: String = row.get(1)?;

    Ok(Budget {
        id: row.get(0)?,
        amount: amount_from_column(1, raw_amount)?,
        month: row.get(2)?,
        category_id: row.get(3)?,
        user_id: UserID::new(row.get(4)?),
    })
}

/// Create a new budget in the database.
///
/// The month is normalized to its first day, and the category must belong to
/// `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not a valid amount of money,
/// - [Error::InvalidCategory] if the category does not exist or belongs to
///   another user,
/// - [Error::DuplicateBudget] if a budget already exists for this category
///   and month,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    new_budget: NewBudget,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    validate_amount(new_budget.amount)?;

    get_category(new_budget.category_id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCategory,
        error => error,
    })?;

    connection
        .prepare(
            "INSERT INTO budget (amount, month, category_id, user_id)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, amount, month, category_id, user_id",
        )?
        .query_row(
            (
                new_budget.amount.to_string(),
                normalize_month(new_budget.month),
                new_budget.category_id,
                user_id.as_i64(),
            ),
            map_row_to_budget,
        )
        .map_err(|error| error.into())
}

/// Retrieve the budget with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn get_budget(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, amount, month, category_id, user_id FROM budget
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_row_to_budget,
        )
        .map_err(|error| error.into())
}

/// Retrieve `user_id`'s budgets with their category metadata, newest month
/// first and category name ascending within a month.
///
/// Passing a `month` restricts the result to budgets for that calendar month.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_budgets_by_user(
    user_id: UserID,
    month: Option<Date>,
    connection: &Connection,
) -> Result<Vec<BudgetRecord>, Error> {
    let mut query_string = "SELECT b.id, b.amount, b.month, b.category_id, b.user_id, c.name, c.color
         FROM budget b INNER JOIN category c ON b.category_id = c.id
         WHERE b.user_id = :user_id"
        .to_string();

    if month.is_some() {
        query_string.push_str(" AND b.month = :month");
    }

    query_string.push_str(" ORDER BY b.month DESC, c.name ASC");

    let map_row = |row: &Row| {
        let budget = map_row_to_budget(row)?;

        Ok(BudgetRecord {
            budget,
            category_name: row.get(5)?,
            category_color: row.get(6)?,
        })
    };

    let user_id = user_id.as_i64();
    let mut statement = connection.prepare(&query_string)?;

    let rows = match month {
        Some(month) => statement.query_map(
            rusqlite::named_params! {
                ":user_id": user_id,
                ":month": normalize_month(month),
            },
            map_row,
        )?,
        None => statement.query_map(&[(":user_id", &user_id)], map_row)?,
    };

    rows.map(|maybe_record| maybe_record.map_err(Error::SqlError))
        .collect()
}

/// Overwrite the amount, month and category of the budget with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a budget owned by `user_id`,
/// - [Error::DuplicateBudget] if the new category and month clash with
///   another of the user's budgets,
/// - or any error that [create_budget] can return for invalid input.
pub fn update_budget(
    id: DatabaseId,
    new_budget: NewBudget,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    validate_amount(new_budget.amount)?;

    get_category(new_budget.category_id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCategory,
        error => error,
    })?;

    let rows_affected = connection.execute(
        "UPDATE budget SET amount = ?1, month = ?2, category_id = ?3
         WHERE id = ?4 AND user_id = ?5",
        (
            new_budget.amount.to_string(),
            normalize_month(new_budget.month),
            new_budget.category_id,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_budget(id, user_id, connection)
}

/// Delete the budget with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = :id AND user_id = :user_id",
        &[(":id", &id), (":user_id", &user_id.as_i64())],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The amounts of `user_id`'s expense transactions in `category_id` during
/// the month containing `month`.
///
/// This is the input the budget utilization calculator expects: expenses
/// only, already scoped to the budget's user, category and calendar month.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_matching_expense_amounts(
    user_id: UserID,
    category_id: DatabaseId,
    month: Date,
    connection: &Connection,
) -> Result<Vec<Decimal>, Error> {
    let bounds = month_bounds(month);

    connection
        .prepare(
            "SELECT amount FROM \"transaction\"
             WHERE user_id = :user_id AND category_id = :category_id AND kind = :kind
                AND date BETWEEN :start AND :end",
        )?
        .query_map(
            rusqlite::named_params! {
                ":user_id": user_id.as_i64(),
                ":category_id": category_id,
                ":kind": CategoryKind::Expense,
                ":start": bounds.start(),
                ":end": bounds.end(),
            },
            |row| {
                let raw_amount: String = row.get(0)?;
                amount_from_column(0, raw_amount)
            },
        )?
        .map(|maybe_amount| maybe_amount.map_err(Error::SqlError))
        .collect()
}
