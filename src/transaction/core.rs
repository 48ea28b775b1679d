//! Defines the core data model, validation policy and database queries for
//! transactions.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    category::{CategoryKind, get_category},
    database_id::DatabaseId,
    money::{amount_from_column, validate_amount},
    user::UserID,
};

/// The longest transaction description that will be accepted.
pub(crate) const MAX_DESCRIPTION_LENGTH: usize = 255;

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// The amount of money spent or earned in this transaction.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether money was earned or spent. Always equal to the kind of the
    /// transaction's category.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
    /// The ID of the category the transaction belongs to.
    #[serde(rename = "category")]
    pub category_id: DatabaseId,
    /// The ID of the user that owns the transaction.
    #[serde(skip_serializing)]
    pub user_id: UserID,
}

/// The data needed to create a transaction, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money spent or earned. Must be at least one cent and at
    /// currency scale.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The kind the client asked for, if any. The category's kind always
    /// wins; see [resolve_kind].
    pub kind: Option<CategoryKind>,
    /// When the transaction happened. Must not be in the future.
    pub date: Date,
    /// The ID of the category the transaction belongs to. Must be owned by
    /// the same user.
    pub category_id: DatabaseId,
}

/// Decide the kind of a transaction being written against `category_kind`.
///
/// A transaction always takes on its category's kind. The requested kind is
/// only used to warn when a client sends a kind that contradicts the chosen
/// category, since clients selecting the kind independently of the category
/// are likely to be surprised by the override.
pub(crate) fn resolve_kind(
    requested: Option<CategoryKind>,
    category_kind: CategoryKind,
) -> CategoryKind {
    match requested {
        Some(requested) if requested != category_kind => {
            tracing::warn!(
                "requested transaction kind {requested} does not match category kind \
                 {category_kind}, using the category kind"
            );
        }
        _ => {}
    }

    category_kind
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table.
///
/// Note that because a transaction references the user and category tables,
/// those tables must also be set up in the database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                amount TEXT NOT NULL,
                description TEXT NOT NULL,
                kind TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_amount: String = row.get(1)?;

    Ok(Transaction {
        id: row.get(0)?,
        amount: amount_from_column(1, raw_amount)?,
        description: row.get(2)?,
        kind: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
        category_id: row.get(6)?,
        user_id: UserID::new(row.get(7)?),
    })
}

fn validate(new_transaction: &NewTransaction) -> Result<(), Error> {
    validate_amount(new_transaction.amount)?;

    if new_transaction.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(Error::DescriptionTooLong(MAX_DESCRIPTION_LENGTH));
    }

    if new_transaction.date > OffsetDateTime::now_utc().date() {
        return Err(Error::FutureDate(new_transaction.date));
    }

    Ok(())
}

/// Create a new transaction in the database.
///
/// Dates must be no later than today, and the category must belong to
/// `user_id`. The transaction's kind is taken from the category via
/// [resolve_kind].
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not a valid amount of money,
/// - [Error::DescriptionTooLong] if the description is too long,
/// - [Error::FutureDate] if the date is in the future,
/// - [Error::InvalidCategory] if the category does not exist or belongs to
///   another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate(&new_transaction)?;

    // The client must not learn whether the category exists but belongs to
    // someone else, so both cases map to the same error.
    let category = get_category(new_transaction.category_id, user_id, connection)
        .map_err(|error| match error {
            Error::NotFound => Error::InvalidCategory,
            error => error,
        })?;

    let kind = resolve_kind(new_transaction.kind, category.kind);
    let created_at = OffsetDateTime::now_utc();

    connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, description, kind, date, created_at, category_id, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, amount, description, kind, date, created_at, category_id, user_id",
        )?
        .query_row(
            (
                new_transaction.amount.to_string(),
                &new_transaction.description,
                kind,
                new_transaction.date,
                created_at,
                new_transaction.category_id,
                user_id.as_i64(),
            ),
            map_row_to_transaction,
        )
        .map_err(|error| error.into())
}

/// Retrieve the transaction with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, amount, description, kind, date, created_at, category_id, user_id
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_row_to_transaction,
        )
        .map_err(|error| error.into())
}

/// Overwrite the mutable fields of the transaction with `id`.
///
/// The same validation as [create_transaction] applies; `created_at` is left
/// untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by
///   `user_id`,
/// - or any error that [create_transaction] can return for invalid input.
pub fn update_transaction(
    id: DatabaseId,
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate(&new_transaction)?;

    let category = get_category(new_transaction.category_id, user_id, connection)
        .map_err(|error| match error {
            Error::NotFound => Error::InvalidCategory,
            error => error,
        })?;

    let kind = resolve_kind(new_transaction.kind, category.kind);

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET amount = ?1, description = ?2, kind = ?3, date = ?4, category_id = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            new_transaction.amount.to_string(),
            &new_transaction.description,
            kind,
            new_transaction.date,
            new_transaction.category_id,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_transaction(id, user_id, connection)
}

/// Delete the transaction with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        &[(":id", &id), (":user_id", &user_id.as_i64())],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod resolve_kind_tests {
    use crate::category::CategoryKind;

    use super::resolve_kind;

    #[test]
    fn category_kind_wins_over_requested_kind() {
        let kind = resolve_kind(Some(CategoryKind::Income), CategoryKind::Expense);

        assert_eq!(kind, CategoryKind::Expense);
    }

    #[test]
    fn matching_kind_is_kept() {
        let kind = resolve_kind(Some(CategoryKind::Income), CategoryKind::Income);

        assert_eq!(kind, CategoryKind::Income);
    }

    #[test]
    fn missing_kind_defaults_to_category_kind() {
        let kind = resolve_kind(None, CategoryKind::Expense);

        assert_eq!(kind, CategoryKind::Expense);
    }
}

#[cfg(test)]
mod transaction_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::{Duration, OffsetDateTime, macros::date};

    use crate::{
        Error,
        category::{Category, CategoryKind, CategoryName, Color, NewCategory, create_category},
        db::initialize,
        test_utils::{insert_test_user, insert_user_with_email},
        user::UserID,
    };

    use super::{
        NewTransaction, create_transaction, delete_transaction, get_transaction,
        update_transaction,
    };

    fn get_test_connection() -> (Connection, UserID, Category) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user_id = insert_test_user(&conn);

        let category = create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                kind: CategoryKind::Expense,
                color: Color::default(),
                user_id,
            },
            &conn,
        )
        .unwrap();

        (conn, user_id, category)
    }

    fn new_transaction(category_id: i64) -> NewTransaction {
        NewTransaction {
            amount: dec!(42.50),
            description: "Weekly shop".to_owned(),
            kind: None,
            date: date!(2024 - 03 - 15),
            category_id,
        }
    }

    #[test]
    fn create_transaction_succeeds() {
        let (conn, user_id, category) = get_test_connection();

        let transaction =
            create_transaction(new_transaction(category.id), user_id, &conn).unwrap();

        assert!(transaction.id > 0);
        assert_eq!(transaction.amount, dec!(42.50));
        assert_eq!(transaction.description, "Weekly shop");
        assert_eq!(transaction.kind, CategoryKind::Expense);
        assert_eq!(transaction.date, date!(2024 - 03 - 15));
        assert_eq!(transaction.category_id, category.id);
        assert_eq!(transaction.user_id, user_id);
    }

    #[test]
    fn create_transaction_coerces_kind_to_category_kind() {
        let (conn, user_id, category) = get_test_connection();

        let transaction = create_transaction(
            NewTransaction {
                kind: Some(CategoryKind::Income),
                ..new_transaction(category.id)
            },
            user_id,
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.kind, CategoryKind::Expense);
    }

    #[test]
    fn create_transaction_fails_on_invalid_amount() {
        let (conn, user_id, category) = get_test_connection();

        let result = create_transaction(
            NewTransaction {
                amount: dec!(0),
                ..new_transaction(category.id)
            },
            user_id,
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidAmount(dec!(0))));
    }

    #[test]
    fn create_transaction_fails_on_future_date() {
        let (conn, user_id, category) = get_test_connection();
        let tomorrow = OffsetDateTime::now_utc().date() + Duration::days(1);

        let result = create_transaction(
            NewTransaction {
                date: tomorrow,
                ..new_transaction(category.id)
            },
            user_id,
            &conn,
        );

        assert_eq!(result, Err(Error::FutureDate(tomorrow)));
    }

    #[test]
    fn create_transaction_fails_on_nonexistent_category() {
        let (conn, user_id, category) = get_test_connection();

        let result = create_transaction(new_transaction(category.id + 1337), user_id, &conn);

        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn create_transaction_fails_on_other_users_category() {
        let (conn, _user_id, someone_elses_category) = get_test_connection();
        let unauthorized_user = insert_user_with_email("other@test.com", &conn);

        let result = create_transaction(
            new_transaction(someone_elses_category.id),
            unauthorized_user,
            &conn,
        );

        // The same error as a nonexistent category, so the response does not
        // reveal that the category exists.
        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn get_transaction_succeeds() {
        let (conn, user_id, category) = get_test_connection();
        let inserted = create_transaction(new_transaction(category.id), user_id, &conn).unwrap();

        let selected = get_transaction(inserted.id, user_id, &conn).unwrap();

        assert_eq!(inserted, selected);
    }

    #[test]
    fn get_transaction_fails_on_invalid_id() {
        let (conn, user_id, category) = get_test_connection();
        let inserted = create_transaction(new_transaction(category.id), user_id, &conn).unwrap();

        let selected = get_transaction(inserted.id + 1, user_id, &conn);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn update_transaction_overwrites_mutable_fields() {
        let (conn, user_id, category) = get_test_connection();
        let inserted = create_transaction(new_transaction(category.id), user_id, &conn).unwrap();

        let updated = update_transaction(
            inserted.id,
            NewTransaction {
                amount: dec!(55.00),
                description: "Bigger weekly shop".to_owned(),
                kind: None,
                date: date!(2024 - 03 - 16),
                category_id: category.id,
            },
            user_id,
            &conn,
        )
        .unwrap();

        assert_eq!(updated.id, inserted.id);
        assert_eq!(updated.amount, dec!(55.00));
        assert_eq!(updated.description, "Bigger weekly shop");
        assert_eq!(updated.date, date!(2024 - 03 - 16));
        assert_eq!(updated.created_at, inserted.created_at);
    }

    #[test]
    fn update_transaction_fails_on_missing_id() {
        let (conn, user_id, category) = get_test_connection();

        let result = update_transaction(1337, new_transaction(category.id), user_id, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_removes_row() {
        let (conn, user_id, category) = get_test_connection();
        let inserted = create_transaction(new_transaction(category.id), user_id, &conn).unwrap();

        delete_transaction(inserted.id, user_id, &conn).unwrap();

        assert_eq!(
            get_transaction(inserted.id, user_id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_transaction_fails_on_missing_id() {
        let (conn, user_id, _category) = get_test_connection();

        assert_eq!(delete_transaction(1337, user_id, &conn), Err(Error::NotFound));
    }
}
