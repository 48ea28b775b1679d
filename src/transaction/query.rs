//! Filtered retrieval of transactions joined with their category metadata.
//!
//! The list endpoint and the summary engine both consume
//! [TransactionRecord]s: the raw transaction fields plus the category name
//! and colour needed for display and grouping.

use std::ops::RangeInclusive;

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error, category::CategoryKind, database_id::DatabaseId, money::amount_from_column,
    user::UserID,
};

/// A transaction joined with the name and colour of its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// The amount of money spent or earned in this transaction.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
    /// The ID of the category the transaction belongs to.
    #[serde(rename = "category")]
    pub category_id: DatabaseId,
    /// The name of the transaction's category.
    pub category_name: String,
    /// The display colour of the transaction's category.
    pub category_color: String,
}

/// Defines how transactions should be filtered by [query_transactions].
///
/// The default filter selects all of a user's transactions.
#[derive(Debug, Default)]
pub struct TransactionFilter {
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Include only income or only expense transactions.
    pub kind: Option<CategoryKind>,
    /// Include only transactions in the category with this ID.
    pub category_id: Option<DatabaseId>,
}

const SELECT_RECORD: &str = "SELECT t.id, t.amount, t.description, t.kind, t.date, t.created_at, \
     t.category_id, c.name, c.color \
     FROM \"transaction\" t INNER JOIN category c ON t.category_id = c.id";

fn map_row_to_record(row: &Row) -> Result<TransactionRecord, rusqlite::Error> {
    let raw_amount: String = row.get(1)?;

    Ok(TransactionRecord {
        id: row.get(0)?,
        amount: amount_from_column(1, raw_amount)?,
        description: row.get(2)?,
        kind: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
        category_id: row.get(6)?,
        category_name: row.get(7)?,
        category_color: row.get(8)?,
    })
}

/// Query for `user_id`'s transactions, newest first.
///
/// Results are ordered by date descending, then creation time descending
/// (ties broken by ID descending), matching the order transactions are shown
/// in the client.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn query_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<TransactionRecord>, Error> {
    let mut where_clause_parts = vec!["t.user_id = ?1".to_string()];
    let mut query_parameters = vec![Value::Integer(user_id.as_i64())];

    if let Some(date_range) = &filter.date_range {
        where_clause_parts.push(format!(
            "t.date BETWEEN ?{} AND ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        ));
        query_parameters.push(Value::Text(date_range.start().to_string()));
        query_parameters.push(Value::Text(date_range.end().to_string()));
    }

    if let Some(kind) = filter.kind {
        where_clause_parts.push(format!("t.kind = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(kind.as_str().to_string()));
    }

    if let Some(category_id) = filter.category_id {
        where_clause_parts.push(format!("t.category_id = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Integer(category_id));
    }

    let query_string = format!(
        "{SELECT_RECORD} WHERE {} ORDER BY t.date DESC, t.created_at DESC, t.id DESC",
        where_clause_parts.join(" AND ")
    );
    let params = params_from_iter(query_parameters.iter());

    connection
        .prepare(&query_string)?
        .query_map(params, map_row_to_record)?
        .map(|maybe_record| maybe_record.map_err(Error::SqlError))
        .collect()
}

/// Retrieve a single transaction with its category metadata.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction_record(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionRecord, Error> {
    let query_string = format!("{SELECT_RECORD} WHERE t.id = :id AND t.user_id = :user_id");

    connection
        .prepare(&query_string)?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_row_to_record,
        )
        .map_err(|error| error.into())
}

#[cfg(test)]
mod query_transactions_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, macros::date};

    use crate::{
        Error,
        category::{Category, CategoryKind, CategoryName, Color, NewCategory, create_category},
        db::initialize,
        test_utils::insert_test_user,
        transaction::{NewTransaction, create_transaction},
        user::UserID,
    };

    use super::{TransactionFilter, get_transaction_record, query_transactions};

    struct Fixture {
        conn: Connection,
        user_id: UserID,
        groceries: Category,
        wages: Category,
    }

    fn get_fixture() -> Fixture {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user_id = insert_test_user(&conn);

        let groceries = create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                kind: CategoryKind::Expense,
                color: Color::new_unchecked("#ef4444"),
                user_id,
            },
            &conn,
        )
        .unwrap();

        let wages = create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Wages"),
                kind: CategoryKind::Income,
                color: Color::new_unchecked("#10b981"),
                user_id,
            },
            &conn,
        )
        .unwrap();

        Fixture {
            conn,
            user_id,
            groceries,
            wages,
        }
    }

    fn insert(fixture: &Fixture, amount: Decimal, date: Date, category_id: i64) -> i64 {
        create_transaction(
            NewTransaction {
                amount,
                description: "Test".to_owned(),
                kind: None,
                date,
                category_id,
            },
            fixture.user_id,
            &fixture.conn,
        )
        .unwrap()
        .id
    }

    #[test]
    fn returns_empty_for_user_with_no_transactions() {
        let fixture = get_fixture();

        let records =
            query_transactions(fixture.user_id, &TransactionFilter::default(), &fixture.conn)
                .unwrap();

        assert_eq!(records, vec![]);
    }

    #[test]
    fn orders_by_date_then_recency() {
        let fixture = get_fixture();
        let oldest = insert(&fixture, dec!(1.00), date!(2024 - 01 - 01), fixture.groceries.id);
        let tied_first = insert(&fixture, dec!(2.00), date!(2024 - 02 - 01), fixture.groceries.id);
        let tied_second = insert(&fixture, dec!(3.00), date!(2024 - 02 - 01), fixture.groceries.id);
        let newest = insert(&fixture, dec!(4.00), date!(2024 - 03 - 01), fixture.groceries.id);

        let records =
            query_transactions(fixture.user_id, &TransactionFilter::default(), &fixture.conn)
                .unwrap();
        let ids: Vec<i64> = records.iter().map(|record| record.id).collect();

        // Transactions sharing a date come back most recently created first.
        assert_eq!(ids, vec![newest, tied_second, tied_first, oldest]);
    }

    #[test]
    fn includes_category_metadata() {
        let fixture = get_fixture();
        insert(&fixture, dec!(42.50), date!(2024 - 03 - 15), fixture.groceries.id);

        let records =
            query_transactions(fixture.user_id, &TransactionFilter::default(), &fixture.conn)
                .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category_name, "Groceries");
        assert_eq!(records[0].category_color, "#ef4444");
        assert_eq!(records[0].kind, CategoryKind::Expense);
    }

    #[test]
    fn filters_by_date_range_inclusive() {
        let fixture = get_fixture();
        insert(&fixture, dec!(1.00), date!(2024 - 01 - 31), fixture.groceries.id);
        let on_start = insert(&fixture, dec!(2.00), date!(2024 - 02 - 01), fixture.groceries.id);
        let on_end = insert(&fixture, dec!(3.00), date!(2024 - 02 - 29), fixture.groceries.id);
        insert(&fixture, dec!(4.00), date!(2024 - 03 - 01), fixture.groceries.id);

        let filter = TransactionFilter {
            date_range: Some(date!(2024 - 02 - 01)..=date!(2024 - 02 - 29)),
            ..Default::default()
        };
        let records = query_transactions(fixture.user_id, &filter, &fixture.conn).unwrap();
        let ids: Vec<i64> = records.iter().map(|record| record.id).collect();

        assert_eq!(ids, vec![on_end, on_start]);
    }

    #[test]
    fn filters_by_kind_and_category() {
        let fixture = get_fixture();
        let expense = insert(&fixture, dec!(1.00), date!(2024 - 01 - 15), fixture.groceries.id);
        let income = insert(&fixture, dec!(2.00), date!(2024 - 01 - 20), fixture.wages.id);

        let filter = TransactionFilter {
            kind: Some(CategoryKind::Income),
            ..Default::default()
        };
        let records = query_transactions(fixture.user_id, &filter, &fixture.conn).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, income);

        let filter = TransactionFilter {
            category_id: Some(fixture.groceries.id),
            ..Default::default()
        };
        let records = query_transactions(fixture.user_id, &filter, &fixture.conn).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, expense);
    }

    #[test]
    fn get_record_returns_joined_fields() {
        let fixture = get_fixture();
        let id = insert(&fixture, dec!(42.50), date!(2024 - 03 - 15), fixture.groceries.id);

        let record = get_transaction_record(id, fixture.user_id, &fixture.conn).unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.amount, dec!(42.50));
        assert_eq!(record.category_name, "Groceries");
    }

    #[test]
    fn get_record_fails_on_missing_id() {
        let fixture = get_fixture();

        assert_eq!(
            get_transaction_record(1337, fixture.user_id, &fixture.conn),
            Err(Error::NotFound)
        );
    }
}
