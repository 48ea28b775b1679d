//! Defines the core data models and database queries for categories.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId, user::UserID};

/// The longest category name that will be accepted.
pub(crate) const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// The colour given to categories created without an explicit colour.
pub(crate) const DEFAULT_COLOR: &str = "#3B82F6";

// ============================================================================
// MODELS
// ============================================================================

/// Whether a category (and therefore its transactions) records money earned
/// or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Money coming in, e.g. wages or dividends.
    Income,
    /// Money going out, e.g. rent or groceries.
    Expense,
}

impl CategoryKind {
    /// The kind as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for CategoryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            other => Err(FromSqlError::Other(
                format!("{other} is not a category kind").into(),
            )),
        }
    }
}

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an error if `name` is empty or longer than
    /// one hundred characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyCategoryName);
        }

        if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            return Err(Error::CategoryNameTooLong(MAX_CATEGORY_NAME_LENGTH));
        }

        Ok(Self(name.to_string()))
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hex colour code (e.g. `#3B82F6`) used when charting a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Color(String);

impl Color {
    /// Create a colour from a hex colour code.
    ///
    /// # Errors
    ///
    /// This function will return an error if `raw_color` is not a `#` followed
    /// by six hex digits.
    pub fn new(raw_color: &str) -> Result<Self, Error> {
        let mut chars = raw_color.chars();

        let is_hex_code = chars.next() == Some('#')
            && raw_color.len() == 7
            && chars.all(|c| c.is_ascii_hexdigit());

        if is_hex_code {
            Ok(Self(raw_color.to_string()))
        } else {
            Err(Error::InvalidColor(raw_color.to_string()))
        }
    }

    /// Create a colour without validation.
    ///
    /// The caller should ensure the string is a valid hex colour code.
    pub fn new_unchecked(raw_color: &str) -> Self {
        Self(raw_color.to_string())
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(DEFAULT_COLOR.to_string())
    }
}

/// A category for expenses and income, e.g., 'Groceries', 'Eating Out', 'Wages'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: DatabaseId,
    /// The name of the category.
    pub name: CategoryName,
    /// Whether the category records income or expenses.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// The colour used when charting the category.
    pub color: Color,
    /// The ID of the user that owns the category.
    #[serde(skip_serializing)]
    pub user_id: UserID,
}

/// The data needed to create a new category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The name of the category.
    pub name: CategoryName,
    /// Whether the category records income or expenses.
    pub kind: CategoryKind,
    /// The colour used when charting the category.
    pub color: Color,
    /// The ID of the user that owns the category.
    pub user_id: UserID,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the category table.
///
/// Category names are unique per user and kind, so "Other" can exist once as
/// an income category and once as an expense category.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                color TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                UNIQUE(user_id, name, kind)
                )",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_row_to_category(row: &Row) -> Result<Category, rusqlite::Error> {
    map_row_to_category_with_offset(row, 0)
}

pub(crate) fn map_row_to_category_with_offset(
    row: &Row,
    offset: usize,
) -> Result<Category, rusqlite::Error> {
    let id = row.get(offset)?;
    let raw_name: String = row.get(offset + 1)?;
    let kind = row.get(offset + 2)?;
    let raw_color: String = row.get(offset + 3)?;
    let user_id = UserID::new(row.get(offset + 4)?);

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        kind,
        color: Color::new_unchecked(&raw_color),
        user_id,
    })
}

/// Create a new category in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategory] if the user already has a category with this
///   name and kind,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(
            "INSERT INTO category (name, kind, color, user_id)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, kind, color, user_id",
        )?
        .query_row(
            (
                category.name.as_ref(),
                category.kind,
                category.color.as_ref(),
                category.user_id.as_i64(),
            ),
            map_row_to_category,
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 2067 => {
                Error::DuplicateCategory(category.name.to_string())
            }
            error => error.into(),
        })
}

/// Retrieve the category with `id` belonging to `user_id`.
///
/// Categories owned by other users are reported as [Error::NotFound], the
/// same as categories that do not exist.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a category owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, color, user_id FROM category
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_row_to_category,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of `user_id`'s categories, ordered by kind then name.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_categories_by_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, color, user_id FROM category
             WHERE user_id = :user_id
             ORDER BY kind, name",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_category)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the name, kind and colour of the category with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a category owned by `user_id`,
/// - [Error::DuplicateCategory] if the new name and kind clash with another
///   of the user's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_category(
    id: DatabaseId,
    category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, kind = ?2, color = ?3
             WHERE id = ?4 AND user_id = ?5",
            (
                category.name.as_ref(),
                category.kind,
                category.color.as_ref(),
                id,
                category.user_id.as_i64(),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 2067 => {
                Error::DuplicateCategory(category.name.to_string())
            }
            error => Error::from(error),
        })?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_category(id, category.user_id, connection)
}

/// Delete the category with `id` belonging to `user_id`.
///
/// The database cascades the deletion to the category's transactions and
/// budgets.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a category owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = :id AND user_id = :user_id",
        &[(":id", &id), (":user_id", &user_id.as_i64())],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}


#[cfg(test)]
mod color_tests {
    use crate::Error;

    use super::Color;

    #[test]
    fn new_accepts_hex_codes() {
        assert!(Color::new("#3B82F6").is_ok());
        assert!(Color::new("#ef4444").is_ok());
    }

    #[test]
    fn new_rejects_malformed_codes() {
        for raw in ["3B82F6", "#3B82F", "#3B82F6A", "#GGGGGG", ""] {
            assert_eq!(
                Color::new(raw),
                Err(Error::InvalidColor(raw.to_string())),
                "expected {raw:?} to be rejected"
            );
        }
    }
}

#[cfg(test)]
mod category_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        test_utils::insert_test_user,
        user::UserID,
    };

    use super::{
        Category, CategoryKind, CategoryName, Color, NewCategory, create_category,
        delete_category, get_categories_by_user, get_category, update_category,
    };

    fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user_id = insert_test_user(&conn);

        (conn, user_id)
    }

    fn new_category(name: &str, kind: CategoryKind, user_id: UserID) -> NewCategory {
        NewCategory {
            name: CategoryName::new_unchecked(name),
            kind,
            color: Color::default(),
            user_id,
        }
    }

    #[test]
    fn create_category_succeeds() {
        let (conn, user_id) = get_test_connection();

        let category =
            create_category(new_category("Groceries", CategoryKind::Expense, user_id), &conn)
                .unwrap();

        assert!(category.id > 0);
        assert_eq!(category.name, CategoryName::new_unchecked("Groceries"));
        assert_eq!(category.kind, CategoryKind::Expense);
        assert_eq!(category.user_id, user_id);
    }

    #[test]
    fn create_category_fails_on_duplicate_name_and_kind() {
        let (conn, user_id) = get_test_connection();

        create_category(new_category("Groceries", CategoryKind::Expense, user_id), &conn).unwrap();
        let duplicate =
            create_category(new_category("Groceries", CategoryKind::Expense, user_id), &conn);

        assert_eq!(
            duplicate,
            Err(Error::DuplicateCategory("Groceries".to_string()))
        );
    }

    #[test]
    fn create_category_allows_same_name_with_different_kind() {
        let (conn, user_id) = get_test_connection();

        create_category(new_category("Other", CategoryKind::Expense, user_id), &conn).unwrap();
        let result = create_category(new_category("Other", CategoryKind::Income, user_id), &conn);

        assert!(result.is_ok());
    }

    #[test]
    fn get_category_succeeds() {
        let (conn, user_id) = get_test_connection();
        let inserted =
            create_category(new_category("Rent", CategoryKind::Expense, user_id), &conn).unwrap();

        let selected = get_category(inserted.id, user_id, &conn).unwrap();

        assert_eq!(inserted, selected);
    }

    #[test]
    fn get_category_hides_other_users_categories() {
        let (conn, user_id) = get_test_connection();
        let other_user_id = crate::test_utils::insert_user_with_email("other@test.com", &conn);
        let someone_elses =
            create_category(new_category("Rent", CategoryKind::Expense, other_user_id), &conn)
                .unwrap();

        let selected = get_category(someone_elses.id, user_id, &conn);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn get_categories_by_user_orders_by_kind_then_name() {
        let (conn, user_id) = get_test_connection();

        create_category(new_category("Rent", CategoryKind::Expense, user_id), &conn).unwrap();
        create_category(new_category("Wages", CategoryKind::Income, user_id), &conn).unwrap();
        create_category(new_category("Groceries", CategoryKind::Expense, user_id), &conn).unwrap();

        let categories = get_categories_by_user(user_id, &conn).unwrap();
        let names: Vec<&str> = categories
            .iter()
            .map(|category| category.name.as_ref())
            .collect();

        assert_eq!(names, vec!["Groceries", "Rent", "Wages"]);
    }

    #[test]
    fn update_category_overwrites_fields() {
        let (conn, user_id) = get_test_connection();
        let inserted =
            create_category(new_category("Grocery", CategoryKind::Expense, user_id), &conn)
                .unwrap();

        let updated = update_category(
            inserted.id,
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                kind: CategoryKind::Expense,
                color: Color::new_unchecked("#ef4444"),
                user_id,
            },
            &conn,
        )
        .unwrap();

        assert_eq!(
            updated,
            Category {
                id: inserted.id,
                name: CategoryName::new_unchecked("Groceries"),
                kind: CategoryKind::Expense,
                color: Color::new_unchecked("#ef4444"),
                user_id,
            }
        );
    }

    #[test]
    fn update_category_fails_on_missing_id() {
        let (conn, user_id) = get_test_connection();

        let result = update_category(
            1337,
            new_category("Groceries", CategoryKind::Expense, user_id),
            &conn,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_category_removes_row() {
        let (conn, user_id) = get_test_connection();
        let inserted =
            create_category(new_category("Rent", CategoryKind::Expense, user_id), &conn).unwrap();

        delete_category(inserted.id, user_id, &conn).unwrap();

        assert_eq!(get_category(inserted.id, user_id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_category_fails_on_missing_id() {
        let (conn, user_id) = get_test_connection();

        assert_eq!(delete_category(1337, user_id, &conn), Err(Error::NotFound));
    }
}
