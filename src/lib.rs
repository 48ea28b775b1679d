//! Centsible is a personal finance tracker: users record income and expense
//! transactions against categories, set monthly budgets, and read back
//! summaries of where their money went.
//!
//! This library provides a JSON REST API backed by SQLite. The interesting
//! part lives in the summary module: a pure aggregation engine that turns a
//! user's transactions into category breakdowns, monthly trends and budget
//! utilisation figures.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod category;
mod database_id;
mod db;
pub mod endpoints;
mod health;
mod logging;
mod money;
mod password;
mod routing;
mod summary;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use budget::{Budget, NewBudget, create_budget};
pub use category::{Category, CategoryKind, CategoryName, Color, NewCategory, create_category};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, create_transaction};
pub use user::{
    Email, User, UserID, create_user, get_user_by_email, get_user_by_id, update_user_password,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an email/password combination that does not match a
    /// registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing a date from a cookie or creating the new
    /// expiry date time.
    #[error("could not parse or format a session date time")]
    DateError,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string used to create an email address was not a valid email.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The email used to register already belongs to another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// An amount was zero, negative, below one cent, or had more than two
    /// fractional digits.
    ///
    /// Amounts record real money movements, so they must be positive and
    /// representable at currency scale.
    #[error("{0} is not a valid amount of money")]
    InvalidAmount(Decimal),

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A category name longer than the maximum length was provided.
    #[error("category name cannot be longer than {0} characters")]
    CategoryNameTooLong(usize),

    /// A string that is not a hex colour code (e.g. `#3B82F6`) was used as a
    /// category colour.
    #[error("{0} is not a valid hex colour code")]
    InvalidColor(String),

    /// The category ID used to create a transaction or budget did not match a
    /// category owned by the requesting user.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// A category with the same name and kind already exists for this user.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// A budget already exists for this user, category and month.
    #[error("a budget for this category and month already exists")]
    DuplicateBudget,

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A transaction description longer than the maximum length was provided.
    #[error("description cannot be longer than {0} characters")]
    DescriptionTooLong(usize),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("budget.") =>
            {
                Error::DuplicateBudget
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::InvalidCredentials | Error::CookieMissing => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateEmail
            | Error::DuplicateCategory(_)
            | Error::DuplicateBudget
            | Error::InvalidCategory => StatusCode::BAD_REQUEST,
            Error::TooWeak(_)
            | Error::InvalidEmail(_)
            | Error::InvalidAmount(_)
            | Error::EmptyCategoryName
            | Error::CategoryNameTooLong(_)
            | Error::InvalidColor(_)
            | Error::FutureDate(_)
            | Error::DescriptionTooLong(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::DateError | Error::HashingError(_) | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details belong in the server logs, not in responses.
            tracing::error!("An unexpected error occurred: {}", self);
            return (
                status,
                Json(json!({ "error": "internal server error" })),
            )
                .into_response();
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
