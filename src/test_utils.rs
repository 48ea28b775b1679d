//! Shared helpers for setting up test databases, users and servers.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{AppState, PasswordHash, db::initialize, user::{Email, UserID, create_user}};

/// The cookie secret used by test servers.
pub(crate) const TEST_COOKIE_SECRET: &str = "the-only-secret-is-that-there-is-no-secret";

/// Create an [AppState] backed by a fresh in-memory database with one
/// registered user.
pub(crate) fn test_state() -> (AppState, UserID) {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");
    let user_id = insert_test_user(&connection);

    let state = AppState::new(Arc::new(Mutex::new(connection)), TEST_COOKIE_SECRET);

    (state, user_id)
}

/// Insert a user with a fixed test email, returning its ID.
pub(crate) fn insert_test_user(connection: &Connection) -> UserID {
    insert_user_with_email("test@example.com", connection)
}

/// Insert a user with `email`, returning its ID.
///
/// The stored password hash is a nonsense placeholder; use
/// [crate::PasswordHash::from_raw_password] in tests that need to log in.
pub(crate) fn insert_user_with_email(email: &str, connection: &Connection) -> UserID {
    create_user(
        Email::new_unchecked(email),
        PasswordHash::new_unchecked("notarealhash"),
        connection,
    )
    .expect("Could not insert test user")
    .id
}
