//! The route handler for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error, PasswordHash,
    user::{Email, create_user},
};

/// The details a client sends to register.
#[derive(Debug, Deserialize)]
pub(crate) struct RegisterForm {
    /// The email to register with.
    pub email: String,
    /// The password in plain text. Weak passwords are rejected.
    pub password: String,
}

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegisterState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when hashing the new user's password.
    pub hash_cost: u32,
}

impl FromRef<AppState> for RegisterState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// A route handler for registering a new user with an email and password.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_user_endpoint(
    State(state): State<RegisterState>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let email = Email::new(&form.email)?;
    let password_hash = PasswordHash::from_raw_password(&form.password, state.hash_cost)?;

    let connection = state.db_connection.lock().unwrap();
    let user = create_user(email, password_hash, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": user.id, "email": user.email })),
    ))
}

#[cfg(test)]
mod register_user_endpoint_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{endpoints, test_utils::test_state};

    use super::{RegisterState, register_user_endpoint};

    fn get_test_server() -> TestServer {
        let (state, _) = test_state();
        let register_state = RegisterState {
            db_connection: state.db_connection.clone(),
            // The minimum cost keeps the tests fast.
            hash_cost: 4,
        };

        let app = Router::new()
            .route(endpoints::USERS, post(register_user_endpoint))
            .with_state(register_state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn registers_user() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .json(&json!({"email": "new@test.com", "password": "nioaFI:S)F89kl11j"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let user: Value = response.json();
        assert_eq!(user["email"], json!("new@test.com"));
        assert!(user["id"].is_i64());
    }

    #[tokio::test]
    async fn rejects_weak_password() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .json(&json!({"email": "new@test.com", "password": "hunter2"}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn rejects_invalid_email() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .json(&json!({"email": "not-an-email", "password": "nioaFI:S)F89kl11j"}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let server = get_test_server();
        let body = json!({"email": "new@test.com", "password": "nioaFI:S)F89kl11j"});

        server.post(endpoints::USERS).json(&body).await;
        let response = server.post(endpoints::USERS).json(&body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
