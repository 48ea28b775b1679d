//! The health check endpoint used by monitoring and deployment tooling.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::OffsetDateTime;

use crate::app_state::DbState;

/// A route handler reporting whether the service and its database are usable.
///
/// Responds with 200 when healthy and 503 when the database check fails, so
/// load balancers can act on the status code alone.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_health_endpoint(State(state): State<DbState>) -> Response {
    let database_check = {
        let connection = state.db_connection.lock().unwrap();

        connection.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
    };

    let (status, database_status, database_message) = match database_check {
        Ok(_) => (
            StatusCode::OK,
            "healthy",
            "Database connection successful".to_string(),
        ),
        Err(error) => {
            tracing::error!("Health check database query failed: {error}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "unhealthy",
                format!("Database connection failed: {error}"),
            )
        }
    };

    let body = json!({
        "status": if status == StatusCode::OK { "healthy" } else { "unhealthy" },
        "timestamp": OffsetDateTime::now_utc().unix_timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "database": {
                "status": database_status,
                "message": database_message,
            }
        }
    });

    (status, Json(body)).into_response()
}
