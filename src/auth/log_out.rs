//! The route handler for logging out.

use axum::{http::StatusCode, response::{IntoResponse, Response}};
use axum_extra::extract::PrivateCookieJar;

use crate::auth::cookie::invalidate_auth_cookie;

/// A route handler for logging out the current user.
///
/// Replaces the session cookies with expired ones so the client drops them.
/// Logging out without being logged in is harmless.
pub async fn log_out_endpoint(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, StatusCode::NO_CONTENT).into_response()
}
