//! The route handler for the financial summary.

use axum::{Extension, Json, extract::{Query, State}};
use serde::Deserialize;
use time::{Date, Duration, OffsetDateTime};

use crate::{
    Error,
    app_state::DbState,
    summary::{Summary, summarize},
    transaction::{TransactionFilter, query_transactions},
    user::UserID,
};

/// How far back the summary looks when the client gives no date range.
const DEFAULT_WINDOW: Duration = Duration::days(365);

/// The optional date range for a summary request, ISO `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SummaryParams {
    /// The first day included in the summary.
    pub start_date: Option<Date>,
    /// The last day included in the summary.
    pub end_date: Option<Date>,
}

/// A route handler for computing a user's financial summary.
///
/// Without query parameters the summary covers the trailing 365 days ending
/// today.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_summary_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<Summary>, Error> {
    let end = params
        .end_date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let start = params.start_date.unwrap_or(end - DEFAULT_WINDOW);

    let records = {
        let connection = state.db_connection.lock().unwrap();

        query_transactions(
            user_id,
            &TransactionFilter {
                date_range: Some(start..=end),
                ..Default::default()
            },
            &connection,
        )?
    };

    Ok(Json(summarize(&records, start, end)))
}
