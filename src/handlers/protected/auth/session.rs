use axum::extract::{Extension, State};
use serde::Serialize;

use crate::agent::log_background_failure;
use crate::middleware::{ApiResponse, ApiResult, AuthCustomer};
use crate::routes::AppState;

#[derive(Debug, Serialize)]
pub struct SessionStarted {
    pub dispatched: bool,
}

/// POST /api/auth/session - login hook called once a session is established.
///
/// Returns immediately. The daily analysis, if due, runs in the background
/// and its outcome only shows up as a pushed frame or a log line.
pub async fn session_started(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCustomer>,
) -> ApiResult<SessionStarted> {
    let trigger = state
        .coordinator
        .trigger_on_login(auth.customer_id, log_background_failure);

    Ok(ApiResponse::accepted(SessionStarted {
        dispatched: trigger.dispatched(),
    }))
}
