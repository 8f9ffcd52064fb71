use axum::extract::{Extension, State};
use chrono::NaiveDate;
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult, AuthCustomer};
use crate::routes::AppState;
use crate::types::CustomerId;

#[derive(Debug, Serialize)]
pub struct AgentStatus {
    pub customer_id: CustomerId,
    pub connected: bool,
    pub last_run: Option<NaiveDate>,
}

/// GET /api/agent/status
pub async fn agent_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCustomer>,
) -> ApiResult<AgentStatus> {
    let customer = auth.customer_id;
    Ok(ApiResponse::success(AgentStatus {
        connected: state.registry.liveness(&customer),
        last_run: state.coordinator.last_run(&customer),
        customer_id: customer,
    }))
}
