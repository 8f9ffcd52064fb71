use axum::extract::{Extension, Path, State};
use serde::Serialize;

use crate::agent::InsightResult;
use crate::middleware::{ApiResponse, ApiResult, AuthCustomer};
use crate::routes::AppState;
use crate::types::Variant;

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub message: String,
    pub variant: Variant,
    pub insights: InsightResult,
}

/// POST /api/agent/run - explicit financial-health run for the caller.
///
/// Blocks until reduce, analyze and deliver have finished. The result is
/// also pushed to the caller's live connection when there is one.
pub async fn run_analysis(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCustomer>,
) -> ApiResult<RunResponse> {
    let insights = state.coordinator.run_now(&auth.customer_id).await?;
    Ok(ApiResponse::success(RunResponse {
        message: "Agent analysis completed".to_string(),
        variant: Variant::FinancialHealth,
        insights,
    }))
}

/// POST /api/agent/run/:variant
pub async fn run_variant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCustomer>,
    Path(variant): Path<String>,
) -> ApiResult<RunResponse> {
    let variant: Variant = variant.parse()?;
    let insights = state
        .coordinator
        .run_variant(&auth.customer_id, variant)
        .await?;

    Ok(ApiResponse::success(RunResponse {
        message: format!("{} analysis completed", variant),
        variant,
        insights,
    }))
}
