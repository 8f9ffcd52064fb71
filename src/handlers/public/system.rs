use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::routes::AppState;

/// GET / - service descriptor
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Finsight API",
            "version": version,
            "description": "Financial insight pipeline: summary reduction, reasoning and live delivery",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "session": "POST /api/auth/session (protected - login hook)",
                "agent": "POST /api/agent/run[/:variant], GET /api/agent/status (protected)",
                "socket": "/ws?token=<jwt> (WebSocket, token in query)"
            }
        }
    }))
}

/// GET /health - record store probe plus live connection count
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let connections = state.registry.connected_count();
    let store = state.store.name();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "record_store": store,
                    "connections": connections
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed for {} store: {}", store, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "record store unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "record_store": store,
                        "record_store_error": e.to_string(),
                        "connections": connections
                    }
                })),
            )
        }
    }
}

/// Fallback for unmatched paths, answered with the standard error envelope
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
