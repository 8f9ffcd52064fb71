use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::auth::validate_jwt;
use crate::error::ApiError;
use crate::realtime::run_session;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// GET /ws?token=<jwt> - authenticate, then hand the socket to a session task.
/// The token is checked before the upgrade headers so unauthenticated
/// callers always see 401.
pub async fn socket_upgrade(
    Query(query): Query<SocketQuery>,
    State(state): State<AppState>,
    ws: Option<WebSocketUpgrade>,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::unauthorized("Missing token query parameter"))?;

    let claims = validate_jwt(&token)?;
    let ws = ws.ok_or_else(|| ApiError::bad_request("Expected a WebSocket upgrade request"))?;

    let customer = claims.customer_id;
    let registry = state.registry.clone();

    Ok(ws.on_upgrade(move |socket| run_session(socket, customer, registry)))
}
