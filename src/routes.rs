use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::agent::{Clock, InsightEngine, ReasoningBackend, RunCoordinator, SummaryReducer};
use crate::config::{config, AgentConfig};
use crate::database::RecordStore;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::realtime::ConnectionRegistry;

/// Shared handler state: one coordinator and one registry per process
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<RunCoordinator>,
    pub registry: Arc<ConnectionRegistry>,
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    /// Wire the pipeline around a record store and reasoning backend
    pub fn assemble(
        store: Arc<dyn RecordStore>,
        backend: Arc<dyn ReasoningBackend>,
        clock: Arc<dyn Clock>,
        agent: &AgentConfig,
    ) -> Self {
        let offset = agent.reference_offset();
        let registry = Arc::new(ConnectionRegistry::new());
        let coordinator = RunCoordinator::new(
            SummaryReducer::new(store.clone(), clock.clone(), offset),
            InsightEngine::new(backend, clock.clone()),
            registry.clone(),
            clock,
            agent.window_days,
            offset,
        );

        Self {
            coordinator: Arc::new(coordinator),
            registry,
            store,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/ws", get(public::socket_upgrade))
        // Protected API
        .merge(protected_routes())
        .fallback(public::not_found)
        .with_state(state)
        // Global middleware
        .layer(cors_layer(&config().security.cors_origins));

    with_request_tracing(router, config().server.enable_request_logging)
}

fn with_request_tracing(router: Router, enabled: bool) -> Router {
    if enabled {
        router.layer(TraceLayer::new_for_http())
    } else {
        tracing::debug!("Request tracing disabled");
        router
    }
}

fn protected_routes() -> Router<AppState> {
    use protected::{agent, auth};

    Router::new()
        .route("/api/auth/session", post(auth::session_started))
        .route("/api/agent/run", post(agent::run_analysis))
        .route("/api/agent/run/:variant", post(agent::run_variant))
        .route("/api/agent/status", get(agent::agent_status))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
