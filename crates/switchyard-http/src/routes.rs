//! Router assembly and shared application state.

use crate::auth::AuthState;
use crate::rate_limit::RateLimitState;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Instant;
use switchyard_gateway::{Dispatcher, ServiceRegistry};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub registry: Arc<ServiceRegistry>,
    pub auth: Arc<AuthState>,
    pub rate: Arc<RateLimitState>,
    pub started_at: Instant,
}

/// Build the full router: the authenticated, rate-limited API surface under
/// `/api/v1` plus the unauthenticated process health endpoint.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/dispatch", post(crate::handlers::dispatch))
        .route("/services", get(crate::handlers::list_services))
        .route("/services/{name}", get(crate::handlers::describe_service))
        .route(
            "/services/{name}/status",
            get(crate::handlers::service_status),
        )
        .route("/stats", get(crate::handlers::stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_api_key,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::rate_limit::enforce,
        ));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(crate::handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
