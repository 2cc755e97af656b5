//! # Switchyard HTTP
//!
//! Thin HTTP transport for the Switchyard dispatch gateway: the dispatch
//! endpoint, read-only introspection endpoints, API-key authentication and
//! rate limiting. The transport receives already-structured
//! `(service, operation, params)` triples and hands them to the dispatcher;
//! everything else is request/response shaping.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod server;

pub use config::{ConfigError, HttpConfig, RateLimitConfig};
pub use routes::{AppState, build_router};
pub use server::{ServeError, app_state, serve};

use utoipa::OpenApi;

/// OpenAPI description of the gateway surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::dispatch,
        handlers::list_services,
        handlers::describe_service,
        handlers::service_status,
        handlers::stats,
        handlers::health,
    ),
    components(schemas(
        handlers::DispatchBody,
        handlers::ErrorResponse,
        handlers::ServiceListResponse,
        handlers::ServiceDescribeResponse,
    )),
    info(
        title = "Switchyard Gateway API",
        description = "Unified dispatch gateway for pluggable backend services"
    )
)]
pub struct ApiDoc;
