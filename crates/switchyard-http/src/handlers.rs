//! HTTP handlers for dispatch, introspection and process health.

use crate::routes::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use switchyard_core::{DispatchResponse, ErrorCode, ServiceName};
use switchyard_gateway::DispatchRequest;
use utoipa::ToSchema;

/// Body of a dispatch call.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DispatchBody {
    /// Target service name.
    #[schema(example = "weather")]
    pub service: String,
    /// Operation to perform.
    #[schema(example = "forecast")]
    pub operation: String,
    /// Opaque parameters passed through to the backend.
    #[serde(default)]
    pub params: Value,
}

/// Error body for the introspection endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code identifier.
    #[schema(example = "service_not_found")]
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// Response listing registered services.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceListResponse {
    pub services: Vec<String>,
    #[schema(example = 3)]
    pub total: usize,
}

/// Descriptor view of one service.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceDescribeResponse {
    #[schema(example = "weather")]
    pub name: String,
    #[schema(example = "1.2.0")]
    pub version: String,
    pub description: String,
    pub operations: Vec<String>,
}

fn status_for(response: &DispatchResponse) -> StatusCode {
    match response.error_code() {
        None => StatusCode::OK,
        Some(ErrorCode::InvalidRequest) => StatusCode::BAD_REQUEST,
        Some(ErrorCode::ServiceNotFound) => StatusCode::NOT_FOUND,
        Some(ErrorCode::ServiceOffline) | Some(ErrorCode::NoAvailableInstance) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        Some(ErrorCode::ExecutionError) => StatusCode::BAD_GATEWAY,
    }
}

/// POST /api/v1/dispatch - execute one operation against a registered service
#[utoipa::path(
    post,
    path = "/api/v1/dispatch",
    request_body = DispatchBody,
    responses(
        (status = 200, description = "Operation executed", body = serde_json::Value),
        (status = 400, description = "Invalid request identifiers", body = serde_json::Value),
        (status = 404, description = "Unknown service", body = serde_json::Value),
        (status = 502, description = "Backend execution failed", body = serde_json::Value),
        (status = 503, description = "Service offline or no instance available", body = serde_json::Value)
    )
)]
pub async fn dispatch(
    State(state): State<AppState>,
    Json(body): Json<DispatchBody>,
) -> impl IntoResponse {
    let response = state
        .dispatcher
        .dispatch(DispatchRequest::new(body.service, body.operation, body.params))
        .await;
    (status_for(&response), Json(response))
}

/// GET /api/v1/services - list registered service names
#[utoipa::path(
    get,
    path = "/api/v1/services",
    responses((status = 200, description = "Registered services", body = ServiceListResponse))
)]
pub async fn list_services(State(state): State<AppState>) -> Json<ServiceListResponse> {
    let services: Vec<String> = state
        .registry
        .service_names()
        .await
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let total = services.len();
    Json(ServiceListResponse { services, total })
}

/// GET /api/v1/services/{name} - describe one service
#[utoipa::path(
    get,
    path = "/api/v1/services/{name}",
    params(("name" = String, Path, description = "Service name")),
    responses(
        (status = 200, description = "Service descriptor", body = ServiceDescribeResponse),
        (status = 404, description = "Unknown service", body = ErrorResponse)
    )
)]
pub async fn describe_service(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ServiceDescribeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let name = parse_name(&name)?;
    match state.registry.descriptor_of(&name).await {
        Some(descriptor) => Ok(Json(ServiceDescribeResponse {
            name: descriptor.name.to_string(),
            version: descriptor.version.clone(),
            description: descriptor.description.clone(),
            operations: descriptor
                .operations
                .iter()
                .map(|op| op.to_string())
                .collect(),
        })),
        None => Err(not_found(&name)),
    }
}

/// GET /api/v1/services/{name}/status - cached status snapshot
#[utoipa::path(
    get,
    path = "/api/v1/services/{name}/status",
    params(("name" = String, Path, description = "Service name")),
    responses(
        (status = 200, description = "Cached status snapshot", body = serde_json::Value),
        (status = 404, description = "Unknown service", body = ErrorResponse)
    )
)]
pub async fn service_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let name = parse_name(&name)?;
    match state.registry.status_of(&name).await {
        Some(status) => Ok(Json(
            serde_json::to_value(status).unwrap_or(Value::Null),
        )),
        None => Err(not_found(&name)),
    }
}

/// GET /api/v1/stats - aggregate registry statistics
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses((status = 200, description = "Aggregate registry statistics", body = serde_json::Value))
)]
pub async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = state.registry.stats().await;
    Json(serde_json::to_value(stats).unwrap_or(Value::Null))
}

/// GET /health - process liveness with version info
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = serde_json::Value))
)]
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "switchyard",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

fn parse_name(raw: &str) -> Result<ServiceName, (StatusCode, Json<ErrorResponse>)> {
    ServiceName::parse(raw).map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "invalid_service_name".to_string(),
                message: err.to_string(),
            }),
        )
    })
}

fn not_found(name: &ServiceName) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "service_not_found".to_string(),
            message: format!("Service '{name}' is not registered"),
        }),
    )
}
