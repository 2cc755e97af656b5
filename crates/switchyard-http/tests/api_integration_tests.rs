//! Integration tests for the gateway's HTTP surface: dispatch, introspection,
//! authentication and rate limiting.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use switchyard_core::{
    HandleError, OperationName, ServiceDescriptor, ServiceHandle, ServiceName, ServiceStatus,
};
use switchyard_gateway::ServiceRegistry;
use switchyard_http::{HttpConfig, app_state, build_router};
use tower::ServiceExt;

struct EchoService;

#[async_trait]
impl ServiceHandle for EchoService {
    async fn execute(&self, operation: &OperationName, params: Value) -> Result<Value, HandleError> {
        match operation.as_str() {
            "echo" => Ok(json!({ "echo": params })),
            "explode" => Err(HandleError::backend("deliberate failure")),
            other => Err(HandleError::UnsupportedOperation {
                operation: other.to_string(),
            }),
        }
    }

    async fn current_status(&self) -> ServiceStatus {
        ServiceStatus::online()
    }

    async fn probe_health(&self) -> Result<bool, HandleError> {
        Ok(true)
    }
}

async fn test_registry() -> Arc<ServiceRegistry> {
    let registry = Arc::new(ServiceRegistry::new());
    registry
        .register(
            ServiceDescriptor::new(
                ServiceName::parse("echo").unwrap(),
                "1.0.0",
                "echoes its input back",
                vec![
                    OperationName::parse("echo").unwrap(),
                    OperationName::parse("explode").unwrap(),
                ],
            ),
            Arc::new(EchoService),
        )
        .await;
    registry
}

async fn test_app(config: HttpConfig) -> axum::Router {
    let registry = test_registry().await;
    build_router(app_state(&config, registry).unwrap())
}

fn post_dispatch(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/dispatch")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_the_process() {
    let app = test_app(HttpConfig::default()).await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "switchyard");
    assert!(json["version"].is_string());
    assert!(json["uptime_seconds"].is_number());
}

#[tokio::test]
async fn dispatch_returns_the_success_envelope() {
    let app = test_app(HttpConfig::default()).await;

    let response = app
        .oneshot(post_dispatch(json!({
            "service": "echo",
            "operation": "echo",
            "params": {"greeting": "hello"}
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["echo"]["greeting"], "hello");
    assert_eq!(json["meta"]["service"], "echo");
    assert_eq!(json["meta"]["operation"], "echo");
    assert!(json["meta"]["request_id"].is_string());
    assert!(json["meta"]["execution_time_ms"].is_number());
}

#[tokio::test]
async fn unknown_service_maps_to_404_with_the_failure_envelope() {
    let app = test_app(HttpConfig::default()).await;

    let response = app
        .oneshot(post_dispatch(json!({
            "service": "missing",
            "operation": "echo",
            "params": {}
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "SERVICE_NOT_FOUND");
    assert_eq!(json["error"]["details"]["known_services"][0], "echo");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn empty_identifiers_map_to_400() {
    let app = test_app(HttpConfig::default()).await;

    let response = app
        .oneshot(post_dispatch(json!({
            "service": "",
            "operation": "echo",
            "params": {}
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn backend_failure_maps_to_502_then_offline_to_503() {
    let app = test_app(HttpConfig::default()).await;

    let response = app
        .clone()
        .oneshot(post_dispatch(json!({
            "service": "echo",
            "operation": "explode",
            "params": {}
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "EXECUTION_ERROR");

    // The failure flipped the service offline for the next caller.
    let response = app
        .oneshot(post_dispatch(json!({
            "service": "echo",
            "operation": "echo",
            "params": {}
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "SERVICE_OFFLINE");
}

#[tokio::test]
async fn introspection_endpoints_expose_the_registry() {
    let app = test_app(HttpConfig::default()).await;

    let response = app.clone().oneshot(get("/api/v1/services")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["services"], json!(["echo"]));
    assert_eq!(json["total"], 1);

    let response = app
        .clone()
        .oneshot(get("/api/v1/services/echo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["version"], "1.0.0");
    assert_eq!(json["operations"], json!(["echo", "explode"]));

    let response = app
        .clone()
        .oneshot(get("/api/v1/services/echo/status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["online"], true);
    assert_eq!(json["load"]["total_requests"], 0);

    let response = app.clone().oneshot(get("/api/v1/stats")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total_services"], 1);
    assert_eq!(json["online_services"], 1);
    assert_eq!(json["total_operations"], 2);

    let response = app.oneshot(get("/api/v1/services/ghost")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "service_not_found");
}

#[tokio::test]
async fn configured_api_keys_guard_the_api_surface() {
    let config = HttpConfig {
        api_keys: vec!["sk_test_validkey".to_string()],
        ..HttpConfig::default()
    };
    let app = test_app(config).await;

    // No key.
    let response = app.clone().oneshot(get("/api/v1/services")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "unauthorized");

    // Wrong key.
    let request = Request::builder()
        .uri("/api/v1/services")
        .header("x-api-key", "sk_test_wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct key.
    let request = Request::builder()
        .uri("/api/v1/services")
        .header("x-api-key", "sk_test_validkey")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The health endpoint stays open for liveness checks.
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rate_limit_rejects_the_overflowing_client() {
    let config = HttpConfig {
        rate_limit: switchyard_http::RateLimitConfig {
            global_rpm: 1000,
            per_client_rpm: 2,
        },
        ..HttpConfig::default()
    };
    let app = test_app(config).await;

    for _ in 0..2 {
        let response = app.clone().oneshot(get("/api/v1/services")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get("/api/v1/services")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["error"], "client_rate_limit_exceeded");
    assert!(json["retry_after"].is_number());
}
