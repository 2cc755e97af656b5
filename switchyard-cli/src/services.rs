//! Built-in demonstration services registered at bootstrap.
//!
//! These give a freshly started gateway something to dispatch to: an echo
//! service, a clock service, and a pooled echo pair that exercises the load
//! balancer.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use switchyard_core::{
    HandleError, OperationName, ServiceDescriptor, ServiceHandle, ServiceName, ServiceStatus,
};
use switchyard_gateway::{BalancingPolicy, ServicePool, ServiceRegistry};

/// Echoes parameters back, or reverses a provided text.
pub struct EchoService;

#[async_trait]
impl ServiceHandle for EchoService {
    async fn execute(&self, operation: &OperationName, params: Value) -> Result<Value, HandleError> {
        match operation.as_str() {
            "echo" => Ok(json!({ "echo": params })),
            "reverse" => {
                let text = params
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| HandleError::InvalidParams {
                        message: "expected a 'text' string field".to_string(),
                    })?;
                Ok(json!({ "reversed": text.chars().rev().collect::<String>() }))
            }
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

/// Reports the current time.
pub struct ClockService;

#[async_trait]
impl ServiceHandle for ClockService {
    async fn execute(&self, operation: &OperationName, _params: Value) -> Result<Value, HandleError> {
        match operation.as_str() {
            "now" => Ok(json!({ "now": chrono::Utc::now().to_rfc3339() })),
            "unix" => Ok(json!({ "unix": chrono::Utc::now().timestamp() })),
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

fn name(raw: &str) -> ServiceName {
    ServiceName::parse(raw).expect("built-in service names are valid")
}

fn ops(raws: &[&str]) -> Vec<OperationName> {
    raws.iter()
        .map(|raw| OperationName::parse(raw).expect("built-in operation names are valid"))
        .collect()
}

/// Register the built-in services. Returns the registered names.
pub async fn register_builtin(
    registry: &ServiceRegistry,
    policy: BalancingPolicy,
) -> Vec<ServiceName> {
    let version = env!("CARGO_PKG_VERSION");

    let echo = name("echo");
    registry
        .register(
            ServiceDescriptor::new(
                echo.clone(),
                version,
                "Echoes parameters back, or reverses a text field",
                ops(&["echo", "reverse"]),
            ),
            Arc::new(EchoService),
        )
        .await;

    let clock = name("clock");
    registry
        .register(
            ServiceDescriptor::new(
                clock.clone(),
                version,
                "Reports the current time",
                ops(&["now", "unix"]),
            ),
            Arc::new(ClockService),
        )
        .await;

    let pooled = name("echo-pool");
    let pool = ServicePool::new(
        vec![
            Arc::new(EchoService) as Arc<dyn ServiceHandle>,
            Arc::new(EchoService) as Arc<dyn ServiceHandle>,
        ],
        policy,
    )
    .await;
    registry
        .register(
            ServiceDescriptor::new(
                pooled.clone(),
                version,
                "Two echo instances behind one name, selected by the load balancer",
                ops(&["echo", "reverse"]),
            ),
            Arc::new(pool),
        )
        .await;

    vec![echo, clock, pooled]
}
