//! The service capability contract and registration descriptor.

use crate::{HandleError, OperationName, ServiceName, ServiceStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable description of a registered service: its unique name, version,
/// human-readable description and the ordered set of operations it supports.
///
/// The descriptor is created by whoever registers the service; the registry
/// holds it behind an `Arc`, never a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: ServiceName,
    pub version: String,
    pub description: String,
    pub operations: Vec<OperationName>,
}

impl ServiceDescriptor {
    pub fn new(
        name: ServiceName,
        version: impl Into<String>,
        description: impl Into<String>,
        operations: Vec<OperationName>,
    ) -> Self {
        Self {
            name,
            version: version.into(),
            description: description.into(),
            operations,
        }
    }

    /// Whether this service advertises the given operation.
    pub fn supports(&self, operation: &OperationName) -> bool {
        self.operations.contains(operation)
    }
}

/// The in-process reference through which the gateway invokes a backend
/// service.
///
/// A handle exposes exactly three capabilities: executing an operation,
/// reporting its own status, and answering an out-of-band liveness probe.
/// Concrete implementations are supplied by the code that registers them;
/// the gateway never constructs handles itself.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::{Value, json};
/// use switchyard_core::{HandleError, OperationName, ServiceHandle, ServiceStatus};
///
/// struct EchoService;
///
/// #[async_trait]
/// impl ServiceHandle for EchoService {
///     async fn execute(&self, _op: &OperationName, params: Value) -> Result<Value, HandleError> {
///         Ok(json!({ "echo": params }))
///     }
///
///     async fn current_status(&self) -> ServiceStatus {
///         ServiceStatus::online()
///     }
///
///     async fn probe_health(&self) -> Result<bool, HandleError> {
///         Ok(true)
///     }
/// }
/// ```
#[async_trait]
pub trait ServiceHandle: Send + Sync {
    /// Perform one named operation with opaque structured parameters.
    async fn execute(&self, operation: &OperationName, params: Value) -> Result<Value, HandleError>;

    /// The service's own view of its status. Consulted once at registration
    /// to seed the registry's cached status.
    async fn current_status(&self) -> ServiceStatus;

    /// Out-of-band liveness check, distinct from a real operation.
    ///
    /// `Ok(true)` means healthy, `Ok(false)` means the service answered but
    /// reports itself unhealthy; `Err` means the probe itself failed.
    async fn probe_health(&self) -> Result<bool, HandleError>;
}
