//! # Switchyard Gateway
//!
//! The dispatch-and-registry subsystem: the service registry with cached
//! status and request counters, the periodic health-probe loop, load-balanced
//! service pools, and the dispatcher that turns caller input into the uniform
//! response envelope.
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::{Value, json};
//! use async_trait::async_trait;
//! use switchyard_core::{
//!     HandleError, OperationName, ServiceDescriptor, ServiceHandle, ServiceName, ServiceStatus,
//! };
//! use switchyard_gateway::{DispatchRequest, Dispatcher, ServiceRegistry};
//!
//! struct EchoService;
//!
//! #[async_trait]
//! impl ServiceHandle for EchoService {
//!     async fn execute(&self, _op: &OperationName, params: Value) -> Result<Value, HandleError> {
//!         Ok(json!({ "echo": params }))
//!     }
//!     async fn current_status(&self) -> ServiceStatus { ServiceStatus::online() }
//!     async fn probe_health(&self) -> Result<bool, HandleError> { Ok(true) }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = Arc::new(ServiceRegistry::new());
//! registry
//!     .register(
//!         ServiceDescriptor::new(
//!             ServiceName::parse("echo").unwrap(),
//!             "1.0.0",
//!             "echoes its input",
//!             vec![OperationName::parse("echo").unwrap()],
//!         ),
//!         Arc::new(EchoService),
//!     )
//!     .await;
//!
//! let dispatcher = Dispatcher::new(registry);
//! let response = dispatcher
//!     .dispatch(DispatchRequest::new("echo", "echo", json!({"hello": "world"})))
//!     .await;
//! assert!(response.success);
//! # }
//! ```

mod cell;

pub mod balancer;
pub mod dispatcher;
pub mod health;
pub mod pool;
pub mod registry;

pub use balancer::{BalancedInstance, BalancingPolicy, LoadBalancer};
pub use dispatcher::{DispatchRequest, Dispatcher};
pub use health::{DEFAULT_PROBE_INTERVAL, HealthMonitor, MonitorHandle};
pub use pool::ServicePool;
pub use registry::{RegistryStats, ServiceRegistry};
