//! # Switchyard Core
//!
//! Core traits and types for the Switchyard dispatch gateway: the service
//! capability contract, validated identifiers, cached status snapshots, the
//! dispatch failure taxonomy and the uniform response envelope.

pub mod envelope;
pub mod error;
pub mod ids;
pub mod service;
pub mod status;

pub use envelope::{DispatchResponse, ErrorBody, ResponseMeta};
pub use error::{DispatchError, ErrorCode, HandleError};
pub use ids::{InvalidName, OperationName, ServiceName};
pub use service::{ServiceDescriptor, ServiceHandle};
pub use status::{LoadMetrics, ServiceStatus};
