//! Failure taxonomy for dispatch and backend execution.
//!
//! Every caller-visible failure is one of the five [`DispatchError`] kinds,
//! each with a stable wire [`ErrorCode`]. Probe failures never appear here;
//! they only update cached status inside the gateway.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Failure raised by a backend handle itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    /// The requested operation is not part of the service's contract.
    #[error("operation '{operation}' is not supported")]
    UnsupportedOperation { operation: String },

    /// The parameters did not match what the operation expects.
    #[error("invalid parameters: {message}")]
    InvalidParams { message: String },

    /// A pooled handle had no online member to delegate to.
    #[error("no pool member is available")]
    NoAvailableInstance,

    /// The backend computation failed.
    #[error("{message}")]
    Backend { message: String },
}

impl HandleError {
    pub fn backend(message: impl Into<String>) -> Self {
        HandleError::Backend {
            message: message.into(),
        }
    }
}

/// Stable wire codes for the caller-visible failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    ServiceNotFound,
    ServiceOffline,
    NoAvailableInstance,
    ExecutionError,
}

/// Caller-visible dispatch failures.
///
/// `InvalidRequest` and `ServiceNotFound` are caller errors and not worth
/// retrying unchanged; `ServiceOffline` and `NoAvailableInstance` may clear
/// on a later attempt once a probe succeeds; `ExecutionError` means the
/// backend was invoked and failed (which also flips the service offline).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Missing or malformed request identifiers.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// No service is registered under the requested name.
    #[error("service '{service}' not found (known services: [{}])", .known.join(", "))]
    ServiceNotFound { service: String, known: Vec<String> },

    /// The service is registered but its cached status is offline.
    #[error("service '{service}' is offline")]
    ServiceOffline {
        service: String,
        detail: Option<String>,
    },

    /// The service resolves to a pool with zero healthy members.
    #[error("service '{service}' has no available instance")]
    NoAvailableInstance { service: String },

    /// The backend call itself failed.
    #[error("execution failed for '{service}.{operation}': {message}")]
    ExecutionError {
        service: String,
        operation: String,
        message: String,
    },
}

impl DispatchError {
    /// The wire code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            DispatchError::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            DispatchError::ServiceNotFound { .. } => ErrorCode::ServiceNotFound,
            DispatchError::ServiceOffline { .. } => ErrorCode::ServiceOffline,
            DispatchError::NoAvailableInstance { .. } => ErrorCode::NoAvailableInstance,
            DispatchError::ExecutionError { .. } => ErrorCode::ExecutionError,
        }
    }

    /// Structured detail safe to return to callers in any posture.
    pub fn details(&self) -> Option<Value> {
        match self {
            DispatchError::ServiceNotFound { known, .. } => {
                Some(json!({ "known_services": known }))
            }
            DispatchError::ServiceOffline {
                detail: Some(detail),
                ..
            } => Some(json!({ "cached_error": detail })),
            _ => None,
        }
    }

    /// Whether a later retry can reasonably succeed without the caller
    /// changing the request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::ServiceOffline { .. }
                | DispatchError::NoAvailableInstance { .. }
                | DispatchError::ExecutionError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_one_to_one() {
        let err = DispatchError::ServiceNotFound {
            service: "missing".into(),
            known: vec!["svc-a".into()],
        };
        assert_eq!(err.code(), ErrorCode::ServiceNotFound);
        assert_eq!(
            serde_json::to_value(err.code()).unwrap(),
            "SERVICE_NOT_FOUND"
        );
    }

    #[test]
    fn not_found_message_lists_known_services() {
        let err = DispatchError::ServiceNotFound {
            service: "missing".into(),
            known: vec!["svc-a".into(), "svc-b".into()],
        };
        let message = err.to_string();
        assert!(message.contains("svc-a"));
        assert!(message.contains("svc-b"));

        let details = err.details().unwrap();
        assert_eq!(details["known_services"][0], "svc-a");
    }

    #[test]
    fn retry_semantics_follow_the_taxonomy() {
        assert!(!DispatchError::InvalidRequest {
            message: "empty".into()
        }
        .is_retryable());
        assert!(DispatchError::ServiceOffline {
            service: "svc-a".into(),
            detail: None,
        }
        .is_retryable());
        assert!(DispatchError::NoAvailableInstance {
            service: "svc-a".into(),
        }
        .is_retryable());
    }

    #[test]
    fn offline_detail_is_exposed_in_details() {
        let err = DispatchError::ServiceOffline {
            service: "svc-a".into(),
            detail: Some("probe failed".into()),
        };
        assert_eq!(err.details().unwrap()["cached_error"], "probe failed");
    }
}
