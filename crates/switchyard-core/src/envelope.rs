//! The uniform response envelope returned for every dispatched call.
//!
//! Callers always receive the same shape regardless of which backend handled
//! the call, and every response, success or failure, carries a request
//! correlation id in its metadata.

use crate::{DispatchError, ErrorCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Correlation metadata attached to every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub operation: Option<String>,
}

impl ResponseMeta {
    pub fn new(
        request_id: Uuid,
        execution_time_ms: u64,
        service: Option<String>,
        operation: Option<String>,
    ) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            execution_time_ms,
            service,
            operation,
        }
    }
}

/// Wire form of a dispatch failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<Value>,
}

/// The fixed envelope shape for one dispatched call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorBody>,
    pub meta: ResponseMeta,
}

impl DispatchResponse {
    /// Wrap a successful backend result.
    pub fn success(data: Value, meta: ResponseMeta) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta,
        }
    }

    /// Wrap a dispatch failure, optionally attaching extra detail. The extra
    /// detail is for debug posture only; production callers get the
    /// structured details alone.
    pub fn failure(error: &DispatchError, debug_detail: Option<Value>, meta: ResponseMeta) -> Self {
        let details = match (error.details(), debug_detail) {
            (Some(mut base), Some(extra)) => {
                if let Some(map) = base.as_object_mut() {
                    map.insert("debug".to_string(), extra);
                }
                Some(base)
            }
            (Some(base), None) => Some(base),
            (None, Some(extra)) => Some(serde_json::json!({ "debug": extra })),
            (None, None) => None,
        };

        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: error.code(),
                message: error.to_string(),
                details,
            }),
            meta,
        }
    }

    /// The wire error code, if this is a failure envelope.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}
