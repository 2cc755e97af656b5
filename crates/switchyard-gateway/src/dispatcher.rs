//! The externally-facing dispatch operation.
//!
//! The dispatcher is the single seam that turns raw caller input into a
//! registry execution and maps every internal failure onto the fixed
//! caller-visible taxonomy. Whatever happens, the caller gets the uniform
//! envelope with a correlation id.

use crate::registry::ServiceRegistry;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use switchyard_core::{
    DispatchError, DispatchResponse, OperationName, ResponseMeta, ServiceName,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// One inbound call, as received from the transport layer.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub service: String,
    pub operation: String,
    pub params: Value,
}

impl DispatchRequest {
    pub fn new(service: impl Into<String>, operation: impl Into<String>, params: Value) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
            params,
        }
    }
}

/// Composes registry lookups, status checks and execution into one
/// request/response cycle.
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
    debug: bool,
}

impl Dispatcher {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            debug: false,
        }
    }

    /// Enable debug posture: failure envelopes carry the internal error
    /// representation under `details.debug`. Off in production.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Run one call to completion and wrap the outcome in the envelope.
    pub async fn dispatch(&self, request: DispatchRequest) -> DispatchResponse {
        let request_id = Uuid::new_v4();
        let timer = Instant::now();

        match self.try_dispatch(&request).await {
            Ok((data, execution_time)) => {
                debug!(
                    request_id = %request_id,
                    service = %request.service,
                    operation = %request.operation,
                    execution_time_ms = execution_time.as_millis() as u64,
                    "dispatch succeeded"
                );
                let meta = ResponseMeta::new(
                    request_id,
                    execution_time.as_millis() as u64,
                    Some(request.service),
                    Some(request.operation),
                );
                DispatchResponse::success(data, meta)
            }
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    service = %request.service,
                    operation = %request.operation,
                    code = ?err.code(),
                    error = %err,
                    "dispatch failed"
                );
                let meta = ResponseMeta::new(
                    request_id,
                    timer.elapsed().as_millis() as u64,
                    non_empty(&request.service),
                    non_empty(&request.operation),
                );
                let debug_detail = self
                    .debug
                    .then(|| Value::String(format!("{err:?}")));
                DispatchResponse::failure(&err, debug_detail, meta)
            }
        }
    }

    async fn try_dispatch(
        &self,
        request: &DispatchRequest,
    ) -> Result<(Value, Duration), DispatchError> {
        let service =
            ServiceName::parse(&request.service).map_err(|err| DispatchError::InvalidRequest {
                message: format!("service name: {err}"),
            })?;
        let operation =
            OperationName::parse(&request.operation).map_err(|err| {
                DispatchError::InvalidRequest {
                    message: format!("operation name: {err}"),
                }
            })?;

        self.registry
            .execute_tool(&service, &operation, request.params.clone())
            .await
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
