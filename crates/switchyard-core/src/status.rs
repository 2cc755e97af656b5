//! Cached service health and load snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request counters for one service.
///
/// `active_requests` counts calls currently in flight; `total_requests` is
/// monotonically non-decreasing over the life of a registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadMetrics {
    pub active_requests: u32,
    pub total_requests: u64,
}

/// The registry's cached belief about one service's health, load and last
/// observed latency or error.
///
/// This is a point-in-time snapshot; freshness is bounded by the health-probe
/// interval. Reading a status never triggers a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Whether the service is believed reachable.
    pub online: bool,
    /// When this status last changed (probe or execution outcome).
    pub last_update: DateTime<Utc>,
    /// Wall-clock duration of the most recent successful execution.
    #[serde(
        rename = "response_time_ms",
        with = "duration_ms",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub response_time: Option<Duration>,
    /// Last failure message, cleared on recovery.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// Current request counters.
    pub load: LoadMetrics,
}

impl ServiceStatus {
    /// A fresh online status with zeroed counters.
    pub fn online() -> Self {
        Self {
            online: true,
            last_update: Utc::now(),
            response_time: None,
            error: None,
            load: LoadMetrics::default(),
        }
    }

    /// An offline status carrying a failure message.
    pub fn offline(error: impl Into<String>) -> Self {
        Self {
            online: false,
            last_update: Utc::now(),
            response_time: None,
            error: Some(error.into()),
            load: LoadMetrics::default(),
        }
    }
}

/// Serialize `Option<Duration>` as whole milliseconds on the wire.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let ms: Option<u64> = Option::deserialize(deserializer)?;
        Ok(ms.map(Duration::from_millis))
    }
}
