//! Shared mutable status state for one registered service.
//!
//! Counters are atomics so increment/decrement pairing survives concurrent
//! bursts; the remaining status fields sit behind an async lock. The online
//! flag is atomic as well so load-balancer filtering and `available` listings
//! can read it without taking the lock.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use switchyard_core::{LoadMetrics, ServiceStatus};
use tokio::sync::RwLock;

#[derive(Debug)]
struct StatusMeta {
    last_update: DateTime<Utc>,
    response_time: Option<Duration>,
    error: Option<String>,
}

/// One service's live status record.
#[derive(Debug)]
pub(crate) struct StatusCell {
    online: AtomicBool,
    active: AtomicU32,
    total: AtomicU64,
    meta: RwLock<StatusMeta>,
}

impl StatusCell {
    /// Seed a cell from a status snapshot (taken from the handle itself at
    /// registration time).
    pub(crate) fn seeded(status: &ServiceStatus) -> Self {
        Self {
            online: AtomicBool::new(status.online),
            active: AtomicU32::new(status.load.active_requests),
            total: AtomicU64::new(status.load.total_requests),
            meta: RwLock::new(StatusMeta {
                last_update: status.last_update,
                response_time: status.response_time,
                error: status.error.clone(),
            }),
        }
    }

    pub(crate) fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub(crate) fn active_requests(&self) -> u32 {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) async fn last_error(&self) -> Option<String> {
        self.meta.read().await.error.clone()
    }

    /// Point-in-time snapshot of the full status.
    pub(crate) async fn snapshot(&self) -> ServiceStatus {
        let meta = self.meta.read().await;
        ServiceStatus {
            online: self.is_online(),
            last_update: meta.last_update,
            response_time: meta.response_time,
            error: meta.error.clone(),
            load: LoadMetrics {
                active_requests: self.active.load(Ordering::Acquire),
                total_requests: self.total.load(Ordering::Acquire),
            },
        }
    }

    /// Record a healthy observation. `response_time` is set only when the
    /// observation came from a real execution; probes pass `None` and leave
    /// the last measured latency in place.
    pub(crate) async fn mark_online(&self, response_time: Option<Duration>) {
        let mut meta = self.meta.write().await;
        self.online.store(true, Ordering::Release);
        meta.last_update = Utc::now();
        meta.error = None;
        if response_time.is_some() {
            meta.response_time = response_time;
        }
    }

    /// Record a failure. This is the only path that flips a service offline;
    /// the fail-fast degradation policy lives entirely here.
    pub(crate) async fn mark_offline(&self, error: impl Into<String>) {
        let mut meta = self.meta.write().await;
        self.online.store(false, Ordering::Release);
        meta.last_update = Utc::now();
        meta.error = Some(error.into());
    }
}

/// RAII pairing for the request counters: acquiring increments
/// `active_requests` and `total_requests`, dropping decrements
/// `active_requests` on every exit path, including cancellation.
pub(crate) struct ActiveRequestGuard {
    cell: Arc<StatusCell>,
}

impl ActiveRequestGuard {
    pub(crate) fn acquire(cell: Arc<StatusCell>) -> Self {
        cell.active.fetch_add(1, Ordering::AcqRel);
        cell.total.fetch_add(1, Ordering::AcqRel);
        Self { cell }
    }
}

impl Drop for ActiveRequestGuard {
    fn drop(&mut self) {
        self.cell.active.fetch_sub(1, Ordering::AcqRel);
    }
}
