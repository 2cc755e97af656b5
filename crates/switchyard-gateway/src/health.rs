//! Periodic liveness probing of every registered service.
//!
//! Each tick spawns one independent probe task per service and waits for all
//! of them: one service's probe failing (or panicking) never prevents the
//! others from being probed in the same tick, and never terminates the loop.
//! The loop ends only on explicit shutdown.

use crate::registry::{ProbeTarget, ServiceRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Default probe interval when none is configured.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration and entry point for the probe loop.
pub struct HealthMonitor {
    registry: Arc<ServiceRegistry>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self::with_interval(registry, DEFAULT_PROBE_INTERVAL)
    }

    pub fn with_interval(registry: Arc<ServiceRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Start the background loop. Probing begins one interval after startup;
    /// registration already seeded each status from the handle itself.
    pub fn spawn(self) -> MonitorHandle {
        let (shutdown, mut signal) = watch::channel(false);
        let registry = self.registry;
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = signal.changed() => break,
                    _ = ticker.tick() => probe_all(&registry).await,
                }
            }
            debug!("health monitor stopped");
        });

        MonitorHandle { shutdown, task }
    }
}

/// Probe every registered service once, with per-service failure isolation.
async fn probe_all(registry: &ServiceRegistry) {
    let targets = registry.probe_targets().await;
    if targets.is_empty() {
        return;
    }

    let probes: Vec<JoinHandle<()>> = targets.into_iter().map(|t| tokio::spawn(probe_one(t))).collect();
    for outcome in futures::future::join_all(probes).await {
        if let Err(join_err) = outcome {
            warn!(error = %join_err, "health probe task panicked");
        }
    }
}

async fn probe_one(target: ProbeTarget) {
    match target.handle.probe_health().await {
        Ok(true) => {
            target.cell.mark_online(None).await;
            debug!(service = %target.name, "health probe passed");
        }
        Ok(false) => {
            target
                .cell
                .mark_offline("health probe reported unhealthy")
                .await;
            warn!(service = %target.name, "health probe reported unhealthy");
        }
        Err(err) => {
            target
                .cell
                .mark_offline(format!("health probe failed: {err}"))
                .await;
            warn!(service = %target.name, error = %err, "health probe failed");
        }
    }
}

/// Handle to a running monitor. The loop ends when the handle is dropped;
/// [`MonitorHandle::stop`] additionally waits for the task to finish.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Signal the loop to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
