//! Redundant instances behind one logical service name.
//!
//! A [`ServicePool`] is itself a [`ServiceHandle`], so the registry keeps
//! exactly one handle per name and never learns about pooling: registering a
//! pool is how a name comes to resolve to multiple instances. Each call
//! selects a member through the pool's load balancer.

use crate::balancer::{BalancedInstance, BalancingPolicy, LoadBalancer};
use crate::cell::{ActiveRequestGuard, StatusCell};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use switchyard_core::{HandleError, LoadMetrics, OperationName, ServiceHandle, ServiceStatus};
use tracing::{debug, warn};

struct PoolMember {
    handle: Arc<dyn ServiceHandle>,
    cell: Arc<StatusCell>,
}

impl BalancedInstance for PoolMember {
    fn is_online(&self) -> bool {
        self.cell.is_online()
    }

    fn active_requests(&self) -> u32 {
        self.cell.active_requests()
    }
}

/// A set of redundant handles backing one logical service name.
pub struct ServicePool {
    members: Vec<PoolMember>,
    balancer: LoadBalancer,
}

impl ServicePool {
    /// Build a pool over the given handles, seeding each member's tracked
    /// status from the handle's own report.
    pub async fn new(handles: Vec<Arc<dyn ServiceHandle>>, policy: BalancingPolicy) -> Self {
        let mut members = Vec::with_capacity(handles.len());
        for handle in handles {
            let initial = handle.current_status().await;
            members.push(PoolMember {
                handle,
                cell: Arc::new(StatusCell::seeded(&initial)),
            });
        }
        Self {
            members,
            balancer: LoadBalancer::new(policy),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub async fn policy(&self) -> BalancingPolicy {
        self.balancer.policy().await
    }

    /// Switch the selection policy mid-stream. Resets round-robin state.
    pub async fn set_policy(&self, policy: BalancingPolicy) {
        self.balancer.set_policy(policy).await;
    }

    /// Status snapshots of every member, in registration order.
    pub async fn member_statuses(&self) -> Vec<ServiceStatus> {
        let mut statuses = Vec::with_capacity(self.members.len());
        for member in &self.members {
            statuses.push(member.cell.snapshot().await);
        }
        statuses
    }
}

#[async_trait]
impl ServiceHandle for ServicePool {
    async fn execute(&self, operation: &OperationName, params: Value) -> Result<Value, HandleError> {
        let member = self
            .balancer
            .select(&self.members)
            .await
            .ok_or(HandleError::NoAvailableInstance)?;

        let _guard = ActiveRequestGuard::acquire(member.cell.clone());
        match member.handle.execute(operation, params).await {
            Ok(value) => {
                member.cell.mark_online(None).await;
                Ok(value)
            }
            Err(err) => {
                member.cell.mark_offline(err.to_string()).await;
                warn!(operation = %operation, error = %err, "pool member failed, marked offline");
                Err(err)
            }
        }
    }

    async fn current_status(&self) -> ServiceStatus {
        let mut online = false;
        let mut load = LoadMetrics::default();
        let mut response_time = None;

        for member in &self.members {
            let status = member.cell.snapshot().await;
            online |= status.online;
            load.active_requests += status.load.active_requests;
            load.total_requests += status.load.total_requests;
            response_time = match (response_time, status.response_time) {
                (Some(current), Some(candidate)) => Some(std::cmp::min(current, candidate)),
                (current, candidate) => current.or(candidate),
            };
        }

        ServiceStatus {
            online,
            last_update: Utc::now(),
            response_time,
            error: (!online).then(|| "no pool member is online".to_string()),
            load,
        }
    }

    /// Probe every member, isolating failures per member. The pool is
    /// healthy when at least one member is.
    async fn probe_health(&self) -> Result<bool, HandleError> {
        let probes = self.members.iter().map(|member| async move {
            match member.handle.probe_health().await {
                Ok(true) => {
                    member.cell.mark_online(None).await;
                    true
                }
                Ok(false) => {
                    member.cell.mark_offline("health probe reported unhealthy").await;
                    false
                }
                Err(err) => {
                    debug!(error = %err, "pool member probe failed");
                    member
                        .cell
                        .mark_offline(format!("health probe failed: {err}"))
                        .await;
                    false
                }
            }
        });

        let outcomes = join_all(probes).await;
        Ok(outcomes.into_iter().any(|healthy| healthy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingService {
        id: usize,
        healthy: AtomicBool,
        calls: AtomicUsize,
    }

    impl CountingService {
        fn new(id: usize) -> Arc<Self> {
            Arc::new(Self {
                id,
                healthy: AtomicBool::new(true),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ServiceHandle for CountingService {
        async fn execute(
            &self,
            _operation: &OperationName,
            _params: Value,
        ) -> Result<Value, HandleError> {
            if !self.healthy.load(Ordering::SeqCst) {
                return Err(HandleError::backend("member down"));
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "member": self.id }))
        }

        async fn current_status(&self) -> ServiceStatus {
            if self.healthy.load(Ordering::SeqCst) {
                ServiceStatus::online()
            } else {
                ServiceStatus::offline("member down")
            }
        }

        async fn probe_health(&self) -> Result<bool, HandleError> {
            Ok(self.healthy.load(Ordering::SeqCst))
        }
    }

    fn op(raw: &str) -> OperationName {
        OperationName::parse(raw).unwrap()
    }

    fn handles(services: &[Arc<CountingService>]) -> Vec<Arc<dyn ServiceHandle>> {
        services
            .iter()
            .map(|s| s.clone() as Arc<dyn ServiceHandle>)
            .collect()
    }

    #[tokio::test]
    async fn round_robin_pool_spreads_calls_across_members() {
        let first = CountingService::new(0);
        let second = CountingService::new(1);
        let pool = ServicePool::new(
            handles(&[first.clone(), second.clone()]),
            BalancingPolicy::RoundRobin,
        )
        .await;

        for _ in 0..4 {
            pool.execute(&op("work"), json!({})).await.unwrap();
        }

        assert_eq!(first.calls.load(Ordering::SeqCst), 2);
        assert_eq!(second.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn pool_with_no_online_member_reports_no_available_instance() {
        let member = CountingService::new(0);
        member.healthy.store(false, Ordering::SeqCst);
        let pool = ServicePool::new(handles(&[member]), BalancingPolicy::RoundRobin).await;

        let err = pool.execute(&op("work"), json!({})).await.unwrap_err();
        assert!(matches!(err, HandleError::NoAvailableInstance));
    }

    #[tokio::test]
    async fn failing_member_is_skipped_on_subsequent_calls() {
        let flaky = CountingService::new(0);
        let steady = CountingService::new(1);
        let pool = ServicePool::new(
            handles(&[flaky.clone(), steady.clone()]),
            BalancingPolicy::RoundRobin,
        )
        .await;

        flaky.healthy.store(false, Ordering::SeqCst);
        // First selection hits the flaky member and fails; it gets marked
        // offline inside the pool.
        pool.execute(&op("work"), json!({})).await.unwrap_err();

        for _ in 0..3 {
            let value = pool.execute(&op("work"), json!({})).await.unwrap();
            assert_eq!(value["member"], 1);
        }
    }

    #[tokio::test]
    async fn pool_status_aggregates_members() {
        let up = CountingService::new(0);
        let down = CountingService::new(1);
        down.healthy.store(false, Ordering::SeqCst);
        let pool = ServicePool::new(handles(&[up, down]), BalancingPolicy::RoundRobin).await;

        let status = pool.current_status().await;
        assert!(status.online);

        let probes = pool.probe_health().await.unwrap();
        assert!(probes);

        let member_statuses = pool.member_statuses().await;
        assert!(member_statuses[0].online);
        assert!(!member_statuses[1].online);
    }

    #[tokio::test]
    async fn pool_goes_unhealthy_when_every_member_is_down() {
        let a = CountingService::new(0);
        let b = CountingService::new(1);
        a.healthy.store(false, Ordering::SeqCst);
        b.healthy.store(false, Ordering::SeqCst);
        let pool = ServicePool::new(handles(&[a, b]), BalancingPolicy::RoundRobin).await;

        assert!(!pool.probe_health().await.unwrap());
        let status = pool.current_status().await;
        assert!(!status.online);
        assert_eq!(status.error.as_deref(), Some("no pool member is online"));
    }
}
