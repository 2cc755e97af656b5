//! Instance selection across a pool of redundant handles.
//!
//! Candidates are always reduced to their online members first; selection
//! policy applies to the filtered list only. The round-robin cursor is scoped
//! to one balancer instance and is meaningless under the other policies.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Selection policy for pooled instances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancingPolicy {
    /// Cyclic selection over the online members.
    #[default]
    RoundRobin,
    /// Uniform random pick, stateless.
    Random,
    /// Member with the fewest in-flight requests; first wins ties.
    LeastConnections,
}

impl FromStr for BalancingPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "round_robin" => Ok(BalancingPolicy::RoundRobin),
            "random" => Ok(BalancingPolicy::Random),
            "least_connections" => Ok(BalancingPolicy::LeastConnections),
            other => Err(format!(
                "unknown balancing policy '{other}' (expected round_robin, random or least_connections)"
            )),
        }
    }
}

/// A candidate the balancer can weigh: its cached online flag and in-flight
/// request count.
pub trait BalancedInstance {
    fn is_online(&self) -> bool;
    fn active_requests(&self) -> u32;
}

/// Policy-selectable picker over a candidate set.
pub struct LoadBalancer {
    policy: RwLock<BalancingPolicy>,
    cursor: AtomicUsize,
}

impl LoadBalancer {
    pub fn new(policy: BalancingPolicy) -> Self {
        Self {
            policy: RwLock::new(policy),
            cursor: AtomicUsize::new(0),
        }
    }

    pub async fn policy(&self) -> BalancingPolicy {
        *self.policy.read().await
    }

    /// Switch policy. Resets the round-robin cursor; the stateless policies
    /// are unaffected by the reset.
    pub async fn set_policy(&self, policy: BalancingPolicy) {
        let mut current = self.policy.write().await;
        *current = policy;
        self.cursor.store(0, Ordering::Release);
    }

    /// Pick one online candidate, or `None` when no candidate is online.
    ///
    /// The round-robin cursor is taken modulo the filtered list's current
    /// length, so its cycle is only stable while the online set does not
    /// change shape between calls.
    pub async fn select<'a, T: BalancedInstance>(&self, candidates: &'a [T]) -> Option<&'a T> {
        let online: Vec<&T> = candidates.iter().filter(|c| c.is_online()).collect();
        if online.is_empty() {
            return None;
        }

        match *self.policy.read().await {
            BalancingPolicy::RoundRobin => {
                let index = self.cursor.fetch_add(1, Ordering::AcqRel) % online.len();
                Some(online[index])
            }
            BalancingPolicy::Random => {
                let index = rand::rng().random_range(0..online.len());
                Some(online[index])
            }
            BalancingPolicy::LeastConnections => online
                .into_iter()
                .min_by_key(|candidate| candidate.active_requests()),
        }
    }
}

impl Default for LoadBalancer {
    fn default() -> Self {
        Self::new(BalancingPolicy::default())
    }
}
