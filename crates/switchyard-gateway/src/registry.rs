//! The service registry: name→handle and name→status bookkeeping plus the
//! single mutating execution path.
//!
//! Both maps live behind one lock so registration and unregistration mutate
//! them atomically; no entry can exist in one map without the other.

use crate::cell::{ActiveRequestGuard, StatusCell};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use switchyard_core::{
    DispatchError, HandleError, OperationName, ServiceDescriptor, ServiceHandle, ServiceName,
    ServiceStatus,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Aggregate view over the current registry contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_services: usize,
    pub online_services: usize,
    pub offline_services: usize,
    pub total_operations: usize,
}

#[derive(Clone)]
struct Entry {
    descriptor: Arc<ServiceDescriptor>,
    handle: Arc<dyn ServiceHandle>,
}

#[derive(Default)]
struct Maps {
    services: HashMap<ServiceName, Entry>,
    statuses: HashMap<ServiceName, Arc<StatusCell>>,
}

impl Maps {
    fn known_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    }
}

/// One probe unit of work: everything the health monitor needs for a single
/// service, cloned out of the maps so probing never holds the registry lock.
pub(crate) struct ProbeTarget {
    pub(crate) name: ServiceName,
    pub(crate) handle: Arc<dyn ServiceHandle>,
    pub(crate) cell: Arc<StatusCell>,
}

/// Owns the mutable mapping from service name to live handle and cached
/// status, and mediates every execution so counters and status update around
/// the call.
///
/// The registry is shared behind an `Arc`; all methods take `&self`.
pub struct ServiceRegistry {
    inner: RwLock<Maps>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Maps::default()),
        }
    }

    /// Register a service under its descriptor's name, seeding the cached
    /// status from the handle's own report. An existing registration under
    /// the same name is silently replaced (logged, not an error).
    pub async fn register(&self, descriptor: ServiceDescriptor, handle: Arc<dyn ServiceHandle>) {
        let initial = handle.current_status().await;
        let name = descriptor.name.clone();
        let cell = Arc::new(StatusCell::seeded(&initial));

        let mut maps = self.inner.write().await;
        let replaced = maps
            .services
            .insert(
                name.clone(),
                Entry {
                    descriptor: Arc::new(descriptor),
                    handle,
                },
            )
            .is_some();
        maps.statuses.insert(name.clone(), cell);

        if replaced {
            warn!(service = %name, "replacing existing service registration");
        } else {
            debug!(service = %name, online = initial.online, "registered service");
        }
    }

    /// Remove a registration. Absent names are a no-op, not an error.
    /// Returns whether anything was removed.
    pub async fn unregister(&self, name: &ServiceName) -> bool {
        let mut maps = self.inner.write().await;
        let removed = maps.services.remove(name).is_some();
        maps.statuses.remove(name);
        if removed {
            debug!(service = %name, "unregistered service");
        }
        removed
    }

    pub async fn has(&self, name: &ServiceName) -> bool {
        self.inner.read().await.services.contains_key(name)
    }

    /// Shared reference to the live handle.
    pub async fn get(&self, name: &ServiceName) -> Result<Arc<dyn ServiceHandle>, DispatchError> {
        let maps = self.inner.read().await;
        match maps.services.get(name) {
            Some(entry) => Ok(entry.handle.clone()),
            None => Err(DispatchError::ServiceNotFound {
                service: name.to_string(),
                known: maps.known_names(),
            }),
        }
    }

    /// All registered names, sorted.
    pub async fn service_names(&self) -> Vec<ServiceName> {
        let maps = self.inner.read().await;
        let mut names: Vec<ServiceName> = maps.services.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names whose cached status is online, sorted.
    pub async fn available_services(&self) -> Vec<ServiceName> {
        let maps = self.inner.read().await;
        let mut names: Vec<ServiceName> = maps
            .statuses
            .iter()
            .filter(|(_, cell)| cell.is_online())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub async fn descriptor_of(&self, name: &ServiceName) -> Option<Arc<ServiceDescriptor>> {
        self.inner
            .read()
            .await
            .services
            .get(name)
            .map(|entry| entry.descriptor.clone())
    }

    /// Cached status snapshot. Never probes; freshness is bounded by the
    /// health-probe interval.
    pub async fn status_of(&self, name: &ServiceName) -> Option<ServiceStatus> {
        let cell = self.inner.read().await.statuses.get(name).cloned()?;
        Some(cell.snapshot().await)
    }

    /// Aggregate counts over the current snapshot.
    pub async fn stats(&self) -> RegistryStats {
        let maps = self.inner.read().await;
        let total_services = maps.services.len();
        let online_services = maps
            .statuses
            .values()
            .filter(|cell| cell.is_online())
            .count();
        let total_operations = maps
            .services
            .values()
            .map(|entry| entry.descriptor.operations.len())
            .sum();
        RegistryStats {
            total_services,
            online_services,
            offline_services: total_services - online_services,
            total_operations,
        }
    }

    /// Execute one operation against a registered service.
    ///
    /// The only mutating execution path: request counters are guard-scoped
    /// around the backend call, a success refreshes the measured latency, and
    /// a backend failure flips the cached status offline until the next
    /// successful probe or call.
    ///
    /// Returns the backend result together with the call's wall-clock
    /// duration.
    pub async fn execute_tool(
        &self,
        service: &ServiceName,
        operation: &OperationName,
        params: Value,
    ) -> Result<(Value, Duration), DispatchError> {
        let (handle, cell) = {
            let maps = self.inner.read().await;
            match (maps.services.get(service), maps.statuses.get(service)) {
                (Some(entry), Some(cell)) => (entry.handle.clone(), cell.clone()),
                _ => {
                    return Err(DispatchError::ServiceNotFound {
                        service: service.to_string(),
                        known: maps.known_names(),
                    });
                }
            }
        };

        if !cell.is_online() {
            return Err(DispatchError::ServiceOffline {
                service: service.to_string(),
                detail: cell.last_error().await,
            });
        }

        let _guard = ActiveRequestGuard::acquire(cell.clone());
        let started = Instant::now();
        let result = handle.execute(operation, params).await;
        let elapsed = started.elapsed();

        match result {
            Ok(value) => {
                cell.mark_online(Some(elapsed)).await;
                Ok((value, elapsed))
            }
            // A pool with zero online members never invoked a backend, so
            // the fail-fast offline flip does not apply.
            Err(HandleError::NoAvailableInstance) => Err(DispatchError::NoAvailableInstance {
                service: service.to_string(),
            }),
            Err(err) => {
                cell.mark_offline(err.to_string()).await;
                warn!(
                    service = %service,
                    operation = %operation,
                    error = %err,
                    "execution failed, marking service offline"
                );
                Err(DispatchError::ExecutionError {
                    service: service.to_string(),
                    operation: operation.to_string(),
                    message: err.to_string(),
                })
            }
        }
    }

    /// Snapshot of (name, handle, status) triples for the probe loop.
    pub(crate) async fn probe_targets(&self) -> Vec<ProbeTarget> {
        let maps = self.inner.read().await;
        maps.services
            .iter()
            .filter_map(|(name, entry)| {
                maps.statuses.get(name).map(|cell| ProbeTarget {
                    name: name.clone(),
                    handle: entry.handle.clone(),
                    cell: cell.clone(),
                })
            })
            .collect()
    }

    /// Key sets of both maps, for invariant checks in tests.
    #[cfg(test)]
    async fn key_sets(&self) -> (Vec<ServiceName>, Vec<ServiceName>) {
        let maps = self.inner.read().await;
        let mut handles: Vec<ServiceName> = maps.services.keys().cloned().collect();
        let mut statuses: Vec<ServiceName> = maps.statuses.keys().cloned().collect();
        handles.sort();
        statuses.sort();
        (handles, statuses)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
