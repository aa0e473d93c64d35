//! Worker group membership derived from registry liveness nodes.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::keys;
use crate::registry::{EventKind, Registry, RegistryEvent, Subscription};
use crate::RegistryError;

/// Payload a worker writes into each of its liveness nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerHeartbeat {
    /// Worker RPC address (`host:port`).
    pub address: String,

    /// Hostname of the worker machine.
    pub host: String,

    /// Worker groups the worker belongs to.
    pub groups: Vec<String>,

    /// CPU usage ratio (0.0 to 1.0).
    pub cpu_usage: f64,

    /// Memory usage ratio (0.0 to 1.0).
    pub memory_usage: f64,

    /// When the worker process started.
    pub startup_time: DateTime<Utc>,

    /// When this heartbeat was written.
    pub report_time: DateTime<Utc>,
}

impl WorkerHeartbeat {
    /// Create a heartbeat stamped with the current time.
    pub fn new(address: impl Into<String>, host: impl Into<String>, groups: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            address: address.into(),
            host: host.into(),
            groups,
            cpu_usage: 0.0,
            memory_usage: 0.0,
            startup_time: now,
            report_time: now,
        }
    }

    /// Encode as the registry node payload.
    pub fn to_json(&self) -> Result<String, RegistryError> {
        serde_json::to_string(self).map_err(|e| RegistryError::InvalidPayload {
            key: self.address.clone(),
            reason: e.to_string(),
        })
    }
}

/// A live worker within a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerNode {
    /// Worker address.
    pub address: String,

    /// Last heartbeat, if the payload could be decoded.
    pub heartbeat: Option<WorkerHeartbeat>,
}

/// A worker joining or leaving a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    Joined { group: String, address: String },
    Left { group: String, address: String },
}

impl MembershipChange {
    /// Interpret a registry event; heartbeat refreshes are not membership
    /// changes and yield `None`.
    pub fn from_event(event: &RegistryEvent) -> Option<Self> {
        let (group, address) = keys::parse_worker_node_path(&event.key)?;
        match event.kind {
            EventKind::Added => Some(Self::Joined { group, address }),
            EventKind::Removed => Some(Self::Left { group, address }),
            EventKind::Updated => None,
        }
    }
}

/// Read-only view of which workers currently report into which group.
#[derive(Clone)]
pub struct WorkerGroupMembership {
    registry: Arc<dyn Registry>,
}

impl WorkerGroupMembership {
    /// Create a membership view over a registry.
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }

    /// Names of every group with at least one live worker.
    pub async fn live_groups(&self) -> Result<Vec<String>, RegistryError> {
        self.registry.children(keys::WORKER_GROUPS_ROOT).await
    }

    /// Live workers of one group, sorted by address.
    pub async fn live_members(&self, group: &str) -> Result<Vec<WorkerNode>, RegistryError> {
        let group_path = keys::worker_group_path(group);
        let mut members = Vec::new();

        for address in self.registry.children(&group_path).await? {
            let key = keys::worker_node_path(group, &address);
            // The node may vanish between listing and reading.
            let Some(value) = self.registry.get(&key).await? else {
                continue;
            };
            let heartbeat = match serde_json::from_str::<WorkerHeartbeat>(&value) {
                Ok(heartbeat) => Some(heartbeat),
                Err(e) => {
                    warn!(key = %key, error = %e, "Undecodable worker heartbeat");
                    None
                }
            };
            members.push(WorkerNode { address, heartbeat });
        }

        Ok(members)
    }

    /// Every live group with its members.
    pub async fn snapshot(&self) -> Result<BTreeMap<String, Vec<WorkerNode>>, RegistryError> {
        let mut snapshot = BTreeMap::new();
        for group in self.live_groups().await? {
            let members = self.live_members(&group).await?;
            if !members.is_empty() {
                snapshot.insert(group, members);
            }
        }
        Ok(snapshot)
    }

    /// Watch the whole worker group tree.
    pub fn watch(&self) -> Result<Subscription, RegistryError> {
        self.registry.subscribe(keys::WORKER_GROUPS_ROOT)
    }
}
