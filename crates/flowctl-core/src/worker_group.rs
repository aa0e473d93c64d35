//! Worker group types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Name of the worker group every worker joins unless configured otherwise.
pub const DEFAULT_WORKER_GROUP: &str = "default";

/// A named pool of worker nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerGroup {
    /// Surrogate id assigned by the directory (None until persisted).
    #[serde(default)]
    pub id: Option<i64>,

    /// Unique worker group name.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Statically configured worker addresses (`host:port`).
    #[serde(default)]
    pub addresses: Vec<String>,

    /// When the group was created.
    #[serde(default = "Utc::now")]
    pub create_time: DateTime<Utc>,

    /// When the group was last updated.
    #[serde(default = "Utc::now")]
    pub update_time: DateTime<Utc>,
}

impl WorkerGroup {
    /// Create a new WorkerGroup with no addresses.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            addresses: Vec::new(),
            create_time: now,
            update_time: now,
        }
    }

    /// Builder method to set description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder method to add a static address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.addresses.push(address.into());
        self
    }

    /// Validate this group's name.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_worker_group_name(&self.name)
    }
}

/// Worker group names become registry path segments and are joined with
/// commas in worker heartbeats, so neither character may appear in them.
pub fn validate_worker_group_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed != name || name.contains(['/', ',']) {
        return Err(CoreError::InvalidWorkerGroupName(name.to_string()));
    }
    Ok(())
}
