//! Control plane configuration.

use std::path::Path;

use serde::Deserialize;

use flowctl_core::{
    Permission, Project, ProjectCode, ScheduleRef, TaskDefinitionRef, User, WorkerGroup,
    DEFAULT_WORKER_GROUP,
};

/// Control plane configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address.
    pub http_bind_addr: String,

    /// Registry sessions without a heartbeat for this long are expired (seconds).
    pub session_timeout_secs: u64,

    /// How often stale registry sessions are swept (seconds).
    pub session_sweep_interval_secs: u64,

    /// Worker group that always exists and cannot be deleted.
    pub default_worker_group: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_bind_addr: "[::1]:12345".to_string(),
            session_timeout_secs: 45,
            session_sweep_interval_secs: 15,
            default_worker_group: DEFAULT_WORKER_GROUP.to_string(),
        }
    }
}

/// Errors loading a seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Initial directory contents, loaded from TOML.
///
/// ```toml
/// [[users]]
/// id = 1
/// name = "admin"
/// role = "ADMIN"
///
/// [[worker_groups]]
/// name = "etl"
///
/// [[projects]]
/// code = 1
/// name = "demo"
///
/// [[bindings]]
/// project_code = 1
/// worker_group = "etl"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub users: Vec<User>,
    pub worker_groups: Vec<WorkerGroup>,
    pub projects: Vec<Project>,
    pub grants: Vec<GrantSeed>,
    pub bindings: Vec<BindingSeed>,
    pub task_definitions: Vec<TaskDefinitionRef>,
    pub schedules: Vec<ScheduleRef>,
}

/// A user's permission on a project.
#[derive(Debug, Clone, Deserialize)]
pub struct GrantSeed {
    pub user: String,
    pub project_code: ProjectCode,
    pub permission: Permission,
}

/// An initial project binding.
#[derive(Debug, Clone, Deserialize)]
pub struct BindingSeed {
    pub project_code: ProjectCode,
    pub worker_group: String,
}

impl Seed {
    /// Parse seed data from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, SeedError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load seed data from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }
}
