//! Projects, their worker group bindings, and the read-only views that
//! reference worker groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProjectCode;

/// A project owning task definitions and worker group bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Immutable project code.
    pub code: ProjectCode,

    /// Mutable display name.
    pub name: String,

    /// Name of the owning user.
    #[serde(default)]
    pub owner: String,
}

impl Project {
    /// Create a new Project.
    pub fn new(code: ProjectCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            owner: String::new(),
        }
    }

    /// Builder method to set the owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }
}

/// Association of a worker group name to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectWorkerGroup {
    /// Surrogate id.
    pub id: i64,

    /// Bound project.
    pub project_code: ProjectCode,

    /// Bound worker group name.
    pub worker_group: String,

    /// When the binding was created.
    pub create_time: DateTime<Utc>,

    /// When the binding was last updated.
    pub update_time: DateTime<Utc>,
}

impl ProjectWorkerGroup {
    /// Create an unsaved binding (id 0; the store assigns the real one).
    pub fn new(project_code: ProjectCode, worker_group: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            project_code,
            worker_group: worker_group.into(),
            create_time: now,
            update_time: now,
        }
    }
}

/// A task definition's pin to a worker group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinitionRef {
    /// Task definition code.
    pub code: i64,

    /// Task definition name.
    pub name: String,

    /// Owning project.
    pub project_code: ProjectCode,

    /// Worker group the task runs on.
    pub worker_group: String,
}

/// A schedule definition pinned to a worker group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRef {
    /// Schedule id.
    pub id: i64,

    /// Name of the scheduled workflow.
    pub workflow_name: String,

    /// Name of the project the workflow belongs to.
    pub project_name: String,

    /// Worker group the schedule dispatches to.
    pub worker_group: String,

    /// Cron expression.
    #[serde(default)]
    pub crontab: String,
}
