//! Result status codes surfaced to the API layer.

use serde::{Deserialize, Serialize};

/// Status code carried by every control plane result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Operation succeeded.
    #[default]
    Success,
    /// Caller lacks the required permission.
    UserNoOperationPerm,
    /// Project code absent or unknown.
    ProjectNotExist,
    /// One or more worker group names are unknown.
    WorkerGroupNotExist,
    /// Worker group is still referenced and cannot be removed.
    UsedWorkerGroupExists,
    /// Worker group name already taken.
    WorkerGroupNameExist,
    /// Worker group name is malformed.
    InvalidWorkerGroupName,
    /// The default worker group cannot be removed.
    DeleteDefaultWorkerGroupForbidden,
    /// Persisting binding changes failed.
    AssignWorkerGroupToProjectError,
    /// Persisting worker group changes failed.
    SaveWorkerGroupError,
    /// Internal failure outside the categories above.
    InternalError,
}

impl Status {
    /// Stable numeric code.
    pub fn code(&self) -> u32 {
        match self {
            Self::Success => 0,
            Self::UserNoOperationPerm => 30001,
            Self::ProjectNotExist => 10018,
            Self::WorkerGroupNotExist => 10213,
            Self::UsedWorkerGroupExists => 10214,
            Self::WorkerGroupNameExist => 10135,
            Self::InvalidWorkerGroupName => 10136,
            Self::DeleteDefaultWorkerGroupForbidden => 10137,
            Self::AssignWorkerGroupToProjectError => 10215,
            Self::SaveWorkerGroupError => 10138,
            Self::InternalError => 10000,
        }
    }

    /// Default human-readable message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::UserNoOperationPerm => "user has no operation privilege",
            Self::ProjectNotExist => "project does not exist",
            Self::WorkerGroupNotExist => "worker group does not exist",
            Self::UsedWorkerGroupExists => "worker group is referenced by task definitions",
            Self::WorkerGroupNameExist => "worker group name already exists",
            Self::InvalidWorkerGroupName => "worker group name is invalid",
            Self::DeleteDefaultWorkerGroupForbidden => "the default worker group cannot be deleted",
            Self::AssignWorkerGroupToProjectError => "failed to assign worker groups to project",
            Self::SaveWorkerGroupError => "failed to save worker group",
            Self::InternalError => "internal server error",
        }
    }

    /// Returns true for the success status.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
