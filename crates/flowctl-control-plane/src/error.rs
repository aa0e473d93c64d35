//! Control plane errors.
//!
//! Validation failures (permission, not-found, in-use) are detected before
//! anything is mutated. Persistence failures can happen mid-operation and
//! are the only ones worth retrying.

use flowctl_core::{CoreError, ProjectCode, Status};
use flowctl_registry::RegistryError;
use thiserror::Error;

/// Failure reported by one of the backing directories.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store rejected or could not complete the operation.
    #[error("Store operation '{operation}' failed: {reason}")]
    Failed { operation: String, reason: String },

    /// A uniqueness constraint was violated.
    #[error("Duplicate key: {0}")]
    Duplicate(String),
}

impl StoreError {
    /// Create a generic failure.
    pub fn failed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from assigning or querying project worker group bindings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingError {
    /// Acting user lacks the required project permission.
    #[error("User '{user}' has no permission on project {project:?}")]
    PermissionDenied {
        user: String,
        project: Option<ProjectCode>,
    },

    /// Project code absent or unknown.
    #[error("Project not found: {0:?}")]
    ProjectNotFound(Option<ProjectCode>),

    /// Requested worker groups do not exist.
    #[error("Worker groups not found: {}", .0.join(", "))]
    WorkerGroupNotFound(Vec<String>),

    /// Worker groups to unbind are still referenced by task definitions.
    #[error("Worker groups still referenced by task definitions: {}", .0.join(", "))]
    WorkerGroupInUse(Vec<String>),

    /// The binding store failed mid-operation.
    #[error("Failed to persist worker group bindings: {0}")]
    Persistence(String),
}

impl BindingError {
    /// Status code surfaced to API callers.
    pub fn status(&self) -> Status {
        match self {
            Self::PermissionDenied { .. } => Status::UserNoOperationPerm,
            Self::ProjectNotFound(_) => Status::ProjectNotExist,
            Self::WorkerGroupNotFound(_) => Status::WorkerGroupNotExist,
            Self::WorkerGroupInUse(_) => Status::UsedWorkerGroupExists,
            Self::Persistence(_) => Status::AssignWorkerGroupToProjectError,
        }
    }

    /// True if the caller must fix its input; false if a retry may succeed.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

impl From<StoreError> for BindingError {
    fn from(e: StoreError) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<WorkerGroupError> for BindingError {
    fn from(e: WorkerGroupError) -> Self {
        Self::Persistence(e.to_string())
    }
}

/// Errors from the worker group store.
#[derive(Debug, Error)]
pub enum WorkerGroupError {
    /// Acting user is not an administrator.
    #[error("User '{0}' may not manage worker groups")]
    PermissionDenied(String),

    /// Name is malformed.
    #[error(transparent)]
    InvalidName(#[from] CoreError),

    /// Name already taken.
    #[error("Worker group already exists: {0}")]
    NameExists(String),

    /// No such worker group in the directory.
    #[error("Worker group not found: {0}")]
    NotFound(String),

    /// Still bound to projects or referenced by task definitions.
    #[error("Worker group '{name}' is in use (projects: {projects:?}, task definitions: {referenced_by_tasks})")]
    InUse {
        name: String,
        projects: Vec<ProjectCode>,
        referenced_by_tasks: bool,
    },

    /// The default group is permanent.
    #[error("The default worker group '{0}' cannot be deleted")]
    DefaultGroup(String),

    /// Directory failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl WorkerGroupError {
    /// Status code surfaced to API callers.
    pub fn status(&self) -> Status {
        match self {
            Self::PermissionDenied(_) => Status::UserNoOperationPerm,
            Self::InvalidName(_) => Status::InvalidWorkerGroupName,
            Self::NameExists(_) => Status::WorkerGroupNameExist,
            Self::NotFound(_) => Status::WorkerGroupNotExist,
            Self::InUse { .. } => Status::UsedWorkerGroupExists,
            Self::DefaultGroup(_) => Status::DeleteDefaultWorkerGroupForbidden,
            Self::Store(_) => Status::SaveWorkerGroupError,
            Self::Registry(_) => Status::InternalError,
        }
    }

    /// True if the caller must fix its input; false if a retry may succeed.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Store(_) | Self::Registry(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_error_classification() {
        let in_use = BindingError::WorkerGroupInUse(vec!["a".into(), "b".into()]);
        assert_eq!(in_use.status(), Status::UsedWorkerGroupExists);
        assert!(in_use.is_validation());
        assert!(in_use.to_string().contains("a, b"));

        let persistence: BindingError = StoreError::failed("bulk_delete", "0 rows").into();
        assert_eq!(persistence.status(), Status::AssignWorkerGroupToProjectError);
        assert!(!persistence.is_validation());
    }
}
