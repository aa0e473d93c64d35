//! Directories the control plane consumes.
//!
//! Each trait is an external collaborator (SQL tables, the permission
//! system, ...). [`memory::InMemoryStore`] implements all of them for
//! single-node deployments and tests.

use std::collections::BTreeSet;

use async_trait::async_trait;

use flowctl_core::{
    Permission, Project, ProjectCode, ProjectWorkerGroup, ScheduleRef, User, WorkerGroup,
};

use crate::error::StoreError;

pub mod memory;

pub use memory::InMemoryStore;

/// Answers "may user U do P on project R?".
#[async_trait]
pub trait PermissionService: Send + Sync {
    /// `project` is `None` when the caller supplied no project code; only
    /// administrators pass in that case.
    async fn has_project_permission(
        &self,
        user: &User,
        project: Option<ProjectCode>,
        permission: Permission,
    ) -> bool;
}

/// Looks up users by login name.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError>;
}

/// Authoritative project records.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn find_project_by_code(&self, code: ProjectCode) -> Result<Option<Project>, StoreError>;
}

/// Administratively created worker groups.
#[async_trait]
pub trait WorkerGroupDirectory: Send + Sync {
    async fn list_all_worker_group_names(&self) -> Result<BTreeSet<String>, StoreError>;

    async fn list_all_worker_groups(&self) -> Result<Vec<WorkerGroup>, StoreError>;

    async fn find_worker_group(&self, name: &str) -> Result<Option<WorkerGroup>, StoreError>;

    /// Insert a new group; fails with [`StoreError::Duplicate`] if the name is taken.
    async fn insert_worker_group(&self, group: WorkerGroup) -> Result<WorkerGroup, StoreError>;

    /// Returns false if no group had that name.
    async fn delete_worker_group(&self, name: &str) -> Result<bool, StoreError>;
}

/// Project to worker group bindings.
#[async_trait]
pub trait BindingStore: Send + Sync {
    async fn find_bindings_by_project(
        &self,
        code: ProjectCode,
    ) -> Result<Vec<ProjectWorkerGroup>, StoreError>;

    /// Projects binding any of `names`.
    async fn find_bound_projects_for_groups(
        &self,
        names: &[String],
    ) -> Result<BTreeSet<ProjectCode>, StoreError>;

    /// Delete the bindings of `code` to each of `names` in one operation.
    ///
    /// Returns false if the store removed fewer rows than requested.
    async fn bulk_delete(&self, code: ProjectCode, names: &[String]) -> Result<bool, StoreError>;

    /// Insert one binding, returning the number of rows affected.
    async fn insert(&self, binding: ProjectWorkerGroup) -> Result<u64, StoreError>;
}

/// Worker group references held by task definitions.
#[async_trait]
pub trait TaskDefinitionDirectory: Send + Sync {
    /// Worker group names referenced by any task definition in the project.
    async fn list_worker_group_names_referenced(
        &self,
        code: ProjectCode,
    ) -> Result<Vec<String>, StoreError>;

    /// True if any task definition in any project references the group.
    async fn is_worker_group_referenced(&self, name: &str) -> Result<bool, StoreError>;
}

/// Schedule definitions.
#[async_trait]
pub trait ScheduleDirectory: Send + Sync {
    async fn list_schedules_referencing_project(
        &self,
        project_name: &str,
    ) -> Result<Vec<ScheduleRef>, StoreError>;
}
