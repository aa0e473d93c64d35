//! Project to worker group binding reconciliation.
//!
//! Assignment takes the desired set of names and diffs it against what is
//! stored. Deletions go out as one bulk operation guarded by the in-use
//! check; insertions go out one by one and are never rolled back.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use flowctl_core::{Permission, ProjectCode, ProjectWorkerGroup, ScheduleRef, User};

use crate::error::BindingError;
use crate::service::WorkerGroupService;
use crate::store::{
    BindingStore, PermissionService, ProjectDirectory, ScheduleDirectory, TaskDefinitionDirectory,
};

/// Result of a successful assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignOutcome {
    pub project_code: ProjectCode,

    /// Bindings after reconciliation.
    pub worker_groups: BTreeSet<String>,

    /// Names newly bound.
    pub added: BTreeSet<String>,

    /// Names unbound.
    pub removed: BTreeSet<String>,
}

/// Current bindings of a project, as seen by a permitted reader.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignedWorkerGroups {
    pub bindings: Vec<ProjectWorkerGroup>,

    /// Bound names that task definitions in the project reference.
    pub used_names: BTreeSet<String>,

    /// Schedules of the project pinned to a bound group.
    pub schedule_refs: Vec<ScheduleRef>,
}

/// Collaborators of [`ProjectWorkerGroupService`].
pub struct BindingDeps {
    pub permissions: Arc<dyn PermissionService>,
    pub projects: Arc<dyn ProjectDirectory>,
    pub bindings: Arc<dyn BindingStore>,
    pub task_definitions: Arc<dyn TaskDefinitionDirectory>,
    pub schedules: Arc<dyn ScheduleDirectory>,
}

/// Assigns worker groups to projects.
pub struct ProjectWorkerGroupService {
    deps: BindingDeps,
    worker_groups: Arc<WorkerGroupService>,
}

impl ProjectWorkerGroupService {
    /// Create a new ProjectWorkerGroupService.
    pub fn new(deps: BindingDeps, worker_groups: Arc<WorkerGroupService>) -> Self {
        Self {
            deps,
            worker_groups,
        }
    }

    /// Reconcile a project's bindings to exactly `desired`.
    pub async fn assign_worker_groups(
        &self,
        user: &User,
        project_code: Option<ProjectCode>,
        desired: &[String],
    ) -> Result<AssignOutcome, BindingError> {
        if !self
            .deps
            .permissions
            .has_project_permission(user, project_code, Permission::Write)
            .await
        {
            return Err(BindingError::PermissionDenied {
                user: user.name.clone(),
                project: project_code,
            });
        }

        let Some(code) = project_code else {
            return Err(BindingError::ProjectNotFound(None));
        };
        if self.deps.projects.find_project_by_code(code).await?.is_none() {
            return Err(BindingError::ProjectNotFound(Some(code)));
        }

        let desired: BTreeSet<String> = desired.iter().cloned().collect();
        let known = self.worker_groups.all_worker_group_names().await?;
        let unknown: Vec<String> = desired.difference(&known).cloned().collect();
        if !unknown.is_empty() {
            return Err(BindingError::WorkerGroupNotFound(unknown));
        }

        let current: BTreeSet<String> = self
            .deps
            .bindings
            .find_bindings_by_project(code)
            .await?
            .into_iter()
            .map(|b| b.worker_group)
            .collect();
        let to_remove: BTreeSet<String> = current.difference(&desired).cloned().collect();
        let to_add: BTreeSet<String> = desired.difference(&current).cloned().collect();

        if !to_remove.is_empty() {
            let referenced: BTreeSet<String> = self
                .deps
                .task_definitions
                .list_worker_group_names_referenced(code)
                .await?
                .into_iter()
                .collect();
            let in_use: Vec<String> = to_remove.intersection(&referenced).cloned().collect();
            if !in_use.is_empty() {
                return Err(BindingError::WorkerGroupInUse(in_use));
            }

            let names: Vec<String> = to_remove.iter().cloned().collect();
            match self.deps.bindings.bulk_delete(code, &names).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(project = %code, names = ?names, "Bulk delete removed fewer bindings than requested");
                    return Err(BindingError::Persistence(format!(
                        "failed to unbind {}",
                        names.join(", ")
                    )));
                }
                Err(e) => {
                    warn!(project = %code, error = %e, "Bulk delete of bindings failed");
                    return Err(e.into());
                }
            }
        }

        let mut failed = Vec::new();
        for name in &to_add {
            match self
                .deps
                .bindings
                .insert(ProjectWorkerGroup::new(code, name.clone()))
                .await
            {
                Ok(0) => failed.push(format!("{name}: no rows inserted")),
                Ok(_) => debug!(project = %code, worker_group = %name, "Bound worker group"),
                Err(e) => failed.push(format!("{name}: {e}")),
            }
        }
        if !failed.is_empty() {
            warn!(project = %code, failures = ?failed, "Some worker group bindings failed to insert");
            return Err(BindingError::Persistence(failed.join("; ")));
        }

        info!(
            project = %code,
            user = %user.name,
            added = to_add.len(),
            removed = to_remove.len(),
            "Worker groups assigned"
        );

        Ok(AssignOutcome {
            project_code: code,
            worker_groups: desired,
            added: to_add,
            removed: to_remove,
        })
    }

    /// Bindings of a project. Unpermitted readers and unknown projects get an
    /// empty result rather than an error.
    pub async fn query_assigned_worker_groups(
        &self,
        user: &User,
        project_code: ProjectCode,
    ) -> Result<AssignedWorkerGroups, BindingError> {
        if !self
            .deps
            .permissions
            .has_project_permission(user, Some(project_code), Permission::Read)
            .await
        {
            debug!(project = %project_code, user = %user.name, "Query without read permission");
            return Ok(AssignedWorkerGroups::default());
        }
        let Some(project) = self.deps.projects.find_project_by_code(project_code).await? else {
            return Ok(AssignedWorkerGroups::default());
        };

        let bindings = self.deps.bindings.find_bindings_by_project(project_code).await?;
        let bound: BTreeSet<&str> = bindings.iter().map(|b| b.worker_group.as_str()).collect();

        let used_names = self
            .deps
            .task_definitions
            .list_worker_group_names_referenced(project_code)
            .await?
            .into_iter()
            .filter(|name| bound.contains(name.as_str()))
            .collect();

        let schedule_refs = self
            .deps
            .schedules
            .list_schedules_referencing_project(&project.name)
            .await?
            .into_iter()
            .filter(|s| bound.contains(s.worker_group.as_str()))
            .collect();

        Ok(AssignedWorkerGroups {
            bindings,
            used_names,
            schedule_refs,
        })
    }
}
