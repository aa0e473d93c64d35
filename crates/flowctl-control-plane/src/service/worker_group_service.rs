//! Worker group store: directory records merged with registry liveness.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use flowctl_core::worker_group::validate_worker_group_name;
use flowctl_core::{User, WorkerGroup};
use flowctl_registry::{Subscription, WorkerGroupMembership, WorkerNode};

use crate::error::{StoreError, WorkerGroupError};
use crate::store::{BindingStore, TaskDefinitionDirectory, WorkerGroupDirectory};

/// A worker group together with the workers currently reporting into it.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerGroupView {
    /// Group record (synthesized for groups only known from the registry).
    pub group: WorkerGroup,

    /// Workers with a live registry node in this group.
    pub live_members: Vec<WorkerNode>,

    /// True if the group exists only because workers registered into it.
    pub registry_only: bool,
}

/// Authoritative view of worker groups.
pub struct WorkerGroupService {
    directory: Arc<dyn WorkerGroupDirectory>,
    bindings: Arc<dyn BindingStore>,
    task_definitions: Arc<dyn TaskDefinitionDirectory>,
    membership: WorkerGroupMembership,
    default_group: String,
}

impl WorkerGroupService {
    /// Create a new WorkerGroupService.
    pub fn new(
        directory: Arc<dyn WorkerGroupDirectory>,
        bindings: Arc<dyn BindingStore>,
        task_definitions: Arc<dyn TaskDefinitionDirectory>,
        membership: WorkerGroupMembership,
        default_group: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            bindings,
            task_definitions,
            membership,
            default_group: default_group.into(),
        }
    }

    /// Name of the permanent default group.
    pub fn default_group(&self) -> &str {
        &self.default_group
    }

    /// Every known group name: directory, live registry groups and the default.
    pub async fn all_worker_group_names(&self) -> Result<BTreeSet<String>, WorkerGroupError> {
        let mut names = self.directory.list_all_worker_group_names().await?;
        names.extend(self.membership.live_groups().await?);
        names.insert(self.default_group.clone());
        Ok(names)
    }

    /// List every known group with its live members, sorted by name.
    pub async fn list_worker_groups(&self) -> Result<Vec<WorkerGroupView>, WorkerGroupError> {
        let mut live = self.membership.snapshot().await?;
        let mut views: BTreeMap<String, WorkerGroupView> = BTreeMap::new();

        for group in self.directory.list_all_worker_groups().await? {
            let live_members = live.remove(&group.name).unwrap_or_default();
            views.insert(
                group.name.clone(),
                WorkerGroupView {
                    group,
                    live_members,
                    registry_only: false,
                },
            );
        }

        live.entry(self.default_group.clone()).or_default();
        for (name, live_members) in live {
            if views.contains_key(&name) {
                continue;
            }
            views.insert(
                name.clone(),
                WorkerGroupView {
                    group: WorkerGroup::new(name),
                    live_members,
                    registry_only: true,
                },
            );
        }

        Ok(views.into_values().collect())
    }

    /// Create a group. Administrators only.
    pub async fn create_worker_group(
        &self,
        user: &User,
        group: WorkerGroup,
    ) -> Result<WorkerGroup, WorkerGroupError> {
        if !user.is_admin() {
            return Err(WorkerGroupError::PermissionDenied(user.name.clone()));
        }
        validate_worker_group_name(&group.name)?;
        if group.name == self.default_group {
            return Err(WorkerGroupError::NameExists(group.name));
        }

        let created = self
            .directory
            .insert_worker_group(group)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(name) => WorkerGroupError::NameExists(name),
                other => WorkerGroupError::Store(other),
            })?;

        info!(worker_group = %created.name, user = %user.name, "Worker group created");
        Ok(created)
    }

    /// Delete a group. Administrators only; refused while any project binds
    /// it or any task definition references it.
    pub async fn delete_worker_group(&self, user: &User, name: &str) -> Result<(), WorkerGroupError> {
        if !user.is_admin() {
            return Err(WorkerGroupError::PermissionDenied(user.name.clone()));
        }
        if name == self.default_group {
            return Err(WorkerGroupError::DefaultGroup(name.to_string()));
        }
        if self.directory.find_worker_group(name).await?.is_none() {
            return Err(WorkerGroupError::NotFound(name.to_string()));
        }

        let projects = self
            .bindings
            .find_bound_projects_for_groups(&[name.to_string()])
            .await?;
        let referenced_by_tasks = self.task_definitions.is_worker_group_referenced(name).await?;
        if !projects.is_empty() || referenced_by_tasks {
            return Err(WorkerGroupError::InUse {
                name: name.to_string(),
                projects: projects.into_iter().collect(),
                referenced_by_tasks,
            });
        }

        if !self.directory.delete_worker_group(name).await? {
            return Err(WorkerGroupError::NotFound(name.to_string()));
        }

        info!(worker_group = %name, user = %user.name, "Worker group deleted");
        Ok(())
    }

    /// Watch workers joining and leaving groups.
    pub fn watch_membership(&self) -> Result<Subscription, WorkerGroupError> {
        Ok(self.membership.watch()?)
    }
}
