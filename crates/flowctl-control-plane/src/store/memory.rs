//! In-memory implementation of every directory.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::warn;

use flowctl_core::{
    Permission, Project, ProjectCode, ProjectWorkerGroup, ScheduleRef, TaskDefinitionRef, User,
    WorkerGroup,
};

use super::{
    BindingStore, PermissionService, ProjectDirectory, ScheduleDirectory, TaskDefinitionDirectory,
    UserDirectory, WorkerGroupDirectory,
};
use crate::config::Seed;
use crate::error::StoreError;

/// All directories held in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, User>>,
    grants: RwLock<HashMap<(i64, ProjectCode), Permission>>,
    projects: RwLock<BTreeMap<ProjectCode, Project>>,
    worker_groups: RwLock<BTreeMap<String, WorkerGroup>>,
    bindings: RwLock<Vec<ProjectWorkerGroup>>,
    task_definitions: RwLock<Vec<TaskDefinitionRef>>,
    schedules: RwLock<Vec<ScheduleRef>>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded from seed data.
    pub async fn from_seed(seed: Seed) -> Result<Self, StoreError> {
        let store = Self::new();
        for user in seed.users {
            store.add_user(user).await;
        }
        for group in seed.worker_groups {
            store.insert_worker_group(group).await?;
        }
        for project in seed.projects {
            store.add_project(project).await;
        }
        for grant in seed.grants {
            let user = store.find_user_by_name(&grant.user).await?;
            match user {
                Some(user) => store.grant(&user, grant.project_code, grant.permission).await,
                None => warn!(user = %grant.user, "Seed grant references unknown user"),
            }
        }
        for binding in seed.bindings {
            store
                .insert(ProjectWorkerGroup::new(binding.project_code, binding.worker_group))
                .await?;
        }
        for definition in seed.task_definitions {
            store.add_task_definition(definition).await;
        }
        for schedule in seed.schedules {
            store.add_schedule(schedule).await;
        }
        Ok(store)
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Add or replace a user.
    pub async fn add_user(&self, user: User) {
        self.users.write().await.insert(user.name.clone(), user);
    }

    /// Grant a user a permission on a project.
    pub async fn grant(&self, user: &User, project: ProjectCode, permission: Permission) {
        self.grants
            .write()
            .await
            .insert((user.id, project), permission);
    }

    /// Add or replace a project.
    pub async fn add_project(&self, project: Project) {
        self.projects.write().await.insert(project.code, project);
    }

    /// Add a task definition.
    pub async fn add_task_definition(&self, definition: TaskDefinitionRef) {
        self.task_definitions.write().await.push(definition);
    }

    /// Add a schedule.
    pub async fn add_schedule(&self, schedule: ScheduleRef) {
        self.schedules.write().await.push(schedule);
    }
}

#[async_trait]
impl PermissionService for InMemoryStore {
    async fn has_project_permission(
        &self,
        user: &User,
        project: Option<ProjectCode>,
        permission: Permission,
    ) -> bool {
        if user.is_admin() {
            return true;
        }
        let Some(project) = project else {
            return false;
        };
        if let Some(owned) = self.projects.read().await.get(&project) {
            if owned.owner == user.name {
                return true;
            }
        }
        self.grants
            .read()
            .await
            .get(&(user.id, project))
            .is_some_and(|granted| granted.implies(permission))
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(name).cloned())
    }
}

#[async_trait]
impl ProjectDirectory for InMemoryStore {
    async fn find_project_by_code(&self, code: ProjectCode) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.read().await.get(&code).cloned())
    }
}

#[async_trait]
impl WorkerGroupDirectory for InMemoryStore {
    async fn list_all_worker_group_names(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.worker_groups.read().await.keys().cloned().collect())
    }

    async fn list_all_worker_groups(&self) -> Result<Vec<WorkerGroup>, StoreError> {
        Ok(self.worker_groups.read().await.values().cloned().collect())
    }

    async fn find_worker_group(&self, name: &str) -> Result<Option<WorkerGroup>, StoreError> {
        Ok(self.worker_groups.read().await.get(name).cloned())
    }

    async fn insert_worker_group(&self, mut group: WorkerGroup) -> Result<WorkerGroup, StoreError> {
        let mut groups = self.worker_groups.write().await;
        if groups.contains_key(&group.name) {
            return Err(StoreError::Duplicate(group.name));
        }
        group.id = Some(self.next_id());
        groups.insert(group.name.clone(), group.clone());
        Ok(group)
    }

    async fn delete_worker_group(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.worker_groups.write().await.remove(name).is_some())
    }
}

#[async_trait]
impl BindingStore for InMemoryStore {
    async fn find_bindings_by_project(
        &self,
        code: ProjectCode,
    ) -> Result<Vec<ProjectWorkerGroup>, StoreError> {
        Ok(self
            .bindings
            .read()
            .await
            .iter()
            .filter(|b| b.project_code == code)
            .cloned()
            .collect())
    }

    async fn find_bound_projects_for_groups(
        &self,
        names: &[String],
    ) -> Result<BTreeSet<ProjectCode>, StoreError> {
        Ok(self
            .bindings
            .read()
            .await
            .iter()
            .filter(|b| names.contains(&b.worker_group))
            .map(|b| b.project_code)
            .collect())
    }

    async fn bulk_delete(&self, code: ProjectCode, names: &[String]) -> Result<bool, StoreError> {
        let mut bindings = self.bindings.write().await;
        // All or nothing: a stale row leaves the set untouched.
        let all_present = names.iter().all(|name| {
            bindings
                .iter()
                .any(|b| b.project_code == code && &b.worker_group == name)
        });
        if !all_present {
            return Ok(false);
        }
        bindings.retain(|b| !(b.project_code == code && names.contains(&b.worker_group)));
        Ok(true)
    }

    async fn insert(&self, mut binding: ProjectWorkerGroup) -> Result<u64, StoreError> {
        let mut bindings = self.bindings.write().await;
        let exists = bindings
            .iter()
            .any(|b| b.project_code == binding.project_code && b.worker_group == binding.worker_group);
        if exists {
            return Ok(0);
        }
        let now = Utc::now();
        binding.id = self.next_id();
        binding.create_time = now;
        binding.update_time = now;
        bindings.push(binding);
        Ok(1)
    }
}

#[async_trait]
impl TaskDefinitionDirectory for InMemoryStore {
    async fn list_worker_group_names_referenced(
        &self,
        code: ProjectCode,
    ) -> Result<Vec<String>, StoreError> {
        let names: BTreeSet<String> = self
            .task_definitions
            .read()
            .await
            .iter()
            .filter(|d| d.project_code == code)
            .map(|d| d.worker_group.clone())
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn is_worker_group_referenced(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self
            .task_definitions
            .read()
            .await
            .iter()
            .any(|d| d.worker_group == name))
    }
}

#[async_trait]
impl ScheduleDirectory for InMemoryStore {
    async fn list_schedules_referencing_project(
        &self,
        project_name: &str,
    ) -> Result<Vec<ScheduleRef>, StoreError> {
        Ok(self
            .schedules
            .read()
            .await
            .iter()
            .filter(|s| s.project_name == project_name)
            .cloned()
            .collect())
    }
}
