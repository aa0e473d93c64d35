//! Shared application state.

use std::sync::Arc;

use flowctl_registry::{InMemoryRegistry, WorkerGroupMembership};

use crate::config::Config;
use crate::service::{BindingDeps, ProjectWorkerGroupService, WorkerGroupService};
use crate::store::{InMemoryStore, UserDirectory};

/// Shared application state.
pub struct AppState {
    /// Worker group store.
    pub worker_groups: Arc<WorkerGroupService>,

    /// Project binding reconciliation.
    pub bindings: ProjectWorkerGroupService,

    /// Resolves the acting user of each request.
    pub users: Arc<dyn UserDirectory>,

    /// Coordination registry workers register into.
    pub registry: InMemoryRegistry,
}

impl AppState {
    /// Wire every service over a single in-memory store and registry.
    pub fn new(config: &Config, store: Arc<InMemoryStore>, registry: InMemoryRegistry) -> Arc<Self> {
        let membership = WorkerGroupMembership::new(Arc::new(registry.clone()));
        let worker_groups = Arc::new(WorkerGroupService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            membership,
            config.default_worker_group.clone(),
        ));
        let bindings = ProjectWorkerGroupService::new(
            BindingDeps {
                permissions: store.clone(),
                projects: store.clone(),
                bindings: store.clone(),
                task_definitions: store.clone(),
                schedules: store.clone(),
            },
            worker_groups.clone(),
        );

        Arc::new(Self {
            worker_groups,
            bindings,
            users: store,
            registry,
        })
    }
}
