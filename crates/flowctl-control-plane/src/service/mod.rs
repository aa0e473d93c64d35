//! Control plane services.

pub mod binding_service;
pub mod worker_group_service;

pub use binding_service::{
    AssignOutcome, AssignedWorkerGroups, BindingDeps, ProjectWorkerGroupService,
};
pub use worker_group_service::{WorkerGroupService, WorkerGroupView};
