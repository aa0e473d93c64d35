//! flowctl Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - The coordination registry
//! - Persistence
//! - Operating-system process control
//!
//! All types here represent the worker-group and project domain shared by
//! the control plane and the workers.

pub mod error;
pub mod ids;
pub mod path;
pub mod project;
pub mod status;
pub mod user;
pub mod worker_group;

// Re-export commonly used types
pub use error::CoreError;
pub use ids::{ProjectCode, SessionId, TaskInstanceId};
pub use project::{Project, ProjectWorkerGroup, ScheduleRef, TaskDefinitionRef};
pub use status::Status;
pub use user::{Permission, User, UserRole};
pub use worker_group::{WorkerGroup, DEFAULT_WORKER_GROUP};
