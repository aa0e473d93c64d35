//! flowctl Control Plane Library
//!
//! Worker group directory, project binding reconciliation and the HTTP
//! surface over them. Worker liveness comes from the coordination registry.

pub mod config;
pub mod error;
pub mod http;
pub mod service;
pub mod state;
pub mod store;

pub use config::{Config, Seed};
pub use error::{BindingError, StoreError, WorkerGroupError};
pub use service::{ProjectWorkerGroupService, WorkerGroupService};
pub use state::AppState;
pub use store::InMemoryStore;
