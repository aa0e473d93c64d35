//! flowctl Registry
//!
//! An abstraction over a hierarchical key-value coordination service
//! (ZooKeeper, etcd or a database-backed store all fit the contract),
//! plus the worker group membership view derived from it.
//!
//! Keys are slash-delimited paths; the parent/child relation comes from
//! [`flowctl_core::path`]. Ephemeral nodes belong to a session and vanish
//! when the session is closed or expires, which is how worker liveness is
//! reported.

pub mod error;
pub mod keys;
pub mod membership;
pub mod memory;
pub mod registry;

pub use error::RegistryError;
pub use membership::{MembershipChange, WorkerGroupMembership, WorkerHeartbeat, WorkerNode};
pub use memory::InMemoryRegistry;
pub use registry::{EventKind, NodeMode, Registry, RegistryEvent, Subscription};
