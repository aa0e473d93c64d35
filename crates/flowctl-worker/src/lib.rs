//! flowctl Worker Library
//!
//! Registers a worker into its worker groups and stops the process trees
//! of the tasks it runs: tree resolution, tenant elevation and the
//! escalating SIGINT/SIGKILL protocol.
//!
//! The `flowctl-worker` binary only exposes the process tools (`tree`,
//! `kill`). Registration is library-only: a worker host embeds
//! [`WorkerRegistration`] with the [`flowctl_registry::Registry`] it shares
//! with the control plane, since the bundled registry is in-process.

pub mod client_cache;
pub mod config;
pub mod context;
pub mod error;
pub mod process;
pub mod registration;

pub use client_cache::{ClientEvictor, RuntimeClientCache};
pub use config::Config;
pub use context::TaskExecutionContext;
pub use error::ProcessError;
pub use process::{KillOutcome, Platform, ProcessTerminator, ProcessTreeResolver, ShellRunner};
pub use registration::{RegisteredWorker, WorkerRegistration};
