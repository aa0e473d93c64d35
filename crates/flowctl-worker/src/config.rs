//! Worker configuration.

use flowctl_core::DEFAULT_WORKER_GROUP;

use crate::process::Platform;

/// Worker configuration.
///
/// `address`, `worker_groups` and `heartbeat_interval_secs` are read by
/// [`crate::WorkerRegistration`]; the CLI only sets the process fields.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address other components reach this worker on (`host:port`).
    pub address: String,

    /// Worker groups this worker serves.
    pub worker_groups: Vec<String>,

    /// Heartbeat interval in seconds.
    pub heartbeat_interval_secs: u64,

    /// Run tenant commands through `sudo -u`.
    pub sudo_enabled: bool,

    /// Wait between a signal and the following liveness check (milliseconds).
    pub kill_verify_wait_ms: u64,

    /// Process tree grammar; detected from the build target when unset.
    pub platform: Option<Platform>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:1234".to_string(),
            worker_groups: vec![DEFAULT_WORKER_GROUP.to_string()],
            heartbeat_interval_secs: 10,
            sudo_enabled: true,
            kill_verify_wait_ms: 3000,
            platform: None,
        }
    }
}

impl Config {
    /// Platform strategy for process tree listing.
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }
}
