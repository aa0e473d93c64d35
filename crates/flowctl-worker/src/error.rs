//! Worker errors.

use thiserror::Error;

/// Errors from process inspection and termination.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The command could not be spawned at all.
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A liveness probe exited non-zero with output it could not explain.
    #[error("Liveness probe '{command}' failed: {output}")]
    Probe { command: String, output: String },

    /// Processes survived the force kill.
    #[error("Process {pid} still alive after SIGKILL (survivors: {alive:?})")]
    TerminationFailed { pid: i32, alive: Vec<i32> },

    /// An upstream logic error, e.g. evicting a cache entry without a key.
    #[error("Caller defect: {0}")]
    CallerDefect(String),
}
