//! Shell command execution.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::ProcessError;

/// Result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status was zero.
    pub success: bool,

    /// Captured standard output.
    pub stdout: String,
}

impl CommandOutput {
    /// A successful command with the given output.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
        }
    }

    /// A command that exited non-zero with no output.
    pub fn failed() -> Self {
        Self::default()
    }
}

/// Runs shell command lines.
///
/// A non-zero exit is not an error; only failing to run the command is.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, command: &str) -> Result<CommandOutput, ProcessError>;
}

/// Runs commands with `sh -c` on the local host.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn execute(&self, command: &str) -> Result<CommandOutput, ProcessError> {
        debug!(command = %command, "Executing command");

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                command: command.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shell_runner_captures_stdout_and_status() {
        let runner = ShellRunner;

        let output = runner.execute("echo hello").await.unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "hello");

        let output = runner.execute("exit 3").await.unwrap();
        assert!(!output.success);
    }
}
