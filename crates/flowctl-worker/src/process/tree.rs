//! Process tree resolution and liveness probes.
//!
//! Both run unelevated on the local host, as the worker's own user.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use super::{CommandRunner, Platform};
use crate::error::ProcessError;

/// Expands a pid to its descendants and checks which are still running.
#[derive(Clone)]
pub struct ProcessTreeResolver {
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
}

impl ProcessTreeResolver {
    /// Create a new ProcessTreeResolver.
    pub fn new(runner: Arc<dyn CommandRunner>, platform: Platform) -> Self {
        Self { runner, platform }
    }

    /// The root pid followed by every descendant, in the order the OS tool
    /// reports them. Empty if the process is already gone.
    ///
    /// Resolution is local: the tree is read on the host this worker runs
    /// on, which is the host that launched the task.
    pub async fn resolve_descendants(&self, pid: i32) -> Result<Vec<i32>, ProcessError> {
        let output = self.runner.execute(&self.platform.tree_command(pid)).await?;
        let pids = self.platform.parse_tree(&output.stdout);
        debug!(pid, descendants = ?pids, "Resolved process tree");
        Ok(pids)
    }

    /// True if `pid` is still running.
    pub async fn is_alive(&self, pid: i32) -> Result<bool, ProcessError> {
        Ok(self.alive_among(&[pid]).await?.contains(&pid))
    }

    /// The subset of `pids` still running.
    ///
    /// A non-zero `ps` exit means none are running only when it printed no
    /// process rows; any other output is a [`ProcessError::Probe`].
    pub async fn alive_among(&self, pids: &[i32]) -> Result<Vec<i32>, ProcessError> {
        if pids.is_empty() {
            return Ok(Vec::new());
        }
        let list: Vec<String> = pids.iter().map(i32::to_string).collect();
        let command = format!("ps -p {}", list.join(","));
        let output = self.runner.execute(&command).await?;

        let mut listed = BTreeSet::new();
        let mut unexpected = false;
        for line in output.stdout.lines() {
            let Some(token) = line.split_whitespace().next() else {
                continue;
            };
            match token.parse::<i32>() {
                Ok(pid) => {
                    listed.insert(pid);
                }
                Err(_) if token == "PID" => {}
                Err(_) => unexpected = true,
            }
        }

        if !output.success && (unexpected || !listed.is_empty()) {
            return Err(ProcessError::Probe {
                command,
                output: output.stdout.trim().to_string(),
            });
        }
        Ok(pids.iter().copied().filter(|p| listed.contains(p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::FakeRunner;
    use crate::process::CommandOutput;
    use async_trait::async_trait;

    fn resolver(runner: Arc<dyn CommandRunner>) -> ProcessTreeResolver {
        ProcessTreeResolver::new(runner, Platform::Linux)
    }

    /// Answers every command with the same output.
    struct FixedRunner(CommandOutput);

    #[async_trait]
    impl CommandRunner for FixedRunner {
        async fn execute(&self, _command: &str) -> Result<CommandOutput, ProcessError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_resolve_wrapper_layers() {
        let runner = Arc::new(FakeRunner::default().with_tree(
            6279,
            "sudo(6279)---558_1497.sh(6282)---sleep(6354)",
            &[6279, 6282, 6354],
        ));
        let pids = resolver(runner.clone()).resolve_descendants(6279).await.unwrap();

        assert_eq!(pids, vec![6279, 6282, 6354]);
        assert_eq!(runner.commands(), vec!["pstree -p 6279"]);
    }

    #[tokio::test]
    async fn test_resolve_missing_process_is_empty() {
        let runner = Arc::new(FakeRunner::default());
        let pids = resolver(runner).resolve_descendants(4242).await.unwrap();
        assert!(pids.is_empty());
    }

    #[tokio::test]
    async fn test_liveness_matches_whole_pids() {
        let runner = Arc::new(FakeRunner::default().with_tree(123, "sleep(123)", &[123]));
        let resolver = resolver(runner.clone());

        assert!(resolver.is_alive(123).await.unwrap());
        assert!(!resolver.is_alive(12).await.unwrap());
        assert_eq!(resolver.alive_among(&[12, 123]).await.unwrap(), vec![123]);
        assert_eq!(runner.commands().last().unwrap(), "ps -p 12,123");
    }

    #[tokio::test]
    async fn test_header_only_failure_means_exited() {
        let runner = Arc::new(FixedRunner(CommandOutput {
            success: false,
            stdout: "    PID TTY          TIME CMD\n".to_string(),
        }));
        assert!(!resolver(runner).is_alive(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_unexplained_failure_is_an_error() {
        let runner = Arc::new(FixedRunner(CommandOutput {
            success: false,
            stdout: "error: unsupported option\n".to_string(),
        }));
        assert!(matches!(
            resolver(runner).is_alive(42).await,
            Err(ProcessError::Probe { .. })
        ));
    }
}
