//! Escalating kill: SIGINT the whole tree, verify, then SIGKILL survivors.
//!
//! Transitions are decided by whether the root pid is still running. The
//! tree is resolved once; children forked after resolution are not chased.
//! Signals are sent as the task's tenant; liveness is checked unelevated.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{CommandRunner, ProcessTreeResolver, TenantElevation};
use crate::client_cache::ClientEvictor;
use crate::context::TaskExecutionContext;
use crate::error::ProcessError;

/// How a successful kill ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KillOutcome {
    /// No process was ever launched.
    NotStarted,

    /// The process was already gone.
    AlreadyExited,

    /// The tree exited after SIGINT.
    Interrupted,

    /// SIGKILL was needed.
    ForceKilled,
}

/// Terminates task process trees.
pub struct ProcessTerminator {
    resolver: ProcessTreeResolver,
    runner: Arc<dyn CommandRunner>,
    elevation: TenantElevation,
    verify_wait: Duration,
    clients: Option<Arc<dyn ClientEvictor>>,
}

impl ProcessTerminator {
    /// Create a new ProcessTerminator.
    pub fn new(
        resolver: ProcessTreeResolver,
        runner: Arc<dyn CommandRunner>,
        elevation: TenantElevation,
        verify_wait: Duration,
    ) -> Self {
        Self {
            resolver,
            runner,
            elevation,
            verify_wait,
            clients: None,
        }
    }

    /// Evict runtime clients from `clients` once their task is dead.
    pub fn with_client_cache(mut self, clients: Arc<dyn ClientEvictor>) -> Self {
        self.clients = Some(clients);
        self
    }

    /// Kill the task's process tree.
    ///
    /// Fails with [`ProcessError::TerminationFailed`] if the root survives
    /// SIGKILL; this is not retried here.
    pub async fn kill(&self, ctx: &TaskExecutionContext) -> Result<KillOutcome, ProcessError> {
        let pid = ctx.process_id;
        if pid <= 0 {
            debug!(task = %ctx.task_instance_id, "No process to kill");
            return Ok(KillOutcome::NotStarted);
        }

        let pids = self.resolver.resolve_descendants(pid).await?;
        if pids.is_empty() {
            info!(task = %ctx.task_instance_id, pid, "Process already exited");
            self.evict_client(ctx).await?;
            return Ok(KillOutcome::AlreadyExited);
        }

        let tenant = ctx.tenant_code.as_str();
        info!(
            task = %ctx.task_instance_id,
            host = %ctx.host,
            pid,
            tree = ?pids,
            "Sending SIGINT to process tree"
        );
        self.signal("SIGINT", &pids, tenant).await?;

        tokio::time::sleep(self.verify_wait).await;
        let root_alive = self.resolver.is_alive(pid).await.unwrap_or_else(|e| {
            warn!(pid, error = %e, "Liveness check failed; assuming alive");
            true
        });
        if !root_alive {
            info!(task = %ctx.task_instance_id, pid, "Process tree exited after SIGINT");
            self.evict_client(ctx).await?;
            return Ok(KillOutcome::Interrupted);
        }

        let survivors = match self.resolver.alive_among(&pids).await {
            Ok(alive) if !alive.is_empty() => alive,
            Ok(_) => pids.clone(),
            Err(e) => {
                warn!(pid, error = %e, "Survivor check failed; killing whole tree");
                pids.clone()
            }
        };
        warn!(
            task = %ctx.task_instance_id,
            pid,
            survivors = ?survivors,
            "Process survived SIGINT, sending SIGKILL"
        );
        self.signal("SIGKILL", &survivors, tenant).await?;

        tokio::time::sleep(self.verify_wait).await;
        if self.resolver.is_alive(pid).await? {
            let alive = self
                .resolver
                .alive_among(&survivors)
                .await
                .unwrap_or_else(|_| vec![pid]);
            error!(task = %ctx.task_instance_id, pid, alive = ?alive, "Process survived SIGKILL");
            return Err(ProcessError::TerminationFailed { pid, alive });
        }

        info!(task = %ctx.task_instance_id, pid, "Process tree force killed");
        self.evict_client(ctx).await?;
        Ok(KillOutcome::ForceKilled)
    }

    async fn signal(&self, signal: &str, pids: &[i32], tenant: &str) -> Result<(), ProcessError> {
        let list: Vec<String> = pids.iter().map(i32::to_string).collect();
        let command = self
            .elevation
            .wrap(tenant, &format!("kill -s {signal} {}", list.join(" ")));
        let output = self.runner.execute(&command).await?;
        if !output.success {
            // Members that exited on their own also fail the command; the
            // following liveness check decides whether to escalate.
            warn!(command = %command, "Signal command exited non-zero");
        }
        Ok(())
    }

    async fn evict_client(&self, ctx: &TaskExecutionContext) -> Result<(), ProcessError> {
        if let (Some(clients), Some(key)) = (&self.clients, &ctx.runtime_client_key) {
            clients.evict(key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client_cache::RuntimeClientCache;
    use crate::process::testing::FakeRunner;
    use crate::process::Platform;
    use flowctl_core::TaskInstanceId;

    const TREE: &str = "sudo(6279)---558_1497.sh(6282)---sleep(6354)";
    const PIDS: [i32; 3] = [6279, 6282, 6354];

    fn terminator(runner: Arc<FakeRunner>) -> ProcessTerminator {
        ProcessTerminator::new(
            ProcessTreeResolver::new(runner.clone(), Platform::Linux),
            runner,
            TenantElevation::new(true),
            Duration::ZERO,
        )
    }

    fn task(pid: i32) -> TaskExecutionContext {
        TaskExecutionContext::new(TaskInstanceId::new("task-1"), pid)
    }

    #[tokio::test]
    async fn test_no_process_runs_no_commands() {
        let runner = Arc::new(FakeRunner::default());
        let terminator = terminator(runner.clone());

        assert_eq!(terminator.kill(&task(0)).await.unwrap(), KillOutcome::NotStarted);
        assert_eq!(terminator.kill(&task(-5)).await.unwrap(), KillOutcome::NotStarted);
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_already_exited() {
        let runner = Arc::new(FakeRunner::default());
        let outcome = terminator(runner.clone()).kill(&task(4242)).await.unwrap();

        assert_eq!(outcome, KillOutcome::AlreadyExited);
        assert_eq!(runner.count("kill"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sigint_suffices() {
        let runner = Arc::new(FakeRunner::default().with_tree(6279, TREE, &PIDS));
        let terminator = ProcessTerminator::new(
            ProcessTreeResolver::new(runner.clone(), Platform::Linux),
            runner.clone(),
            TenantElevation::new(true),
            Duration::from_secs(3),
        );

        let outcome = terminator.kill(&task(6279)).await.unwrap();

        assert_eq!(outcome, KillOutcome::Interrupted);
        assert_eq!(
            runner.commands(),
            vec![
                "pstree -p 6279",
                "kill -s SIGINT 6279 6282 6354",
                "ps -p 6279",
            ]
        );
        assert_eq!(runner.count("kill -s SIGKILL"), 0);
    }

    #[tokio::test]
    async fn test_escalates_to_exactly_one_sigkill() {
        let runner = Arc::new(
            FakeRunner::default()
                .with_tree(6279, TREE, &PIDS)
                .ignoring_sigint(&[6279, 6354]),
        );

        let outcome = terminator(runner.clone()).kill(&task(6279)).await.unwrap();

        assert_eq!(outcome, KillOutcome::ForceKilled);
        assert_eq!(runner.count("kill -s SIGKILL"), 1);
        assert!(runner
            .commands()
            .contains(&"kill -s SIGKILL 6279 6354".to_string()));
        assert_eq!(runner.commands().last().unwrap(), "ps -p 6279");
    }

    #[tokio::test]
    async fn test_survivor_of_sigkill_fails() {
        let runner = Arc::new(
            FakeRunner::default()
                .with_tree(6279, TREE, &PIDS)
                .ignoring_sigint(&PIDS)
                .ignoring_sigkill(&[6279]),
        );

        let err = terminator(runner.clone()).kill(&task(6279)).await.unwrap_err();

        match err {
            ProcessError::TerminationFailed { pid, alive } => {
                assert_eq!(pid, 6279);
                assert_eq!(alive, vec![6279]);
            }
            other => panic!("expected TerminationFailed, got {:?}", other),
        }
        assert_eq!(runner.count("kill -s SIGKILL"), 1);
    }

    #[tokio::test]
    async fn test_single_process_tree_is_signalled() {
        let runner = Arc::new(FakeRunner::default().with_tree(42, "sleep(42)", &[42]));

        let outcome = terminator(runner.clone()).kill(&task(42)).await.unwrap();

        assert_eq!(outcome, KillOutcome::Interrupted);
        assert_eq!(runner.count("kill -s SIGINT 42"), 1);
    }

    #[tokio::test]
    async fn test_tenant_commands_are_elevated() {
        let runner = Arc::new(FakeRunner::default().with_tree(42, "sleep(42)", &[42]));

        terminator(runner.clone())
            .kill(&task(42).with_tenant("etl"))
            .await
            .unwrap();

        assert_eq!(
            runner.commands(),
            vec!["pstree -p 42", "sudo -u etl kill -s SIGINT 42", "ps -p 42"]
        );
    }

    #[tokio::test]
    async fn test_denied_elevation_is_not_reported_as_killed() {
        let runner = Arc::new(
            FakeRunner::default()
                .with_tree(42, "sleep(42)", &[42])
                .denying_sudo(),
        );

        let result = terminator(runner.clone())
            .kill(&task(42).with_tenant("etl"))
            .await;

        match result {
            Err(ProcessError::TerminationFailed { pid, alive }) => {
                assert_eq!(pid, 42);
                assert_eq!(alive, vec![42]);
            }
            other => panic!("expected TerminationFailed, got {:?}", other),
        }
        assert_eq!(runner.count("sudo -u etl kill -s SIGKILL 42"), 1);
        assert_eq!(runner.count("sudo -u etl ps"), 0);
    }

    #[tokio::test]
    async fn test_runtime_client_evicted_on_success() {
        let runner = Arc::new(FakeRunner::default().with_tree(42, "sleep(42)", &[42]));
        let cache = Arc::new(RuntimeClientCache::new());
        cache.insert("task-1", "k8s-client").await.unwrap();
        let terminator = terminator(runner).with_client_cache(cache.clone());

        terminator
            .kill(&task(42).with_runtime_client("task-1"))
            .await
            .unwrap();
        assert!(cache.get("task-1").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_runtime_client_key_is_caller_defect() {
        let runner = Arc::new(FakeRunner::default().with_tree(42, "sleep(42)", &[42]));
        let cache: Arc<RuntimeClientCache<()>> = Arc::new(RuntimeClientCache::new());
        let terminator = terminator(runner).with_client_cache(cache);

        assert!(matches!(
            terminator.kill(&task(42).with_runtime_client("")).await,
            Err(ProcessError::CallerDefect(_))
        ));
    }
}
