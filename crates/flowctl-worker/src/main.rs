//! flowctl Worker - process tree inspection and escalating kill.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flowctl_core::TaskInstanceId;
use flowctl_worker::process::{TenantElevation, DEFAULT_TENANT};
use flowctl_worker::{
    Config, Platform, ProcessTerminator, ProcessTreeResolver, ShellRunner, TaskExecutionContext,
};

/// flowctl worker - Task process management tool
#[derive(Parser)]
#[command(name = "flowctl-worker")]
#[command(about = "Inspect and terminate task process trees", long_about = None)]
struct Cli {
    /// Do not wrap tenant commands in sudo
    #[arg(long)]
    no_sudo: bool,

    /// Wait between a signal and the following liveness check (milliseconds)
    #[arg(long)]
    verify_wait_ms: Option<u64>,

    /// Process tree grammar (linux, macos, other); detected when omitted
    #[arg(long)]
    platform: Option<Platform>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pids of a process tree, root first
    Tree {
        /// Root process id
        #[arg(long)]
        pid: i32,
    },

    /// Kill a process tree: SIGINT, then SIGKILL if it survives
    Kill {
        /// Root process id
        #[arg(long)]
        pid: i32,

        /// Tenant the process runs as
        #[arg(long, default_value = DEFAULT_TENANT)]
        tenant: String,

        /// Task instance id, for logging
        #[arg(long)]
        task: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowctl=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let defaults = Config::default();
    let config = Config {
        sudo_enabled: !cli.no_sudo,
        kill_verify_wait_ms: cli.verify_wait_ms.unwrap_or(defaults.kill_verify_wait_ms),
        platform: cli.platform,
        ..defaults
    };

    let runner = Arc::new(ShellRunner);
    let elevation = TenantElevation::new(config.sudo_enabled);
    let resolver = ProcessTreeResolver::new(runner.clone(), config.platform());

    match cli.command {
        Commands::Tree { pid } => {
            let pids = resolver.resolve_descendants(pid).await?;
            let pids: Vec<String> = pids.iter().map(i32::to_string).collect();
            println!("{}", pids.join(" "));
        }
        Commands::Kill { pid, tenant, task } => {
            let task = task
                .map(TaskInstanceId::new)
                .unwrap_or_else(TaskInstanceId::generate);
            let ctx = TaskExecutionContext::new(task, pid).with_tenant(tenant);

            let terminator = ProcessTerminator::new(
                resolver,
                runner,
                elevation,
                Duration::from_millis(config.kill_verify_wait_ms),
            );
            let outcome = terminator.kill(&ctx).await?;
            info!(pid, outcome = ?outcome, "Kill finished");
            println!("{}", serde_json::to_string(&outcome)?);
        }
    }

    Ok(())
}
