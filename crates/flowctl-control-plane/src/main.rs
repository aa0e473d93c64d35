//! flowctl Control Plane Server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flowctl_control_plane::{http, AppState, Config, InMemoryStore, Seed};
use flowctl_registry::{InMemoryRegistry, MembershipChange};

/// flowctl control plane: worker groups and project bindings.
#[derive(Parser, Debug)]
#[command(name = "flowctl-control-plane", about = "flowctl control plane server")]
struct Args {
    /// HTTP server address
    #[arg(long)]
    http_addr: Option<String>,

    /// TOML file with initial users, projects and worker groups
    #[arg(long)]
    seed: Option<String>,

    /// Registry session timeout in seconds
    #[arg(long)]
    session_timeout_secs: Option<u64>,

    /// Name of the permanent default worker group
    #[arg(long)]
    default_worker_group: Option<String>,
}

impl Args {
    fn into_config(self) -> (Config, Option<String>) {
        let mut config = Config::default();
        if let Some(addr) = self.http_addr {
            config.http_bind_addr = addr;
        }
        if let Some(secs) = self.session_timeout_secs {
            config.session_timeout_secs = secs;
        }
        if let Some(name) = self.default_worker_group {
            config.default_worker_group = name;
        }
        (config, self.seed)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, seed_path) = Args::parse().into_config();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowctl=info")),
        )
        .with_target(true)
        .init();

    let http_addr: SocketAddr = config.http_bind_addr.parse()?;

    let seed = match &seed_path {
        Some(path) => {
            info!(path = %path, "Loading seed data");
            Seed::from_file(path)?
        }
        None => Seed::default(),
    };
    let store = Arc::new(InMemoryStore::from_seed(seed).await?);
    let registry = InMemoryRegistry::new();
    let state = AppState::new(&config, store, registry.clone());

    // Expire registry sessions of workers that stopped heartbeating
    let sweep_registry = registry.clone();
    let timeout = Duration::from_secs(config.session_timeout_secs);
    let sweep_interval = Duration::from_secs(config.session_sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            let expired = sweep_registry.expire_sessions(timeout).await;
            if !expired.is_empty() {
                warn!(count = expired.len(), "Expired stale worker sessions");
            }
        }
    });

    // Log workers joining and leaving groups
    let mut membership = state.worker_groups.watch_membership()?;
    tokio::spawn(async move {
        while let Some(event) = membership.next().await {
            match event {
                Ok(event) => match MembershipChange::from_event(&event) {
                    Some(MembershipChange::Joined { group, address }) => {
                        info!(worker_group = %group, worker = %address, "Worker joined")
                    }
                    Some(MembershipChange::Left { group, address }) => {
                        info!(worker_group = %group, worker = %address, "Worker left")
                    }
                    None => {}
                },
                Err(e) => warn!(error = %e, "Membership watch error"),
            }
        }
    });

    let http_router = http::create_router(state);
    let http_listener = TcpListener::bind(http_addr).await?;

    info!(
        http_addr = %http_addr,
        default_worker_group = %config.default_worker_group,
        "Starting flowctl control plane"
    );

    axum::serve(http_listener, http_router).await?;

    Ok(())
}
