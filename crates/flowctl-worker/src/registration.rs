//! Worker self-registration into the coordination registry.
//!
//! A worker holds one registry session and writes an ephemeral liveness
//! node per worker group it serves. The heartbeat loop keeps the session
//! alive and refreshes the payload; when the session ends the nodes vanish
//! and the control plane sees the worker leave.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use flowctl_core::SessionId;
use flowctl_registry::{keys, NodeMode, Registry, RegistryError, WorkerHeartbeat};

use crate::config::Config;

/// Registers a worker into its groups.
pub struct WorkerRegistration {
    registry: Arc<dyn Registry>,
    config: Arc<Config>,
}

impl WorkerRegistration {
    /// Create a new WorkerRegistration.
    pub fn new(registry: Arc<dyn Registry>, config: Arc<Config>) -> Self {
        Self { registry, config }
    }

    /// Open a session, write the liveness nodes, and start heartbeating.
    pub async fn register(&self) -> Result<RegisteredWorker, RegistryError> {
        let session = self.registry.open_session().await?;
        let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());
        let heartbeat = WorkerHeartbeat::new(
            self.config.address.clone(),
            hostname,
            self.config.worker_groups.clone(),
        );

        let keys: Vec<String> = self
            .config
            .worker_groups
            .iter()
            .map(|group| keys::worker_node_path(group, &self.config.address))
            .collect();

        if let Err(e) = write_nodes(self.registry.as_ref(), &session, &keys, &heartbeat).await {
            let _ = self.registry.close_session(&session).await;
            return Err(e);
        }

        info!(
            address = %self.config.address,
            groups = ?self.config.worker_groups,
            session = %session,
            "Worker registered"
        );

        let heartbeat_handle = tokio::spawn(run_heartbeat_loop(
            self.registry.clone(),
            session.clone(),
            keys.clone(),
            heartbeat,
            Duration::from_secs(self.config.heartbeat_interval_secs),
        ));

        Ok(RegisteredWorker {
            registry: self.registry.clone(),
            session,
            keys,
            heartbeat_handle,
        })
    }
}

/// A live registration. Dropping it without [`RegisteredWorker::shutdown`]
/// leaves the nodes to expire with the session.
pub struct RegisteredWorker {
    registry: Arc<dyn Registry>,
    session: SessionId,
    keys: Vec<String>,
    heartbeat_handle: JoinHandle<()>,
}

impl RegisteredWorker {
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Liveness node keys, one per worker group.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Stop heartbeating and close the session, removing the nodes.
    pub async fn shutdown(self) -> Result<(), RegistryError> {
        self.heartbeat_handle.abort();
        self.registry.close_session(&self.session).await?;
        info!(session = %self.session, "Worker deregistered");
        Ok(())
    }
}

async fn write_nodes(
    registry: &dyn Registry,
    session: &SessionId,
    keys: &[String],
    heartbeat: &WorkerHeartbeat,
) -> Result<(), RegistryError> {
    let payload = heartbeat.to_json()?;
    for key in keys {
        registry
            .put(key, &payload, NodeMode::Ephemeral(session.clone()))
            .await?;
    }
    Ok(())
}

async fn run_heartbeat_loop(
    registry: Arc<dyn Registry>,
    session: SessionId,
    keys: Vec<String>,
    mut heartbeat: WorkerHeartbeat,
    interval: Duration,
) {
    let mut interval_timer = tokio::time::interval(interval);
    // The first tick completes immediately; registration just wrote the nodes.
    interval_timer.tick().await;

    loop {
        interval_timer.tick().await;

        if let Err(e) = registry.keep_alive(&session).await {
            warn!(session = %session, error = %e, "Registry session lost, stopping heartbeat");
            break;
        }

        heartbeat.report_time = Utc::now();
        if let Err(e) = write_nodes(registry.as_ref(), &session, &keys, &heartbeat).await {
            warn!(session = %session, error = %e, "Failed to refresh worker heartbeat");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowctl_registry::{InMemoryRegistry, WorkerGroupMembership};

    fn config() -> Arc<Config> {
        Arc::new(Config {
            address: "10.0.0.1:1234".to_string(),
            worker_groups: vec!["default".to_string(), "gpu".to_string()],
            heartbeat_interval_secs: 10,
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn test_register_and_shutdown() {
        let registry = InMemoryRegistry::new();
        let membership = WorkerGroupMembership::new(Arc::new(registry.clone()));

        let worker = WorkerRegistration::new(Arc::new(registry.clone()), config())
            .register()
            .await
            .unwrap();

        assert_eq!(worker.keys().len(), 2);
        let snapshot = membership.snapshot().await.unwrap();
        assert_eq!(snapshot["gpu"][0].address, "10.0.0.1:1234");
        assert_eq!(
            snapshot["default"][0].heartbeat.as_ref().unwrap().groups,
            vec!["default".to_string(), "gpu".to_string()]
        );

        worker.shutdown().await.unwrap();
        assert!(membership.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_keeps_session_alive() {
        let registry = InMemoryRegistry::new();
        let worker = WorkerRegistration::new(Arc::new(registry.clone()), config())
            .register()
            .await
            .unwrap();
        let key = worker.keys()[0].clone();
        let first = registry.get(&key).await.unwrap().unwrap();

        tokio::time::sleep(Duration::from_secs(25)).await;

        let refreshed = registry.get(&key).await.unwrap().unwrap();
        let first: WorkerHeartbeat = serde_json::from_str(&first).unwrap();
        let refreshed: WorkerHeartbeat = serde_json::from_str(&refreshed).unwrap();
        assert!(refreshed.report_time >= first.report_time);
        assert!(registry.expire_sessions(Duration::from_secs(60)).await.is_empty());

        worker.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_session_expiry_removes_nodes() {
        let registry = InMemoryRegistry::new();
        let worker = WorkerRegistration::new(Arc::new(registry.clone()), config())
            .register()
            .await
            .unwrap();
        let key = worker.keys()[0].clone();

        let expired = registry.expire_sessions(Duration::ZERO).await;
        assert_eq!(expired, vec![worker.session().clone()]);
        assert!(!registry.exists(&key).await.unwrap());
    }
}
