//! Cache of external runtime clients (container orchestrators and the
//! like) keyed by task identity.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ProcessError;

/// Removes a task's cached runtime client once the task is dead.
#[async_trait]
pub trait ClientEvictor: Send + Sync {
    /// Returns true if a client was cached under `key`. An empty key is a
    /// [`ProcessError::CallerDefect`].
    async fn evict(&self, key: &str) -> Result<bool, ProcessError>;
}

/// Runtime clients keyed by task identity.
pub struct RuntimeClientCache<C> {
    clients: RwLock<HashMap<String, Arc<C>>>,
}

impl<C> Default for RuntimeClientCache<C> {
    fn default() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }
}

impl<C: Send + Sync> RuntimeClientCache<C> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a client, returning the one it replaced.
    pub async fn insert(&self, key: &str, client: C) -> Result<Option<Arc<C>>, ProcessError> {
        check_key(key)?;
        Ok(self
            .clients
            .write()
            .await
            .insert(key.to_string(), Arc::new(client)))
    }

    pub async fn get(&self, key: &str) -> Option<Arc<C>> {
        self.clients.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

#[async_trait]
impl<C: Send + Sync> ClientEvictor for RuntimeClientCache<C> {
    async fn evict(&self, key: &str) -> Result<bool, ProcessError> {
        check_key(key)?;
        let removed = self.clients.write().await.remove(key).is_some();
        debug!(key = %key, removed, "Evicted runtime client");
        Ok(removed)
    }
}

fn check_key(key: &str) -> Result<(), ProcessError> {
    if key.trim().is_empty() {
        return Err(ProcessError::CallerDefect(
            "runtime client key must not be empty".to_string(),
        ));
    }
    Ok(())
}
