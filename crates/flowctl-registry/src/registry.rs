//! The registry contract every coordination backend satisfies.

use std::pin::Pin;

use async_trait::async_trait;
use flowctl_core::{path, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::RegistryError;

/// Lifetime of a registry node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeMode {
    /// Survives until explicitly deleted.
    Persistent,
    /// Removed when the owning session closes or expires.
    Ephemeral(SessionId),
}

/// Kind of change delivered to watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Added,
    Updated,
    Removed,
}

/// A change to a single registry node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEvent {
    /// What happened.
    pub kind: EventKind,
    /// Normalized key of the node.
    pub key: String,
    /// Node value after the change (previous value for `Removed`).
    pub value: Option<String>,
}

/// Hierarchical key-value coordination store.
///
/// Keys are absolute slash-delimited paths. Intermediate nodes are
/// implicit: writing `/a/b/c` makes `/a` and `/a/b` exist as long as a
/// descendant does.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Create or overwrite a node.
    async fn put(&self, key: &str, value: &str, mode: NodeMode) -> Result<(), RegistryError>;

    /// Read a node's value.
    async fn get(&self, key: &str) -> Result<Option<String>, RegistryError>;

    /// Returns true if the node or any descendant exists.
    async fn exists(&self, key: &str) -> Result<bool, RegistryError>;

    /// Remove a node and all of its descendants.
    async fn delete(&self, key: &str) -> Result<(), RegistryError>;

    /// Names of the immediate children of a node, sorted.
    async fn children(&self, key: &str) -> Result<Vec<String>, RegistryError>;

    /// Watch a node and everything beneath it.
    fn subscribe(&self, prefix: &str) -> Result<Subscription, RegistryError>;

    /// Open a session that can own ephemeral nodes.
    async fn open_session(&self) -> Result<SessionId, RegistryError>;

    /// Refresh a session's liveness.
    async fn keep_alive(&self, session: &SessionId) -> Result<(), RegistryError>;

    /// Close a session, removing every ephemeral node it owns.
    async fn close_session(&self, session: &SessionId) -> Result<(), RegistryError>;
}

/// Stream of events scoped to a prefix.
///
/// Events are delivered after the backend has released its internal locks,
/// so a consumer may call back into the registry while handling one.
pub struct Subscription {
    prefix: String,
    rx: broadcast::Receiver<RegistryEvent>,
}

impl Subscription {
    /// Create a subscription over a broadcast channel of all registry events.
    pub fn new(prefix: &str, rx: broadcast::Receiver<RegistryEvent>) -> Self {
        Self {
            prefix: path::normalize(prefix).to_string(),
            rx,
        }
    }

    /// The watched prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Wait for the next event under the prefix.
    ///
    /// Returns `None` once the registry has been dropped.
    pub async fn next(&mut self) -> Option<Result<RegistryEvent, RegistryError>> {
        loop {
            match self.rx.recv().await {
                Ok(event) if path::is_within(&self.prefix, &event.key) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    return Some(Err(RegistryError::WatchLagged(n)))
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Convert into a `Stream` of scoped events.
    pub fn into_stream(
        self,
    ) -> Pin<Box<dyn Stream<Item = Result<RegistryEvent, RegistryError>> + Send>> {
        let prefix = self.prefix;
        Box::pin(BroadcastStream::new(self.rx).filter_map(move |item| match item {
            Ok(event) if path::is_within(&prefix, &event.key) => Some(Ok(event)),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(n)) => Some(Err(RegistryError::WatchLagged(n))),
        }))
    }
}
