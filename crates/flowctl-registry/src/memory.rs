//! In-process registry backend.
//!
//! Used by single-node deployments and by tests. Nodes live in a sorted
//! map; ephemeral nodes are tagged with their owning session.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowctl_core::{path, SessionId};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::registry::{EventKind, NodeMode, Registry, RegistryEvent, Subscription};
use crate::RegistryError;

/// Capacity of the event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

struct Node {
    value: String,
    owner: Option<SessionId>,
}

#[derive(Default)]
struct Inner {
    nodes: BTreeMap<String, Node>,
    sessions: HashMap<SessionId, DateTime<Utc>>,
}

impl Inner {
    /// Remove `key` and its descendants, returning removal events.
    fn remove_subtree(&mut self, key: &str) -> Vec<RegistryEvent> {
        let doomed: Vec<String> = self
            .nodes
            .keys()
            .filter(|k| path::is_within(key, k))
            .cloned()
            .collect();

        doomed
            .into_iter()
            .filter_map(|k| {
                self.nodes.remove(&k).map(|node| RegistryEvent {
                    kind: EventKind::Removed,
                    key: k,
                    value: Some(node.value),
                })
            })
            .collect()
    }

    /// Remove every node owned by `session`, returning removal events.
    fn remove_owned_by(&mut self, session: &SessionId) -> Vec<RegistryEvent> {
        let owned: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.owner.as_ref() == Some(session))
            .map(|(k, _)| k.clone())
            .collect();

        owned
            .into_iter()
            .filter_map(|k| {
                self.nodes.remove(&k).map(|node| RegistryEvent {
                    kind: EventKind::Removed,
                    key: k,
                    value: Some(node.value),
                })
            })
            .collect()
    }
}

/// Registry backed by process memory.
#[derive(Clone)]
pub struct InMemoryRegistry {
    inner: Arc<RwLock<Inner>>,
    events: broadcast::Sender<RegistryEvent>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            events,
        }
    }

    /// Close every session whose last heartbeat is older than `timeout`.
    ///
    /// Returns the expired sessions.
    pub async fn expire_sessions(&self, timeout: Duration) -> Vec<SessionId> {
        let deadline = chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|timeout| Utc::now().checked_sub_signed(timeout));
        let Some(deadline) = deadline else {
            return Vec::new();
        };

        let (expired, events) = {
            let mut inner = self.inner.write().await;
            let expired: Vec<SessionId> = inner
                .sessions
                .iter()
                .filter(|(_, last_seen)| **last_seen <= deadline)
                .map(|(id, _)| id.clone())
                .collect();

            let mut events = Vec::new();
            for session in &expired {
                inner.sessions.remove(session);
                events.extend(inner.remove_owned_by(session));
            }
            (expired, events)
        };

        for session in &expired {
            info!(session = %session, "Registry session expired");
        }
        self.publish(events);
        expired
    }

    /// Number of nodes currently stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.nodes.len()
    }

    /// Returns true if no nodes are stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.nodes.is_empty()
    }

    fn publish(&self, events: Vec<RegistryEvent>) {
        for event in events {
            debug!(key = %event.key, kind = ?event.kind, "Registry event");
            // No receivers is not an error.
            let _ = self.events.send(event);
        }
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate and normalize a key that is about to be modified.
fn writable_key(key: &str) -> Result<String, RegistryError> {
    path::validate(key)?;
    let key = path::normalize(key);
    if key == path::ROOT {
        return Err(RegistryError::RootModification);
    }
    Ok(key.to_string())
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn put(&self, key: &str, value: &str, mode: NodeMode) -> Result<(), RegistryError> {
        let key = writable_key(key)?;

        let event = {
            let mut inner = self.inner.write().await;
            let owner = match mode {
                NodeMode::Persistent => None,
                NodeMode::Ephemeral(session) => {
                    if !inner.sessions.contains_key(&session) {
                        return Err(RegistryError::SessionClosed(session));
                    }
                    Some(session)
                }
            };

            let kind = match inner.nodes.get(&key) {
                Some(existing) if existing.value == value && existing.owner == owner => None,
                Some(_) => Some(EventKind::Updated),
                None => Some(EventKind::Added),
            };

            inner.nodes.insert(
                key.clone(),
                Node {
                    value: value.to_string(),
                    owner,
                },
            );

            kind.map(|kind| RegistryEvent {
                kind,
                key,
                value: Some(value.to_string()),
            })
        };

        self.publish(event.into_iter().collect());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RegistryError> {
        path::validate(key)?;
        let inner = self.inner.read().await;
        Ok(inner
            .nodes
            .get(path::normalize(key))
            .map(|node| node.value.clone()))
    }

    async fn exists(&self, key: &str) -> Result<bool, RegistryError> {
        path::validate(key)?;
        let inner = self.inner.read().await;
        Ok(inner.nodes.keys().any(|k| path::is_within(key, k)))
    }

    async fn delete(&self, key: &str) -> Result<(), RegistryError> {
        let key = writable_key(key)?;
        let events = self.inner.write().await.remove_subtree(&key);
        self.publish(events);
        Ok(())
    }

    async fn children(&self, key: &str) -> Result<Vec<String>, RegistryError> {
        path::validate(key)?;
        let inner = self.inner.read().await;
        let names: BTreeSet<String> = inner
            .nodes
            .keys()
            .filter_map(|k| path::child_segment(key, k))
            .map(str::to_string)
            .collect();
        Ok(names.into_iter().collect())
    }

    fn subscribe(&self, prefix: &str) -> Result<Subscription, RegistryError> {
        path::validate(prefix)?;
        Ok(Subscription::new(prefix, self.events.subscribe()))
    }

    async fn open_session(&self) -> Result<SessionId, RegistryError> {
        let session = SessionId::generate();
        self.inner
            .write()
            .await
            .sessions
            .insert(session.clone(), Utc::now());
        debug!(session = %session, "Registry session opened");
        Ok(session)
    }

    async fn keep_alive(&self, session: &SessionId) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;
        match inner.sessions.get_mut(session) {
            Some(last_seen) => {
                *last_seen = Utc::now();
                Ok(())
            }
            None => Err(RegistryError::SessionClosed(session.clone())),
        }
    }

    async fn close_session(&self, session: &SessionId) -> Result<(), RegistryError> {
        let events = {
            let mut inner = self.inner.write().await;
            if inner.sessions.remove(session).is_none() {
                return Err(RegistryError::SessionClosed(session.clone()));
            }
            inner.remove_owned_by(session)
        };
        info!(session = %session, removed = events.len(), "Registry session closed");
        self.publish(events);
        Ok(())
    }
}
