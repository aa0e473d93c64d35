//! Registry errors.

use flowctl_core::{CoreError, SessionId};
use thiserror::Error;

/// Errors reported by a registry backend.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Key is not a valid registry path.
    #[error("Invalid registry key: {0}")]
    InvalidKey(#[from] CoreError),

    /// The root node cannot be written or deleted.
    #[error("The registry root cannot be modified")]
    RootModification,

    /// Session is unknown or already closed.
    #[error("Registry session closed: {0}")]
    SessionClosed(SessionId),

    /// A watcher fell behind and missed events.
    #[error("Registry watch lagged, {0} events dropped")]
    WatchLagged(u64),

    /// Node payload could not be decoded.
    #[error("Invalid payload at '{key}': {reason}")]
    InvalidPayload { key: String, reason: String },

    /// Backend failure.
    #[error("Registry backend error: {0}")]
    Backend(String),
}
