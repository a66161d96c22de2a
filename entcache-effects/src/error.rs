//! Error types for the effects runtime.

use entcache_actions::{ActionError, PersistError};
use thiserror::Error;

/// Result type for persistence calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// Result type for runtime operations.
pub type EffectsResult<T> = Result<T, EffectsError>;

/// Errors surfaced to callers of the effects runtime.
///
/// Persistence failures never show up here; they become error actions.
#[derive(Debug, Error)]
pub enum EffectsError {
    /// Action could not be built.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The runtime has shut down.
    #[error("channel closed")]
    ChannelClosed,

    /// A runtime task panicked or was aborted.
    #[error("effects task failed: {0}")]
    TaskFailed(String),
}
