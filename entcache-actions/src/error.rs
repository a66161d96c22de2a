//! Error types for the action layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::EntityOp;

/// Result type for action construction.
pub type ActionResult<T> = Result<T, ActionError>;

/// Errors raised synchronously while building an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// A required action field is missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A routing string that names no known operation.
    #[error("unknown entity op: {0}")]
    UnknownOp(String),
}

/// Failure of a persistence operation.
///
/// Carried on derived error actions, so it is a plain cloneable value rather
/// than a wrapper around a source error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PersistError {
    /// The pipeline has no dispatch rule for this operation.
    #[error("persistence action \"{0}\" is not implemented")]
    NotImplemented(EntityOp),

    /// The data service failed (network, server or serialization).
    #[error("remote failure (status {status:?}): {message}")]
    RemoteFailure {
        message: String,
        status: Option<u16>,
    },

    /// No data service is registered for the entity name.
    #[error("no data service registered for entity \"{0}\"")]
    ServiceNotFound(String),

    /// The data service panicked while handling the request.
    #[error("data service panicked: {0}")]
    ServicePanicked(String),

    /// The action's data does not have the shape its operation requires.
    #[error("invalid data for {op}: {reason}")]
    InvalidData { op: EntityOp, reason: String },
}

impl PersistError {
    /// Shorthand for a remote failure without an HTTP status.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteFailure {
            message: message.into(),
            status: None,
        }
    }

    /// Shorthand for a remote failure with an HTTP status.
    pub fn remote_with_status(status: u16, message: impl Into<String>) -> Self {
        Self::RemoteFailure {
            message: message.into(),
            status: Some(status),
        }
    }
}
