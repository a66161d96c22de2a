//! Core type definitions for entcache.
//!
//! This crate defines the small, domain-agnostic identifiers used by every
//! other entcache crate:
//! - [`EntityKey`]: the primary key of a cached entity (integer or string)
//! - [`CorrelationId`]: the opaque token tying a request action to its
//!   derived success/error action
//! - [`CorrelationIdGenerator`]: sequential, prefix-based correlation ids

mod ids;

pub use ids::{CorrelationId, CorrelationIdGenerator, EntityKey, DEFAULT_CORRELATION_PREFIX};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid entity key: {0}")]
    InvalidKey(String),
}
