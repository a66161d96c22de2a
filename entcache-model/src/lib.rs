//! Cached entity model for entcache.
//!
//! Defines the data that flows between the action layer and the external
//! reducer:
//! - [`Entity`]: one element of a cached collection (key + JSON fields)
//! - [`Update`] / [`UpdateResponse`]: partial-update request and its
//!   reconciled result
//! - [`MergeStrategy`]: how a save result is merged into cached state
//!
//! Collections hold entities behind `Arc`, so "the same entity" always means
//! the same allocation (`Arc::ptr_eq`), never structural equality.

mod entity;
mod merge_strategy;
mod update;

pub use entity::Entity;
pub use merge_strategy::MergeStrategy;
pub use update::{Update, UpdateResponse};

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while reading entities or updates from JSON.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("entity has no `id` field")]
    MissingKey,

    #[error(transparent)]
    Key(#[from] entcache_types::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
