use serde::{Deserialize, Serialize};

/// How a save or query result is merged into the cached collection.
///
/// Selected by whoever creates the action and carried on the action payload;
/// applying it is the reducer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Update the original values but keep unsaved local changes on top.
    PreserveChanges,
    /// Replace both the original values and any unsaved local changes.
    OverwriteChanges,
    /// Leave the collection's change tracking untouched.
    IgnoreChanges,
}
