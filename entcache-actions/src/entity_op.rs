//! The operation taxonomy.
//!
//! Every action names exactly one [`EntityOp`]. Persist-eligible operations
//! come in triples: the base code, its success code and its error code. The
//! routing string of a derived code is always the base string followed by
//! [`OP_SUCCESS`] or [`OP_ERROR`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ActionError;

/// Suffix appended to a base operation's routing string for its success code.
pub const OP_SUCCESS: &str = "/success";

/// Suffix appended to a base operation's routing string for its error code.
pub const OP_ERROR: &str = "/error";

/// Operations that require a (real or simulated) round trip to the data source.
pub const PERSIST_OPS: [EntityOp; 7] = [
    EntityOp::QueryAll,
    EntityOp::QueryLoad,
    EntityOp::QueryByKey,
    EntityOp::QueryMany,
    EntityOp::SaveAddOne,
    EntityOp::SaveDeleteOne,
    EntityOp::SaveUpdateOne,
];

/// Outcome half of a derived operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpOutcome {
    Success,
    Error,
}

impl OpOutcome {
    /// The routing-string suffix for this outcome.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Success => OP_SUCCESS,
            Self::Error => OP_ERROR,
        }
    }
}

/// Closed set of entity operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EntityOp {
    // ── Persistence ──────────────────────────────────────────────
    QueryAll,
    QueryAllSuccess,
    QueryAllError,
    QueryLoad,
    QueryLoadSuccess,
    QueryLoadError,
    QueryByKey,
    QueryByKeySuccess,
    QueryByKeyError,
    QueryMany,
    QueryManySuccess,
    QueryManyError,
    SaveAddOne,
    SaveAddOneSuccess,
    SaveAddOneError,
    SaveDeleteOne,
    SaveDeleteOneSuccess,
    SaveDeleteOneError,
    SaveUpdateOne,
    SaveUpdateOneSuccess,
    SaveUpdateOneError,

    // ── Cache-only ───────────────────────────────────────────────
    AddAll,
    AddMany,
    AddOne,
    RemoveAll,
    RemoveMany,
    RemoveOne,
    UpdateMany,
    UpdateOne,
    UpsertMany,
    UpsertOne,
    SetFilter,
    SetLoaded,
    SetLoading,

    // ── Pre-persist delete ───────────────────────────────────────
    /// Delete intent carrying the entity itself.
    Delete,
    /// Delete intent carrying only the entity key.
    DeleteById,
    /// A delete whose position in the cached collection has been looked up.
    ResolvedDelete,
    /// Companion of `ResolvedDelete`, emitted only when the target was found.
    ResolvedDeleteByIndex,
}

impl EntityOp {
    /// Every operation code, in declaration order.
    pub const ALL: [EntityOp; 38] = [
        Self::QueryAll,
        Self::QueryAllSuccess,
        Self::QueryAllError,
        Self::QueryLoad,
        Self::QueryLoadSuccess,
        Self::QueryLoadError,
        Self::QueryByKey,
        Self::QueryByKeySuccess,
        Self::QueryByKeyError,
        Self::QueryMany,
        Self::QueryManySuccess,
        Self::QueryManyError,
        Self::SaveAddOne,
        Self::SaveAddOneSuccess,
        Self::SaveAddOneError,
        Self::SaveDeleteOne,
        Self::SaveDeleteOneSuccess,
        Self::SaveDeleteOneError,
        Self::SaveUpdateOne,
        Self::SaveUpdateOneSuccess,
        Self::SaveUpdateOneError,
        Self::AddAll,
        Self::AddMany,
        Self::AddOne,
        Self::RemoveAll,
        Self::RemoveMany,
        Self::RemoveOne,
        Self::UpdateMany,
        Self::UpdateOne,
        Self::UpsertMany,
        Self::UpsertOne,
        Self::SetFilter,
        Self::SetLoaded,
        Self::SetLoading,
        Self::Delete,
        Self::DeleteById,
        Self::ResolvedDelete,
        Self::ResolvedDeleteByIndex,
    ];

    /// The routing string for this operation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueryAll => "entcache/query-all",
            Self::QueryAllSuccess => "entcache/query-all/success",
            Self::QueryAllError => "entcache/query-all/error",
            Self::QueryLoad => "entcache/query-load",
            Self::QueryLoadSuccess => "entcache/query-load/success",
            Self::QueryLoadError => "entcache/query-load/error",
            Self::QueryByKey => "entcache/query-by-key",
            Self::QueryByKeySuccess => "entcache/query-by-key/success",
            Self::QueryByKeyError => "entcache/query-by-key/error",
            Self::QueryMany => "entcache/query-many",
            Self::QueryManySuccess => "entcache/query-many/success",
            Self::QueryManyError => "entcache/query-many/error",
            Self::SaveAddOne => "entcache/save/add-one",
            Self::SaveAddOneSuccess => "entcache/save/add-one/success",
            Self::SaveAddOneError => "entcache/save/add-one/error",
            Self::SaveDeleteOne => "entcache/save/delete-one",
            Self::SaveDeleteOneSuccess => "entcache/save/delete-one/success",
            Self::SaveDeleteOneError => "entcache/save/delete-one/error",
            Self::SaveUpdateOne => "entcache/save/update-one",
            Self::SaveUpdateOneSuccess => "entcache/save/update-one/success",
            Self::SaveUpdateOneError => "entcache/save/update-one/error",
            Self::AddAll => "entcache/add-all",
            Self::AddMany => "entcache/add-many",
            Self::AddOne => "entcache/add-one",
            Self::RemoveAll => "entcache/remove-all",
            Self::RemoveMany => "entcache/remove-many",
            Self::RemoveOne => "entcache/remove-one",
            Self::UpdateMany => "entcache/update-many",
            Self::UpdateOne => "entcache/update-one",
            Self::UpsertMany => "entcache/upsert-many",
            Self::UpsertOne => "entcache/upsert-one",
            Self::SetFilter => "entcache/set-filter",
            Self::SetLoaded => "entcache/set-loaded",
            Self::SetLoading => "entcache/set-loading",
            Self::Delete => "entcache/delete",
            Self::DeleteById => "entcache/delete-by-id",
            Self::ResolvedDelete => "entcache/resolved-delete",
            Self::ResolvedDeleteByIndex => "entcache/resolved-delete-by-index",
        }
    }

    /// Whether actions with this code are handled by the persistence pipeline.
    pub fn is_persist_op(self) -> bool {
        PERSIST_OPS.contains(&self)
    }

    /// Whether this is a delete intent awaiting pre-persist resolution.
    pub fn is_delete_intent(self) -> bool {
        matches!(self, Self::Delete | Self::DeleteById)
    }

    /// The outcome half of a derived code; `None` for base codes.
    pub fn outcome(self) -> Option<OpOutcome> {
        match self {
            Self::QueryAllSuccess
            | Self::QueryLoadSuccess
            | Self::QueryByKeySuccess
            | Self::QueryManySuccess
            | Self::SaveAddOneSuccess
            | Self::SaveDeleteOneSuccess
            | Self::SaveUpdateOneSuccess => Some(OpOutcome::Success),
            Self::QueryAllError
            | Self::QueryLoadError
            | Self::QueryByKeyError
            | Self::QueryManyError
            | Self::SaveAddOneError
            | Self::SaveDeleteOneError
            | Self::SaveUpdateOneError => Some(OpOutcome::Error),
            _ => None,
        }
    }

    /// The base code a derived code was produced from. Base codes map to
    /// themselves.
    pub fn base(self) -> EntityOp {
        match self {
            Self::QueryAllSuccess | Self::QueryAllError => Self::QueryAll,
            Self::QueryLoadSuccess | Self::QueryLoadError => Self::QueryLoad,
            Self::QueryByKeySuccess | Self::QueryByKeyError => Self::QueryByKey,
            Self::QueryManySuccess | Self::QueryManyError => Self::QueryMany,
            Self::SaveAddOneSuccess | Self::SaveAddOneError => Self::SaveAddOne,
            Self::SaveDeleteOneSuccess | Self::SaveDeleteOneError => Self::SaveDeleteOne,
            Self::SaveUpdateOneSuccess | Self::SaveUpdateOneError => Self::SaveUpdateOne,
            other => other,
        }
    }

    /// The derived code for `outcome`, if this is a persist-eligible base code.
    pub fn with_outcome(self, outcome: OpOutcome) -> Option<EntityOp> {
        let (success, error) = match self {
            Self::QueryAll => (Self::QueryAllSuccess, Self::QueryAllError),
            Self::QueryLoad => (Self::QueryLoadSuccess, Self::QueryLoadError),
            Self::QueryByKey => (Self::QueryByKeySuccess, Self::QueryByKeyError),
            Self::QueryMany => (Self::QueryManySuccess, Self::QueryManyError),
            Self::SaveAddOne => (Self::SaveAddOneSuccess, Self::SaveAddOneError),
            Self::SaveDeleteOne => (Self::SaveDeleteOneSuccess, Self::SaveDeleteOneError),
            Self::SaveUpdateOne => (Self::SaveUpdateOneSuccess, Self::SaveUpdateOneError),
            _ => return None,
        };
        Some(match outcome {
            OpOutcome::Success => success,
            OpOutcome::Error => error,
        })
    }

    /// Shorthand for `with_outcome(OpOutcome::Success)`.
    pub fn success(self) -> Option<EntityOp> {
        self.with_outcome(OpOutcome::Success)
    }

    /// Shorthand for `with_outcome(OpOutcome::Error)`.
    pub fn error(self) -> Option<EntityOp> {
        self.with_outcome(OpOutcome::Error)
    }
}

impl fmt::Display for EntityOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityOp {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ActionError::UnknownOp(s.to_string()))
    }
}

impl From<EntityOp> for String {
    fn from(op: EntityOp) -> Self {
        op.as_str().to_string()
    }
}

impl TryFrom<String> for EntityOp {
    type Error = ActionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
