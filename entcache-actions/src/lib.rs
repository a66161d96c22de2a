//! Entity actions for entcache.
//!
//! An action is an immutable descriptor of one intent against one entity
//! collection: which collection, which [`EntityOp`], what data, and the
//! bookkeeping (correlation id, optimistic flag, merge strategy, tag) needed
//! to match and apply its eventual outcome.
//!
//! # Example
//!
//! ```
//! use entcache_actions::{EntityActionFactory, EntityOp, PayloadOverrides};
//!
//! let factory = EntityActionFactory::new();
//! let query = factory.create("Hero", EntityOp::QueryAll).unwrap();
//! assert_eq!(query.action_type(), "[Hero] entcache/query-all");
//!
//! let done = factory.create_from_action(&query, PayloadOverrides::new(EntityOp::QueryAllSuccess));
//! assert_eq!(done.entity_op().base(), EntityOp::QueryAll);
//! ```

mod action;
mod entity_op;
mod error;
mod factory;

pub use action::{
    ActionData, EntityAction, EntityActionOptions, EntityActionPayload, ErrorContext,
    ResolvedDelete,
};
pub use entity_op::{EntityOp, OpOutcome, OP_ERROR, OP_SUCCESS, PERSIST_OPS};
pub use error::{ActionError, ActionResult, PersistError};
pub use factory::{
    default_action_type, ActionTypeFormatter, EntityActionFactory, EntityActionInit,
    PayloadOverrides,
};
