//! Shapes the success and error actions derived from a persistence request.

use entcache_actions::{
    ActionData, EntityAction, EntityActionFactory, EntityOp, ErrorContext, OpOutcome,
    PayloadOverrides, PersistError,
};
use std::sync::Arc;
use tracing::warn;

/// Turns a request action plus an outcome into the derived action.
pub trait PersistenceResultHandler: Send + Sync {
    /// Builds the success action for `action` carrying `data`.
    fn handle_success(&self, action: &EntityAction, data: Option<ActionData>) -> EntityAction;

    /// Builds the error action for `action`.
    fn handle_error(&self, action: &EntityAction, error: PersistError) -> EntityAction;
}

/// Derives `<op>/success` and `<op>/error` actions with the factory.
///
/// Error actions carry the error on `payload.error` and an [`ErrorContext`]
/// (original action + error) as data.
pub struct DefaultPersistenceResultHandler {
    factory: Arc<EntityActionFactory>,
}

impl DefaultPersistenceResultHandler {
    pub fn new(factory: Arc<EntityActionFactory>) -> Self {
        Self { factory }
    }
}

fn derived_op(op: EntityOp, outcome: OpOutcome) -> EntityOp {
    op.with_outcome(outcome).unwrap_or_else(|| {
        warn!("{} has no {:?} code; reusing it", op, outcome);
        op
    })
}

impl PersistenceResultHandler for DefaultPersistenceResultHandler {
    fn handle_success(&self, action: &EntityAction, data: Option<ActionData>) -> EntityAction {
        let op = derived_op(action.entity_op(), OpOutcome::Success);
        let overrides = match data {
            Some(data) => PayloadOverrides::new(op).data(data),
            None => PayloadOverrides::new(op).without_data(),
        };
        self.factory.create_from_action(action, overrides)
    }

    fn handle_error(&self, action: &EntityAction, error: PersistError) -> EntityAction {
        let op = derived_op(action.entity_op(), OpOutcome::Error);
        let context = ErrorContext {
            original_action: action.clone(),
            error: error.clone(),
        };
        self.factory.create_from_action(
            action,
            PayloadOverrides::new(op)
                .data(ActionData::Error(Box::new(context)))
                .error(error),
        )
    }
}
