//! Builds and derives [`EntityAction`]s.

use entcache_model::MergeStrategy;
use entcache_types::CorrelationId;
use std::fmt;
use std::sync::Arc;

use crate::action::{ActionData, EntityAction, EntityActionOptions, EntityActionPayload};
use crate::error::{ActionError, ActionResult, PersistError};
use crate::EntityOp;

/// Produces an action's `type` string from its operation and the entity name
/// (or tag, when the action has one).
pub type ActionTypeFormatter = Arc<dyn Fn(EntityOp, &str) -> String + Send + Sync>;

/// The default `type` format: `[Hero] entcache/query-all`.
pub fn default_action_type(op: EntityOp, entity_name_or_tag: &str) -> String {
    format!("[{entity_name_or_tag}] {op}")
}

/// Payload in its loosest form, for callers that assemble actions from
/// untyped input. Required fields are checked by
/// [`EntityActionFactory::create_from_payload`].
#[derive(Debug, Clone, Default)]
pub struct EntityActionInit {
    pub entity_name: Option<String>,
    pub entity_op: Option<EntityOp>,
    pub data: Option<ActionData>,
    pub correlation_id: Option<CorrelationId>,
    pub is_optimistic: Option<bool>,
    pub merge_strategy: Option<MergeStrategy>,
    pub tag: Option<String>,
    pub skip: bool,
    pub error: Option<PersistError>,
}

impl From<EntityActionPayload> for EntityActionInit {
    fn from(p: EntityActionPayload) -> Self {
        Self {
            entity_name: Some(p.entity_name),
            entity_op: Some(p.entity_op),
            data: p.data,
            correlation_id: p.correlation_id,
            is_optimistic: p.is_optimistic,
            merge_strategy: p.merge_strategy,
            tag: p.tag,
            skip: p.skip,
            error: p.error,
        }
    }
}

/// Fields laid over a source payload by
/// [`EntityActionFactory::create_from_action`].
///
/// The operation is mandatory: a derived action always names a new
/// operation or outcome. `None` fields keep the source value.
#[derive(Debug, Clone)]
pub struct PayloadOverrides {
    entity_op: EntityOp,
    data: Option<Option<ActionData>>,
    correlation_id: Option<CorrelationId>,
    is_optimistic: Option<bool>,
    merge_strategy: Option<MergeStrategy>,
    tag: Option<String>,
    skip: Option<bool>,
    error: Option<PersistError>,
}

impl PayloadOverrides {
    pub fn new(entity_op: EntityOp) -> Self {
        Self {
            entity_op,
            data: None,
            correlation_id: None,
            is_optimistic: None,
            merge_strategy: None,
            tag: None,
            skip: None,
            error: None,
        }
    }

    /// Replace the source data.
    #[must_use]
    pub fn data(mut self, data: impl Into<ActionData>) -> Self {
        self.data = Some(Some(data.into()));
        self
    }

    /// Drop the source data; the derived payload carries none.
    #[must_use]
    pub fn without_data(mut self) -> Self {
        self.data = Some(None);
        self
    }

    #[must_use]
    pub fn correlation_id(mut self, id: impl Into<CorrelationId>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn optimistic(mut self, is_optimistic: bool) -> Self {
        self.is_optimistic = Some(is_optimistic);
        self
    }

    #[must_use]
    pub fn merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = Some(strategy);
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = Some(skip);
        self
    }

    #[must_use]
    pub fn error(mut self, error: PersistError) -> Self {
        self.error = Some(error);
        self
    }
}

/// Creates [`EntityAction`]s.
///
/// The `type` formatter is instance state read on every call, so replacing it
/// with [`set_action_type_formatter`](Self::set_action_type_formatter)
/// changes the output of every later `create*` call on this factory.
#[derive(Clone)]
pub struct EntityActionFactory {
    formatter: ActionTypeFormatter,
}

impl EntityActionFactory {
    pub fn new() -> Self {
        Self {
            formatter: Arc::new(default_action_type),
        }
    }

    /// Creates a factory with a custom `type` formatter.
    pub fn with_formatter<F>(formatter: F) -> Self
    where
        F: Fn(EntityOp, &str) -> String + Send + Sync + 'static,
    {
        Self {
            formatter: Arc::new(formatter),
        }
    }

    /// Replaces the `type` formatter.
    pub fn set_action_type_formatter<F>(&mut self, formatter: F)
    where
        F: Fn(EntityOp, &str) -> String + Send + Sync + 'static,
    {
        self.formatter = Arc::new(formatter);
    }

    /// Formats an action `type` with the current formatter.
    pub fn format_action_type(&self, op: EntityOp, entity_name_or_tag: &str) -> String {
        (self.formatter)(op, entity_name_or_tag)
    }

    /// Creates an action with no data and no options.
    pub fn create(&self, entity_name: &str, op: EntityOp) -> ActionResult<EntityAction> {
        self.create_with(entity_name, op, None, EntityActionOptions::default())
    }

    /// Creates an action from an entity name, operation, optional data and
    /// options. Undefined options are left off the payload.
    pub fn create_with(
        &self,
        entity_name: &str,
        op: EntityOp,
        data: Option<ActionData>,
        options: EntityActionOptions,
    ) -> ActionResult<EntityAction> {
        self.create_from_payload(EntityActionInit {
            entity_name: Some(entity_name.to_string()),
            entity_op: Some(op),
            data,
            correlation_id: options.correlation_id,
            is_optimistic: options.is_optimistic,
            merge_strategy: options.merge_strategy,
            tag: options.tag,
            skip: false,
            error: None,
        })
    }

    /// Creates an action from a pre-built payload.
    pub fn create_from_payload(&self, init: EntityActionInit) -> ActionResult<EntityAction> {
        let entity_name = match init.entity_name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(ActionError::InvalidArgument(
                    "missing or empty entity name".into(),
                ));
            }
        };
        let entity_op = init
            .entity_op
            .ok_or_else(|| ActionError::InvalidArgument("missing entity op".into()))?;

        Ok(self.build(EntityActionPayload {
            entity_name,
            entity_op,
            data: init.data,
            correlation_id: init.correlation_id,
            is_optimistic: init.is_optimistic,
            merge_strategy: init.merge_strategy,
            tag: init.tag,
            skip: init.skip,
            error: init.error,
        }))
    }

    /// Derives a new action from `source`: its payload with `overrides` laid
    /// on top.
    pub fn create_from_action(
        &self,
        source: &EntityAction,
        overrides: PayloadOverrides,
    ) -> EntityAction {
        let src = source.payload();
        let payload = EntityActionPayload {
            entity_name: src.entity_name.clone(),
            entity_op: overrides.entity_op,
            data: match overrides.data {
                Some(data) => data,
                None => src.data.clone(),
            },
            correlation_id: overrides
                .correlation_id
                .or_else(|| src.correlation_id.clone()),
            is_optimistic: overrides.is_optimistic.or(src.is_optimistic),
            merge_strategy: overrides.merge_strategy.or(src.merge_strategy),
            tag: overrides.tag.or_else(|| src.tag.clone()),
            skip: overrides.skip.unwrap_or(src.skip),
            error: overrides.error.or_else(|| src.error.clone()),
        };
        self.build(payload)
    }

    fn build(&self, payload: EntityActionPayload) -> EntityAction {
        let label = payload.tag.as_deref().unwrap_or(&payload.entity_name);
        let action_type = self.format_action_type(payload.entity_op, label);
        EntityAction::new(action_type, payload)
    }
}

impl Default for EntityActionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityActionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityActionFactory").finish_non_exhaustive()
    }
}
