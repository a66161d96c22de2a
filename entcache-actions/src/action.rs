//! Action descriptors.

use entcache_model::{Entity, MergeStrategy, Update, UpdateResponse};
use entcache_types::{CorrelationId, EntityKey};
use serde_json::Value;
use std::sync::Arc;

use crate::error::PersistError;
use crate::EntityOp;

/// An immutable action descriptor.
///
/// Built only by [`EntityActionFactory`](crate::EntityActionFactory); there
/// is no API to change an action once created. Derived actions are new values.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityAction {
    action_type: String,
    payload: EntityActionPayload,
}

impl EntityAction {
    pub(crate) fn new(action_type: String, payload: EntityActionPayload) -> Self {
        Self {
            action_type,
            payload,
        }
    }

    /// The routing/display string, e.g. `[Hero] entcache/query-all`.
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn payload(&self) -> &EntityActionPayload {
        &self.payload
    }

    pub fn entity_name(&self) -> &str {
        &self.payload.entity_name
    }

    pub fn entity_op(&self) -> EntityOp {
        self.payload.entity_op
    }

    pub fn data(&self) -> Option<&ActionData> {
        self.payload.data.as_ref()
    }

    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.payload.correlation_id.as_ref()
    }

    pub fn into_payload(self) -> EntityActionPayload {
        self.payload
    }
}

/// The payload of an [`EntityAction`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntityActionPayload {
    pub entity_name: String,
    pub entity_op: EntityOp,
    /// `None` means no data was supplied; JSON `null` is `Some(ActionData::Value(Null))`.
    pub data: Option<ActionData>,
    pub correlation_id: Option<CorrelationId>,
    pub is_optimistic: Option<bool>,
    pub merge_strategy: Option<MergeStrategy>,
    pub tag: Option<String>,
    /// Skip the data source and report success.
    pub skip: bool,
    /// Report this error instead of calling the data source.
    pub error: Option<PersistError>,
}

/// Optional fields copied onto a payload when defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityActionOptions {
    pub correlation_id: Option<CorrelationId>,
    pub is_optimistic: Option<bool>,
    pub merge_strategy: Option<MergeStrategy>,
    pub tag: Option<String>,
}

impl EntityActionOptions {
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
}

/// Data carried by an action.
///
/// Reducers read it through the typed accessors:
///
/// ```
/// use entcache_actions::{ActionData, EntityActionFactory, EntityOp, ErrorContext, PersistError};
/// use entcache_model::Entity;
/// use std::sync::Arc;
///
/// let loaded = ActionData::from(vec![Arc::new(Entity::new(1)), Arc::new(Entity::new(2))]);
/// assert_eq!(loaded.as_entities().map(<[_]>::len), Some(2));
/// assert!(loaded.as_error_context().is_none());
///
/// let request = EntityActionFactory::new().create("Hero", EntityOp::QueryAll).unwrap();
/// let failed = ActionData::Error(Box::new(ErrorContext {
///     original_action: request,
///     error: PersistError::remote("down"),
/// }));
/// let context = failed.as_error_context().unwrap();
/// assert_eq!(context.original_action.entity_op(), EntityOp::QueryAll);
/// assert_eq!(context.error, PersistError::remote("down"));
///
/// assert!(ActionData::null().is_null());
/// assert!(!failed.is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ActionData {
    /// Raw JSON: query parameters, keys sent as JSON, explicit `null`.
    Value(Value),
    Key(EntityKey),
    Entity(Arc<Entity>),
    Entities(Vec<Arc<Entity>>),
    Update(Update),
    UpdateResponse(UpdateResponse),
    ResolvedDelete(ResolvedDelete),
    /// Attached to derived error actions.
    Error(Box<ErrorContext>),
}

impl ActionData {
    /// Explicit JSON `null` data.
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Reads an entity key from key data, an entity, or a JSON key.
    pub fn as_key(&self) -> Option<EntityKey> {
        match self {
            Self::Key(k) => Some(k.clone()),
            Self::Entity(e) => Some(e.id.clone()),
            Self::Value(v) => EntityKey::from_value(v).ok(),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Arc<Entity>> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_entities(&self) -> Option<&[Arc<Entity>]> {
        match self {
            Self::Entities(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_resolved_delete(&self) -> Option<&ResolvedDelete> {
        match self {
            Self::ResolvedDelete(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_error_context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Error(ctx) => Some(ctx),
            _ => None,
        }
    }
}

impl From<Value> for ActionData {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<EntityKey> for ActionData {
    fn from(key: EntityKey) -> Self {
        Self::Key(key)
    }
}

impl From<Entity> for ActionData {
    fn from(entity: Entity) -> Self {
        Self::Entity(Arc::new(entity))
    }
}

impl From<Arc<Entity>> for ActionData {
    fn from(entity: Arc<Entity>) -> Self {
        Self::Entity(entity)
    }
}

impl From<Vec<Arc<Entity>>> for ActionData {
    fn from(entities: Vec<Arc<Entity>>) -> Self {
        Self::Entities(entities)
    }
}

impl From<Update> for ActionData {
    fn from(update: Update) -> Self {
        Self::Update(update)
    }
}

impl From<UpdateResponse> for ActionData {
    fn from(resp: UpdateResponse) -> Self {
        Self::UpdateResponse(resp)
    }
}

impl From<ResolvedDelete> for ActionData {
    fn from(resolved: ResolvedDelete) -> Self {
        Self::ResolvedDelete(resolved)
    }
}

/// Position of a delete target in the cached collection at resolution time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDelete {
    /// Index in the collection, or `-1` when the target was not present.
    pub index: isize,
    pub id: EntityKey,
    pub entity: Option<Arc<Entity>>,
}

impl ResolvedDelete {
    pub fn is_found(&self) -> bool {
        self.index >= 0
    }
}

/// What went wrong, and for which request.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    pub original_action: EntityAction,
    pub error: PersistError,
}
