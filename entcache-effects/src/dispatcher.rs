//! Per-collection command API.

use entcache_actions::{ActionData, EntityActionFactory, EntityActionOptions, EntityOp};
use entcache_model::{Entity, Update};
use entcache_types::{CorrelationId, CorrelationIdGenerator, EntityKey};
use serde_json::Value;
use std::sync::Arc;

use crate::config::DefaultDispatcherOptions;
use crate::error::EffectsResult;
use crate::runtime::ActionSender;

/// Builds and dispatches actions for one entity collection.
///
/// Every dispatched action gets a fresh correlation id, returned to the
/// caller so it can match the eventual success or error action.
#[derive(Clone)]
pub struct EntityDispatcher {
    entity_name: String,
    factory: Arc<EntityActionFactory>,
    sender: ActionSender,
    options: DefaultDispatcherOptions,
    correlation_ids: Arc<CorrelationIdGenerator>,
}

impl EntityDispatcher {
    pub fn new(
        entity_name: impl Into<String>,
        factory: Arc<EntityActionFactory>,
        sender: ActionSender,
        options: DefaultDispatcherOptions,
        correlation_ids: Arc<CorrelationIdGenerator>,
    ) -> Self {
        Self {
            entity_name: entity_name.into(),
            factory,
            sender,
            options,
            correlation_ids,
        }
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn options(&self) -> DefaultDispatcherOptions {
        self.options
    }

    /// Dispatches `op` with `data`. A correlation id is assigned unless
    /// `options` already carries one.
    pub async fn dispatch_op(
        &self,
        op: EntityOp,
        data: Option<ActionData>,
        mut options: EntityActionOptions,
    ) -> EffectsResult<CorrelationId> {
        let correlation_id = match options.correlation_id.take() {
            Some(id) => id,
            None => self.correlation_ids.next_id(),
        };
        let action = self.factory.create_with(
            &self.entity_name,
            op,
            data,
            options.correlation_id(correlation_id.clone()),
        )?;
        self.sender.dispatch(action).await?;
        Ok(correlation_id)
    }

    /// Queries every entity from the server.
    pub async fn get_all(&self) -> EffectsResult<CorrelationId> {
        self.dispatch_op(EntityOp::QueryAll, None, EntityActionOptions::default())
            .await
    }

    /// Like [`get_all`](Self::get_all), but the reducer replaces the
    /// collection instead of merging.
    pub async fn load(&self) -> EffectsResult<CorrelationId> {
        self.dispatch_op(EntityOp::QueryLoad, None, EntityActionOptions::default())
            .await
    }

    pub async fn get_by_key(&self, key: impl Into<EntityKey>) -> EffectsResult<CorrelationId> {
        self.dispatch_op(
            EntityOp::QueryByKey,
            Some(ActionData::Key(key.into())),
            EntityActionOptions::default(),
        )
        .await
    }

    pub async fn get_with_query(&self, query: Value) -> EffectsResult<CorrelationId> {
        self.dispatch_op(
            EntityOp::QueryMany,
            Some(ActionData::Value(query)),
            EntityActionOptions::default(),
        )
        .await
    }

    pub async fn add(&self, entity: impl Into<Arc<Entity>>) -> EffectsResult<CorrelationId> {
        self.dispatch_op(
            EntityOp::SaveAddOne,
            Some(ActionData::Entity(entity.into())),
            EntityActionOptions::default().optimistic(self.options.optimistic_add),
        )
        .await
    }

    pub async fn update(&self, update: Update) -> EffectsResult<CorrelationId> {
        self.dispatch_op(
            EntityOp::SaveUpdateOne,
            Some(ActionData::Update(update)),
            EntityActionOptions::default().optimistic(self.options.optimistic_update),
        )
        .await
    }

    /// Deletes on the server by key.
    pub async fn delete(&self, key: impl Into<EntityKey>) -> EffectsResult<CorrelationId> {
        self.dispatch_op(
            EntityOp::SaveDeleteOne,
            Some(ActionData::Key(key.into())),
            EntityActionOptions::default().optimistic(self.options.optimistic_delete),
        )
        .await
    }

    /// Removes a cached entity. Resolved against the collection before it
    /// reaches the reducer.
    pub async fn remove_one(&self, entity: Arc<Entity>) -> EffectsResult<CorrelationId> {
        self.dispatch_op(
            EntityOp::Delete,
            Some(ActionData::Entity(entity)),
            EntityActionOptions::default(),
        )
        .await
    }

    /// Removes a cached entity by key.
    pub async fn remove_by_key(&self, key: impl Into<EntityKey>) -> EffectsResult<CorrelationId> {
        self.dispatch_op(
            EntityOp::DeleteById,
            Some(ActionData::Key(key.into())),
            EntityActionOptions::default(),
        )
        .await
    }
}
