//! Persistence effect: one request action in, one derived action out.
//!
//! ```text
//! Dispatched ─┬─ skip ───────────► delay ─► success
//!             ├─ payload.error ──► delay ─► error
//!             └─ call service ─┬─────────► success
//!                              └─ fail ──► delay ─► error
//! ```
//!
//! A panicking data service is caught and reported like any other failure.
//!
//! `persist` is a plain async function; ordering across actions is the
//! runtime's job (see [`crate::runtime`]).

use entcache_actions::{
    ActionData, EntityAction, EntityActionFactory, EntityOp, PayloadOverrides, PersistError,
};
use entcache_model::{Entity, Update};
use entcache_types::EntityKey;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::EffectsConfig;
use crate::data_service::EntityDataService;
use crate::error::PersistResult;
use crate::result_handler::PersistenceResultHandler;

/// Executes persist-eligible actions against the data services.
pub struct EntityEffects {
    data_service: Arc<EntityDataService>,
    factory: Arc<EntityActionFactory>,
    result_handler: Arc<dyn PersistenceResultHandler>,
    response_delay: Duration,
}

impl EntityEffects {
    pub fn new(
        data_service: Arc<EntityDataService>,
        factory: Arc<EntityActionFactory>,
        result_handler: Arc<dyn PersistenceResultHandler>,
        config: &EffectsConfig,
    ) -> Self {
        Self {
            data_service,
            factory,
            result_handler,
            response_delay: config.response_delay,
        }
    }

    /// Returns the minimum delay of the skip and error paths.
    pub fn response_delay(&self) -> Duration {
        self.response_delay
    }

    /// Performs the requested persistence operation and returns the action
    /// to dispatch once it completes. Never fails: every failure becomes an
    /// error action.
    pub async fn persist(&self, action: EntityAction) -> EntityAction {
        debug!("Persisting {}", action.action_type());

        if action.payload().skip {
            return self.handle_skip_success(&action).await;
        }
        if let Some(error) = action.payload().error.clone() {
            return self.handle_error(&action, error).await;
        }

        let outcome = AssertUnwindSafe(self.call_data_service(&action))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(PersistError::ServicePanicked(panic_message(panic.as_ref())))
            });

        match outcome {
            Ok(data) => self.result_handler.handle_success(&action, data),
            Err(error) => {
                warn!("Persistence of {} failed: {}", action.action_type(), error);
                self.handle_error(&action, error).await
            }
        }
    }

    async fn call_data_service(&self, action: &EntityAction) -> PersistResult<Option<ActionData>> {
        let payload = action.payload();
        let op = payload.entity_op;
        let data = payload.data.as_ref();
        let service = self.data_service.get_service(&payload.entity_name).await?;

        match op {
            EntityOp::QueryAll | EntityOp::QueryLoad => {
                let entities = service.get_all().await?;
                Ok(Some(into_entities(entities)))
            }
            EntityOp::QueryByKey => {
                let key = require_key(op, data)?;
                let entity = service.get_by_id(&key).await?;
                Ok(Some(ActionData::Entity(Arc::new(entity))))
            }
            EntityOp::QueryMany => {
                let query = match data {
                    None => Value::Null,
                    Some(ActionData::Value(v)) => v.clone(),
                    Some(other) => {
                        return Err(invalid(op, format!("expected a query, got {other:?}")));
                    }
                };
                let entities = service.get_with_query(&query).await?;
                Ok(Some(into_entities(entities)))
            }
            EntityOp::SaveAddOne => {
                let entity = require_entity(op, data)?;
                let saved = service.add(&entity).await?;
                Ok(Some(ActionData::Entity(Arc::new(saved))))
            }
            EntityOp::SaveDeleteOne => {
                let key = require_key(op, data)?;
                let deleted = service.delete(&key).await?;
                Ok(Some(ActionData::Key(deleted)))
            }
            EntityOp::SaveUpdateOne => {
                let update = require_update(op, data)?;
                let body = service.update(&update).await?;
                Ok(Some(ActionData::UpdateResponse(update.into_response(body))))
            }
            other => Err(PersistError::NotImplemented(other)),
        }
    }

    /// Error action, emitted no sooner than the response delay.
    async fn handle_error(&self, action: &EntityAction, error: PersistError) -> EntityAction {
        let error_action = self.result_handler.handle_error(action, error);
        tokio::time::sleep(self.response_delay).await;
        error_action
    }

    /// Success action for a skipped request, emitted no sooner than the
    /// response delay. The source data is carried over unchanged.
    async fn handle_skip_success(&self, action: &EntityAction) -> EntityAction {
        let op = action.entity_op();
        let success_op = op.success().unwrap_or(op);
        let success = self
            .factory
            .create_from_action(action, PayloadOverrides::new(success_op));
        tokio::time::sleep(self.response_delay).await;
        success
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn into_entities(entities: Vec<Entity>) -> ActionData {
    ActionData::Entities(entities.into_iter().map(Arc::new).collect())
}

fn invalid(op: EntityOp, reason: impl Into<String>) -> PersistError {
    PersistError::InvalidData {
        op,
        reason: reason.into(),
    }
}

fn require_key(op: EntityOp, data: Option<&ActionData>) -> PersistResult<EntityKey> {
    match data {
        Some(data) => data
            .as_resolved_delete()
            .map(|resolved| resolved.id.clone())
            .or_else(|| data.as_key())
            .ok_or_else(|| invalid(op, format!("expected a key, got {data:?}"))),
        None => Err(invalid(op, "missing key")),
    }
}

fn require_entity(op: EntityOp, data: Option<&ActionData>) -> PersistResult<Entity> {
    if let Some(entity) = data.and_then(ActionData::as_entity) {
        return Ok(entity.as_ref().clone());
    }
    match data {
        Some(ActionData::Value(value)) => {
            Entity::from_value(value.clone()).map_err(|e| invalid(op, e.to_string()))
        }
        Some(other) => Err(invalid(op, format!("expected an entity, got {other:?}"))),
        None => Err(invalid(op, "missing entity")),
    }
}

fn require_update(op: EntityOp, data: Option<&ActionData>) -> PersistResult<Update> {
    match data {
        Some(ActionData::Update(update)) => Ok(update.clone()),
        Some(ActionData::Value(value)) => {
            Update::from_value(value.clone()).map_err(|e| invalid(op, e.to_string()))
        }
        Some(other) => Err(invalid(op, format!("expected an update, got {other:?}"))),
        None => Err(invalid(op, "missing update")),
    }
}
