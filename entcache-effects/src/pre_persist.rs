//! Resolves delete intents to a position in the cached collection.
//!
//! A `DELETE` names an entity, a `DELETE_BY_ID` names a key. Either way the
//! reducer needs the index the target had when the intent was seen, so this
//! effect reads one snapshot of the collection and emits:
//!
//! - `RESOLVED_DELETE` with `{index, id, entity}` (index `-1` when absent),
//! - `RESOLVED_DELETE_BY_INDEX` with the same data, only when found.
//!
//! The index is not re-checked later. If the collection changes before the
//! reducer applies it, the reducer sees a stale index.

use entcache_actions::{
    ActionData, EntityAction, EntityActionFactory, EntityOp, PayloadOverrides, PersistError,
    ResolvedDelete,
};
use entcache_model::Entity;
use entcache_types::EntityKey;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::collections::{CollectionSnapshot, EntityCollections};

pub struct EntityPrePersistEffects {
    factory: Arc<EntityActionFactory>,
    collections: Arc<dyn EntityCollections>,
}

impl EntityPrePersistEffects {
    pub fn new(factory: Arc<EntityActionFactory>, collections: Arc<dyn EntityCollections>) -> Self {
        Self {
            factory,
            collections,
        }
    }

    /// Resolves a delete intent. Any other action yields nothing.
    pub async fn pre_delete(&self, action: &EntityAction) -> Vec<EntityAction> {
        let op = action.entity_op();
        if !op.is_delete_intent() {
            return Vec::new();
        }

        let snapshot = self.collections.entities(action.entity_name()).await;
        let data = action.data();
        let resolved = match (op, data.and_then(ActionData::as_entity)) {
            (EntityOp::Delete, Some(entity)) => Some(resolve_entity(&snapshot, entity)),
            _ => data
                .and_then(ActionData::as_key)
                .map(|key| resolve_key(&snapshot, key)),
        };

        let Some(resolved) = resolved else {
            warn!(
                "Cannot resolve {}: no entity key in {:?}",
                action.action_type(),
                action.data()
            );
            let error = PersistError::InvalidData {
                op,
                reason: "delete intent carries no entity or key".into(),
            };
            let overrides = PayloadOverrides::new(EntityOp::ResolvedDelete).error(error);
            return vec![self.factory.create_from_action(action, overrides)];
        };

        debug!("Resolved {} of {} to index {}", op, resolved.id, resolved.index);

        let mut out = Vec::with_capacity(2);
        out.push(self.factory.create_from_action(
            action,
            PayloadOverrides::new(EntityOp::ResolvedDelete).data(resolved.clone()),
        ));
        if resolved.is_found() {
            out.push(self.factory.create_from_action(
                action,
                PayloadOverrides::new(EntityOp::ResolvedDeleteByIndex).data(resolved),
            ));
        }
        out
    }
}

fn resolve_entity(snapshot: &CollectionSnapshot, entity: &Arc<Entity>) -> ResolvedDelete {
    let index = snapshot.iter().position(|e| Arc::ptr_eq(e, entity));
    ResolvedDelete {
        index: to_index(index),
        id: entity.id.clone(),
        entity: Some(Arc::clone(entity)),
    }
}

fn resolve_key(snapshot: &CollectionSnapshot, key: EntityKey) -> ResolvedDelete {
    let index = snapshot.iter().position(|e| e.id == key);
    ResolvedDelete {
        index: to_index(index),
        id: key,
        entity: index.map(|i| Arc::clone(&snapshot[i])),
    }
}

fn to_index(index: Option<usize>) -> isize {
    index.and_then(|i| isize::try_from(i).ok()).unwrap_or(-1)
}
