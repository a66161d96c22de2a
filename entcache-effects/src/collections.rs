//! Read access to cached entity collections.
//!
//! The effects only ever read a point-in-time snapshot; writing collections
//! is the reducer's job.

use async_trait::async_trait;
use entcache_model::Entity;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// A point-in-time view of one collection, in collection order.
pub type CollectionSnapshot = Arc<Vec<Arc<Entity>>>;

/// Source of collection snapshots, keyed by entity name.
#[async_trait]
pub trait EntityCollections: Send + Sync {
    /// Returns the current contents of a collection. Unknown collections are
    /// empty.
    async fn entities(&self, entity_name: &str) -> CollectionSnapshot;
}

/// Collections held in `watch` channels, one per entity name.
///
/// Hosts publish a new snapshot whenever their reducer changes a collection;
/// readers always see the latest one.
#[derive(Default)]
pub struct InMemoryCollections {
    collections: RwLock<HashMap<String, watch::Sender<CollectionSnapshot>>>,
}

impl InMemoryCollections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents of a collection.
    pub async fn publish(&self, entity_name: &str, entities: Vec<Arc<Entity>>) {
        let snapshot = Arc::new(entities);
        let mut collections = self.collections.write().await;
        match collections.get(entity_name) {
            Some(tx) => {
                tx.send_replace(snapshot);
            }
            None => {
                let (tx, _rx) = watch::channel(snapshot);
                collections.insert(entity_name.to_string(), tx);
            }
        }
    }

    /// Subscribes to changes of a collection, creating it empty if needed.
    pub async fn subscribe(&self, entity_name: &str) -> watch::Receiver<CollectionSnapshot> {
        let mut collections = self.collections.write().await;
        collections
            .entry(entity_name.to_string())
            .or_insert_with(|| watch::channel(Arc::new(Vec::new())).0)
            .subscribe()
    }
}

#[async_trait]
impl EntityCollections for InMemoryCollections {
    async fn entities(&self, entity_name: &str) -> CollectionSnapshot {
        self.collections
            .read()
            .await
            .get(entity_name)
            .map(|tx| tx.borrow().clone())
            .unwrap_or_default()
    }
}
