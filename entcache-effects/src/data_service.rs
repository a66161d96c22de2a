//! Data-access capability.
//!
//! The effects never talk to the network themselves. Each entity collection
//! has an [`EntityCollectionDataService`], looked up by entity name in the
//! [`EntityDataService`] registry.

use async_trait::async_trait;
use entcache_actions::PersistError;
use entcache_model::{Entity, Update};
use entcache_types::EntityKey;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::PersistResult;

/// Remote operations for one entity collection.
#[async_trait]
pub trait EntityCollectionDataService: Send + Sync {
    /// Fetches every entity.
    async fn get_all(&self) -> PersistResult<Vec<Entity>>;

    /// Fetches one entity by key.
    async fn get_by_id(&self, key: &EntityKey) -> PersistResult<Entity>;

    /// Fetches the entities matching a query.
    async fn get_with_query(&self, query: &Value) -> PersistResult<Vec<Entity>>;

    /// Saves a new entity and returns it as stored by the server.
    async fn add(&self, entity: &Entity) -> PersistResult<Entity>;

    /// Saves an update. Returns the server's body, if it sent one.
    async fn update(&self, update: &Update) -> PersistResult<Option<Value>>;

    /// Deletes by key and returns the key of the deleted entity.
    async fn delete(&self, key: &EntityKey) -> PersistResult<EntityKey>;
}

/// Registry of data services keyed by entity name.
#[derive(Default)]
pub struct EntityDataService {
    services: RwLock<HashMap<String, Arc<dyn EntityCollectionDataService>>>,
}

impl EntityDataService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the service for an entity name.
    pub async fn register_service(
        &self,
        entity_name: impl Into<String>,
        service: Arc<dyn EntityCollectionDataService>,
    ) {
        let entity_name = entity_name.into();
        debug!("Registering data service for {}", entity_name);
        self.services.write().await.insert(entity_name, service);
    }

    /// Returns the service for an entity name.
    pub async fn get_service(
        &self,
        entity_name: &str,
    ) -> PersistResult<Arc<dyn EntityCollectionDataService>> {
        self.services
            .read()
            .await
            .get(entity_name)
            .cloned()
            .ok_or_else(|| PersistError::ServiceNotFound(entity_name.to_string()))
    }
}

/// An in-memory data service for testing.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Which method was called, with its argument.
    #[derive(Debug, Clone, PartialEq)]
    pub enum MockRequest {
        GetAll,
        GetById(EntityKey),
        GetWithQuery(Value),
        Add(EntityKey),
        Update(EntityKey),
        Delete(EntityKey),
    }

    /// A recorded call and when it started.
    #[derive(Debug, Clone)]
    pub struct MockCall {
        pub request: MockRequest,
        pub started_at: Instant,
    }

    /// Records every call and answers from an in-memory entity list.
    ///
    /// Each call sleeps for `latency` before answering, so tests with paused
    /// time can observe overlap. Queued failures are returned by the next
    /// calls in order.
    #[derive(Debug, Default)]
    pub struct MockDataService {
        entities: Mutex<Vec<Entity>>,
        calls: Mutex<Vec<MockCall>>,
        failures: Mutex<Vec<PersistError>>,
        update_body: Mutex<Option<Value>>,
        latency: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockDataService {
        /// Creates a service serving `entities`.
        pub fn new(entities: Vec<Entity>) -> Self {
            Self {
                entities: Mutex::new(entities),
                ..Default::default()
            }
        }

        /// Sets the simulated network latency.
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        /// Queues a failure for the next call.
        pub fn fail_next(&self, error: PersistError) {
            self.failures.lock().unwrap().push(error);
        }

        /// Sets the body returned by `update`.
        pub fn set_update_body(&self, body: Option<Value>) {
            *self.update_body.lock().unwrap() = body;
        }

        /// Returns a copy of every recorded call.
        pub fn calls(&self) -> Vec<MockCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Returns the requests in call order.
        pub fn requests(&self) -> Vec<MockRequest> {
            self.calls().into_iter().map(|c| c.request).collect()
        }

        /// Highest number of calls that were ever running at once.
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        /// Returns the stored entities.
        pub fn entities(&self) -> Vec<Entity> {
            self.entities.lock().unwrap().clone()
        }

        async fn call<T>(
            &self,
            request: MockRequest,
            answer: impl FnOnce(&mut Vec<Entity>) -> PersistResult<T>,
        ) -> PersistResult<T> {
            self.calls.lock().unwrap().push(MockCall {
                request,
                started_at: Instant::now(),
            });
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let failure = {
                let mut failures = self.failures.lock().unwrap();
                (!failures.is_empty()).then(|| failures.remove(0))
            };
            if let Some(err) = failure {
                return Err(err);
            }
            answer(&mut *self.entities.lock().unwrap())
        }
    }

    fn not_found(key: &EntityKey) -> PersistError {
        PersistError::remote_with_status(404, format!("entity {key} not found"))
    }

    #[async_trait]
    impl EntityCollectionDataService for MockDataService {
        async fn get_all(&self) -> PersistResult<Vec<Entity>> {
            self.call(MockRequest::GetAll, |all| Ok(all.clone())).await
        }

        async fn get_by_id(&self, key: &EntityKey) -> PersistResult<Entity> {
            self.call(MockRequest::GetById(key.clone()), |all| {
                all.iter()
                    .find(|e| &e.id == key)
                    .cloned()
                    .ok_or_else(|| not_found(key))
            })
            .await
        }

        async fn get_with_query(&self, query: &Value) -> PersistResult<Vec<Entity>> {
            self.call(MockRequest::GetWithQuery(query.clone()), |all| {
                let Some(filter) = query.as_object() else {
                    return Ok(all.clone());
                };
                Ok(all
                    .iter()
                    .filter(|e| filter.iter().all(|(k, v)| e.fields.get(k) == Some(v)))
                    .cloned()
                    .collect())
            })
            .await
        }

        async fn add(&self, entity: &Entity) -> PersistResult<Entity> {
            self.call(MockRequest::Add(entity.id.clone()), |all| {
                all.push(entity.clone());
                Ok(entity.clone())
            })
            .await
        }

        async fn update(&self, update: &Update) -> PersistResult<Option<Value>> {
            let body = self.update_body.lock().unwrap().clone();
            self.call(MockRequest::Update(update.id.clone()), |all| {
                let entity = all
                    .iter_mut()
                    .find(|e| e.id == update.id)
                    .ok_or_else(|| not_found(&update.id))?;
                entity
                    .fields
                    .extend(update.changes.iter().map(|(k, v)| (k.clone(), v.clone())));
                Ok(body)
            })
            .await
        }

        async fn delete(&self, key: &EntityKey) -> PersistResult<EntityKey> {
            self.call(MockRequest::Delete(key.clone()), |all| {
                all.retain(|e| &e.id != key);
                Ok(key.clone())
            })
            .await
        }
    }
}
