//! Shared fixtures for the effects tests.

#![allow(dead_code)]

use entcache_actions::EntityActionFactory;
use entcache_effects::data_service::mock::MockDataService;
use entcache_effects::{
    DefaultPersistenceResultHandler, EffectsConfig, EntityDataService, EntityEffects,
    EntityPrePersistEffects, InMemoryCollections,
};
use entcache_model::Entity;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const HERO: &str = "Hero";
pub const VILLAIN: &str = "Villain";

/// Installs a test-writer subscriber once. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn hero(id: i64, name: &str) -> Entity {
    Entity::new(id).with_field("name", name)
}

pub fn heroes() -> Vec<Entity> {
    vec![
        hero(1, "Windstorm").with_field("power", "flight"),
        hero(2, "Bombasto").with_field("power", "strength"),
        hero(3, "Magneta").with_field("power", "flight"),
    ]
}

pub fn config(response_delay: Duration) -> EffectsConfig {
    EffectsConfig {
        response_delay,
        ..EffectsConfig::default()
    }
}

/// Effects wired to one mock service registered for [`HERO`].
pub struct Harness {
    pub factory: Arc<EntityActionFactory>,
    pub data_service: Arc<EntityDataService>,
    pub mock: Arc<MockDataService>,
    pub collections: Arc<InMemoryCollections>,
    pub effects: Arc<EntityEffects>,
    pub pre_persist: Arc<EntityPrePersistEffects>,
    pub config: EffectsConfig,
}

impl Harness {
    pub async fn new(mock: MockDataService) -> Self {
        Self::with_config(mock, EffectsConfig::default()).await
    }

    pub async fn with_config(mock: MockDataService, config: EffectsConfig) -> Self {
        init_tracing();
        let factory = Arc::new(EntityActionFactory::new());
        let mock = Arc::new(mock);
        let data_service = Arc::new(EntityDataService::new());
        data_service.register_service(HERO, mock.clone()).await;

        let handler = Arc::new(DefaultPersistenceResultHandler::new(factory.clone()));
        let effects = Arc::new(EntityEffects::new(
            data_service.clone(),
            factory.clone(),
            handler,
            &config,
        ));
        let collections = Arc::new(InMemoryCollections::new());
        let pre_persist = Arc::new(EntityPrePersistEffects::new(
            factory.clone(),
            collections.clone(),
        ));

        Self {
            factory,
            data_service,
            mock,
            collections,
            effects,
            pre_persist,
            config,
        }
    }
}
