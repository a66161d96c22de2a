//! Persistence effects for entcache.
//!
//! Turns dispatched entity actions into calls on per-collection data
//! services and emits the derived success/error actions:
//!
//! - [`EntityEffects`]: performs one persistence request
//! - [`EntityPrePersistEffects`]: resolves delete intents to a collection index
//! - [`spawn_effects`]: runs both as tasks; persistence is single-flight and
//!   results come out in dispatch order
//! - [`EntityDispatcher`]: per-collection command API with correlation ids
//!
//! Persistence failures never surface as `Err`; they become `<op>/error`
//! actions carrying the failure and the request that caused it.

mod collections;
mod config;
pub mod data_service;
mod dispatcher;
mod error;
mod persist;
mod pre_persist;
mod result_handler;
pub mod runtime;

pub use collections::{CollectionSnapshot, EntityCollections, InMemoryCollections};
pub use config::{DefaultDispatcherOptions, EffectsConfig};
pub use data_service::{EntityCollectionDataService, EntityDataService};
pub use dispatcher::EntityDispatcher;
pub use error::{EffectsError, EffectsResult, PersistResult};
pub use persist::EntityEffects;
pub use pre_persist::EntityPrePersistEffects;
pub use result_handler::{DefaultPersistenceResultHandler, PersistenceResultHandler};
pub use runtime::{spawn_effects, ActionSender, EffectsHandle};
