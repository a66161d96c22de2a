mod common;

use common::{hero, heroes, Harness, HERO};
use entcache_actions::{ActionData, EntityActionOptions, EntityOp};
use entcache_effects::data_service::mock::{MockDataService, MockRequest};
use entcache_effects::{
    spawn_effects, DefaultDispatcherOptions, EffectsError, EffectsHandle, EntityDispatcher,
};
use entcache_model::Update;
use entcache_types::CorrelationIdGenerator;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

async fn setup(options: DefaultDispatcherOptions) -> (Harness, EffectsHandle, EntityDispatcher) {
    let h = Harness::new(MockDataService::new(heroes())).await;
    let handle = spawn_effects(&h.config, h.effects.clone(), h.pre_persist.clone());
    let dispatcher = EntityDispatcher::new(
        HERO,
        h.factory.clone(),
        handle.sender(),
        options,
        Arc::new(CorrelationIdGenerator::default()),
    );
    (h, handle, dispatcher)
}

// ── Defaults ─────────────────────────────────────────────────────

#[test]
fn default_options_are_pessimistic_except_delete() {
    let options = DefaultDispatcherOptions::default();
    assert!(!options.optimistic_add);
    assert!(options.optimistic_delete);
    assert!(!options.optimistic_update);
}

#[tokio::test(start_paused = true)]
async fn saves_carry_default_optimism() {
    let (_h, mut handle, dispatcher) = setup(DefaultDispatcherOptions::default()).await;

    dispatcher.add(hero(4, "Tornado")).await.unwrap();
    dispatcher
        .update(Update::new(1, json!({ "name": "Gale" }).as_object().unwrap().clone()))
        .await
        .unwrap();
    dispatcher.delete(2).await.unwrap();

    let add = handle.next_action().await.unwrap();
    let update = handle.next_action().await.unwrap();
    let delete = handle.next_action().await.unwrap();

    assert_eq!(add.entity_op(), EntityOp::SaveAddOneSuccess);
    assert_eq!(add.payload().is_optimistic, Some(false));
    assert_eq!(update.entity_op(), EntityOp::SaveUpdateOneSuccess);
    assert_eq!(update.payload().is_optimistic, Some(false));
    assert_eq!(delete.entity_op(), EntityOp::SaveDeleteOneSuccess);
    assert_eq!(delete.payload().is_optimistic, Some(true));

    drop(dispatcher);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn custom_options_override_defaults() {
    let options = DefaultDispatcherOptions {
        optimistic_add: true,
        optimistic_delete: false,
        optimistic_update: true,
    };
    let (_h, mut handle, dispatcher) = setup(options).await;

    dispatcher.add(hero(4, "Tornado")).await.unwrap();
    dispatcher.delete(1).await.unwrap();

    let add = handle.next_action().await.unwrap();
    let delete = handle.next_action().await.unwrap();
    assert_eq!(add.payload().is_optimistic, Some(true));
    assert_eq!(delete.payload().is_optimistic, Some(false));

    drop(dispatcher);
    handle.shutdown().await.unwrap();
}

// ── Correlation ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn each_dispatch_gets_a_fresh_correlation_id() {
    let (_h, mut handle, dispatcher) = setup(DefaultDispatcherOptions::default()).await;

    let first = dispatcher.get_all().await.unwrap();
    let second = dispatcher.get_by_key(2).await.unwrap();

    assert_eq!(first.as_str(), "CRID1");
    assert_eq!(second.as_str(), "CRID2");
    assert_eq!(handle.next_action().await.unwrap().correlation_id(), Some(&first));
    assert_eq!(handle.next_action().await.unwrap().correlation_id(), Some(&second));

    drop(dispatcher);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn explicit_correlation_id_is_kept() {
    let (_h, mut handle, dispatcher) = setup(DefaultDispatcherOptions::default()).await;

    let crid = dispatcher
        .dispatch_op(
            EntityOp::QueryAll,
            None,
            EntityActionOptions::default().correlation_id("mine"),
        )
        .await
        .unwrap();

    assert_eq!(crid.as_str(), "mine");
    let result = handle.next_action().await.unwrap();
    assert_eq!(result.correlation_id().unwrap().as_str(), "mine");

    drop(dispatcher);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn clones_share_the_id_sequence() {
    let (_h, handle, dispatcher) = setup(DefaultDispatcherOptions::default()).await;
    let other = dispatcher.clone();

    assert_eq!(dispatcher.load().await.unwrap().as_str(), "CRID1");
    assert_eq!(other.load().await.unwrap().as_str(), "CRID2");

    drop(dispatcher);
    drop(other);
    assert_eq!(handle.shutdown().await.unwrap().len(), 2);
}

// ── Commands ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn commands_reach_the_data_service() {
    let (h, mut handle, dispatcher) = setup(DefaultDispatcherOptions::default()).await;

    dispatcher.load().await.unwrap();
    dispatcher.get_by_key(3).await.unwrap();
    dispatcher
        .get_with_query(json!({ "power": "flight" }))
        .await
        .unwrap();
    for _ in 0..3 {
        handle.next_action().await.unwrap();
    }

    assert_eq!(
        h.mock.requests(),
        vec![
            MockRequest::GetAll,
            MockRequest::GetById(3.into()),
            MockRequest::GetWithQuery(json!({ "power": "flight" })),
        ]
    );

    drop(dispatcher);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn remove_commands_are_resolved_not_persisted() {
    let (h, mut handle, dispatcher) = setup(DefaultDispatcherOptions::default()).await;
    let cached = vec![Arc::new(hero(1, "Windstorm")), Arc::new(hero(2, "Bombasto"))];
    h.collections.publish(HERO, cached.clone()).await;

    let by_entity = dispatcher.remove_one(cached[1].clone()).await.unwrap();
    let by_key = dispatcher.remove_by_key(7).await.unwrap();

    let out = [
        handle.next_action().await.unwrap(),
        handle.next_action().await.unwrap(),
        handle.next_action().await.unwrap(),
    ];
    assert_eq!(out[0].correlation_id(), Some(&by_entity));
    assert_eq!(out[1].entity_op(), EntityOp::ResolvedDeleteByIndex);
    assert_eq!(out[2].correlation_id(), Some(&by_key));
    let absent = out[2].data().and_then(ActionData::as_resolved_delete).unwrap();
    assert_eq!(absent.index, -1);
    assert!(h.mock.calls().is_empty());

    drop(dispatcher);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_dispatcher_senders() {
    let (_h, handle, dispatcher) = setup(DefaultDispatcherOptions::default()).await;

    let shutdown = tokio::spawn(handle.shutdown());
    tokio::task::yield_now().await;

    dispatcher.get_all().await.unwrap();
    drop(dispatcher);

    let remaining = shutdown.await.unwrap().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].entity_op(), EntityOp::QueryAllSuccess);
}

#[tokio::test]
async fn empty_entity_name_is_rejected() {
    let h = Harness::new(MockDataService::new(vec![])).await;
    let handle = spawn_effects(&h.config, h.effects.clone(), h.pre_persist.clone());
    let dispatcher = EntityDispatcher::new(
        "",
        h.factory.clone(),
        handle.sender(),
        DefaultDispatcherOptions::default(),
        Arc::new(CorrelationIdGenerator::default()),
    );

    let err = dispatcher.get_all().await.unwrap_err();
    assert!(matches!(err, EffectsError::Action(_)));

    drop(dispatcher);
    assert!(handle.shutdown().await.unwrap().is_empty());
}
