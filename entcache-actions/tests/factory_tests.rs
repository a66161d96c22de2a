use entcache_actions::{
    ActionData, ActionError, EntityActionFactory, EntityActionInit, EntityActionOptions, EntityOp,
    PayloadOverrides, PersistError,
};
use entcache_model::{Entity, MergeStrategy};
use entcache_types::CorrelationId;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn hero(id: i64, name: &str) -> Arc<Entity> {
    Arc::new(Entity::new(id).with_field("name", name))
}

fn crid_options() -> EntityActionOptions {
    EntityActionOptions::default()
        .correlation_id("CRID42")
        .optimistic(true)
        .merge_strategy(MergeStrategy::OverwriteChanges)
        .tag("Foo")
}

// ── create ───────────────────────────────────────────────────────

#[test]
fn create_from_entity_name_and_op() {
    let factory = EntityActionFactory::new();
    let action = factory.create("Hero", EntityOp::QueryAll).unwrap();

    assert_eq!(action.entity_name(), "Hero");
    assert_eq!(action.entity_op(), EntityOp::QueryAll);
    assert!(action.data().is_none(), "no data property");
}

#[test]
fn create_with_data() {
    let factory = EntityActionFactory::new();
    let h = hero(42, "Francis");
    let action = factory
        .create_with("Hero", EntityOp::AddOne, Some(h.clone().into()), Default::default())
        .unwrap();

    assert_eq!(action.entity_op(), EntityOp::AddOne);
    let data = action.data().and_then(ActionData::as_entity).unwrap();
    assert!(Arc::ptr_eq(data, &h));
}

#[test]
fn create_forwards_explicit_null_data() {
    let factory = EntityActionFactory::new();
    let action = factory
        .create_with("Hero", EntityOp::QueryAll, Some(ActionData::null()), Default::default())
        .unwrap();

    assert!(action.data().is_some());
    assert!(action.data().unwrap().is_null());
}

#[test]
fn create_with_options() {
    let factory = EntityActionFactory::new();
    let action = factory
        .create_with("Hero", EntityOp::QueryAll, None, crid_options())
        .unwrap();
    let p = action.payload();

    assert_eq!(p.entity_name, "Hero");
    assert_eq!(p.entity_op, EntityOp::QueryAll);
    assert!(p.data.is_none());
    assert_eq!(p.correlation_id, Some(CorrelationId::from("CRID42")));
    assert_eq!(p.is_optimistic, Some(true));
    assert_eq!(p.merge_strategy, Some(MergeStrategy::OverwriteChanges));
    assert_eq!(p.tag.as_deref(), Some("Foo"));
}

#[test]
fn create_leaves_undefined_options_off() {
    let factory = EntityActionFactory::new();
    let action = factory
        .create_with(
            "Hero",
            EntityOp::QueryAll,
            None,
            EntityActionOptions::default().optimistic(false),
        )
        .unwrap();
    let p = action.payload();

    assert_eq!(p.is_optimistic, Some(false));
    assert!(p.correlation_id.is_none());
    assert!(p.merge_strategy.is_none());
    assert!(p.tag.is_none());
    assert!(!p.skip);
    assert!(p.error.is_none());
}

#[test]
fn create_from_payload() {
    let factory = EntityActionFactory::new();
    let h = hero(42, "Francis");
    let action = factory
        .create_from_payload(EntityActionInit {
            entity_name: Some("Hero".into()),
            entity_op: Some(EntityOp::AddOne),
            data: Some(h.clone().into()),
            correlation_id: Some("CRID42".into()),
            is_optimistic: Some(true),
            merge_strategy: Some(MergeStrategy::OverwriteChanges),
            tag: Some("Foo".into()),
            ..Default::default()
        })
        .unwrap();
    let p = action.payload();

    assert_eq!(p.entity_name, "Hero");
    assert_eq!(p.entity_op, EntityOp::AddOne);
    assert_eq!(p.data, Some(ActionData::Entity(h)));
    assert_eq!(p.correlation_id, Some(CorrelationId::from("CRID42")));
    assert_eq!(p.is_optimistic, Some(true));
    assert_eq!(p.merge_strategy, Some(MergeStrategy::OverwriteChanges));
    assert_eq!(p.tag.as_deref(), Some("Foo"));
}

#[test]
fn create_from_payload_roundtrips_existing_payload() {
    let factory = EntityActionFactory::new();
    let original = factory
        .create_with("Hero", EntityOp::QueryMany, Some(json!({"name": "A"}).into()), crid_options())
        .unwrap();
    let copy = factory
        .create_from_payload(original.payload().clone().into())
        .unwrap();
    assert_eq!(copy, original);
}

// ── create: invalid arguments ────────────────────────────────────

#[test]
fn create_fails_without_entity_name() {
    let factory = EntityActionFactory::new();
    let err = factory
        .create_from_payload(EntityActionInit {
            entity_op: Some(EntityOp::QueryAll),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ActionError::InvalidArgument(_)));
}

#[test]
fn create_fails_with_empty_entity_name() {
    let factory = EntityActionFactory::new();
    assert!(matches!(
        factory.create("", EntityOp::QueryAll),
        Err(ActionError::InvalidArgument(_))
    ));
}

#[test]
fn create_fails_without_entity_op() {
    let factory = EntityActionFactory::new();
    let err = factory
        .create_from_payload(EntityActionInit {
            entity_name: Some("Hero".into()),
            entity_op: None,
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ActionError::InvalidArgument(_)));
}

// ── create_from_action ───────────────────────────────────────────

#[test]
fn create_from_action_forwards_data() {
    let factory = EntityActionFactory::new();
    let h = hero(42, "Francis");
    let action1 = factory
        .create_with("Hero", EntityOp::AddOne, Some(h.clone().into()), Default::default())
        .unwrap();
    let action = factory.create_from_action(&action1, PayloadOverrides::new(EntityOp::SaveAddOne));

    assert_eq!(action.entity_name(), "Hero");
    assert_eq!(action.entity_op(), EntityOp::SaveAddOne);
    assert!(Arc::ptr_eq(action.data().and_then(ActionData::as_entity).unwrap(), &h));
    assert_eq!(action.action_type(), "[Hero] entcache/save/add-one");
}

#[test]
fn create_from_action_copies_options() {
    let factory = EntityActionFactory::new();
    let source = factory
        .create_with("Hero", EntityOp::QueryAll, None, crid_options())
        .unwrap();
    let results = vec![hero(1, "Francis"), hero(2, "Alex")];
    let action = factory.create_from_action(
        &source,
        PayloadOverrides::new(EntityOp::QueryAllSuccess).data(results.clone()),
    );
    let p = action.payload();

    assert_eq!(p.entity_name, "Hero");
    assert_eq!(p.entity_op, EntityOp::QueryAllSuccess);
    assert_eq!(p.data, Some(ActionData::Entities(results)));
    assert_eq!(p.correlation_id, Some(CorrelationId::from("CRID42")));
    assert_eq!(p.is_optimistic, Some(true));
    assert_eq!(p.merge_strategy, Some(MergeStrategy::OverwriteChanges));
    assert_eq!(p.tag.as_deref(), Some("Foo"));
}

#[test]
fn create_from_action_can_suppress_data() {
    let factory = EntityActionFactory::new();
    let action1 = factory
        .create_with("Hero", EntityOp::AddOne, Some(hero(42, "Francis").into()), Default::default())
        .unwrap();
    let action = factory.create_from_action(
        &action1,
        PayloadOverrides::new(EntityOp::SaveAddOne).without_data(),
    );

    assert_eq!(action.entity_name(), "Hero");
    assert_eq!(action.entity_op(), EntityOp::SaveAddOne);
    assert!(action.data().is_none());
    // Source is untouched.
    assert!(action1.data().is_some());
}

#[test]
fn create_from_action_overrides_win() {
    let factory = EntityActionFactory::new();
    let source = factory
        .create_with("Hero", EntityOp::SaveAddOne, None, crid_options())
        .unwrap();
    let err = PersistError::remote("boom");
    let action = factory.create_from_action(
        &source,
        PayloadOverrides::new(EntityOp::SaveAddOneError)
            .correlation_id("CRID99")
            .optimistic(false)
            .merge_strategy(MergeStrategy::IgnoreChanges)
            .tag("Bar")
            .skip(true)
            .error(err.clone()),
    );
    let p = action.payload();

    assert_eq!(p.correlation_id, Some(CorrelationId::from("CRID99")));
    assert_eq!(p.is_optimistic, Some(false));
    assert_eq!(p.merge_strategy, Some(MergeStrategy::IgnoreChanges));
    assert_eq!(p.tag.as_deref(), Some("Bar"));
    assert!(p.skip);
    assert_eq!(p.error, Some(err));
    assert_eq!(action.action_type(), "[Bar] entcache/save/add-one/error");
}

#[test]
fn create_from_action_preserves_skip_flag() {
    let factory = EntityActionFactory::new();
    let source = factory
        .create_from_payload(EntityActionInit {
            entity_name: Some("Hero".into()),
            entity_op: Some(EntityOp::SaveAddOne),
            skip: true,
            ..Default::default()
        })
        .unwrap();
    let derived =
        factory.create_from_action(&source, PayloadOverrides::new(EntityOp::SaveAddOneSuccess));
    assert!(derived.payload().skip);
}

// ── format_action_type ───────────────────────────────────────────

#[test]
fn format_action_type_uses_entity_name() {
    let factory = EntityActionFactory::new();
    let action = factory.create("Hero", EntityOp::QueryAll).unwrap();
    let expected = factory.format_action_type(EntityOp::QueryAll, "Hero");
    assert_eq!(action.action_type(), expected);
}

#[test]
fn format_action_type_uses_tag_instead_of_entity_name() {
    let factory = EntityActionFactory::new();
    let tag = "Hero - Tag Test";
    let action = factory
        .create_with(
            "Hero",
            EntityOp::QueryAll,
            Some(ActionData::null()),
            EntityActionOptions::default().tag(tag),
        )
        .unwrap();
    assert!(action.action_type().contains(tag));
}

#[test]
fn format_action_type_is_deterministic() {
    let factory = EntityActionFactory::new();
    assert_eq!(
        factory.format_action_type(EntityOp::SaveUpdateOne, "Villain"),
        factory.format_action_type(EntityOp::SaveUpdateOne, "Villain")
    );
}

#[test]
fn custom_formatter_reformats_action_type() {
    let mut factory = EntityActionFactory::new();
    factory.set_action_type_formatter(|op, name| format!("{name}_{op}").to_uppercase());

    let expected = format!("Hero_{}", EntityOp::QueryAll).to_uppercase();
    let action = factory.create("Hero", EntityOp::QueryAll).unwrap();
    assert_eq!(action.action_type(), expected);
}

#[test]
fn custom_formatter_applies_only_after_override() {
    let mut factory = EntityActionFactory::new();
    let before = factory.create("Hero", EntityOp::QueryAll).unwrap();
    factory.set_action_type_formatter(|_, name| format!("custom:{name}"));
    let after = factory.create("Hero", EntityOp::QueryAll).unwrap();
    let derived = factory.create_from_action(&before, PayloadOverrides::new(EntityOp::QueryAllSuccess));

    assert_eq!(before.action_type(), "[Hero] entcache/query-all");
    assert_eq!(after.action_type(), "custom:Hero");
    assert_eq!(derived.action_type(), "custom:Hero");
}

#[test]
fn with_formatter_constructor() {
    let factory = EntityActionFactory::with_formatter(|op, name| format!("{op}@{name}"));
    let action = factory.create("Hero", EntityOp::QueryLoad).unwrap();
    assert_eq!(action.action_type(), "entcache/query-load@Hero");
}
