pub mod fixtures;

use fixtures::{context, counting};
use flagpole::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn create_with_true_is_always_on() {
    let mut registry = Registry::new();
    registry.create("beta", true).unwrap();

    assert!(registry.is_active("beta", &Context::new()).unwrap());
}

#[test]
fn create_without_processor_is_off() {
    let mut registry = Registry::new();
    registry.create("beta", Processor::default()).unwrap();

    assert!(!registry.is_active("beta", &Context::new()).unwrap());
    assert!(registry.is_inactive("beta", &Context::new()).unwrap());
}

#[test]
fn context_driven_result_is_preserved_from_first_call() {
    let mut registry = Registry::new();
    registry
        .create("x", Processor::new(|ctx, _| ctx.get("flag").cloned().unwrap_or_default()))
        .unwrap();

    assert!(registry.is_active("x", &context(json!({ "flag": true }))).unwrap());
    assert!(registry.is_active("x", &context(json!({ "flag": false }))).unwrap());
}

#[test]
fn non_boolean_processor_result_is_a_validation_error() {
    let mut registry = Registry::new();
    registry.add(Feature::new("y", Processor::new(|_, _| 1))).unwrap();

    let result = registry.is_active("y", &Context::new());
    assert!(matches!(result, Err(FlagError::Validation { .. })), "got {result:?}");
}

#[test]
fn duplicate_add_conflicts() {
    let mut registry = Registry::new();
    registry.add(Feature::new("dup", true)).unwrap();

    let result = registry.add(Feature::new("dup", false));
    assert!(matches!(result, Err(FlagError::Conflict { .. })));
    assert_eq!(registry.processor("dup").and_then(Processor::as_constant), Some(true));
}

#[test]
fn static_result_wins_over_processor_and_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    registry.add(Feature::new("pinned", counting(&calls, false)).with_static_result(Some(true))).unwrap();
    registry.import_results([("pinned", false)]).unwrap();

    for flag in [true, false] {
        assert!(registry.is_active("pinned", &context(json!({ "flag": flag }))).unwrap());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_feature_depends_on_strict_mode() {
    let mut registry = Registry::new();
    assert!(!registry.is_active("ghost", &Context::new()).unwrap());
    assert!(registry.is_inactive("ghost", &Context::new()).unwrap());

    registry.set_strict(true);
    let result = registry.is_active("ghost", &Context::new());
    assert!(matches!(result, Err(FlagError::NotFound { .. })));
}

#[test]
fn preserve_invokes_processor_at_most_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    registry.create("memo", counting(&calls, true)).unwrap();

    registry.is_active("memo", &Context::new()).unwrap();
    registry.is_active("memo", &Context::new()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn disabling_preserve_reinvokes_processor() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new().with_preserve(false);
    registry.create("live", counting(&calls, true)).unwrap();

    for _ in 0..3 {
        registry.is_active("live", &Context::new()).unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(registry.cached("live"), None);
}

#[test]
fn remove_then_readd_succeeds() {
    let mut registry = Registry::new();
    registry.create("temp", true).unwrap();
    registry.is_active("temp", &Context::new()).unwrap();

    registry.remove("temp");
    assert!(!registry.has("temp"));

    registry.create("temp", false).unwrap();
    assert!(!registry.is_active("temp", &Context::new()).unwrap());
}

#[test]
fn flush_empties_features_and_results() {
    let mut registry = Registry::new();
    registry.create("a", true).unwrap().create("b", false).unwrap();
    registry.results().unwrap();

    registry.flush();

    assert!(registry.all().is_empty());
    assert!(registry.results().unwrap().is_empty());
    assert_eq!(registry.cached("a"), None);
}

#[test]
fn snapshot_roundtrip_skips_processors() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut source = Registry::new();
    source.create("on", true).unwrap().create("off", false).unwrap();
    let snapshot = source.results().unwrap();
    assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["on", "off"]);

    let mut target = Registry::new();
    target.create("on", counting(&calls, false)).unwrap().create("off", counting(&calls, true)).unwrap();
    target.import_results(snapshot.clone()).unwrap();

    assert_eq!(target.results().unwrap(), snapshot);
    assert!(target.is_active("on", &Context::new()).unwrap());
    assert!(!target.is_active("off", &Context::new()).unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn import_rejects_unknown_names() {
    let mut registry = Registry::new();
    let result = registry.import_results([("ghost".to_owned(), true)]);
    assert!(matches!(result, Err(FlagError::NotFound { .. })));
}

#[test]
fn append_stops_at_first_failure_without_rollback() {
    let mut registry = Registry::new();
    let result = registry.append([
        Feature::new("one", true),
        Feature::new("two", true),
        Feature::new("one", false),
        Feature::new("three", true),
    ]);

    assert!(matches!(result, Err(FlagError::Conflict { .. })));
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["one", "two"]);
}

#[test]
fn replace_swaps_entire_content() {
    let mut registry = Registry::new();
    registry.create("old", true).unwrap();
    registry.is_active("old", &Context::new()).unwrap();

    registry.replace([Feature::new("new", true)]).unwrap();

    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["new"]);
    assert_eq!(registry.cached("old"), None);
}

#[test]
fn feature_lookup_requires_registration() {
    let mut registry = Registry::new();
    registry.add(Feature::new("known", true).with_param("owner", "growth")).unwrap();

    assert_eq!(registry.feature("known").unwrap().params()["owner"], json!("growth"));
    assert!(matches!(registry.feature("unknown"), Err(FlagError::NotFound { .. })));
}

#[test]
fn params_get_single_and_merge() {
    let mut registry = Registry::new();
    registry
        .add(Feature::new("promo", true).with_param("discount", 10).with_param("region", "eu"))
        .unwrap();

    assert_eq!(registry.param("promo", "discount"), Some(&json!(10)));
    assert_eq!(registry.param("promo", "missing"), None);
    assert!(registry.params("ghost").is_none());

    let update = context(json!({ "discount": 15, "channel": "email" }));
    registry.merge_params("promo", update).unwrap();

    let params = registry.params("promo").unwrap();
    assert_eq!(params.keys().collect::<Vec<_>>(), vec!["discount", "region", "channel"]);
    assert_eq!(params["discount"], json!(15));
}

#[test]
fn processor_setter_replaces_decision() {
    let mut registry = Registry::new();
    registry.create("switch", false).unwrap();
    assert!(!registry.is_active("switch", &Context::new()).unwrap());

    registry.set_processor("switch", true).unwrap();

    assert!(registry.is_active("switch", &Context::new()).unwrap());
}

#[test]
fn static_result_setter_pins_and_unpins() {
    let mut registry = Registry::new();
    registry.create("pin", true).unwrap();

    registry.set_static_result("pin", Some(false)).unwrap();
    assert_eq!(registry.static_result("pin"), Some(false));
    assert!(!registry.is_active("pin", &Context::new()).unwrap());

    registry.set_static_result("pin", None).unwrap();
    assert!(registry.is_active("pin", &Context::new()).unwrap());
}

#[test]
fn when_and_unless_dispatch_on_state() {
    let mut registry = Registry::new();
    registry.add(Feature::new("on", true).with_param("limit", 5)).unwrap();
    registry.create("off", false).unwrap();
    let ctx = Context::new();

    let limit = registry.when("on", &ctx, |_, params| params["limit"].clone()).unwrap();
    assert_eq!(limit, Some(json!(5)));
    assert_eq!(registry.when("off", &ctx, |_, _| 1).unwrap(), None);

    assert_eq!(registry.unless("off", &ctx, |_, _| "fallback").unwrap(), Some("fallback"));
    assert_eq!(registry.unless("on", &ctx, |_, _| "fallback").unwrap(), None);

    assert_eq!(registry.when_else("on", &ctx, |_, p| p["limit"].clone(), |_, _| json!(0)).unwrap(), json!(5));
    assert_eq!(registry.when_else("off", &ctx, |_, _| 1, |_, _| 2).unwrap(), 2);
    assert_eq!(registry.unless_else("on", &ctx, |_, _| 1, |_, _| 2).unwrap(), 2);
    assert_eq!(registry.unless_else("off", &ctx, |_, _| 1, |_, _| 2).unwrap(), 1);
    assert_eq!(registry.unless_else("ghost", &ctx, |_, p| p.len(), |_, _| 9).unwrap(), 0);
}

#[test]
fn when_propagates_strict_errors() {
    let mut registry = Registry::new().with_strict(true);
    let result = registry.when("ghost", &Context::new(), |_, _| ());
    assert!(matches!(result, Err(FlagError::NotFound { .. })));
}

#[test]
fn settings_chain() {
    let mut registry = Registry::new();
    registry.set_preserve(false).set_strict(true);

    assert!(!registry.preserves());
    assert!(registry.is_strict());
}

#[test]
fn results_without_preserve_leave_cache_empty() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new().with_preserve(false);
    registry.create("a", counting(&calls, true)).unwrap();

    let snapshot = registry.results().unwrap();

    assert_eq!(snapshot["a"], true);
    assert_eq!(registry.cached("a"), None);

    registry.results().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn set_inserts_unregistered_feature() {
    let mut registry = Registry::new();
    registry.create("first", false).unwrap();

    registry.set(Feature::new("fresh", true)).unwrap();

    assert!(registry.has("fresh"));
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["first", "fresh"]);
    assert!(registry.is_active("fresh", &Context::new()).unwrap());
}

#[test]
fn attribute_reads_processor_and_params() {
    let mut registry = Registry::new();
    registry.add(Feature::new("promo", true).with_param("discount", 10)).unwrap();

    let Some(Attribute::Processor(processor)) = registry.attribute("promo", AttributeKey::Processor) else {
        panic!("expected a processor attribute");
    };
    assert_eq!(processor.as_constant(), Some(true));

    let Some(Attribute::Params(params)) = registry.attribute("promo", AttributeKey::Params) else {
        panic!("expected a params attribute");
    };
    assert_eq!(params["discount"], json!(10));

    assert!(registry.attribute("ghost", AttributeKey::Params).is_none());
}

#[test]
fn remove_keeps_insertion_order() {
    let mut registry = Registry::new();
    for name in ["a", "b", "c", "d"] {
        registry.create(name, true).unwrap();
    }

    registry.remove("b");

    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "c", "d"]);
}
