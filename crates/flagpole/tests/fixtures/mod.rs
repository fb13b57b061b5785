use flagpole::{Context, Processor};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Builds a context (or params) map from a JSON object literal.
/// # Panics
/// * If `value` is not a JSON object.
#[must_use]
pub fn context(value: Value) -> Context {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A processor that always returns `result` and counts its invocations.
#[must_use]
pub fn counting(calls: &Arc<AtomicUsize>, result: bool) -> Processor {
    let calls = Arc::clone(calls);
    Processor::new(move |_, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        result
    })
}
