//! Processors the CLI can reference by name from configuration files.

use flagpole::{Context, Params, Processor, ProcessorCatalog};
use serde_json::Value;

pub(crate) fn builtin() -> ProcessorCatalog {
    ProcessorCatalog::new()
        .with("context_flag", Processor::new(context_flag))
        .with("context_in", Processor::new(context_in))
}

/// The boolean stored in the context under `params.key`; `false` when missing.
fn context_flag(context: &Context, params: &Params) -> Value {
    lookup(context, params).cloned().unwrap_or(Value::Bool(false))
}

/// `true` when the context value under `params.key` is listed in `params.values`.
fn context_in(context: &Context, params: &Params) -> bool {
    let Some(value) = lookup(context, params) else {
        return false;
    };
    params.get("values").and_then(Value::as_array).is_some_and(|values| values.contains(value))
}

fn lookup<'a>(context: &'a Context, params: &Params) -> Option<&'a Value> {
    params.get("key").and_then(Value::as_str).and_then(|key| context.get(key))
}
