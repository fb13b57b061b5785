use anyhow::{Result, bail};
use flagpole::{Context, Registry, ResultSnapshot};
use serde_json::Value;
use tracing::debug;

/// Prints one line per feature: name, kind and params.
pub(crate) fn list(registry: &Registry) {
    if registry.all().is_empty() {
        println!("No features configured.");
        return;
    }

    for (name, feature) in registry.all() {
        let kind = match (feature.static_result(), feature.processor().as_constant()) {
            (Some(value), _) => format!("static({value})"),
            (None, Some(value)) => format!("constant({value})"),
            (None, None) => "dynamic".to_owned(),
        };
        println!("{name}\t{kind}\t{}", Value::Object(feature.params().clone()));
    }
}

/// Evaluates each name against the parsed context.
///
/// # Errors
/// Returns an error for malformed context entries or failed evaluations.
pub(crate) fn eval(registry: &mut Registry, names: &[String], entries: &[String]) -> Result<()> {
    let context = parse_context(entries)?;
    debug!(features = names.len(), "Evaluating features");

    for name in names {
        let active = registry.is_active(name, &context)?;
        println!("{name}={active}");
    }
    Ok(())
}

/// Prints the decision of every registered feature as JSON.
///
/// Without context entries this is the registry's own result snapshot; with them,
/// every feature is evaluated against the supplied context.
///
/// # Errors
/// Returns an error for malformed context entries or failed evaluations.
pub(crate) fn snapshot(registry: &mut Registry, entries: &[String], pretty: bool) -> Result<()> {
    let context = parse_context(entries)?;

    let results = if context.is_empty() {
        registry.results()?
    } else {
        let names: Vec<String> = registry.names().map(str::to_owned).collect();
        names
            .into_iter()
            .map(|name| registry.is_active(&name, &context).map(|active| (name, active)))
            .collect::<flagpole::Result<ResultSnapshot>>()?
    };

    let rendered =
        if pretty { serde_json::to_string_pretty(&results)? } else { serde_json::to_string(&results)? };
    println!("{rendered}");
    Ok(())
}

/// Parses `key=value` pairs; values that are not valid JSON are kept as strings.
fn parse_context(entries: &[String]) -> Result<Context> {
    let mut context = Context::new();
    for entry in entries {
        let Some((key, raw)) = entry.split_once('=') else {
            bail!("Invalid context entry '{entry}', expected KEY=VALUE");
        };
        if key.is_empty() {
            bail!("Invalid context entry '{entry}', key is empty");
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
        context.insert(key.to_owned(), value);
    }
    Ok(context)
}
