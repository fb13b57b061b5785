//! # Configuration Records
//!
//! Raw feature entries as they arrive from configuration sources, before any
//! defaults are applied. [`FeatureConfig::into_feature`] is the single place where
//! an entry is normalized into a [`Feature`]:
//!
//! * `processor`: absent or `null` means off, a boolean becomes a constant processor,
//!   a string is looked up in the [`ProcessorCatalog`]. Anything else is rejected.
//! * `params`: absent or `null` means empty, otherwise it must be a mapping.
//! * `static_result`: kept only when it is a boolean.

use crate::error::{FlagError, Result};
use crate::feature::{Feature, Params};
use crate::processor::{Processor, ProcessorCatalog};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single, un-normalized feature entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Optional explicit name; overrides the key the entry was found under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(alias = "staticResult", skip_serializing_if = "Option::is_none")]
    pub static_result: Option<Value>,
}

impl FeatureConfig {
    /// Normalizes the entry into a [`Feature`].
    ///
    /// `key` is the name the entry was registered under, if any. A keyed entry is
    /// always named after its key; an embedded `name` must then agree with it.
    ///
    /// # Errors
    /// Returns [`FlagError::Validation`] when the name is missing or not a string,
    /// when an embedded name differs from `key`, when the processor is neither a
    /// boolean nor a name known to `catalog`, or when params are not a mapping.
    pub fn into_feature(self, key: Option<&str>, catalog: &ProcessorCatalog) -> Result<Feature> {
        let embedded = match self.name {
            Some(Value::String(name)) => Some(name),
            Some(other) => {
                return Err(FlagError::Validation {
                    message: "Feature key `name` must be a string".into(),
                    context: Some(format!("got {other}").into()),
                });
            },
            None => None,
        };

        let name = match (key, embedded) {
            (Some(key), Some(embedded)) if embedded != key => {
                return Err(FlagError::Validation {
                    message: "Feature key `name` does not match its entry key".into(),
                    context: Some(format!("entry '{key}' names itself '{embedded}'").into()),
                });
            },
            (Some(key), _) => key.to_owned(),
            (None, Some(embedded)) => embedded,
            (None, None) => return Err(FlagError::validation("Feature key `name` is not found")),
        };

        let processor = resolve_processor(&name, self.processor, catalog)?;
        let params = normalize_params(&name, self.params)?;
        let static_result = match self.static_result {
            Some(Value::Bool(value)) => Some(value),
            _ => None,
        };

        Ok(Feature::new(name, processor).with_params(params).with_static_result(static_result))
    }
}

impl From<bool> for FeatureConfig {
    fn from(enabled: bool) -> Self {
        Self { processor: Some(Value::Bool(enabled)), ..Self::default() }
    }
}

/// A whole-registry configuration document.
///
/// ```toml
/// strict = true
///
/// [features.beta]
/// processor = true
///
/// [features.staff-only]
/// processor = "context_in"
/// params = { key = "role", values = ["staff"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub preserve: bool,
    pub strict: bool,
    pub features: IndexMap<String, FeatureConfig>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { preserve: true, strict: false, features: IndexMap::new() }
    }
}

fn resolve_processor(
    name: &str,
    raw: Option<Value>,
    catalog: &ProcessorCatalog,
) -> Result<Processor> {
    match raw {
        None | Some(Value::Null) => Ok(Processor::default()),
        Some(Value::Bool(value)) => Ok(Processor::constant(value)),
        Some(Value::String(reference)) => {
            catalog.get(&reference).cloned().ok_or_else(|| FlagError::Validation {
                message: format!("Processor `{reference}` is not callable").into(),
                context: Some(format!("feature '{name}'").into()),
            })
        },
        Some(other) => Err(FlagError::Validation {
            message: format!("Feature key `processor` must be callable, got {other}").into(),
            context: Some(format!("feature '{name}'").into()),
        }),
    }
}

fn normalize_params(name: &str, raw: Option<Value>) -> Result<Params> {
    match raw {
        None | Some(Value::Null) => Ok(Params::new()),
        Some(Value::Object(params)) => Ok(params),
        Some(other) => Err(FlagError::Validation {
            message: format!("Feature key `params` must be a mapping, got {other}").into(),
            context: Some(format!("feature '{name}'").into()),
        }),
    }
}
