use crate::config::{FeatureConfig, RegistryConfig};
use crate::error::{FlagError, Result};
use crate::feature::{Attribute, AttributeKey, Context, Feature, Params};
use crate::processor::{Processor, ProcessorCatalog};
use fxhash::FxHashMap;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

/// Ordered mapping of feature name to its current decision.
pub type ResultSnapshot = IndexMap<String, bool>;

/// The feature-toggle registry.
///
/// Owns every feature definition and the memoized result of each evaluation.
/// Evaluation writes to the cache and therefore takes `&mut self`; share a registry
/// across threads by wrapping it in a lock.
///
/// ### Evaluation order
/// 1. Unknown name: `false`, or [`FlagError::NotFound`] in strict mode.
/// 2. Static result, when set.
/// 3. Memoized result, when present.
/// 4. The processor; its result is memoized when `preserve` is enabled.
///
/// ### Example
/// ```rust
/// use flagpole::{Context, Feature, Registry};
///
/// # fn main() -> flagpole::Result<()> {
/// let mut registry = Registry::new();
/// registry
///     .create("beta", true)?
///     .add(Feature::new("legacy", true).with_static_result(Some(false)))?;
///
/// assert!(registry.is_active("beta", &Context::new())?);
/// assert!(registry.is_inactive("legacy", &Context::new())?);
/// assert!(!registry.is_active("unknown", &Context::new())?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Registry {
    features: IndexMap<String, Feature>,
    preserved: FxHashMap<String, bool>,
    preserve: bool,
    strict: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self { features: IndexMap::new(), preserved: FxHashMap::default(), preserve: true, strict: false }
    }
}

impl Registry {
    /// Creates an empty registry with memoization on and strict mode off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether evaluation results are memoized.
    #[must_use]
    pub const fn with_preserve(mut self, preserve: bool) -> Self {
        self.preserve = preserve;
        self
    }

    /// Sets whether evaluating an unknown feature is an error.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builds a registry from a mapping of name to raw configuration entry.
    ///
    /// Entries are normalized by [`FeatureConfig::into_feature`] and registered in
    /// iteration order.
    ///
    /// # Errors
    /// * [`FlagError::Validation`] If an entry cannot be normalized.
    /// * [`FlagError::Conflict`] If two entries resolve to the same name.
    pub fn from_entries<I, K>(entries: I, catalog: &ProcessorCatalog) -> Result<Self>
    where
        I: IntoIterator<Item = (K, FeatureConfig)>,
        K: AsRef<str>,
    {
        let mut registry = Self::new();
        for (key, entry) in entries {
            let feature = entry.into_feature(Some(key.as_ref()), catalog)?;
            registry.add(feature)?;
        }
        Ok(registry)
    }

    /// Builds a registry from a whole configuration document, including its flags.
    ///
    /// # Errors
    /// See [`Registry::from_entries`].
    pub fn from_config(config: RegistryConfig, catalog: &ProcessorCatalog) -> Result<Self> {
        let registry = Self::from_entries(config.features, catalog)?;
        Ok(registry.with_preserve(config.preserve).with_strict(config.strict))
    }

    // --- Registration ---

    /// Registers a new feature.
    ///
    /// # Errors
    /// * [`FlagError::Validation`] If the name is blank.
    /// * [`FlagError::Conflict`] If the name is already registered.
    pub fn add(&mut self, feature: Feature) -> Result<&mut Self> {
        validate_name(feature.name())?;
        if self.has(feature.name()) {
            return Err(FlagError::conflict(feature.name()));
        }

        debug!(feature = feature.name(), "Feature registered");
        self.features.insert(feature.name().to_owned(), feature);
        Ok(self)
    }

    /// Registers features one by one.
    ///
    /// Stops at the first failure; features added before it stay registered.
    ///
    /// # Errors
    /// See [`Registry::add`].
    pub fn append(&mut self, features: impl IntoIterator<Item = Feature>) -> Result<&mut Self> {
        for feature in features {
            self.add(feature)?;
        }
        Ok(self)
    }

    /// Normalizes and registers raw records that carry their own `name`.
    ///
    /// # Errors
    /// See [`FeatureConfig::into_feature`] and [`Registry::add`].
    pub fn append_configs(
        &mut self,
        records: impl IntoIterator<Item = FeatureConfig>,
        catalog: &ProcessorCatalog,
    ) -> Result<&mut Self> {
        for record in records {
            self.add(record.into_feature(None, catalog)?)?;
        }
        Ok(self)
    }

    /// Registers a feature with empty params and no static result.
    ///
    /// `processor` accepts a [`Processor`] or a plain `bool` for an always-on or
    /// always-off feature; use [`Processor::default`] for an omitted processor.
    ///
    /// # Errors
    /// See [`Registry::add`].
    pub fn create(&mut self, name: impl Into<String>, processor: impl Into<Processor>) -> Result<&mut Self> {
        self.add(Feature::new(name, processor))
    }

    /// Inserts or overwrites a feature by name.
    ///
    /// Unlike [`Registry::add`] this never conflicts. A memoized result for the name
    /// is dropped, so the new definition is evaluated on next use.
    ///
    /// # Errors
    /// Returns [`FlagError::Validation`] if the name is blank.
    pub fn set(&mut self, feature: Feature) -> Result<&mut Self> {
        validate_name(feature.name())?;

        let name = feature.name().to_owned();
        self.preserved.remove(&name);
        if self.features.insert(name.clone(), feature).is_some() {
            debug!(feature = name.as_str(), "Feature replaced");
        } else {
            debug!(feature = name.as_str(), "Feature registered");
        }
        Ok(self)
    }

    /// Replaces the whole registry content: flush, then [`Registry::append`].
    ///
    /// # Errors
    /// See [`Registry::add`].
    pub fn replace(&mut self, features: impl IntoIterator<Item = Feature>) -> Result<&mut Self> {
        self.flush();
        self.append(features)
    }

    // --- Inspection ---

    /// Every registered feature, in registration order.
    #[must_use]
    pub const fn all(&self) -> &IndexMap<String, Feature> {
        &self.features
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.features.keys().map(String::as_str)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    /// Returns the full definition of `name`.
    ///
    /// # Errors
    /// Returns [`FlagError::NotFound`] if the feature is not registered.
    pub fn feature(&self, name: &str) -> Result<&Feature> {
        self.features.get(name).ok_or_else(|| FlagError::not_found(name))
    }

    /// Reads one sub-field of a feature; `None` when the feature is not registered.
    #[must_use]
    pub fn attribute(&self, name: &str, key: AttributeKey) -> Option<Attribute> {
        self.features.get(name).map(|feature| feature.attribute(key))
    }

    /// Reads one sub-field, falling back to `fallback` when the feature is not registered.
    #[must_use]
    pub fn attribute_or(&self, name: &str, fallback: Attribute) -> Attribute {
        self.attribute(name, fallback.key()).unwrap_or(fallback)
    }

    /// Overwrites one sub-field and stores the feature through [`Registry::set`].
    ///
    /// # Errors
    /// Returns [`FlagError::NotFound`] if the feature is not registered.
    pub fn set_attribute(&mut self, name: &str, attribute: impl Into<Attribute>) -> Result<&mut Self> {
        let mut feature = self.feature(name)?.clone();
        feature.apply(attribute.into());
        self.set(feature)
    }

    #[must_use]
    pub fn params(&self, name: &str) -> Option<&Params> {
        self.features.get(name).map(Feature::params)
    }

    #[must_use]
    pub fn param(&self, name: &str, key: &str) -> Option<&Value> {
        self.params(name).and_then(|params| params.get(key))
    }

    /// Merges `params` into the feature's params; new keys overwrite or extend.
    ///
    /// # Errors
    /// Returns [`FlagError::NotFound`] if the feature is not registered.
    pub fn merge_params(&mut self, name: &str, params: Params) -> Result<&mut Self> {
        let mut merged = self.feature(name)?.params().clone();
        merged.extend(params);
        self.set_attribute(name, merged)
    }

    #[must_use]
    pub fn processor(&self, name: &str) -> Option<&Processor> {
        self.features.get(name).map(Feature::processor)
    }

    /// # Errors
    /// Returns [`FlagError::NotFound`] if the feature is not registered.
    pub fn set_processor(&mut self, name: &str, processor: impl Into<Processor>) -> Result<&mut Self> {
        self.set_attribute(name, Attribute::Processor(processor.into()))
    }

    #[must_use]
    pub fn static_result(&self, name: &str) -> Option<bool> {
        self.features.get(name).and_then(Feature::static_result)
    }

    /// # Errors
    /// Returns [`FlagError::NotFound`] if the feature is not registered.
    pub fn set_static_result(&mut self, name: &str, static_result: Option<bool>) -> Result<&mut Self> {
        self.set_attribute(name, static_result)
    }

    // --- Evaluation ---

    /// Decides whether `name` is active for `context`.
    ///
    /// # Errors
    /// * [`FlagError::NotFound`] If the feature is unknown and strict mode is on.
    /// * [`FlagError::Validation`] If the processor returns a non-boolean value.
    pub fn is_active(&mut self, name: &str, context: &Context) -> Result<bool> {
        let Some(feature) = self.features.get(name) else {
            if self.strict {
                return Err(FlagError::not_found(name));
            }
            trace!(feature = name, "Unknown feature evaluated as inactive");
            return Ok(false);
        };

        if let Some(value) = feature.static_result() {
            return Ok(value);
        }

        if let Some(&value) = self.preserved.get(name) {
            trace!(feature = name, value, "Preserved result reused");
            return Ok(value);
        }

        let value = match feature.processor().call(context, feature.params()) {
            Value::Bool(value) => value,
            other => {
                return Err(FlagError::Validation {
                    message: "Processed result is not a boolean".into(),
                    context: Some(format!("feature '{name}' returned {other}").into()),
                });
            },
        };
        trace!(feature = name, value, "Processor evaluated");

        if self.preserve {
            self.preserved.insert(name.to_owned(), value);
        }

        Ok(value)
    }

    /// Negation of [`Registry::is_active`].
    ///
    /// # Errors
    /// See [`Registry::is_active`].
    pub fn is_inactive(&mut self, name: &str, context: &Context) -> Result<bool> {
        self.is_active(name, context).map(|active| !active)
    }

    /// Runs `callback` when the feature is active; `None` otherwise.
    ///
    /// # Errors
    /// See [`Registry::is_active`].
    pub fn when<T>(
        &mut self,
        name: &str,
        context: &Context,
        callback: impl FnOnce(&Context, &Params) -> T,
    ) -> Result<Option<T>> {
        let active = self.is_active(name, context)?;
        Ok(active.then(|| callback(context, &self.params_or_empty(name))))
    }

    /// Runs `callback` when the feature is active, `default` otherwise.
    ///
    /// # Errors
    /// See [`Registry::is_active`].
    pub fn when_else<T>(
        &mut self,
        name: &str,
        context: &Context,
        callback: impl FnOnce(&Context, &Params) -> T,
        default: impl FnOnce(&Context, &Params) -> T,
    ) -> Result<T> {
        let active = self.is_active(name, context)?;
        let params = self.params_or_empty(name);
        Ok(if active { callback(context, &params) } else { default(context, &params) })
    }

    /// Runs `callback` when the feature is inactive; `None` otherwise.
    ///
    /// # Errors
    /// See [`Registry::is_active`].
    pub fn unless<T>(
        &mut self,
        name: &str,
        context: &Context,
        callback: impl FnOnce(&Context, &Params) -> T,
    ) -> Result<Option<T>> {
        let active = self.is_active(name, context)?;
        Ok((!active).then(|| callback(context, &self.params_or_empty(name))))
    }

    /// Runs `callback` when the feature is inactive, `default` otherwise.
    ///
    /// # Errors
    /// See [`Registry::is_active`].
    pub fn unless_else<T>(
        &mut self,
        name: &str,
        context: &Context,
        callback: impl FnOnce(&Context, &Params) -> T,
        default: impl FnOnce(&Context, &Params) -> T,
    ) -> Result<T> {
        let active = self.is_active(name, context)?;
        let params = self.params_or_empty(name);
        Ok(if active { default(context, &params) } else { callback(context, &params) })
    }

    // Unknown features hand callbacks an empty map.
    fn params_or_empty(&self, name: &str) -> Params {
        self.params(name).cloned().unwrap_or_default()
    }

    // --- Removal ---

    /// Removes a feature and its memoized result. Unknown names are ignored.
    pub fn remove(&mut self, name: &str) -> Option<Feature> {
        self.preserved.remove(name);
        let removed = self.features.shift_remove(name);
        if removed.is_some() {
            debug!(feature = name, "Feature removed");
        }
        removed
    }

    /// Removes every feature and every memoized result.
    pub fn flush(&mut self) {
        debug!(features = self.features.len(), "Registry flushed");
        self.features.clear();
        self.preserved.clear();
    }

    // --- Results ---

    /// Decisions for every registered feature, evaluated with an empty context.
    ///
    /// Memoized results are reused; missing ones are computed through
    /// [`Registry::is_active`] and memoized when `preserve` is enabled.
    ///
    /// # Errors
    /// Returns [`FlagError::Validation`] if a processor returns a non-boolean value.
    pub fn results(&mut self) -> Result<ResultSnapshot> {
        let context = Context::new();
        let names: Vec<String> = self.features.keys().cloned().collect();

        let mut snapshot = ResultSnapshot::with_capacity(names.len());
        for name in names {
            let value = self.is_active(&name, &context)?;
            snapshot.insert(name, value);
        }
        Ok(snapshot)
    }

    /// Imports decisions straight into the memoization cache, bypassing processors.
    ///
    /// All names are checked before anything is written.
    ///
    /// # Errors
    /// Returns [`FlagError::NotFound`] if any name is not registered.
    pub fn import_results<I, K>(&mut self, results: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        let results: Vec<(String, bool)> = results.into_iter().map(|(k, v)| (k.into(), v)).collect();

        if let Some((name, _)) = results.iter().find(|(name, _)| !self.has(name)) {
            return Err(FlagError::NotFound {
                message: format!("Feature '{name}' is not found").into(),
                context: Some("importing results".into()),
            });
        }

        debug!(results = results.len(), "Results imported");
        self.preserved.extend(results);
        Ok(self)
    }

    /// The memoized result for `name`, if any.
    #[must_use]
    pub fn cached(&self, name: &str) -> Option<bool> {
        self.preserved.get(name).copied()
    }

    /// Drops the memoized result for `name` without touching its definition.
    pub fn forget(&mut self, name: &str) -> &mut Self {
        self.preserved.remove(name);
        self
    }

    // --- Settings ---

    pub const fn set_preserve(&mut self, preserve: bool) -> &mut Self {
        self.preserve = preserve;
        self
    }

    pub const fn set_strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub const fn preserves(&self) -> bool {
        self.preserve
    }

    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(FlagError::validation("Feature name cannot be empty"));
    }
    Ok(())
}
