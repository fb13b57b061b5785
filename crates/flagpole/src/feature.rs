use crate::processor::Processor;
use serde_json::{Map, Value};

/// Caller-supplied runtime data passed to processors at evaluation time.
pub type Context = Map<String, Value>;

/// Ordered, opaque payload attached to a feature.
pub type Params = Map<String, Value>;

/// A named toggle: processor, parameters and an optional fixed result.
///
/// # Example
/// ```rust
/// use flagpole::Feature;
///
/// let feature = Feature::new("checkout-v2", true)
///     .with_param("audience", "staff")
///     .with_static_result(Some(false));
///
/// assert_eq!(feature.name(), "checkout-v2");
/// assert_eq!(feature.static_result(), Some(false));
/// ```
#[derive(Debug, Clone)]
pub struct Feature {
    name: String,
    processor: Processor,
    params: Params,
    static_result: Option<bool>,
}

impl Feature {
    /// Creates a feature with empty params and no static result.
    pub fn new(name: impl Into<String>, processor: impl Into<Processor>) -> Self {
        Self {
            name: name.into(),
            processor: processor.into(),
            params: Params::new(),
            static_result: None,
        }
    }

    /// Replaces the whole params map.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Inserts a single param, keeping insertion order.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Hard-wires the feature on or off; `None` restores dynamic evaluation.
    #[must_use]
    pub const fn with_static_result(mut self, static_result: Option<bool>) -> Self {
        self.static_result = static_result;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn processor(&self) -> &Processor {
        &self.processor
    }

    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    #[must_use]
    pub const fn static_result(&self) -> Option<bool> {
        self.static_result
    }

    pub(crate) fn apply(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::Processor(processor) => self.processor = processor,
            Attribute::Params(params) => self.params = params,
            Attribute::StaticResult(static_result) => self.static_result = static_result,
        }
    }

    pub(crate) fn attribute(&self, key: AttributeKey) -> Attribute {
        match key {
            AttributeKey::Processor => Attribute::Processor(self.processor.clone()),
            AttributeKey::Params => Attribute::Params(self.params.clone()),
            AttributeKey::StaticResult => Attribute::StaticResult(self.static_result),
        }
    }
}

/// Selects one mutable sub-field of a [`Feature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    Processor,
    Params,
    StaticResult,
}

/// The value of one sub-field of a [`Feature`].
#[derive(Debug, Clone)]
pub enum Attribute {
    Processor(Processor),
    Params(Params),
    StaticResult(Option<bool>),
}

impl Attribute {
    #[must_use]
    pub const fn key(&self) -> AttributeKey {
        match self {
            Self::Processor(_) => AttributeKey::Processor,
            Self::Params(_) => AttributeKey::Params,
            Self::StaticResult(_) => AttributeKey::StaticResult,
        }
    }
}

impl From<Processor> for Attribute {
    fn from(processor: Processor) -> Self {
        Self::Processor(processor)
    }
}

impl From<Params> for Attribute {
    fn from(params: Params) -> Self {
        Self::Params(params)
    }
}

impl From<Option<bool>> for Attribute {
    fn from(static_result: Option<bool>) -> Self {
        Self::StaticResult(static_result)
    }
}
