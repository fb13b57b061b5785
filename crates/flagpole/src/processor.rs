//! # Processors
//!
//! A [`Processor`] is the decision function of a feature: it receives the caller's
//! [`Context`] and the feature's [`Params`] and returns a JSON value. The registry
//! accepts only boolean results; anything else is reported as a validation error at
//! evaluation time.
//!
//! Configuration sources cannot carry code, so they reference processors by name.
//! Those names are resolved through a [`ProcessorCatalog`] supplied by the host.

use crate::feature::{Context, Params};
use fxhash::FxHashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type DynProcessor = dyn Fn(&Context, &Params) -> Value + Send + Sync;

#[derive(Clone)]
enum Kind {
    Constant(bool),
    Dynamic(Arc<DynProcessor>),
}

/// A cheaply clonable decision function.
///
/// # Example
/// ```rust
/// use flagpole::{Context, Params, Processor};
///
/// let on = Processor::from(true);
/// assert_eq!(on.call(&Context::new(), &Params::new()), true);
///
/// let beta = Processor::new(|ctx, _| ctx.get("beta").cloned().unwrap_or_default());
/// assert!(beta.as_constant().is_none());
/// ```
#[derive(Clone)]
pub struct Processor {
    kind: Kind,
}

impl Processor {
    /// Wraps any callable with the `(context, params)` signature.
    ///
    /// The return type only has to convert into a JSON value, so a closure returning
    /// `bool`, `Value` or `Option<bool>` is accepted as is.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Context, &Params) -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        Self { kind: Kind::Dynamic(Arc::new(move |ctx: &Context, params: &Params| f(ctx, params).into())) }
    }

    /// A processor that always returns `value`.
    #[must_use]
    pub const fn constant(value: bool) -> Self {
        Self { kind: Kind::Constant(value) }
    }

    /// Returns the fixed value when this processor was built by [`Processor::constant`].
    #[must_use]
    pub const fn as_constant(&self) -> Option<bool> {
        match self.kind {
            Kind::Constant(value) => Some(value),
            Kind::Dynamic(_) => None,
        }
    }

    /// Invokes the processor.
    #[must_use]
    pub fn call(&self, context: &Context, params: &Params) -> Value {
        match &self.kind {
            Kind::Constant(value) => Value::Bool(*value),
            Kind::Dynamic(f) => f(context, params),
        }
    }
}

/// An omitted processor means "off".
impl Default for Processor {
    fn default() -> Self {
        Self::constant(false)
    }
}

impl From<bool> for Processor {
    fn from(value: bool) -> Self {
        Self::constant(value)
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Constant(value) => f.debug_tuple("Processor::Constant").field(value).finish(),
            Kind::Dynamic(_) => f.write_str("Processor::Dynamic(..)"),
        }
    }
}

/// Named processors available to configuration-driven construction.
#[derive(Debug, Clone, Default)]
pub struct ProcessorCatalog {
    entries: FxHashMap<String, Processor>,
}

impl ProcessorCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `processor` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, processor: impl Into<Processor>) -> &mut Self {
        self.entries.insert(name.into(), processor.into());
        self
    }

    /// By-value variant of [`ProcessorCatalog::register`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, processor: impl Into<Processor>) -> Self {
        self.register(name, processor);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Processor> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
