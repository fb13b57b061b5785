//! # Flagpole
//!
//! An embeddable feature-toggle registry. Features map a name to a [`Processor`]
//! (the decision function), opaque [`Params`] and an optional static result; the
//! [`Registry`] answers "is this feature active?" for a caller-supplied [`Context`].
//!
//! ## Evaluation & Memoization
//!
//! A static result always wins. Otherwise the first evaluation of a feature invokes
//! its processor and, while `preserve` is enabled (the default), every later call
//! returns the memoized value without re-invoking it, whatever the context.
//! [`Registry::remove`], [`Registry::set`] and [`Registry::flush`] invalidate it.
//!
//! ## Strict Mode
//!
//! Unknown features evaluate to `false`. With strict mode on they fail with
//! [`FlagError::NotFound`] instead.
//!
//! ## Configuration
//!
//! [`Registry::from_config`] builds a registry from a [`RegistryConfig`] document.
//! Processors are referenced by name and resolved through a [`ProcessorCatalog`].
//! The `loader` feature adds [`load_config`] for file + environment sources.
//!
//! ## Example
//!
//! ```rust
//! use flagpole::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), FlagError> {
//! let mut registry = Registry::new();
//! registry.create(
//!     "dark-mode",
//!     Processor::new(|ctx, _| ctx.get("theme") == Some(&json!("dark"))),
//! )?;
//!
//! let mut ctx = Context::new();
//! ctx.insert("theme".to_owned(), json!("dark"));
//!
//! let label = registry.when_else("dark-mode", &ctx, |_, _| "night", |_, _| "day")?;
//! assert_eq!(label, "night");
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod feature;
#[cfg(feature = "loader")]
mod loader;
mod processor;
mod registry;

pub use config::{FeatureConfig, RegistryConfig};
pub use error::{FlagError, FlagErrorExt, Result};
pub use feature::{Attribute, AttributeKey, Context, Feature, Params};
#[cfg(feature = "loader")]
pub use loader::load_config;
pub use processor::{Processor, ProcessorCatalog};
pub use registry::{Registry, ResultSnapshot};

pub mod prelude {
    pub use crate::config::{FeatureConfig, RegistryConfig};
    pub use crate::error::{FlagError, FlagErrorExt};
    pub use crate::feature::{Attribute, AttributeKey, Context, Feature, Params};
    pub use crate::processor::{Processor, ProcessorCatalog};
    pub use crate::registry::{Registry, ResultSnapshot};
}
