use crate::config::RegistryConfig;
use crate::error::{FlagErrorExt, Result};
use crate::processor::ProcessorCatalog;
use crate::registry::Registry;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Prefix of environment variables overriding file settings.
const ENV_PREFIX: &str = "FLAGPOLE";

/// Loads a configuration document, layering environment overrides over a file.
///
/// 1. **Base File**: the format is picked from the extension (TOML, JSON, YAML, ...).
/// 2. **Environment Overrides**: variables prefixed with `FLAGPOLE__`; nested keys use
///    double underscores (e.g. `FLAGPOLE__STRICT=true` maps to `strict`).
///
/// # Errors
/// Returns [`FlagError::Config`](crate::FlagError::Config) if the file is missing or
/// malformed, or if the merged document does not match `T`.
///
/// # Example
/// ```rust,no_run
/// use flagpole::{RegistryConfig, load_config};
///
/// let config: RegistryConfig = load_config("flagpole.toml").unwrap_or_default();
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let builder = Config::builder().add_source(File::from(path).required(true)).add_source(
        Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__").try_parsing(true),
    );

    debug!(path = %path.display(), "Loading feature config");

    builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}

impl Registry {
    /// Loads a [`RegistryConfig`] from `path` and builds the registry from it.
    ///
    /// # Errors
    /// See [`load_config`] and [`Registry::from_config`].
    pub fn load(path: impl AsRef<Path>, catalog: &ProcessorCatalog) -> Result<Self> {
        let config: RegistryConfig = load_config(path)?;
        Self::from_config(config, catalog)
    }
}
