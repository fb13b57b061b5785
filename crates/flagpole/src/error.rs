//! # Registry Errors
//!
//! This module defines the [`FlagError`] enum and [`Result`] type used throughout
//! the crate for reporting malformed feature definitions, name conflicts and
//! lookups of unregistered features.

use std::borrow::Cow;

/// A specialized [`Result`] for registry operations.
pub type Result<T, E = FlagError> = std::result::Result<T, E>;

/// Errors raised synchronously by the [`Registry`](crate::Registry).
///
/// Every failure is a programming or configuration error; nothing here is transient.
#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    /// Malformed feature definition or a processor returning a non-boolean value.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A feature with the same name is already registered.
    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The requested feature is not registered.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Failure while reading or deserializing a configuration source.
    #[cfg(feature = "loader")]
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

impl FlagError {
    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub(crate) fn conflict(name: &str) -> Self {
        Self::Conflict { message: format!("Feature '{name}' already exists").into(), context: None }
    }

    pub(crate) fn not_found(name: &str) -> Self {
        Self::NotFound { message: format!("Feature '{name}' is not found").into(), context: None }
    }
}

/// Attaches human-readable context to a failed registry operation.
pub trait FlagErrorExt<T> {
    /// Records `context` on the error, replacing any previous context.
    ///
    /// # Errors
    /// Returns the original error with the context attached.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T>;
}

impl<T> FlagErrorExt<T> for Result<T> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                FlagError::Validation { context: c, .. }
                | FlagError::Conflict { context: c, .. }
                | FlagError::NotFound { context: c, .. } => *c = Some(context.into()),
                #[cfg(feature = "loader")]
                FlagError::Config { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

#[cfg(feature = "loader")]
impl From<config::ConfigError> for FlagError {
    #[inline]
    fn from(source: config::ConfigError) -> Self {
        Self::Config { source, context: None }
    }
}

#[cfg(feature = "loader")]
impl<T> FlagErrorExt<T> for std::result::Result<T, config::ConfigError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T> {
        self.map_err(|source| FlagError::Config { source, context: Some(context.into()) })
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
