//! Error types for tether.

use derive_more::{Display, Error, From};

/// Boxed error returned by [`Converter`](crate::Converter) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A converter failure carried as the source of [`Error::Conversion`].
#[derive(Debug, Display)]
#[display("{_0}")]
pub struct ConverterFailure(BoxError);

impl ConverterFailure {
    /// The error reported by the converter.
    #[must_use]
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

impl std::error::Error for ConverterFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for tether operations.
///
/// Errors fall into two phases:
/// - compile time: [`Error::Configuration`], raised while handlers are built
///   from declared metadata, never retried;
/// - call time: [`Error::Validation`], [`Error::Conversion`] and
///   [`Error::InvalidRequest`], raised while a single request is assembled.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Malformed or inconsistent declared metadata.
    #[display("configuration error: {_0}")]
    #[from(skip)]
    Configuration(#[error(not(source))] String),

    /// A call-time value violated the handler's null or shape policy.
    #[display("{_0}")]
    #[from(skip)]
    Validation(#[error(not(source))] String),

    /// A converter failed to turn a value into a string or a body.
    #[display("{context}: {source}")]
    #[from(skip)]
    Conversion {
        /// What was being converted.
        context: String,
        /// The converter failure.
        source: ConverterFailure,
    },

    /// The request under construction cannot be materialized.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// Form serialization error.
    #[display("form serialization error: {_0}")]
    #[from]
    FormSerialization(serde_html_form::ser::Error),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap a converter failure.
    #[must_use]
    pub fn conversion(context: impl Into<String>, source: BoxError) -> Self {
        Self::Conversion {
            context: context.into(),
            source: ConverterFailure(source),
        }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns `true` if this error was raised while compiling metadata.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns `true` if this is a call-time validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` if a converter failed.
    #[must_use]
    pub const fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }
}
