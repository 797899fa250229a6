//! Class-level metadata compiler.
//!
//! Turns the service-level declarations into an ordered list of
//! [`ClassHandler`]s, one per declared literal, in declaration order then
//! literal order. Compilation is pure and may be repeated.

use tether_core::handler::ParameterHandler;
use tether_core::templated::{ParamHeader, ParamQuery, ParamUrl};
use tether_core::{Error, RequestBuilder, Result, ToStringConverter};
use tracing::{debug, trace};

use crate::metadata::{ClassAnnotation, ServiceMetadata};
use crate::provider::ParamProvider;

/// A compiled class-level handler.
#[derive(Debug, Clone)]
pub enum ClassHandler {
    /// Templated header, fed by [`ParamProvider::header_param`].
    Header(ParamHeader<ToStringConverter>),
    /// Templated query parameter, fed by [`ParamProvider::query_param`].
    Query(ParamQuery<ToStringConverter>),
    /// Templated base URL, fed by [`ParamProvider::url_param`].
    Url(ParamUrl),
}

impl ClassHandler {
    /// Placeholder key resolved through the provider, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Header(handler) => handler.key(),
            Self::Query(handler) => handler.key(),
            Self::Url(handler) => handler.key(),
        }
    }

    /// Resolve the value for this handler's key from `provider`.
    ///
    /// A handler without a key receives no value.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error when the handler has a key and no
    /// provider is available.
    pub fn resolve(&self, provider: Option<&dyn ParamProvider>) -> Result<Option<String>> {
        let Some(key) = self.key() else {
            return Ok(None);
        };
        let provider = provider.ok_or_else(missing_provider)?;

        Ok(match self {
            Self::Header(_) => provider.header_param(key),
            Self::Query(_) => provider.query_param(key),
            Self::Url(_) => provider.url_param(key),
        })
    }

    /// Resolve this handler's value and apply it to `builder`.
    ///
    /// # Errors
    ///
    /// Fails when the value cannot be resolved or the underlying handler
    /// rejects it.
    pub fn apply(
        &self,
        builder: &mut RequestBuilder,
        provider: Option<&dyn ParamProvider>,
    ) -> Result<()> {
        let value = self.resolve(provider)?;
        trace!(handler = ?self, value = ?value, "applying class-level handler");

        let value = value.as_deref();
        match self {
            Self::Header(handler) => handler.apply(builder, value),
            Self::Query(handler) => handler.apply(builder, value),
            Self::Url(handler) => handler.apply(builder, value),
        }
    }
}

/// The error raised when templated class-level handlers have no provider.
#[must_use]
pub(crate) fn missing_provider() -> Error {
    Error::configuration("Use type parameters must be set ParamProvider")
}

/// Compile the class-level handlers of `metadata`.
///
/// # Errors
///
/// Fails with a configuration error naming the service when a declaration
/// is empty or a literal is malformed.
pub fn compile_class_level_handlers(metadata: &ServiceMetadata) -> Result<Vec<ClassHandler>> {
    let service = metadata.name();
    let in_service = |err: Error| match err {
        Error::Configuration(message) => Error::configuration(format!("{service}: {message}")),
        other => other,
    };

    let mut handlers = Vec::new();
    for annotation in metadata.annotations() {
        match annotation {
            ClassAnnotation::ParamHeaders(values) => {
                if values.is_empty() {
                    return Err(in_service(Error::configuration(
                        "@ParamHeaders annotation is empty.",
                    )));
                }
                for literal in values {
                    let handler = ParamHeader::new(literal, ToStringConverter).map_err(in_service)?;
                    handlers.push(ClassHandler::Header(handler));
                }
            }
            ClassAnnotation::ParamQueries { values, encoded } => {
                if values.is_empty() {
                    return Err(in_service(Error::configuration(
                        "@ParamQuerys annotation is empty.",
                    )));
                }
                for literal in values {
                    let handler =
                        ParamQuery::new(literal, ToStringConverter, *encoded).map_err(in_service)?;
                    handlers.push(ClassHandler::Query(handler));
                }
            }
            ClassAnnotation::ParamUrl(template) => {
                let handler = ParamUrl::new(template).map_err(in_service)?;
                handlers.push(ClassHandler::Url(handler));
            }
            ClassAnnotation::Other(name) => {
                trace!(service, annotation = %name, "ignoring annotation");
            }
        }
    }

    debug!(
        service,
        handlers = handlers.len(),
        "compiled class-level handlers"
    );
    Ok(handlers)
}
