//! Templated handlers declared once for a whole service.
//!
//! These handlers are compiled from literal strings carrying at most one
//! placeholder, and resolve that placeholder at call time:
//!
//! - [`ParamQuery`] from `"name=value_template"`;
//! - [`ParamHeader`] from `"Name: value_template"`;
//! - [`ParamUrl`] from a base URL template.
//!
//! # Example
//!
//! ```
//! use tether_core::handler::ParameterHandler;
//! use tether_core::templated::ParamHeader;
//! use tether_core::{Method, RequestBuilder, ToStringConverter};
//!
//! let handler = ParamHeader::new("X-Client: {client}", ToStringConverter).unwrap();
//! assert_eq!(handler.key(), Some("client"));
//!
//! let mut builder = RequestBuilder::new(Method::Get, "http://example.com/".parse().unwrap());
//! handler.apply(&mut builder, Some("a=1;b=<2>")).unwrap();
//! assert_eq!(builder.header("X-Client"), Some("a=1;b=%3C2%3E"));
//! ```

use std::fmt::Display;

use tracing::{debug, warn};

use crate::handler::ParameterHandler;
use crate::template::{PlaceholderStyle, Template, TooManyPlaceholders};
use crate::{Converter, Error, RequestBuilder, Result};

/// A parsed `"name=value_template"` literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLiteral {
    /// Query parameter name.
    pub name: String,
    /// Value template.
    pub template: String,
}

/// Parse a `"name=value_template"` literal.
///
/// The literal is split on every `=`, trailing empty segments are dropped,
/// and exactly two segments must remain. A value containing `=` (such as
/// `"q=a={x}"`) is therefore rejected.
///
/// # Errors
///
/// Returns a configuration error naming the literal.
pub fn parse_query_literal(literal: &str) -> Result<QueryLiteral> {
    let mut segments: Vec<&str> = literal.split('=').collect();
    while segments.last().is_some_and(|segment| segment.is_empty()) {
        segments.pop();
    }

    match segments.as_slice() {
        [name, template] => Ok(QueryLiteral {
            name: (*name).to_string(),
            template: (*template).to_string(),
        }),
        _ => Err(Error::configuration(format!(
            "@ParamQuerys Configuration errors,at {literal}"
        ))),
    }
}

/// A parsed `"Name: value_template"` literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLiteral {
    /// Header name.
    pub name: String,
    /// Value template.
    pub template: String,
}

/// Parse a `"Name: value_template"` literal, splitting on the first `:`.
///
/// Name and template are trimmed.
///
/// # Errors
///
/// Returns a configuration error when the literal has no `:` or an empty
/// name.
pub fn parse_header_literal(literal: &str) -> Result<HeaderLiteral> {
    let (name, template) = literal
        .split_once(':')
        .map(|(name, template)| (name.trim(), template.trim()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| {
            Error::configuration(format!("@ParamHeader Configuration errors,at {literal}"))
        })?;

    Ok(HeaderLiteral {
        name: name.to_string(),
        template: template.to_string(),
    })
}

fn too_many(kind: &str, name: &str, err: &TooManyPlaceholders) -> Error {
    debug!(kind, name, placeholders = ?err.placeholders, "too many placeholders");
    Error::configuration(format!(
        "@{kind} Configuration errors,at {name}, You can only have a maximum of one parameter"
    ))
}

/// Percent-encode a composite header value.
///
/// - a blank value yields `None`;
/// - a value without `;` is form-urlencoded as a whole;
/// - otherwise each `;`-separated `key=value` sub-pair is encoded key and
///   value independently; sub-pairs without `=`, ending with `=`, or with a
///   blank side are dropped. `None` when no sub-pair survives.
///
/// # Example
///
/// ```
/// use tether_core::templated::encode_composite;
///
/// assert_eq!(encode_composite("a b").as_deref(), Some("a+b"));
/// assert_eq!(encode_composite("k=<v>;bad;x=").as_deref(), Some("k=%3Cv%3E"));
/// assert_eq!(encode_composite("bad;x="), None);
/// ```
#[must_use]
pub fn encode_composite(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    if !value.contains(';') {
        return Some(form_encode(value));
    }

    let pairs: Vec<String> = value
        .split(';')
        .filter(|pair| !pair.ends_with('='))
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, val)| !key.trim().is_empty() && !val.trim().is_empty())
        .map(|(key, val)| format!("{}={}", form_encode(key), form_encode(val)))
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join(";"))
    }
}

fn form_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

// ============================================================================
// ParamQuery
// ============================================================================

/// Appends a query parameter from a `"name=value_template"` literal.
#[derive(Debug, Clone)]
pub struct ParamQuery<C> {
    name: String,
    template: Template,
    converter: C,
    encoded: bool,
}

impl<C> ParamQuery<C> {
    /// Compile a query literal.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed literal or more than
    /// one placeholder.
    pub fn new(literal: &str, converter: C, encoded: bool) -> Result<Self> {
        let QueryLiteral { name, template } = parse_query_literal(literal)?;
        let template = Template::compile(template, PlaceholderStyle::Path)
            .map_err(|err| too_many("ParamQuerys", &name, &err))?;

        Ok(Self {
            name,
            template,
            converter,
            encoded,
        })
    }

    /// Query parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Substitution key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.template.key()
    }

    /// Compiled value template.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }
}

impl<T: ?Sized, C: Converter<T, String>> ParameterHandler<T> for ParamQuery<C> {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        let resolved = if self.template.is_static() {
            self.template.literal().to_string()
        } else {
            let Some(value) = value else {
                return Ok(());
            };
            let converted = self.converter.convert(value).map_err(|source| {
                Error::conversion(format!("Unable to convert \"{}\" value", self.name), source)
            })?;
            self.template.substitute(&converted)
        };

        if !resolved.is_empty() {
            builder.add_query_param(&self.name, &resolved, self.encoded);
        }
        Ok(())
    }
}

// ============================================================================
// ParamHeader
// ============================================================================

/// Appends a header from a `"Name: value_template"` literal.
///
/// The converted call-time value goes through [`encode_composite`] before
/// substitution.
#[derive(Debug, Clone)]
pub struct ParamHeader<C> {
    name: String,
    template: Template,
    converter: C,
}

impl<C> ParamHeader<C> {
    /// Compile a header literal.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed literal or more than
    /// one placeholder.
    pub fn new(literal: &str, converter: C) -> Result<Self> {
        let HeaderLiteral { name, template } = parse_header_literal(literal)?;
        let template = Template::compile(template, PlaceholderStyle::Header)
            .map_err(|err| too_many("ParamHeader", &name, &err))?;

        Ok(Self {
            name,
            template,
            converter,
        })
    }

    /// Header name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Substitution key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.template.key()
    }

    /// Compiled value template.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }
}

impl<T: ?Sized, C: Converter<T, String>> ParameterHandler<T> for ParamHeader<C> {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        let resolved = if self.template.is_static() {
            self.template.literal().to_string()
        } else {
            let Some(value) = value else {
                return Ok(());
            };
            let converted = self.converter.convert(value).map_err(|source| {
                Error::conversion(format!("Unable to convert \"{}\" value", self.name), source)
            })?;
            let Some(encoded) = encode_composite(&converted) else {
                warn!(header = %self.name, "no encodable value, header suppressed");
                return Ok(());
            };
            self.template.substitute(&encoded)
        };

        if !resolved.is_empty() {
            builder.add_header(&self.name, &resolved);
        }
        Ok(())
    }
}

// ============================================================================
// ParamUrl
// ============================================================================

/// Replaces the base URL from a URL template.
///
/// The call-time value is inlined through [`Display`], without conversion or
/// encoding; a null value becomes the empty string.
#[derive(Debug, Clone)]
pub struct ParamUrl {
    template: Template,
}

impl ParamUrl {
    /// Compile a URL template.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for more than one placeholder.
    pub fn new(url: &str) -> Result<Self> {
        let template = Template::compile(url, PlaceholderStyle::Path)
            .map_err(|err| too_many("ParamUrl", url, &err))?;
        Ok(Self { template })
    }

    /// Substitution key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.template.key()
    }

    /// Compiled URL template.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }
}

impl<T: Display + ?Sized> ParameterHandler<T> for ParamUrl {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        let value = value.map(ToString::to_string).unwrap_or_default();
        builder.set_service_url(self.template.substitute(&value));
        Ok(())
    }
}
