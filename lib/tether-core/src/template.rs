//! Single-placeholder templates.
//!
//! A template is a literal string with zero or exactly one distinct
//! `{placeholder}`, resolved at call time. Two extraction styles exist:
//!
//! - [`PlaceholderStyle::Path`]: `{identifier}` where the identifier matches
//!   `[a-zA-Z][a-zA-Z0-9_-]*`, as in relative URLs and query templates;
//! - [`PlaceholderStyle::Header`]: any non-empty run without braces, so a
//!   composite value such as `{deviceid=<id>;phone=<phone>}` is one
//!   placeholder.
//!
//! # Example
//!
//! ```
//! use tether_core::{PlaceholderStyle, Template};
//!
//! let template = Template::compile("v={version}", PlaceholderStyle::Path).unwrap();
//! assert_eq!(template.key(), Some("version"));
//! assert_eq!(template.substitute("1.2"), "v=1.2");
//! ```

use derive_more::{Display, Error};

/// How placeholders are recognized in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderStyle {
    /// `{identifier}` placeholders.
    Path,
    /// `{anything-but-braces}` placeholders.
    Header,
}

impl PlaceholderStyle {
    fn accepts(self, candidate: &str) -> bool {
        match self {
            Self::Path => is_identifier(candidate),
            Self::Header => !candidate.is_empty() && !candidate.contains('{'),
        }
    }
}

/// A template declared more than one distinct placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("expected at most one placeholder, found {}", placeholders.join(", "))]
pub struct TooManyPlaceholders {
    /// The distinct placeholders, in first-occurrence order.
    #[error(not(source))]
    pub placeholders: Vec<String>,
}

/// A compiled template with at most one substitution key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Template {
    literal: String,
    key: Option<String>,
}

impl Template {
    /// Compile `literal`, validating placeholder cardinality.
    ///
    /// # Errors
    ///
    /// Returns [`TooManyPlaceholders`] when more than one distinct placeholder
    /// is present.
    pub fn compile(
        literal: impl Into<String>,
        style: PlaceholderStyle,
    ) -> Result<Self, TooManyPlaceholders> {
        let literal = literal.into();
        let mut placeholders = extract_placeholders(&literal, style);
        if placeholders.len() > 1 {
            return Err(TooManyPlaceholders { placeholders });
        }
        let key = placeholders.pop();
        Ok(Self { literal, key })
    }

    /// The literal template text.
    #[must_use]
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// The substitution key, if the template has a placeholder.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns `true` if the template has no placeholder.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.key.is_none()
    }

    /// Replace every occurrence of the placeholder with `value`.
    ///
    /// A static template is returned unchanged.
    #[must_use]
    pub fn substitute(&self, value: &str) -> String {
        match &self.key {
            Some(key) => self.literal.replace(&format!("{{{key}}}"), value),
            None => self.literal.clone(),
        }
    }
}

/// Distinct placeholders of `template`, in first-occurrence order.
#[must_use]
pub fn extract_placeholders(template: &str, style: PlaceholderStyle) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = rest.get(open + 1..).unwrap_or_default();
        match after.find('}') {
            Some(close) => {
                let candidate = after.get(..close).unwrap_or_default();
                if style.accepts(candidate) {
                    if !found.iter().any(|name| name == candidate) {
                        found.push(candidate.to_string());
                    }
                    rest = after.get(close + 1..).unwrap_or_default();
                } else {
                    rest = after;
                }
            }
            None => break,
        }
    }

    found
}

/// Path-style placeholders of `template`.
#[must_use]
pub fn path_placeholders(template: &str) -> Vec<String> {
    extract_placeholders(template, PlaceholderStyle::Path)
}

/// Header-style placeholders of `template`.
#[must_use]
pub fn header_placeholders(template: &str) -> Vec<String> {
    extract_placeholders(template, PlaceholderStyle::Header)
}

fn is_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
