//! Normalized service metadata.
//!
//! Discovery of the metadata (attributes, macros, reflection) happens
//! elsewhere; this crate receives the already normalized record.

/// One service-level declaration, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassAnnotation {
    /// Headers declared as `"Name: value_template"` literals.
    ParamHeaders(Vec<String>),
    /// Query parameters declared as `"name=value_template"` literals.
    ParamQueries {
        /// The literals, in declaration order.
        values: Vec<String>,
        /// Whether the resolved values are already percent-encoded.
        encoded: bool,
    },
    /// Base URL template replacing the service base URL on every call.
    ParamUrl(String),
    /// Any other declaration; ignored by the compiler.
    Other(String),
}

impl ClassAnnotation {
    /// Header declarations.
    #[must_use]
    pub fn headers<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ParamHeaders(values.into_iter().map(Into::into).collect())
    }

    /// Query declarations whose values are percent-encoded on assembly.
    #[must_use]
    pub fn queries<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ParamQueries {
            values: values.into_iter().map(Into::into).collect(),
            encoded: false,
        }
    }

    /// Base URL template declaration.
    #[must_use]
    pub fn url(template: impl Into<String>) -> Self {
        Self::ParamUrl(template.into())
    }
}

/// The normalized metadata of one service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceMetadata {
    name: String,
    annotations: Vec<ClassAnnotation>,
}

impl ServiceMetadata {
    /// Metadata for the service named `name`, without declarations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
        }
    }

    /// Append a declaration.
    #[must_use]
    pub fn with(mut self, annotation: ClassAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Service type name, used in configuration errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declarations in declaration order.
    #[must_use]
    pub fn annotations(&self) -> &[ClassAnnotation] {
        &self.annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_in_declaration_order() {
        let metadata = ServiceMetadata::new("UserApi")
            .with(ClassAnnotation::url("{base}"))
            .with(ClassAnnotation::headers(["Accept: text/plain"]))
            .with(ClassAnnotation::Other("Deprecated".to_string()));

        assert_eq!(metadata.name(), "UserApi");
        assert_eq!(
            metadata.annotations(),
            &[
                ClassAnnotation::ParamUrl("{base}".to_string()),
                ClassAnnotation::ParamHeaders(vec!["Accept: text/plain".to_string()]),
                ClassAnnotation::Other("Deprecated".to_string()),
            ]
        );
    }
}
