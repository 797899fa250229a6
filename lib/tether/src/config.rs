//! Service configuration types.

/// Configuration shared by every method of a service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// `Content-Transfer-Encoding` for multipart parts built from maps.
    pub transfer_encoding: String,
    /// Whether a missing provider is reported when the service is built
    /// rather than on the first call that needs it.
    pub eager_validation: bool,
    /// Headers added to every request before any handler runs.
    pub default_headers: Vec<(String, String)>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            transfer_encoding: "binary".to_string(),
            eager_validation: true,
            default_headers: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    transfer_encoding: Option<String>,
    eager_validation: Option<bool>,
    default_headers: Vec<(String, String)>,
}

impl ServiceConfigBuilder {
    /// Set the multipart transfer encoding.
    #[must_use]
    pub fn transfer_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.transfer_encoding = Some(encoding.into());
        self
    }

    /// Set whether a missing provider fails the service build.
    #[must_use]
    pub const fn eager_validation(mut self, eager: bool) -> Self {
        self.eager_validation = Some(eager);
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ServiceConfig {
        let defaults = ServiceConfig::default();
        ServiceConfig {
            transfer_encoding: self.transfer_encoding.unwrap_or(defaults.transfer_encoding),
            eager_validation: self.eager_validation.unwrap_or(defaults.eager_validation),
            default_headers: self.default_headers,
        }
    }
}
