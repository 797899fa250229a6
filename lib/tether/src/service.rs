//! Service facade: class-level handlers, method cache and request assembly.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tether_core::{Error, Request, RequestBuilder, Result};
use tracing::debug;
use url::Url;

use crate::cache::MethodCache;
use crate::compiler::{ClassHandler, compile_class_level_handlers, missing_provider};
use crate::config::ServiceConfig;
use crate::metadata::ServiceMetadata;
use crate::method::{CompiledMethod, MethodDefinition};
use crate::provider::ParamProvider;

struct ServiceInner {
    name: String,
    base_url: Url,
    provider: Option<Arc<dyn ParamProvider>>,
    config: ServiceConfig,
    class_handlers: Arc<[ClassHandler]>,
    methods: MethodCache,
}

/// A compiled service, cheap to clone and safe to share across threads.
///
/// # Example
///
/// ```
/// use tether::handler::Query;
/// use tether::{
///     ClassAnnotation, Method, MethodDefinition, Service, ServiceMetadata, StaticParams,
///     ToStringConverter,
/// };
///
/// let metadata = ServiceMetadata::new("SearchApi")
///     .with(ClassAnnotation::queries(["key={apiKey}"]));
///
/// let service = Service::builder(metadata)
///     .base_url("https://api.example.com/")
///     .provider(StaticParams::new().query("apiKey", "secret"))
///     .build()
///     .unwrap();
///
/// service
///     .method("search", |_| {
///         Ok(MethodDefinition::new(Method::Get, "search")
///             .param::<String, _>(Query::new("q", ToStringConverter, false)))
///     })
///     .unwrap();
///
/// let q = "rust".to_string();
/// let request = service.request("search", &[Some(&q)]).unwrap();
/// assert_eq!(
///     request.url().as_str(),
///     "https://api.example.com/search?key=secret&q=rust"
/// );
/// ```
#[derive(Clone)]
pub struct Service {
    inner: Arc<ServiceInner>,
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.inner.name)
            .field("base_url", &self.inner.base_url.as_str())
            .field("has_provider", &self.inner.provider.is_some())
            .field("class_handlers", &self.inner.class_handlers.len())
            .field("methods", &self.inner.methods.len())
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Start building a service from its metadata.
    #[must_use]
    pub fn builder(metadata: ServiceMetadata) -> ServiceBuilder {
        ServiceBuilder::new(metadata)
    }

    /// Service type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Base URL used when no class-level URL template applies.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    /// Compiled class-level handlers, in declaration order.
    #[must_use]
    pub fn class_handlers(&self) -> &[ClassHandler] {
        &self.inner.class_handlers
    }

    /// Register the method `name`, compiling `define` once.
    ///
    /// Later registrations under the same name return the cached method
    /// without calling `define`.
    ///
    /// # Errors
    ///
    /// Returns the error of `define` or of the method compilation.
    pub fn method<F>(&self, name: &str, define: F) -> Result<Arc<CompiledMethod>>
    where
        F: FnOnce(&ServiceConfig) -> Result<MethodDefinition>,
    {
        self.inner
            .methods
            .get_or_compile(name, || define(&self.inner.config)?.compile(name))
    }

    /// Assemble the request for one call of the method `name`.
    ///
    /// Default headers and the method's static headers come first, then the
    /// class-level handlers fed by the provider, then `args` bound
    /// positionally to the method-level handlers.
    ///
    /// # Errors
    ///
    /// Fails when the method is unknown, when a handler rejects its value,
    /// or when the request cannot be materialized.
    pub fn request(&self, name: &str, args: &[Option<&dyn Any>]) -> Result<Request> {
        let method = self.inner.methods.get(name).ok_or_else(|| {
            Error::invalid_request(format!(
                "unknown method \"{name}\" on service {}",
                self.inner.name
            ))
        })?;

        let mut builder = RequestBuilder::new(method.method(), self.inner.base_url.clone());
        for (header, value) in &self.inner.config.default_headers {
            builder.add_header(header, value);
        }
        method.prepare(&mut builder);

        let provider = self.inner.provider.as_deref();
        for handler in self.inner.class_handlers.iter() {
            handler.apply(&mut builder, provider)?;
        }
        method.apply(&mut builder, args)?;

        builder.build()
    }
}

/// Builder for [`Service`].
pub struct ServiceBuilder {
    metadata: ServiceMetadata,
    base_url: Option<String>,
    provider: Option<Arc<dyn ParamProvider>>,
    config: ServiceConfig,
}

impl fmt::Debug for ServiceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBuilder")
            .field("metadata", &self.metadata)
            .field("base_url", &self.base_url)
            .field("has_provider", &self.provider.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl ServiceBuilder {
    fn new(metadata: ServiceMetadata) -> Self {
        Self {
            metadata,
            base_url: None,
            provider: None,
            config: ServiceConfig::default(),
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the provider feeding templated class-level handlers.
    #[must_use]
    pub fn provider(mut self, provider: impl ParamProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Set a shared provider.
    #[must_use]
    pub fn shared_provider(mut self, provider: Arc<dyn ParamProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Compile the class-level handlers and build the service.
    ///
    /// # Errors
    ///
    /// Fails when the base URL is missing or invalid, when class-level
    /// metadata is malformed, or, with eager validation, when a templated
    /// class-level handler has no provider.
    pub fn build(self) -> Result<Service> {
        let name = self.metadata.name().to_string();
        let base_url = self
            .base_url
            .ok_or_else(|| Error::configuration(format!("{name}: base URL is required")))?;
        let base_url = Url::parse(&base_url)?;

        let class_handlers = compile_class_level_handlers(&self.metadata)?;
        if self.config.eager_validation
            && self.provider.is_none()
            && class_handlers.iter().any(|handler| handler.key().is_some())
        {
            return Err(missing_provider());
        }

        debug!(
            service = %name,
            base_url = %base_url,
            class_handlers = class_handlers.len(),
            "service built"
        );

        Ok(Service {
            inner: Arc::new(ServiceInner {
                name,
                base_url,
                provider: self.provider,
                config: self.config,
                class_handlers: class_handlers.into(),
                methods: MethodCache::new(),
            }),
        })
    }
}
