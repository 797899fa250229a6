//! Declarative parameter binding for HTTP clients.
//!
//! Service and method metadata, declared once, are compiled into immutable
//! handler lists. Every call then runs those handlers against a fresh
//! [`RequestBuilder`] and materializes a [`Request`].
//!
//! - [`ServiceMetadata`] and [`ClassAnnotation`] - normalized service metadata
//! - [`compile_class_level_handlers`] - service-wide templated handlers
//! - [`ParamProvider`] - call-time values for those templates
//! - [`MethodDefinition`] and [`CompiledMethod`] - positional parameter binding
//! - [`Service`] - the cached, thread-safe facade
//!
//! # Example
//!
//! ```
//! use tether::handler::Query;
//! use tether::prelude::*;
//!
//! let metadata = ServiceMetadata::new("UserApi")
//!     .with(ClassAnnotation::headers(["X-Client: {client}"]))
//!     .with(ClassAnnotation::url("{base}"));
//!
//! let service = Service::builder(metadata)
//!     .base_url("http://localhost/")
//!     .provider(
//!         StaticParams::new()
//!             .header("client", "tether")
//!             .url("base", "https://api.example.com"),
//!     )
//!     .build()?;
//!
//! service.method("list_users", |_| {
//!     Ok(MethodDefinition::new(Method::Get, "/users")
//!         .param::<u32, _>(Query::new("page", ToStringConverter, false)))
//! })?;
//!
//! let page = 2_u32;
//! let request = service.request("list_users", &[Some(&page)])?;
//! assert_eq!(request.url().as_str(), "https://api.example.com/users?page=2");
//! assert_eq!(request.header("X-Client"), Some("tether"));
//! # Ok::<(), tether::Error>(())
//! ```

mod cache;
mod compiler;
mod config;
mod metadata;
mod method;
pub mod prelude;
mod provider;
mod service;

pub use cache::MethodCache;
pub use compiler::{ClassHandler, compile_class_level_handlers};
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use metadata::{ClassAnnotation, ServiceMetadata};
pub use method::{CompiledMethod, MethodDefinition};
pub use provider::{ParamProvider, StaticParams};
pub use service::{Service, ServiceBuilder};

// Re-export core types
pub use tether_core::{
    BoxError, BytesConverter, ContentType, Converter, Error, FormConverter, JsonConverter, Method,
    Part, PlaceholderStyle, Request, RequestBody, RequestBuilder, Result, Template, TextConverter,
    ToStringConverter, handler, multipart, template, templated,
};

// Re-export http header names
pub use tether_core::header;
