//! Prelude module for convenient imports.
//!
//! ```
//! use tether::prelude::*;
//! ```

pub use crate::handler::ParameterHandler;
pub use crate::{
    ClassAnnotation, Error, JsonConverter, Method, MethodDefinition, ParamProvider, Request,
    RequestBody, Result, Service, ServiceConfig, ServiceMetadata, StaticParams, ToStringConverter,
};
