//! Prelude module for convenient imports.
//!
//! ```
//! use tether_core::prelude::*;
//! ```

pub use crate::handler::ParameterHandler;
pub use crate::{
    ContentType, Converter, Error, JsonConverter, Method, Part, Request, RequestBody,
    RequestBuilder, Result, ToStringConverter,
};
