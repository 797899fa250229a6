//! Core types and traits for the tether parameter-binding engine.
//!
//! This crate provides the building blocks compiled once per service method
//! and applied on every call:
//! - [`handler`] - the [`ParameterHandler`](handler::ParameterHandler) trait,
//!   its variants and the collection adapters
//! - [`templated`] - service-wide templated headers, queries and base URL
//! - [`Template`] and [`PlaceholderStyle`] - single-placeholder templates
//! - [`Converter`] - value to string or body conversion
//! - [`RequestBuilder`] and [`Request`] - call-scoped request assembly
//! - [`RequestBody`] and [`Part`] - payloads
//! - [`Error`] and [`Result`] - error handling

mod body;
mod converter;
mod error;
pub mod handler;
mod method;
pub mod multipart;
pub mod prelude;
mod request;
pub mod template;
pub mod templated;

pub use body::{ContentType, RequestBody};
pub use converter::{
    BytesConverter, Converter, FormConverter, JsonConverter, TextConverter, ToStringConverter,
};
pub use error::{BoxError, ConverterFailure, Error, Result};
pub use method::Method;
pub use multipart::Part;
pub use request::{EncodedPair, Request, RequestBuilder};
pub use template::{PlaceholderStyle, Template, TooManyPlaceholders};

// Re-export http crate header names
pub use http::header;
