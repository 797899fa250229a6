//! Value converters consumed by parameter handlers.
//!
//! A converter is a pure function from a call-time value to either a string
//! (headers, paths, queries, form fields) or a [`RequestBody`] (bodies and
//! parts). Any `Fn(&T) -> Result<R, BoxError>` closure is a converter.

use std::fmt::Display;

use crate::{BoxError, RequestBody};

/// Converts a value of type `T` into `R`.
pub trait Converter<T: ?Sized, R>: Send + Sync {
    /// Convert `value`.
    ///
    /// # Errors
    ///
    /// Returns the converter's own failure; handlers wrap it into
    /// [`Error::Conversion`](crate::Error::Conversion).
    fn convert(&self, value: &T) -> Result<R, BoxError>;
}

impl<T, R, F> Converter<T, R> for F
where
    T: ?Sized,
    F: Fn(&T) -> Result<R, BoxError> + Send + Sync,
{
    fn convert(&self, value: &T) -> Result<R, BoxError> {
        self(value)
    }
}

/// String converter using the value's [`Display`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToStringConverter;

impl<T: Display + ?Sized> Converter<T, String> for ToStringConverter {
    fn convert(&self, value: &T) -> Result<String, BoxError> {
        Ok(value.to_string())
    }
}

/// Body converter serializing the value as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl<T: serde::Serialize + ?Sized> Converter<T, RequestBody> for JsonConverter {
    fn convert(&self, value: &T) -> Result<RequestBody, BoxError> {
        RequestBody::json(value).map_err(Into::into)
    }
}

/// Body converter producing a `text/plain` body from the value's [`Display`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl<T: Display + ?Sized> Converter<T, RequestBody> for TextConverter {
    fn convert(&self, value: &T) -> Result<RequestBody, BoxError> {
        Ok(RequestBody::text(value.to_string()))
    }
}

/// Body converter producing an `application/octet-stream` body.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesConverter;

impl<T: AsRef<[u8]> + ?Sized> Converter<T, RequestBody> for BytesConverter {
    fn convert(&self, value: &T) -> Result<RequestBody, BoxError> {
        let data = bytes::Bytes::copy_from_slice(value.as_ref());
        Ok(RequestBody::bytes(data))
    }
}

/// Body converter serializing the value as an
/// `application/x-www-form-urlencoded` body.
///
/// Sequence fields become repeated keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormConverter;

impl<T: serde::Serialize + ?Sized> Converter<T, RequestBody> for FormConverter {
    fn convert(&self, value: &T) -> Result<RequestBody, BoxError> {
        RequestBody::form(value).map_err(Into::into)
    }
}
