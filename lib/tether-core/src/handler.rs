//! Parameter handlers: compiled, immutable binding operations.
//!
//! Each handler applies one call-time value to a [`RequestBuilder`]. A null
//! value is modeled as `None`; each variant documents its null policy.
//! Handlers hold no per-call state, so one instance can be shared across
//! threads and calls.
//!
//! | Variant | `None` value | Effect |
//! |---|---|---|
//! | [`RelativeUrl`] | error | sets the relative URL |
//! | [`Header`] | skipped | appends a header |
//! | [`Path`] | error | substitutes a path placeholder |
//! | [`Query`] | skipped | appends a query parameter |
//! | [`QueryMap`], [`HeaderMap`], [`FieldMap`], [`PartMap`] | error | one entry per map item |
//! | [`Field`] | skipped | appends a form field |
//! | [`Part`] | skipped | appends a multipart part |
//! | [`RawPart`] | skipped | appends a pre-built part |
//! | [`Body`] | error | sets the body |
//!
//! Any handler can be lifted over a sequence with
//! [`ParameterHandler::iterable`] or over a fixed-size array with
//! [`ParameterHandler::array`].
//!
//! # Example
//!
//! ```
//! use tether_core::handler::{ParameterHandler, Query};
//! use tether_core::{Method, RequestBuilder, ToStringConverter};
//!
//! let tags = Query::new("tag", ToStringConverter, false).iterable();
//! let mut builder = RequestBuilder::new(Method::Get, "http://example.com/".parse().unwrap());
//! tags.apply(&mut builder, Some(&vec!["a", "b"])).unwrap();
//!
//! let request = builder.build().unwrap();
//! assert_eq!(request.url().query(), Some("tag=a&tag=b"));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::multipart::{CONTENT_DISPOSITION, CONTENT_TRANSFER_ENCODING, disposition_name};
use crate::{Converter, Error, RequestBody, RequestBuilder, Result};

// ============================================================================
// Handler Trait
// ============================================================================

/// An immutable operation applying one value to a request under construction.
pub trait ParameterHandler<T: ?Sized>: Send + Sync {
    /// Apply `value` to `builder`; `None` stands for a null value.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the variant rejects the value, or a
    /// conversion error when the converter fails.
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()>;

    /// Lift this handler over a sequence of values.
    ///
    /// A null sequence is skipped; each element follows this handler's own
    /// null policy.
    fn iterable(self) -> Iterable<Self, T>
    where
        Self: Sized,
        T: Sized,
    {
        Iterable {
            inner: self,
            _element: PhantomData,
        }
    }

    /// Lift this handler over a fixed-size array of values.
    ///
    /// A null array is skipped; each element follows this handler's own null
    /// policy.
    fn array(self) -> Array<Self, T>
    where
        Self: Sized,
        T: Sized,
    {
        Array {
            inner: self,
            _element: PhantomData,
        }
    }
}

impl<T: ?Sized, H: ParameterHandler<T> + ?Sized> ParameterHandler<T> for Arc<H> {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        (**self).apply(builder, value)
    }
}

// ============================================================================
// Nullable Elements and Maps
// ============================================================================

/// A collection element that may be null.
///
/// Implemented for `T` (never null) and `Option<T>`.
pub trait Nullable<T> {
    /// The element value, or `None` for a null element.
    fn as_nullable(&self) -> Option<&T>;
}

impl<T> Nullable<T> for T {
    fn as_nullable(&self) -> Option<&T> {
        Some(self)
    }
}

impl<T> Nullable<T> for Option<T> {
    fn as_nullable(&self) -> Option<&T> {
        self.as_ref()
    }
}

/// A string-keyed map whose keys and values may be null.
///
/// Standard maps never hold null keys or values; a
/// `Vec<(Option<String>, Option<V>)>` models an entry list that can.
pub trait ParamMap {
    /// Value type of the entries.
    type Value;

    /// Entries in iteration order.
    fn entries(&self) -> impl Iterator<Item = (Option<&str>, Option<&Self::Value>)>;
}

impl<V, S> ParamMap for HashMap<String, V, S> {
    type Value = V;

    fn entries(&self) -> impl Iterator<Item = (Option<&str>, Option<&V>)> {
        self.iter().map(|(k, v)| (Some(k.as_str()), Some(v)))
    }
}

impl<V> ParamMap for BTreeMap<String, V> {
    type Value = V;

    fn entries(&self) -> impl Iterator<Item = (Option<&str>, Option<&V>)> {
        self.iter().map(|(k, v)| (Some(k.as_str()), Some(v)))
    }
}

impl<V> ParamMap for Vec<(Option<String>, Option<V>)> {
    type Value = V;

    fn entries(&self) -> impl Iterator<Item = (Option<&str>, Option<&V>)> {
        self.iter().map(|(k, v)| (k.as_deref(), v.as_ref()))
    }
}

/// Validate a map and its entries, then visit each entry.
fn for_each_entry<M: ParamMap>(
    kind: &str,
    map: Option<&M>,
    mut visit: impl FnMut(&str, &M::Value) -> Result<()>,
) -> Result<()> {
    let map = map.ok_or_else(|| Error::validation(format!("{kind} map was null.")))?;
    for (key, value) in map.entries() {
        let Some(key) = key else {
            return Err(Error::validation(format!("{kind} map contained null key.")));
        };
        let Some(value) = value else {
            return Err(Error::validation(format!(
                "{kind} map contained null value for key '{key}'."
            )));
        };
        visit(key, value)?;
    }
    Ok(())
}

fn convert_string<T, C>(converter: &C, name: &str, value: &T) -> Result<String>
where
    T: ?Sized,
    C: Converter<T, String>,
{
    converter.convert(value).map_err(|source| {
        let context = format!("Unable to convert \"{name}\" value");
        Error::conversion(context, source)
    })
}

fn convert_body<T, C>(converter: &C, what: &str, value: &T) -> Result<RequestBody>
where
    T: ?Sized,
    C: Converter<T, RequestBody>,
{
    converter.convert(value).map_err(|source| {
        let context = format!("Unable to convert {what} to RequestBody");
        Error::conversion(context, source)
    })
}

// ============================================================================
// Collection Adapters
// ============================================================================

/// A handler lifted over a sequence (`Vec<E>` or `[E]`).
///
/// Elements are `T` or `Option<T>`.
#[derive(Debug, Clone)]
pub struct Iterable<H, T> {
    inner: H,
    _element: PhantomData<fn(&T)>,
}

impl<T, E, H> ParameterHandler<[E]> for Iterable<H, T>
where
    H: ParameterHandler<T>,
    E: Nullable<T>,
{
    fn apply(&self, builder: &mut RequestBuilder, values: Option<&[E]>) -> Result<()> {
        let Some(values) = values else {
            return Ok(());
        };
        for value in values {
            self.inner.apply(builder, value.as_nullable())?;
        }
        Ok(())
    }
}

impl<T, E, H> ParameterHandler<Vec<E>> for Iterable<H, T>
where
    H: ParameterHandler<T>,
    E: Nullable<T>,
{
    fn apply(&self, builder: &mut RequestBuilder, values: Option<&Vec<E>>) -> Result<()> {
        ParameterHandler::<[E]>::apply(self, builder, values.map(Vec::as_slice))
    }
}

/// A handler lifted over a fixed-size array `[E; N]`.
#[derive(Debug, Clone)]
pub struct Array<H, T> {
    inner: H,
    _element: PhantomData<fn(&T)>,
}

impl<T, E, H, const N: usize> ParameterHandler<[E; N]> for Array<H, T>
where
    H: ParameterHandler<T>,
    E: Nullable<T>,
{
    fn apply(&self, builder: &mut RequestBuilder, values: Option<&[E; N]>) -> Result<()> {
        let Some(values) = values else {
            return Ok(());
        };
        for value in values {
            self.inner.apply(builder, value.as_nullable())?;
        }
        Ok(())
    }
}

// ============================================================================
// Variants
// ============================================================================

/// Sets the relative URL from the value's [`Display`] form.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeUrl;

impl<T: Display + ?Sized> ParameterHandler<T> for RelativeUrl {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        let value = value.ok_or_else(|| Error::validation("@Url parameter is null."))?;
        builder.set_relative_url(value.to_string());
        Ok(())
    }
}

/// Appends a named header.
#[derive(Debug, Clone)]
pub struct Header<C> {
    name: String,
    converter: C,
}

impl<C> Header<C> {
    /// Create a header handler.
    #[must_use]
    pub fn new(name: impl Into<String>, converter: C) -> Self {
        Self {
            name: name.into(),
            converter,
        }
    }
}

impl<T: ?Sized, C: Converter<T, String>> ParameterHandler<T> for Header<C> {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let value = convert_string(&self.converter, &self.name, value)?;
        builder.add_header(&self.name, &value);
        Ok(())
    }
}

/// Substitutes a `{name}` placeholder of the relative URL.
#[derive(Debug, Clone)]
pub struct Path<C> {
    name: String,
    converter: C,
    encoded: bool,
}

impl<C> Path<C> {
    /// Create a path handler; `encoded` marks values as already escaped.
    #[must_use]
    pub fn new(name: impl Into<String>, converter: C, encoded: bool) -> Self {
        Self {
            name: name.into(),
            converter,
            encoded,
        }
    }
}

impl<T: ?Sized, C: Converter<T, String>> ParameterHandler<T> for Path<C> {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        let Some(value) = value else {
            return Err(Error::validation(format!(
                "Path parameter \"{}\" value must not be null.",
                self.name
            )));
        };
        let value = convert_string(&self.converter, &self.name, value)?;
        builder.add_path_param(&self.name, &value, self.encoded)
    }
}

/// Appends a named query parameter.
#[derive(Debug, Clone)]
pub struct Query<C> {
    name: String,
    converter: C,
    encoded: bool,
}

impl<C> Query<C> {
    /// Create a query handler; `encoded` marks values as already escaped.
    #[must_use]
    pub fn new(name: impl Into<String>, converter: C, encoded: bool) -> Self {
        Self {
            name: name.into(),
            converter,
            encoded,
        }
    }
}

impl<T: ?Sized, C: Converter<T, String>> ParameterHandler<T> for Query<C> {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let value = convert_string(&self.converter, &self.name, value)?;
        builder.add_query_param(&self.name, &value, self.encoded);
        Ok(())
    }
}

/// Appends one query parameter per map entry.
#[derive(Debug, Clone)]
pub struct QueryMap<C> {
    converter: C,
    encoded: bool,
}

impl<C> QueryMap<C> {
    /// Create a query map handler.
    #[must_use]
    pub fn new(converter: C, encoded: bool) -> Self {
        Self { converter, encoded }
    }
}

impl<M, C> ParameterHandler<M> for QueryMap<C>
where
    M: ParamMap,
    C: Converter<M::Value, String>,
{
    fn apply(&self, builder: &mut RequestBuilder, map: Option<&M>) -> Result<()> {
        for_each_entry("Query", map, |key, value| {
            let value = convert_string(&self.converter, key, value)?;
            builder.add_query_param(key, &value, self.encoded);
            Ok(())
        })
    }
}

/// Appends one header per map entry.
#[derive(Debug, Clone)]
pub struct HeaderMap<C> {
    converter: C,
}

impl<C> HeaderMap<C> {
    /// Create a header map handler.
    #[must_use]
    pub fn new(converter: C) -> Self {
        Self { converter }
    }
}

impl<M, C> ParameterHandler<M> for HeaderMap<C>
where
    M: ParamMap,
    C: Converter<M::Value, String>,
{
    fn apply(&self, builder: &mut RequestBuilder, map: Option<&M>) -> Result<()> {
        for_each_entry("Header", map, |key, value| {
            let value = convert_string(&self.converter, key, value)?;
            builder.add_header(key, &value);
            Ok(())
        })
    }
}

/// Appends a named form field.
#[derive(Debug, Clone)]
pub struct Field<C> {
    name: String,
    converter: C,
    encoded: bool,
}

impl<C> Field<C> {
    /// Create a form field handler; `encoded` marks values as already escaped.
    #[must_use]
    pub fn new(name: impl Into<String>, converter: C, encoded: bool) -> Self {
        Self {
            name: name.into(),
            converter,
            encoded,
        }
    }
}

impl<T: ?Sized, C: Converter<T, String>> ParameterHandler<T> for Field<C> {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let value = convert_string(&self.converter, &self.name, value)?;
        builder.add_form_field(&self.name, &value, self.encoded);
        Ok(())
    }
}

/// Appends one form field per map entry.
#[derive(Debug, Clone)]
pub struct FieldMap<C> {
    converter: C,
    encoded: bool,
}

impl<C> FieldMap<C> {
    /// Create a form field map handler.
    #[must_use]
    pub fn new(converter: C, encoded: bool) -> Self {
        Self { converter, encoded }
    }
}

impl<M, C> ParameterHandler<M> for FieldMap<C>
where
    M: ParamMap,
    C: Converter<M::Value, String>,
{
    fn apply(&self, builder: &mut RequestBuilder, map: Option<&M>) -> Result<()> {
        for_each_entry("Field", map, |key, value| {
            let value = convert_string(&self.converter, key, value)?;
            builder.add_form_field(key, &value, self.encoded);
            Ok(())
        })
    }
}

/// Appends a multipart part with fixed headers and a converted body.
#[derive(Debug, Clone)]
pub struct Part<C> {
    headers: Vec<(String, String)>,
    converter: C,
}

impl<C> Part<C> {
    /// Create a part handler with explicit part headers.
    #[must_use]
    pub fn new(headers: Vec<(String, String)>, converter: C) -> Self {
        Self { headers, converter }
    }

    /// Create a `form-data` part handler named `name`.
    #[must_use]
    pub fn form_data(name: &str, transfer_encoding: &str, converter: C) -> Self {
        Self::new(part_headers(name, transfer_encoding), converter)
    }
}

impl<T: ?Sized, C: Converter<T, RequestBody>> ParameterHandler<T> for Part<C> {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let what = match disposition_name(&self.headers) {
            Some(name) => format!("part \"{name}\""),
            None => "part".to_string(),
        };
        let body = convert_body(&self.converter, &what, value)?;
        builder.add_part_with_headers(self.headers.clone(), body);
        Ok(())
    }
}

/// Passes a pre-built multipart part through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPart;

impl ParameterHandler<crate::Part> for RawPart {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&crate::Part>) -> Result<()> {
        if let Some(part) = value {
            builder.add_part(part.clone());
        }
        Ok(())
    }
}

/// Appends one `form-data` part per map entry.
#[derive(Debug, Clone)]
pub struct PartMap<C> {
    converter: C,
    transfer_encoding: String,
}

impl<C> PartMap<C> {
    /// Create a part map handler with the given `Content-Transfer-Encoding`.
    #[must_use]
    pub fn new(converter: C, transfer_encoding: impl Into<String>) -> Self {
        Self {
            converter,
            transfer_encoding: transfer_encoding.into(),
        }
    }
}

impl<M, C> ParameterHandler<M> for PartMap<C>
where
    M: ParamMap,
    C: Converter<M::Value, RequestBody>,
{
    fn apply(&self, builder: &mut RequestBuilder, map: Option<&M>) -> Result<()> {
        for_each_entry("Part", map, |key, value| {
            let body = convert_body(&self.converter, &format!("part \"{key}\""), value)?;
            builder.add_part_with_headers(part_headers(key, &self.transfer_encoding), body);
            Ok(())
        })
    }
}

/// Sets the sole request body.
#[derive(Debug, Clone)]
pub struct Body<C> {
    converter: C,
}

impl<C> Body<C> {
    /// Create a body handler.
    #[must_use]
    pub fn new(converter: C) -> Self {
        Self { converter }
    }
}

impl<T: ?Sized, C: Converter<T, RequestBody>> ParameterHandler<T> for Body<C> {
    fn apply(&self, builder: &mut RequestBuilder, value: Option<&T>) -> Result<()> {
        let value =
            value.ok_or_else(|| Error::validation("Body parameter value must not be null."))?;
        let body = convert_body(&self.converter, "body", value)?;
        builder.set_body(body);
        Ok(())
    }
}

fn part_headers(name: &str, transfer_encoding: &str) -> Vec<(String, String)> {
    vec![
        (
            CONTENT_DISPOSITION.to_string(),
            format!("form-data; name=\"{name}\""),
        ),
        (
            CONTENT_TRANSFER_ENCODING.to_string(),
            transfer_encoding.to_string(),
        ),
    ]
}
