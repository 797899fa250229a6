//! Method-level handler lists.
//!
//! A [`MethodDefinition`] collects one handler per positional parameter.
//! Handlers are typed; the definition erases them behind [`Any`] so that a
//! single [`CompiledMethod`] can bind heterogeneous arguments.
//!
//! # Example
//!
//! ```
//! use std::any::Any;
//!
//! use tether::handler::{Path, Query};
//! use tether::{Method, MethodDefinition, RequestBuilder, ToStringConverter};
//!
//! let method = MethodDefinition::new(Method::Get, "/users/{id}")
//!     .param::<u64, _>(Path::new("id", ToStringConverter, false))
//!     .param::<String, _>(Query::new("fields", ToStringConverter, false))
//!     .compile("get_user")
//!     .unwrap();
//!
//! let id = 42_u64;
//! let fields = "name".to_string();
//! let args: [Option<&dyn Any>; 2] = [Some(&id), Some(&fields)];
//!
//! let mut builder = RequestBuilder::new(method.method(), "http://example.com/".parse().unwrap());
//! method.prepare(&mut builder);
//! method.apply(&mut builder, &args).unwrap();
//! assert_eq!(
//!     builder.build().unwrap().url().as_str(),
//!     "http://example.com/users/42?fields=name"
//! );
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tether_core::handler::ParameterHandler;
use tether_core::templated::parse_header_literal;
use tether_core::{Error, Method, RequestBuilder, Result};

// ============================================================================
// Type Erasure
// ============================================================================

trait ErasedHandler: Send + Sync {
    fn expected(&self) -> &'static str;

    fn apply_erased(
        &self,
        position: usize,
        builder: &mut RequestBuilder,
        value: Option<&dyn Any>,
    ) -> Result<()>;
}

struct Typed<H, T> {
    handler: H,
    _value: PhantomData<fn(&T)>,
}

impl<H, T> ErasedHandler for Typed<H, T>
where
    H: ParameterHandler<T>,
    T: Any,
{
    fn expected(&self) -> &'static str {
        type_name::<T>()
    }

    fn apply_erased(
        &self,
        position: usize,
        builder: &mut RequestBuilder,
        value: Option<&dyn Any>,
    ) -> Result<()> {
        let value = match value {
            Some(value) => Some(value.downcast_ref::<T>().ok_or_else(|| {
                Error::validation(format!(
                    "Argument {position} must be of type {}.",
                    self.expected()
                ))
            })?),
            None => None,
        };
        self.handler.apply(builder, value)
    }
}

// ============================================================================
// MethodDefinition
// ============================================================================

/// The declared shape of one service method.
pub struct MethodDefinition {
    method: Method,
    relative_url: Option<String>,
    headers: Vec<String>,
    params: Vec<Box<dyn ErasedHandler>>,
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("method", &self.method)
            .field("relative_url", &self.relative_url)
            .field("headers", &self.headers)
            .field("params", &self.params.len())
            .finish()
    }
}

impl MethodDefinition {
    /// A method with a relative URL, possibly holding `{name}` path slots.
    #[must_use]
    pub fn new(method: Method, relative_url: impl Into<String>) -> Self {
        Self {
            method,
            relative_url: Some(relative_url.into()),
            headers: Vec::new(),
            params: Vec::new(),
        }
    }

    /// A method whose relative URL is supplied by a
    /// [`RelativeUrl`](tether_core::handler::RelativeUrl) parameter.
    #[must_use]
    pub fn without_url(method: Method) -> Self {
        Self {
            method,
            relative_url: None,
            headers: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Add a static `"Name: value"` header.
    #[must_use]
    pub fn header(mut self, literal: impl Into<String>) -> Self {
        self.headers.push(literal.into());
        self
    }

    /// Add the handler for the next positional parameter, of type `T`.
    #[must_use]
    pub fn param<T, H>(mut self, handler: H) -> Self
    where
        T: Any,
        H: ParameterHandler<T> + 'static,
    {
        self.params.push(Box::new(Typed {
            handler,
            _value: PhantomData,
        }));
        self
    }

    /// Validate the definition into an immutable [`CompiledMethod`].
    ///
    /// # Errors
    ///
    /// Fails with a configuration error when a static header literal is
    /// malformed.
    pub fn compile(self, name: &str) -> Result<CompiledMethod> {
        let headers = self
            .headers
            .iter()
            .map(|literal| {
                parse_header_literal(literal)
                    .map(|header| (header.name, header.template))
                    .map_err(|_| {
                        Error::configuration(format!(
                            "Method {name}: @Headers value must be in the form \"Name: Value\". \
                             Found: \"{literal}\""
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CompiledMethod {
            name: name.to_string(),
            method: self.method,
            relative_url: self.relative_url,
            headers,
            params: self.params.into(),
        })
    }
}

// ============================================================================
// CompiledMethod
// ============================================================================

/// An immutable, shareable method binding.
pub struct CompiledMethod {
    name: String,
    method: Method,
    relative_url: Option<String>,
    headers: Vec<(String, String)>,
    params: Arc<[Box<dyn ErasedHandler>]>,
}

impl fmt::Debug for CompiledMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.params.iter().map(|param| param.expected()).collect();
        f.debug_struct("CompiledMethod")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("relative_url", &self.relative_url)
            .field("headers", &self.headers)
            .field("params", &params)
            .finish()
    }
}

impl CompiledMethod {
    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Declared relative URL, if any.
    #[must_use]
    pub fn relative_url(&self) -> Option<&str> {
        self.relative_url.as_deref()
    }

    /// Number of positional parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Seed `builder` with the relative URL template and static headers.
    ///
    /// This is the first step of every call, before [`apply`](Self::apply).
    pub fn prepare(&self, builder: &mut RequestBuilder) {
        if let Some(relative_url) = &self.relative_url {
            builder.set_url_template(relative_url.as_str());
        }
        for (name, value) in &self.headers {
            builder.add_header(name, value);
        }
    }

    /// Apply `args` positionally to the parameter handlers.
    ///
    /// `builder` must have gone through [`prepare`](Self::prepare): path
    /// parameters substitute into the relative URL it seeds.
    ///
    /// # Errors
    ///
    /// Fails with a validation error on an arity or type mismatch, or with
    /// whatever a handler reports.
    pub fn apply(&self, builder: &mut RequestBuilder, args: &[Option<&dyn Any>]) -> Result<()> {
        if args.len() != self.params.len() {
            return Err(Error::validation(format!(
                "Method {} expects {} arguments but {} were given.",
                self.name,
                self.params.len(),
                args.len()
            )));
        }

        for (position, (param, value)) in self.params.iter().zip(args).enumerate() {
            param.apply_erased(position, builder, *value)?;
        }
        Ok(())
    }
}
