//! Call-scoped request assembly.
//!
//! A [`RequestBuilder`] is created fresh for every call, mutated by the
//! compiled parameter handlers, then turned into a [`Request`] with
//! [`RequestBuilder::build`].
//!
//! # Example
//!
//! ```
//! use tether_core::{Method, RequestBuilder};
//!
//! let mut builder = RequestBuilder::new(Method::Get, "https://api.example.com/".parse().unwrap());
//! builder.set_url_template("/users/{id}");
//! builder.add_path_param("id", "42", false).unwrap();
//! builder.add_query_param("page", "1", false);
//! builder.add_header("Accept", "application/json");
//!
//! let request = builder.build().unwrap();
//! assert_eq!(request.url().as_str(), "https://api.example.com/users/42?page=1");
//! ```

use bytes::Bytes;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

use crate::multipart::{encode_multipart, generate_boundary};
use crate::{ContentType, Error, Method, Part, RequestBody, Result, template};

/// Characters escaped in a path segment value that is not pre-encoded.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped in a query name or value that is not pre-encoded.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>');

/// A name/value pair with its encoding state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPair {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: String,
    /// Whether name and value are already percent-encoded.
    pub encoded: bool,
}

impl EncodedPair {
    fn query_component(&self) -> String {
        if self.encoded {
            format!("{}={}", self.name, self.value)
        } else {
            format!(
                "{}={}",
                utf8_percent_encode(&self.name, QUERY_COMPONENT),
                utf8_percent_encode(&self.value, QUERY_COMPONENT)
            )
        }
    }

    fn form_component(&self) -> String {
        if self.encoded {
            format!("{}={}", self.name, self.value)
        } else {
            let name: String = url::form_urlencoded::byte_serialize(self.name.as_bytes()).collect();
            let value: String =
                url::form_urlencoded::byte_serialize(self.value.as_bytes()).collect();
            format!("{name}={value}")
        }
    }
}

/// A materialized request, ready to hand to a transport.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl Request {
    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers in insertion order; duplicate names are kept.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All header values for a case-insensitive name.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, Vec<(String, String)>, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}

impl TryFrom<Request> for http::Request<Bytes> {
    type Error = Error;

    fn try_from(request: Request) -> Result<Self> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(body.unwrap_or_default())
            .map_err(|e| Error::invalid_request(e.to_string()))
    }
}

/// Mutable accumulator for exactly one in-flight call.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    base_url: Url,
    service_url: Option<String>,
    relative_url: Option<String>,
    pending_path_params: Vec<String>,
    queries: Vec<EncodedPair>,
    headers: Vec<(String, String)>,
    form_fields: Vec<EncodedPair>,
    parts: Vec<Part>,
    body: Option<RequestBody>,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, base_url: Url) -> Self {
        Self {
            method,
            base_url,
            service_url: None,
            relative_url: None,
            pending_path_params: Vec::new(),
            queries: Vec::new(),
            headers: Vec::new(),
            form_fields: Vec::new(),
            parts: Vec::new(),
            body: None,
        }
    }

    /// Sets the relative URL verbatim; the last call wins.
    ///
    /// Braces in a verbatim URL are not path placeholders, so none are
    /// required by [`build`](Self::build).
    pub fn set_relative_url(&mut self, relative_url: impl Into<String>) {
        self.relative_url = Some(relative_url.into());
        self.pending_path_params.clear();
    }

    /// Sets a declared relative URL whose `{name}` placeholders must each be
    /// resolved with [`add_path_param`](Self::add_path_param) before
    /// [`build`](Self::build).
    pub fn set_url_template(&mut self, relative_url: impl Into<String>) {
        let relative_url = relative_url.into();
        self.pending_path_params = template::path_placeholders(&relative_url);
        self.relative_url = Some(relative_url);
    }

    /// Replaces the base URL for this call; the last call wins.
    ///
    /// An empty service URL keeps the base URL.
    pub fn set_service_url(&mut self, service_url: impl Into<String>) {
        self.service_url = Some(service_url.into());
    }

    /// Substitutes `{name}` in the relative URL.
    ///
    /// Unless `encoded` is set, the value is percent-encoded as a single path
    /// segment (`/` included).
    pub fn add_path_param(&mut self, name: &str, value: &str, encoded: bool) -> Result<()> {
        let Some(relative_url) = self.relative_url.as_mut() else {
            return Err(Error::invalid_request(format!(
                "path parameter \"{name}\" requires a relative URL"
            )));
        };

        let replacement = if encoded {
            value.to_string()
        } else {
            utf8_percent_encode(value, PATH_SEGMENT).to_string()
        };
        *relative_url = relative_url.replace(&format!("{{{name}}}"), &replacement);
        self.pending_path_params.retain(|pending| pending != name);
        Ok(())
    }

    /// Appends a query parameter.
    pub fn add_query_param(&mut self, name: &str, value: &str, encoded: bool) {
        self.queries.push(EncodedPair {
            name: name.to_string(),
            value: value.to_string(),
            encoded,
        });
    }

    /// Appends a header; duplicate names accumulate.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Appends a form field.
    pub fn add_form_field(&mut self, name: &str, value: &str, encoded: bool) {
        self.form_fields.push(EncodedPair {
            name: name.to_string(),
            value: value.to_string(),
            encoded,
        });
    }

    /// Appends a multipart part built from headers and a body.
    pub fn add_part_with_headers(&mut self, headers: Vec<(String, String)>, body: RequestBody) {
        self.parts.push(Part::new(headers, body));
    }

    /// Appends a pre-built multipart part.
    pub fn add_part(&mut self, part: Part) {
        self.parts.push(part);
    }

    /// Sets the request body; the last call wins.
    pub fn set_body(&mut self, body: RequestBody) {
        self.body = Some(body);
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Current relative URL.
    #[must_use]
    pub fn relative_url(&self) -> Option<&str> {
        self.relative_url.as_deref()
    }

    /// Current service URL override.
    #[must_use]
    pub fn service_url(&self) -> Option<&str> {
        self.service_url.as_deref()
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn queries(&self) -> &[EncodedPair] {
        &self.queries
    }

    /// Headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Form fields in insertion order.
    #[must_use]
    pub fn form_fields(&self) -> &[EncodedPair] {
        &self.form_fields
    }

    /// Multipart parts in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Current body.
    #[must_use]
    pub const fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Materializes the request.
    ///
    /// # Errors
    ///
    /// Fails when a placeholder of the URL template was left unresolved, when
    /// the URL cannot be parsed, when more than one kind of payload (body,
    /// form fields, parts) was supplied, or when the method does not permit a
    /// payload.
    pub fn build(self) -> Result<Request> {
        let base = match self.service_url.as_deref() {
            Some(service_url) if !service_url.is_empty() => Url::parse(service_url)?,
            _ => self.base_url,
        };

        if let Some(name) = self.pending_path_params.first() {
            return Err(Error::invalid_request(format!(
                "missing value for path parameter \"{name}\""
            )));
        }

        let mut url = match self.relative_url.as_deref() {
            Some(relative) => base.join(relative)?,
            None => base,
        };

        if !self.queries.is_empty() {
            let mut query = url.query().unwrap_or_default().to_string();
            for pair in &self.queries {
                if !query.is_empty() {
                    query.push('&');
                }
                query.push_str(&pair.query_component());
            }
            url.set_query(Some(&query));
        }

        let payload_kinds = [
            self.body.is_some(),
            !self.form_fields.is_empty(),
            !self.parts.is_empty(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();
        if payload_kinds > 1 {
            return Err(Error::invalid_request(
                "a request cannot combine a body, form fields and multipart parts",
            ));
        }

        let mut headers = self.headers;
        let body = if !self.parts.is_empty() {
            let (content_type, data) = encode_multipart(&self.parts, &generate_boundary());
            Some(RequestBody::new(content_type, data))
        } else if !self.form_fields.is_empty() {
            let form = self
                .form_fields
                .iter()
                .map(EncodedPair::form_component)
                .collect::<Vec<_>>()
                .join("&");
            Some(RequestBody::new(ContentType::FormUrlEncoded.as_str(), form))
        } else {
            self.body
        };

        let body = match body {
            Some(_) if !self.method.permits_body() => {
                return Err(Error::invalid_request(format!(
                    "{} requests cannot carry a body",
                    self.method
                )));
            }
            Some(body) => {
                let (content_type, data) = body.into_parts();
                let has_content_type = headers
                    .iter()
                    .any(|(n, _)| n.eq_ignore_ascii_case("Content-Type"));
                if let (Some(content_type), false) = (content_type, has_content_type) {
                    headers.push(("Content-Type".to_string(), content_type));
                }
                Some(data)
            }
            None => None,
        };

        Ok(Request {
            method: self.method,
            url,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(method: Method) -> RequestBuilder {
        RequestBuilder::new(method, "http://example.com/".parse().expect("valid URL"))
    }

    #[test]
    fn relative_url_and_queries() {
        let mut builder = builder(Method::Get);
        builder.set_relative_url("/foo");
        builder.add_query_param("bar", "zhang", false);
        builder.add_query_param("q", "a b&c", false);

        let request = builder.build().expect("build");
        assert_eq!(
            request.url().as_str(),
            "http://example.com/foo?bar=zhang&q=a%20b%26c"
        );
    }

    #[test]
    fn encoded_query_is_verbatim() {
        let mut builder = builder(Method::Get);
        builder.set_relative_url("/foo");
        builder.add_query_param("q", "a%20b", true);

        let request = builder.build().expect("build");
        assert_eq!(request.url().as_str(), "http://example.com/foo?q=a%20b");
    }

    #[test]
    fn path_param_encoding() {
        let mut builder = builder(Method::Get);
        builder.set_url_template("/users/{id}/files/{path}");
        builder.add_path_param("id", "a/b c", false).expect("id");
        builder.add_path_param("path", "x/y", true).expect("path");

        let request = builder.build().expect("build");
        assert_eq!(
            request.url().as_str(),
            "http://example.com/users/a%2Fb%20c/files/x/y"
        );
    }

    #[test]
    fn path_param_without_relative_url() {
        let mut builder = builder(Method::Get);
        let err = builder
            .add_path_param("id", "1", false)
            .expect_err("no url");
        assert_eq!(
            err.to_string(),
            "invalid request: path parameter \"id\" requires a relative URL"
        );
    }

    #[test]
    fn unresolved_path_param() {
        let mut builder = builder(Method::Get);
        builder.set_url_template("/users/{id}/posts/{post}");
        builder.add_path_param("id", "1", false).expect("id");
        let err = builder.build().expect_err("unresolved");
        assert_eq!(
            err.to_string(),
            "invalid request: missing value for path parameter \"post\""
        );
    }

    #[test]
    fn verbatim_relative_url_keeps_braces() {
        let mut builder = builder(Method::Get);
        builder.set_url_template("/users/{id}");
        builder.set_relative_url("/search?filter={active}");

        let request = builder.build().expect("build");
        assert_eq!(request.url().path(), "/search");
        assert_eq!(request.url().query(), Some("filter={active}"));
    }

    #[test]
    fn encoded_path_value_with_braces() {
        let mut builder = builder(Method::Get);
        builder.set_url_template("/items/{id}");
        builder.add_path_param("id", "{x}", true).expect("id");

        let request = builder.build().expect("build");
        assert_eq!(request.url().path(), "/items/%7Bx%7D");
    }

    #[test]
    fn service_url_replaces_base() {
        let mut builder = builder(Method::Get);
        builder.set_service_url("http://www.baidu.com");
        builder.set_relative_url("/foo");

        let request = builder.build().expect("build");
        assert_eq!(request.url().as_str(), "http://www.baidu.com/foo");
    }

    #[test]
    fn empty_service_url_keeps_base() {
        let mut builder = builder(Method::Get);
        builder.set_service_url("");
        builder.set_relative_url("/foo");

        let request = builder.build().expect("build");
        assert_eq!(request.url().as_str(), "http://example.com/foo");
    }

    #[test]
    fn duplicate_headers_accumulate() {
        let mut builder = builder(Method::Get);
        builder.add_header("Accept", "text/plain");
        builder.add_header("Accept", "application/json");

        let request = builder.build().expect("build");
        assert_eq!(
            request.header_values("accept"),
            vec!["text/plain", "application/json"]
        );
        assert_eq!(request.header("Accept"), Some("text/plain"));
    }

    #[test]
    fn form_fields_body() {
        let mut builder = builder(Method::Post);
        builder.add_form_field("name", "John Doe", false);
        builder.add_form_field("raw", "a%20b", true);

        let request = builder.build().expect("build");
        assert_eq!(
            request.header("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            request.body().expect("body").as_ref(),
            b"name=John+Doe&raw=a%20b"
        );
    }

    #[test]
    fn body_sets_content_type() {
        let mut builder = builder(Method::Put);
        builder.set_body(RequestBody::text("hello"));

        let request = builder.build().expect("build");
        assert_eq!(
            request.header("content-type"),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(request.body().expect("body").as_ref(), b"hello");
    }

    #[test]
    fn explicit_content_type_wins() {
        let mut builder = builder(Method::Post);
        builder.add_header("Content-Type", "application/vnd.custom+json");
        builder.set_body(RequestBody::json(&[1, 2]).expect("json"));

        let request = builder.build().expect("build");
        assert_eq!(
            request.header_values("Content-Type"),
            vec!["application/vnd.custom+json"]
        );
    }

    #[test]
    fn multipart_body() {
        let mut builder = builder(Method::Post);
        builder.add_part(Part::text("a", "1"));
        builder.add_part_with_headers(
            vec![(
                "Content-Disposition".to_string(),
                "form-data; name=\"b\"".to_string(),
            )],
            RequestBody::text("2"),
        );

        let request = builder.build().expect("build");
        let content_type = request.header("Content-Type").expect("content type");
        assert!(content_type.starts_with("multipart/form-data; boundary=----TetherBoundary"));

        let body = String::from_utf8_lossy(request.body().expect("body"));
        assert!(body.contains("name=\"a\""));
        assert!(body.contains("name=\"b\""));
    }

    #[test]
    fn body_rejected_for_get() {
        let mut builder = builder(Method::Get);
        builder.set_body(RequestBody::text("x"));
        let err = builder.build().expect_err("GET body");
        assert_eq!(
            err.to_string(),
            "invalid request: GET requests cannot carry a body"
        );
    }

    #[test]
    fn mixed_payloads_rejected() {
        let mut builder = builder(Method::Post);
        builder.set_body(RequestBody::text("x"));
        builder.add_form_field("a", "b", false);
        assert!(builder.build().is_err());
    }

    #[test]
    fn into_http_request() {
        let mut builder = builder(Method::Post);
        builder.set_relative_url("/users");
        builder.add_header("X-Trace", "1");
        builder.set_body(RequestBody::text("body"));

        let request = http::Request::try_from(builder.build().expect("build")).expect("http");
        assert_eq!(request.method(), http::Method::POST);
        assert_eq!(request.uri().to_string(), "http://example.com/users");
        assert_eq!(
            request
                .headers()
                .get("x-trace")
                .and_then(|value| value.to_str().ok()),
            Some("1")
        );
        assert_eq!(request.body().as_ref(), b"body");
    }
}
