//! Service-wide values feeding templated class-level handlers.

use std::collections::HashMap;
use std::sync::Arc;

/// Supplies the value of a class-level placeholder at call time.
///
/// Each method receives the placeholder key of the handler asking for it.
/// Returning `None` is a null value: the header or query is skipped and the
/// URL template substitutes an empty string.
pub trait ParamProvider: Send + Sync {
    /// Value for a templated header.
    fn header_param(&self, name: &str) -> Option<String>;

    /// Value for a templated query parameter.
    fn query_param(&self, name: &str) -> Option<String>;

    /// Value for a templated base URL.
    fn url_param(&self, name: &str) -> Option<String>;
}

impl<P: ParamProvider + ?Sized> ParamProvider for Arc<P> {
    fn header_param(&self, name: &str) -> Option<String> {
        (**self).header_param(name)
    }

    fn query_param(&self, name: &str) -> Option<String> {
        (**self).query_param(name)
    }

    fn url_param(&self, name: &str) -> Option<String> {
        (**self).url_param(name)
    }
}

/// A [`ParamProvider`] backed by fixed key/value tables.
///
/// # Example
///
/// ```
/// use tether::{ParamProvider, StaticParams};
///
/// let params = StaticParams::new()
///     .header("token", "abc")
///     .url("base", "https://api.example.com");
///
/// assert_eq!(params.header_param("token").as_deref(), Some("abc"));
/// assert_eq!(params.query_param("token"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticParams {
    headers: HashMap<String, String>,
    queries: HashMap<String, String>,
    urls: HashMap<String, String>,
}

impl StaticParams {
    /// Empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header value.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a query value.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.queries.insert(name.into(), value.into());
        self
    }

    /// Set a URL value.
    #[must_use]
    pub fn url(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.urls.insert(name.into(), value.into());
        self
    }
}

impl ParamProvider for StaticParams {
    fn header_param(&self, name: &str) -> Option<String> {
        self.headers.get(name).cloned()
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.queries.get(name).cloned()
    }

    fn url_param(&self, name: &str) -> Option<String> {
        self.urls.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_params_lookup() {
        let params = StaticParams::new()
            .header("h", "1")
            .query("q", "2")
            .url("u", "http://example.com");

        assert_eq!(params.header_param("h").as_deref(), Some("1"));
        assert_eq!(params.query_param("q").as_deref(), Some("2"));
        assert_eq!(params.url_param("u").as_deref(), Some("http://example.com"));
        assert_eq!(params.header_param("q"), None);
    }

    #[test]
    fn shared_provider() {
        let shared: Arc<dyn ParamProvider> = Arc::new(StaticParams::new().query("q", "v"));
        assert_eq!(shared.query_param("q").as_deref(), Some("v"));
    }
}
