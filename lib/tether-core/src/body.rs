//! Request body representation and serialization helpers.

use bytes::Bytes;

use crate::Result;

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    FormUrlEncoded,
    /// Plain text content type (`text/plain; charset=utf-8`).
    PlainText,
    /// Binary content type (`application/octet-stream`).
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::PlainText => "text/plain; charset=utf-8",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A converted request body: optional media type plus payload.
///
/// This is what body, part and part-map handlers receive from their
/// converters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    content_type: Option<String>,
    data: Bytes,
}

impl RequestBody {
    /// Create a body with the given media type.
    #[must_use]
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            data: data.into(),
        }
    }

    /// Create a body without a media type.
    #[must_use]
    pub fn untyped(data: impl Into<Bytes>) -> Self {
        Self {
            content_type: None,
            data: data.into(),
        }
    }

    /// Create a `text/plain` body.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(ContentType::PlainText.as_str(), Bytes::from(value.into()))
    }

    /// Create an `application/octet-stream` body.
    #[must_use]
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::new(ContentType::OctetStream.as_str(), data)
    }

    /// Serialize a value into an `application/json` body.
    ///
    /// # Example
    ///
    /// ```
    /// use tether_core::RequestBody;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct User { name: String }
    ///
    /// let body = RequestBody::json(&User { name: "Alice".to_string() }).expect("serialize");
    /// assert_eq!(body.content_type(), Some("application/json"));
    /// assert_eq!(body.data().as_ref(), br#"{"name":"Alice"}"#);
    /// ```
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        let data = serde_json::to_vec(value)?;
        Ok(Self::new(ContentType::Json.as_str(), data))
    }

    /// Serialize a value into an `application/x-www-form-urlencoded` body.
    ///
    /// Uses `serde_html_form`, so `Vec<T>` fields become repeated keys.
    pub fn form<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        let data = serde_html_form::to_string(value)?;
        Ok(Self::new(ContentType::FormUrlEncoded.as_str(), data))
    }

    /// The media type, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The payload.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume into (content type, payload).
    #[must_use]
    pub fn into_parts(self) -> (Option<String>, Bytes) {
        (self.content_type, self.data)
    }
}
