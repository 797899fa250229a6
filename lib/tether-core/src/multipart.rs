//! Multipart form data parts.
//!
//! A [`Part`] is a set of part headers plus a [`RequestBody`]. Parts are
//! accumulated on the [`RequestBuilder`](crate::RequestBuilder) by the part
//! handlers, then encoded into a single `multipart/form-data` payload when the
//! request is built.
//!
//! # Example
//!
//! ```
//! use tether_core::{Part, RequestBody};
//!
//! let part = Part::form_data("avatar", RequestBody::bytes(vec![0x89, 0x50]))
//!     .with_filename("photo.png");
//! assert_eq!(part.name(), Some("avatar"));
//! ```

use std::fmt::Write as _;

use bytes::{BufMut, Bytes, BytesMut};

use crate::RequestBody;

/// Header carrying the form field name of a part.
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";

/// Header carrying the transfer encoding of a part.
pub const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";

/// A single part in a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    headers: Vec<(String, String)>,
    body: RequestBody,
}

impl Part {
    /// Create a part from explicit headers and a body.
    #[must_use]
    pub fn new(headers: Vec<(String, String)>, body: RequestBody) -> Self {
        Self { headers, body }
    }

    /// Create a `form-data` part named `name`.
    #[must_use]
    pub fn form_data(name: &str, body: RequestBody) -> Self {
        Self::new(
            vec![(
                CONTENT_DISPOSITION.to_string(),
                format!("form-data; name=\"{name}\""),
            )],
            body,
        )
    }

    /// Create a text part.
    #[must_use]
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self::form_data(name, RequestBody::text(value))
    }

    /// Append a filename to the `Content-Disposition` header.
    #[must_use]
    pub fn with_filename(mut self, filename: &str) -> Self {
        if let Some((_, disposition)) = self
            .headers
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(CONTENT_DISPOSITION))
        {
            let _ = write!(disposition, "; filename=\"{filename}\"");
        }
        self
    }

    /// Add a part header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Part headers, in insertion order.
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

    /// The form field name from `Content-Disposition`, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        disposition_name(&self.headers)
    }

    /// The part body.
    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }
}

/// The `name="..."` value of the `Content-Disposition` header in `headers`.
pub(crate) fn disposition_name(headers: &[(String, String)]) -> Option<&str> {
    let (_, disposition) = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(CONTENT_DISPOSITION))?;
    let start = disposition.find("name=\"")? + "name=\"".len();
    let rest = disposition.get(start..)?;
    let end = rest.find('"')?;
    rest.get(..end)
}

/// Encode parts into a `multipart/form-data` payload.
///
/// Returns a tuple of (content-type header value, body bytes).
#[must_use]
pub fn encode_multipart(parts: &[Part], boundary: &str) -> (String, Bytes) {
    let mut buf = BytesMut::new();

    for part in parts {
        buf.put_slice(b"--");
        buf.put_slice(boundary.as_bytes());
        buf.put_slice(b"\r\n");

        for (name, value) in &part.headers {
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        }

        if let Some(content_type) = part.body.content_type() {
            buf.put_slice(b"Content-Type: ");
            buf.put_slice(content_type.as_bytes());
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(b"Content-Length: ");
        buf.put_slice(part.body.len().to_string().as_bytes());
        buf.put_slice(b"\r\n\r\n");

        buf.put_slice(part.body.data());
        buf.put_slice(b"\r\n");
    }

    buf.put_slice(b"--");
    buf.put_slice(boundary.as_bytes());
    buf.put_slice(b"--\r\n");

    (
        format!("multipart/form-data; boundary={boundary}"),
        buf.freeze(),
    )
}

/// Generate a boundary string.
#[must_use]
pub fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    format!("----TetherBoundary{timestamp:x}")
}
