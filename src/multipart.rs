//! `multipart/form-data` bodies for file uploads
//!
//! The body is serialized here rather than by a backend so that every
//! backend sends the same bytes.

use bytes::{BufMut, Bytes, BytesMut};

/// A part of multipart form data
#[derive(Debug, Clone)]
pub struct MultipartPart {
    /// Field name
    pub name: String,
    /// Content
    pub content: Bytes,
    /// Content type
    pub content_type: Option<String>,
    /// Filename
    pub filename: Option<String>,
}

impl MultipartPart {
    /// Create a file part
    pub fn file(
        name: impl Into<String>,
        content: impl Into<Bytes>,
        filename: impl Into<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            content_type,
            filename: Some(filename.into()),
        }
    }
}

/// A multipart form with a fixed boundary
#[derive(Debug, Clone)]
pub struct Form {
    boundary: String,
    parts: Vec<MultipartPart>,
}

impl Form {
    /// Create an empty form with a random boundary
    pub fn new() -> Self {
        Self::with_boundary(format!("----tether-{:032x}", rand::random::<u128>()))
    }

    /// Create an empty form with the given boundary
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Add a part
    pub fn part(mut self, part: MultipartPart) -> Self {
        self.parts.push(part);
        self
    }

    /// The boundary separating parts
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The `Content-Type` header value for this form
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serialize the form
    pub fn to_bytes(&self) -> Bytes {
        let capacity = self
            .parts
            .iter()
            .map(|part| part.content.len() + self.boundary.len() + 128)
            .sum::<usize>()
            + self.boundary.len()
            + 8;
        let mut buf = BytesMut::with_capacity(capacity);

        for part in &self.parts {
            buf.put_slice(b"--");
            buf.put_slice(self.boundary.as_bytes());
            buf.put_slice(b"\r\n");

            let mut disposition = format!(
                "Content-Disposition: form-data; name=\"{}\"",
                escape_quoted(&part.name)
            );
            if let Some(filename) = &part.filename {
                disposition.push_str(&format!("; filename=\"{}\"", escape_quoted(filename)));
            }
            buf.put_slice(disposition.as_bytes());
            buf.put_slice(b"\r\n");

            if let Some(content_type) = &part.content_type {
                buf.put_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }

            buf.put_slice(b"\r\n");
            buf.put_slice(&part.content);
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--\r\n");
        buf.freeze()
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

/// Percent-encode the characters a browser `FormData` encodes inside a
/// quoted disposition parameter
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
