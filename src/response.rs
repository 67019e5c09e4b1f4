//! Response handling

use crate::body::ResponseData;
use crate::headers::Headers;
use serde::Serialize;

/// Uniform result of a request, whatever backend performed it.
///
/// Any status code is reported here; a 404 is data, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Decoded body
    pub data: ResponseData,
    /// Headers with lower-case names
    pub headers: Headers,
}

impl Response {
    /// Get the response status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status indicates a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The decoded body
    pub fn data(&self) -> &ResponseData {
        &self.data
    }

    /// Deserialize a JSON body into `T`
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        self.data.json()
    }
}
