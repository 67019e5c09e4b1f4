//! Request and response body types

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

/// Request body as supplied by the caller.
///
/// How the body reaches the wire depends on the request's declared
/// `Content-Type`, see [`codec::encode`](crate::codec::encode).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body
    #[default]
    Empty,

    /// Structured data; key order is preserved
    Data(Value),

    /// Raw bytes, always sent as-is
    Bytes(Bytes),
}

impl Body {
    /// Create an empty body
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Create a body from any serializable value
    pub fn data(value: impl Serialize) -> crate::Result<Self> {
        serde_json::to_value(value)
            .map(Self::Data)
            .map_err(|e| crate::Error::InvalidRequest(format!("Body is not serializable: {}", e)))
    }

    /// Create a body from raw bytes
    pub fn bytes(content: impl Into<Bytes>) -> Self {
        Self::Bytes(content.into())
    }

    /// Whether the body is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

impl From<String> for Body {
    fn from(content: String) -> Self {
        Self::Data(Value::String(content))
    }
}

impl From<&str> for Body {
    fn from(content: &str) -> Self {
        Self::Data(Value::String(content.to_string()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(content: Vec<u8>) -> Self {
        Self::Bytes(content.into())
    }
}

impl From<Bytes> for Body {
    fn from(content: Bytes) -> Self {
        Self::Bytes(content)
    }
}

/// Body after content-type driven encoding, ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub enum WireBody {
    /// Nothing to send
    Empty,

    /// Encoded text (JSON or form pairs)
    Text(String),

    /// Raw bytes
    Bytes(Bytes),

    /// No encoding applied; the backend decides how to send the value
    Unencoded(Value),
}

impl WireBody {
    /// Whether there is nothing to send
    pub fn is_empty(&self) -> bool {
        matches!(self, WireBody::Empty)
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// Parsed JSON
    Json(Value),
    /// Raw text
    Text(String),
}

impl ResponseData {
    /// The parsed JSON value, if the response was JSON
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            ResponseData::Text(_) => None,
        }
    }

    /// The raw text, if the response was not JSON
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Json(_) => None,
            ResponseData::Text(text) => Some(text),
        }
    }

    /// Deserialize JSON data into `T`
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        match self {
            ResponseData::Json(value) => {
                T::deserialize(value).map_err(crate::Error::Decode)
            }
            ResponseData::Text(text) => serde_json::from_str(text).map_err(crate::Error::Decode),
        }
    }
}
