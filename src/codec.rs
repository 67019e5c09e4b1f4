//! Content-type driven body encoding and decoding
//!
//! Content types are matched by case-sensitive prefix in a fixed order:
//! JSON, then form-urlencoded, then multipart. A multipart request on the
//! generic request path is encoded exactly like a form; only uploads build a
//! real multipart body (see [`multipart`](crate::multipart)).

use crate::body::{Body, ResponseData, WireBody};
use crate::{Error, Result};
use serde_json::Value;
use url::form_urlencoded;

/// `application/json`
pub const JSON: &str = "application/json";
/// `application/x-www-form-urlencoded`
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
/// `multipart/form-data`
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Encoding strategy selected from a content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Serialize as JSON text
    Json,
    /// Serialize as `k=v&k2=v2`
    Form,
    /// Leave the body alone
    Passthrough,
}

impl Encoding {
    /// Pick the strategy for a declared content type
    pub fn for_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.starts_with(JSON) => Encoding::Json,
            Some(ct) if ct.starts_with(FORM_URLENCODED) => Encoding::Form,
            Some(ct) if ct.starts_with(MULTIPART_FORM_DATA) => Encoding::Form,
            _ => Encoding::Passthrough,
        }
    }
}

/// Encode `body` according to the declared `content_type`
pub fn encode(content_type: Option<&str>, body: Body) -> Result<WireBody> {
    let value = match body {
        Body::Empty => return Ok(WireBody::Empty),
        Body::Bytes(bytes) => return Ok(WireBody::Bytes(bytes)),
        Body::Data(value) => value,
    };

    match Encoding::for_content_type(content_type) {
        Encoding::Json => Ok(WireBody::Text(value.to_string())),
        Encoding::Form => encode_form(&value).map(WireBody::Text),
        Encoding::Passthrough => Ok(WireBody::Unencoded(value)),
    }
}

/// Encode the top-level pairs of an object as a form body.
///
/// Keys keep the object's iteration order and each value is coerced to a
/// string first.
pub fn encode_form(value: &Value) -> Result<String> {
    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => return Ok(String::new()),
        other => {
            return Err(Error::InvalidRequest(format!(
                "Form body must be an object, got {}",
                json_type_name(other)
            )));
        }
    };

    Ok(fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                form_urlencoded::byte_serialize(key.as_bytes()).collect::<String>(),
                form_urlencoded::byte_serialize(coerce_to_string(value).as_bytes())
                    .collect::<String>()
            )
        })
        .collect::<Vec<_>>()
        .join("&"))
}

/// Decode a response body according to its declared `content_type`.
///
/// JSON bodies must parse; anything else is returned as text. An empty body
/// is always empty text.
pub fn decode(content_type: Option<&str>, raw: &[u8]) -> Result<ResponseData> {
    if raw.is_empty() {
        return Ok(ResponseData::Text(String::new()));
    }

    match content_type {
        Some(ct) if ct.starts_with(JSON) => serde_json::from_slice(raw)
            .map(ResponseData::Json)
            .map_err(Error::Decode),
        _ => Ok(ResponseData::Text(String::from_utf8_lossy(raw).into_owned())),
    }
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(coerce_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
