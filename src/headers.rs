//! Case-insensitive header handling
//!
//! Headers are kept as an ordered list of name/value pairs so that the
//! caller's iteration order survives until normalization. Lookups fold case;
//! when several stored names fold to the same key, the one encountered last
//! wins.

use crate::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// An ordered collection of header name/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, keeping any earlier entry with the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Remove every entry whose name matches case-insensitively
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }

    /// Look up a header value case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        lookup(self, name)
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no headers are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Find `name` among `headers`, ignoring case.
///
/// If more than one stored name folds to `name`, the last one in iteration
/// order wins.
pub fn lookup<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .entries
        .iter()
        .rev()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Fold all names to lower case; the last write for each name wins and the
/// position of its first appearance is kept.
pub fn normalize(headers: &Headers) -> Headers {
    let mut normalized: Vec<(String, String)> = Vec::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let name = name.to_ascii_lowercase();
        match normalized.iter_mut().find(|(key, _)| *key == name) {
            Some(existing) => existing.1 = value.to_string(),
            None => normalized.push((name, value.to_string())),
        }
    }
    Headers {
        entries: normalized,
    }
}

/// Convert transport headers into canonical (lower-case) form.
///
/// Repeated headers are joined with `", "`.
pub fn from_header_map(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for name in map.keys() {
        let value = map
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        headers.insert(name.as_str(), value);
    }
    headers
}

/// Convert headers into an `http::HeaderMap`, rejecting invalid names or values
pub fn to_header_map(headers: &Headers) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::InvalidRequest(format!("Invalid header name: {}", name)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| Error::InvalidRequest(format!("Invalid value for header {}", name)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
