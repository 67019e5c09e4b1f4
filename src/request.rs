//! Request types and builders

use crate::backend::types::ExtraOptions;
use crate::body::Body;
use crate::headers::Headers;
use crate::{Client, Result, codec};
use http::Method;
use serde::Serialize;
use url::Url;

/// Description of an HTTP request.
///
/// `url` must already be absolute; the client never joins it onto a base.
#[derive(Debug, Clone)]
pub struct Request {
    /// Absolute URL
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Headers; names are case-insensitive and the last write wins
    pub headers: Headers,
    /// Query parameters appended to `url` in order
    pub params: Vec<(String, String)>,
    /// Body, encoded according to the `Content-Type` header
    pub body: Body,
    /// Options passed to the backend untouched
    pub extra: ExtraOptions,
}

impl Request {
    /// Create a request with no headers or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Headers::new(),
            params: Vec::new(),
            body: Body::Empty,
            extra: ExtraOptions::new(),
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Create a PUT request
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Create a PATCH request
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// Create a DELETE request
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Create a HEAD request
    pub fn head(url: impl Into<String>) -> Self {
        Self::new(Method::HEAD, url)
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a backend option
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Check the URL and append the query parameters
    pub(crate) fn resolved_url(&self) -> Result<Url> {
        let mut url = validate_url(&self.url)?;
        append_params(&mut url, &self.params);
        Ok(url)
    }
}

/// Parse `url`, requiring an absolute `http` or `https` URL
pub(crate) fn validate_url(url: &str) -> Result<Url> {
    if url.trim().is_empty() {
        return Err(crate::Error::InvalidRequest("URL is required".to_string()));
    }

    let parsed = Url::parse(url)
        .map_err(|e| crate::Error::InvalidRequest(format!("Invalid URL {:?}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(parsed),
        scheme => Err(crate::Error::InvalidRequest(format!(
            "Unsupported URL {:?}: expected an http or https URL, got scheme {:?}",
            url, scheme
        ))),
    }
}

pub(crate) fn append_params(url: &mut Url, params: &[(String, String)]) {
    if params.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in params {
        pairs.append_pair(key, value);
    }
}

/// Builder for a request bound to a [`Client`]
#[derive(Debug)]
pub struct RequestBuilder {
    client: Client,
    request: Result<Request>,
}

impl RequestBuilder {
    pub(crate) fn new(client: Client, method: Method, url: &str) -> Self {
        Self {
            client,
            request: Ok(Request::new(method, url)),
        }
    }

    fn map(mut self, f: impl FnOnce(Request) -> Result<Request>) -> Self {
        self.request = self.request.and_then(f);
        self
    }

    /// Add a header
    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|request| Ok(request.header(name, value)))
    }

    /// Add a query parameter
    pub fn param(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|request| Ok(request.param(key, value)))
    }

    /// Set the body
    pub fn body(self, body: impl Into<Body>) -> Self {
        self.map(|request| Ok(request.body(body)))
    }

    /// Send `value` as JSON, setting `Content-Type: application/json`
    pub fn json(self, value: impl Serialize) -> Self {
        self.map(|request| {
            let body = Body::data(value)?;
            Ok(request.header("Content-Type", codec::JSON).body(body))
        })
    }

    /// Send `value` as form pairs, setting
    /// `Content-Type: application/x-www-form-urlencoded`
    pub fn form(self, value: impl Serialize) -> Self {
        self.map(|request| {
            let body = Body::data(value)?;
            Ok(request
                .header("Content-Type", codec::FORM_URLENCODED)
                .body(body))
        })
    }

    /// Set a backend option
    pub fn extra(self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.map(|request| Ok(request.extra(key, value)))
    }

    /// Build the request without sending it
    pub fn build(self) -> Result<Request> {
        self.request
    }

    /// Send the request
    pub async fn send(self) -> Result<crate::Response> {
        let request = self.request?;
        self.client.request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/api").is_ok());
        assert!(validate_url("http://127.0.0.1:8080").is_ok());

        for bad in ["", "   ", "/relative/path", "example.com", "ftp://example.com/x", "mailto:a@b.c"] {
            let err = validate_url(bad).unwrap_err();
            assert!(err.is_invalid_request(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_params_are_appended_in_order() {
        let request = Request::get("https://example.com/search?lang=en")
            .param("q", "rust http")
            .param("page", "2");
        let url = request.resolved_url().unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?lang=en&q=rust+http&page=2");
    }

    #[test]
    fn test_builder_methods() {
        let request = Request::post("https://example.com/items")
            .header("X-Trace", "1")
            .body(serde_json::json!({"a": 1}))
            .extra("readTimeout", 500);

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers.get("x-trace"), Some("1"));
        assert_eq!(request.body, Body::Data(serde_json::json!({"a": 1})));
        assert_eq!(request.extra.get("readTimeout"), Some(&serde_json::json!(500)));
    }
}
