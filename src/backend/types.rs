//! Shared types between backend implementations

use crate::body::WireBody;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Method, StatusCode};
use tokio::sync::mpsc;
use url::Url;

/// Backend-specific options passed through untouched by the core
pub type ExtraOptions = serde_json::Map<String, serde_json::Value>;

/// Platform-agnostic HTTP request
#[derive(Debug)]
pub struct BackendRequest {
    /// HTTP method for the request
    pub method: Method,
    /// URL for the request
    pub url: Url,
    /// Headers for the request
    pub headers: HeaderMap,
    /// Encoded body
    pub body: WireBody,
    /// Options only the backend interprets
    pub extra: ExtraOptions,
}

/// Platform-agnostic HTTP response
pub struct BackendResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Stream of response body bytes
    pub body_receiver: mpsc::Receiver<Result<Bytes, crate::Error>>,
}

impl BackendResponse {
    /// Build a response whose body is already in memory
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let (tx, rx) = mpsc::channel(1);
        if !body.is_empty() {
            // Capacity 1 and a fresh channel, so this cannot fail
            let _ = tx.try_send(Ok(body));
        }
        Self {
            status,
            headers,
            body_receiver: rx,
        }
    }

    /// Drain the body stream into a single buffer
    pub async fn bytes(&mut self) -> Result<Bytes, crate::Error> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.body_receiver.recv().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl std::fmt::Debug for BackendResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
