//! Reqwest backend for cross-platform HTTP support

use crate::backend::types::{BackendRequest, BackendResponse};
use crate::backend::{BackendConfig, Transport};
use crate::body::WireBody;
use crate::{Error, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Extra option holding a per-request timeout in milliseconds
pub const READ_TIMEOUT_OPTION: &str = "readTimeout";

/// Reqwest backend for cross-platform HTTP
#[derive(Clone, Debug)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Create a new Reqwest backend
    pub fn new() -> Result<Self> {
        Self::with_config(BackendConfig::default())
    }

    /// Create a new Reqwest backend with configuration
    pub fn with_config(config: BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if let Some(default_headers) = config.default_headers {
            builder = builder.default_headers(default_headers);
        }

        if let Some(jar) = config.cookie_jar {
            builder = builder.cookie_provider(Arc::new(jar));
        }

        let client = builder
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create reqwest client: {}", e)))?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    fn convert_body(body: WireBody) -> Option<reqwest::Body> {
        match body {
            WireBody::Empty => None,
            WireBody::Text(text) => Some(reqwest::Body::from(text)),
            WireBody::Bytes(bytes) => Some(reqwest::Body::from(bytes)),
            // Unencoded values go out as their natural text form
            WireBody::Unencoded(Value::Null) => None,
            WireBody::Unencoded(Value::String(text)) => Some(reqwest::Body::from(text)),
            WireBody::Unencoded(value) => Some(reqwest::Body::from(value.to_string())),
        }
    }
}

#[async_trait]
impl Transport for ReqwestBackend {
    async fn execute(&self, request: BackendRequest) -> Result<BackendResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let mut req_builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(timeout) = request
            .extra
            .get(READ_TIMEOUT_OPTION)
            .and_then(Value::as_u64)
        {
            req_builder = req_builder.timeout(Duration::from_millis(timeout));
        }

        if let Some(body) = Self::convert_body(request.body) {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().await.map_err(Error::from)?;

        let status = response.status();
        let headers = response.headers().clone();
        tracing::debug!(%status, "response received");

        // Create channel for streaming body
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(bytes) => {
                        if tx.send(Ok(bytes)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx
                            .send(Err(Error::network(format!("Stream error: {}", e))))
                            .await;
                        break;
                    }
                }
            }
        });

        Ok(BackendResponse {
            status,
            headers,
            body_receiver: rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_body_skips_empty_values() {
        assert!(ReqwestBackend::convert_body(WireBody::Empty).is_none());
        assert!(ReqwestBackend::convert_body(WireBody::Unencoded(Value::Null)).is_none());
    }

    #[test]
    fn test_convert_body_sends_text_forms() {
        let body = ReqwestBackend::convert_body(WireBody::Unencoded(json!("plain"))).unwrap();
        assert_eq!(body.as_bytes(), Some(&b"plain"[..]));

        let body = ReqwestBackend::convert_body(WireBody::Unencoded(json!({"a": 1}))).unwrap();
        assert_eq!(body.as_bytes(), Some(&br#"{"a":1}"#[..]));
    }

    #[test]
    fn test_with_config_accepts_cookie_jar() {
        let config = BackendConfig {
            timeout: Some(Duration::from_secs(5)),
            user_agent: Some("tether-test/1.0".into()),
            cookie_jar: Some(crate::CookieJar::new()),
            ..Default::default()
        };
        assert!(ReqwestBackend::with_config(config).is_ok());
    }
}
