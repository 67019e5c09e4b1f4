//! Shared test helpers

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tether::{BackendRequest, BackendResponse, Result, Transport, WireBody};

/// What the fake transport saw
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub url: url::Url,
    pub headers: HeaderMap,
    pub body: WireBody,
}

/// A canned reply
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: Bytes,
}

impl Reply {
    pub fn new(status: u16, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            headers: vec![("content-type", content_type.to_string())],
            body: body.into(),
        }
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

/// In-memory transport.
///
/// Multipart POSTs store the content of their first part under the URL path
/// and GETs on a stored path serve it back. Anything else gets the reply
/// registered for the path, or a 404.
#[derive(Clone, Default)]
pub struct FakeTransport {
    requests: Arc<Mutex<Vec<Recorded>>>,
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    stored: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, path: &str, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(path.to_string(), reply);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request was sent")
    }

    pub fn stored(&self, path: &str) -> Option<Bytes> {
        self.stored.lock().unwrap().get(path).cloned()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: BackendRequest) -> Result<BackendResponse> {
        let path = request.url.path().to_string();
        self.requests.lock().unwrap().push(Recorded {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
        });

        let boundary = request
            .headers
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split_once("boundary="))
            .map(|(_, boundary)| boundary.to_string());

        if let (true, Some(boundary), WireBody::Bytes(body)) =
            (request.method == Method::POST, boundary, &request.body)
        {
            let content = first_part_content(body, &boundary);
            self.stored.lock().unwrap().insert(path, content);
            return Ok(BackendResponse::from_bytes(
                StatusCode::OK,
                HeaderMap::new(),
                Bytes::new(),
            ));
        }

        if request.method == Method::GET {
            if let Some(content) = self.stored(&path) {
                let mut headers = HeaderMap::new();
                headers.insert(
                    "content-type",
                    HeaderValue::from_static("application/octet-stream"),
                );
                return Ok(BackendResponse::from_bytes(StatusCode::OK, headers, content));
            }
        }

        let reply = self.replies.lock().unwrap().get(&path).cloned();
        Ok(match reply {
            Some(reply) => {
                let mut headers = HeaderMap::new();
                for (name, value) in &reply.headers {
                    headers.append(
                        HeaderName::from_bytes(name.as_bytes()).unwrap(),
                        HeaderValue::from_str(value).unwrap(),
                    );
                }
                BackendResponse::from_bytes(reply.status, headers, reply.body)
            }
            None => BackendResponse::from_bytes(StatusCode::NOT_FOUND, HeaderMap::new(), Bytes::new()),
        })
    }
}

/// Content of the first part of a multipart body
pub fn first_part_content(body: &[u8], boundary: &str) -> Bytes {
    let header_end = find(body, b"\r\n\r\n").expect("part headers") + 4;
    let closing = format!("\r\n--{}", boundary);
    let content_end = header_end + find(&body[header_end..], closing.as_bytes()).expect("closing boundary");
    Bytes::copy_from_slice(&body[header_end..content_end])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
