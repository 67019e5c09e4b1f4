//! Downloads into memory or onto disk

use crate::backend::types::ExtraOptions;
use crate::fs::FileRef;
use crate::headers::Headers;
use crate::request::{append_params, validate_url};
use crate::{Client, Result};
use bytes::Bytes;
use std::path::PathBuf;
use url::Url;

/// Where downloaded content ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    /// Kept in memory
    Blob(Bytes),
    /// Written by the filesystem collaborator to this path
    Path(PathBuf),
}

/// Response from a completed download operation
#[derive(Debug, Clone)]
pub struct DownloadResponse {
    /// HTTP status code; a non-2xx status still carries its payload
    pub status: u16,
    /// Total bytes downloaded
    pub bytes_downloaded: u64,
    /// The payload or where it was saved
    pub content: Download,
}

impl DownloadResponse {
    /// The in-memory payload, if the download was not written to disk
    pub fn blob(&self) -> Option<&Bytes> {
        match &self.content {
            Download::Blob(bytes) => Some(bytes),
            Download::Path(_) => None,
        }
    }

    /// The saved file path, if the download was written to disk
    pub fn path(&self) -> Option<&PathBuf> {
        match &self.content {
            Download::Blob(_) => None,
            Download::Path(path) => Some(path),
        }
    }
}

/// Description of a download
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Absolute URL
    pub url: String,
    /// Where to save the payload; kept in memory when `None`
    pub destination: Option<FileRef>,
    /// Request headers
    pub headers: Headers,
    /// Query parameters appended to `url`
    pub params: Vec<(String, String)>,
    /// Options passed to the backend untouched
    pub extra: ExtraOptions,
}

impl DownloadRequest {
    /// Download `url` into memory
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            destination: None,
            headers: Headers::new(),
            params: Vec::new(),
            extra: ExtraOptions::new(),
        }
    }

    pub(crate) fn resolved_url(&self) -> Result<Url> {
        let mut url = validate_url(&self.url)?;
        append_params(&mut url, &self.params);
        Ok(url)
    }
}

/// Builder for downloading a URL.
///
/// # Examples
///
/// ```no_run
/// use tether::{Client, Directory, FileRef};
///
/// # async fn example() -> tether::Result<()> {
/// let client = Client::new()?;
/// let response = client
///     .download("https://example.com/report.pdf")
///     .to_file(FileRef::in_directory("reports/latest.pdf", Directory::Cache))
///     .send()
///     .await?;
///
/// println!("Saved {} bytes to {:?}", response.bytes_downloaded, response.path());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DownloadBuilder {
    client: Client,
    request: DownloadRequest,
}

impl DownloadBuilder {
    pub(crate) fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            request: DownloadRequest::new(url),
        }
    }

    /// Save the payload through the filesystem collaborator instead of
    /// returning it in memory
    pub fn to_file(mut self, file: FileRef) -> Self {
        self.request.destination = Some(file);
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.insert(name, value);
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.params.push((key.into(), value.into()));
        self
    }

    /// Set a backend option
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.request.extra.insert(key.into(), value.into());
        self
    }

    /// Execute the download
    pub async fn send(self) -> Result<DownloadResponse> {
        self.client.download_file(self.request).await
    }
}
