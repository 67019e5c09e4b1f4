//! File uploads as `multipart/form-data`

use crate::backend::types::ExtraOptions;
use crate::fs::FileRef;
use crate::headers::Headers;
use crate::request::{append_params, validate_url};
use crate::{Client, Result};
use bytes::Bytes;
use url::Url;

/// Field name used when none is given
pub const DEFAULT_FIELD_NAME: &str = "file";

/// Where the uploaded content comes from
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// A file owned by the filesystem collaborator
    File(FileRef),
    /// In-memory content
    Blob {
        /// The content
        content: Bytes,
        /// Filename reported in the multipart part
        filename: String,
    },
}

/// Description of a file upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Absolute URL
    pub url: String,
    /// Multipart field name
    pub name: String,
    /// Content to upload
    pub source: UploadSource,
    /// Content type of the file part; `application/octet-stream` if unset
    pub content_type: Option<String>,
    /// Extra headers; any `Content-Type` is replaced by the multipart one
    pub headers: Headers,
    /// Query parameters appended to `url`
    pub params: Vec<(String, String)>,
    /// Options passed to the backend untouched
    pub extra: ExtraOptions,
}

impl UploadRequest {
    /// Upload `source` to `url` under the default field name
    pub fn new(url: impl Into<String>, source: UploadSource) -> Self {
        Self {
            url: url.into(),
            name: DEFAULT_FIELD_NAME.to_string(),
            source,
            content_type: None,
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

/// Builder for uploading a file.
///
/// # Examples
///
/// ```no_run
/// use tether::{Client, FileRef};
///
/// # async fn example() -> tether::Result<()> {
/// let client = Client::new()?;
/// client
///     .upload("https://example.com/upload")
///     .name("avatar")
///     .from_file(FileRef::new("avatar.png"))
///     .content_type("image/png")
///     .send()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UploadBuilder {
    client: Client,
    url: String,
    name: String,
    source: Option<UploadSource>,
    content_type: Option<String>,
    headers: Headers,
    params: Vec<(String, String)>,
    extra: ExtraOptions,
}

impl UploadBuilder {
    pub(crate) fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            name: DEFAULT_FIELD_NAME.to_string(),
            source: None,
            content_type: None,
            headers: Headers::new(),
            params: Vec::new(),
            extra: ExtraOptions::new(),
        }
    }

    /// Set the multipart field name (default `file`)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Upload a file owned by the filesystem collaborator.
    /// If both `from_file()` and `from_data()` are called, the last one wins.
    pub fn from_file(mut self, file: FileRef) -> Self {
        self.source = Some(UploadSource::File(file));
        self
    }

    /// Upload in-memory content under `filename`
    pub fn from_data(mut self, content: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        self.source = Some(UploadSource::Blob {
            content: content.into(),
            filename: filename.into(),
        });
        self
    }

    /// Set the content type of the file part
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add a header to the upload request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set a backend option
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Send the upload
    pub async fn send(self) -> Result<()> {
        let source = self.source.ok_or_else(|| {
            crate::Error::InvalidRequest("Upload source not specified".to_string())
        })?;

        let request = UploadRequest {
            url: self.url,
            name: self.name,
            source,
            content_type: self.content_type,
            headers: self.headers,
            params: self.params,
            extra: self.extra,
        };
        self.client.upload_file(request).await
    }
}
