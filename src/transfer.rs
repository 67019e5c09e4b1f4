//! Request/response exchange and file transfers
//!
//! The engine is the only place that talks to a [`Transport`](crate::backend::Transport).
//! It turns caller requests into [`BackendRequest`]s, and backend responses
//! into [`Response`]s or downloaded payloads.

use crate::backend::Backend;
use crate::backend::types::{BackendRequest, BackendResponse, ExtraOptions};
use crate::body::WireBody;
use crate::client::download::{Download, DownloadRequest, DownloadResponse};
use crate::client::upload::{UploadRequest, UploadSource};
use crate::headers::{self, Headers};
use crate::multipart::{Form, MultipartPart};
use crate::{Request, Response, Result, codec};
use http::Method;
use url::Url;

/// Executes exchanges against a backend
#[derive(Debug, Clone)]
pub struct TransferEngine {
    backend: Backend,
}

impl TransferEngine {
    /// Create an engine over `backend`
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Encode, send and decode a request
    pub async fn request(&self, request: Request) -> Result<Response> {
        let url = request.resolved_url()?;
        let effective = headers::normalize(&request.headers);
        let content_type = effective.get("content-type");
        let body = codec::encode(content_type, request.body)?;

        let mut response = self
            .send(request.method, url, &effective, body, request.extra)
            .await?;

        let raw = response.bytes().await?;
        let response_headers = headers::from_header_map(&response.headers);
        let data = codec::decode(response_headers.get("content-type"), &raw)?;

        Ok(Response {
            status: response.status.as_u16(),
            data,
            headers: response_headers,
        })
    }

    /// POST a single file as `multipart/form-data`
    pub async fn upload_file(&self, upload: UploadRequest) -> Result<()> {
        let url = upload.resolved_url()?;

        let (content, filename) = match upload.source {
            UploadSource::File(file) => {
                let content = self
                    .backend
                    .files()
                    .read_file(&file.path, file.directory)
                    .await?;
                let filename = file.file_name().to_string();
                (content, filename)
            }
            UploadSource::Blob { content, filename } => (content, filename),
        };

        let content_type = upload
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let form = Form::new().part(MultipartPart::file(
            upload.name,
            content,
            filename,
            Some(content_type),
        ));

        let mut effective = headers::normalize(&upload.headers);
        effective.remove("content-type");
        effective.insert("content-type", form.content_type());

        let mut response = self
            .send(
                Method::POST,
                url,
                &effective,
                WireBody::Bytes(form.to_bytes()),
                upload.extra,
            )
            .await?;
        // The acknowledgment carries nothing, but the body must be drained
        let _ = response.bytes().await?;

        if !response.status.is_success() {
            tracing::debug!(status = %response.status, "upload answered with non-success status");
        }
        Ok(())
    }

    /// GET a binary payload and keep it in memory or write it to disk
    pub async fn download_file(&self, download: DownloadRequest) -> Result<DownloadResponse> {
        let url = download.resolved_url()?;
        let effective = headers::normalize(&download.headers);

        let mut response = self
            .send(Method::GET, url, &effective, WireBody::Empty, download.extra)
            .await?;
        let payload = response.bytes().await?;
        let bytes_downloaded = payload.len() as u64;

        let content = match download.destination {
            Some(file) => {
                let path = self
                    .backend
                    .files()
                    .write_file(&file.path, file.directory, payload)
                    .await?;
                tracing::debug!(path = %path.display(), bytes_downloaded, "download saved");
                Download::Path(path)
            }
            None => Download::Blob(payload),
        };

        Ok(DownloadResponse {
            status: response.status.as_u16(),
            bytes_downloaded,
            content,
        })
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: &Headers,
        body: WireBody,
        extra: ExtraOptions,
    ) -> Result<BackendResponse> {
        let request = BackendRequest {
            method,
            url,
            headers: headers::to_header_map(headers)?,
            body,
            extra,
        };
        tracing::trace!(method = %request.method, url = %request.url, "dispatching to backend");
        self.backend.transport().execute(request).await
    }
}
