//! HTTP client implementation

pub mod download;
pub mod upload;

pub use download::{Download, DownloadBuilder, DownloadRequest, DownloadResponse};
pub use upload::{UploadBuilder, UploadRequest, UploadSource};

use crate::backend::{Backend, BackendConfig, CookieStorage, Transport};
use crate::cookies::{self, Cookie};
use crate::fs::{FileSystem, LocalFileSystem};
use crate::request::RequestBuilder;
use crate::transfer::TransferEngine;
use crate::{CookieJar, Request, Response, Result};
use http::Method;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client for making requests.
///
/// Cloning is cheap; clones share the same backend.
///
/// # Examples
///
/// ```no_run
/// use tether::Client;
///
/// # async fn example() -> tether::Result<()> {
/// let client = Client::new()?;
/// let response = client
///     .post("https://example.com/api/items")
///     .json(serde_json::json!({"name": "Max", "age": 5}))
///     .send()
///     .await?;
///
/// if response.status() == 404 {
///     println!("not found: {:?}", response.data());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    backend: Backend,
    engine: TransferEngine,
}

impl Client {
    /// Create a new client with default configuration
    #[cfg(feature = "backend-reqwest")]
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client over an already assembled backend
    pub fn with_backend(backend: Backend) -> Self {
        Self {
            engine: TransferEngine::new(backend.clone()),
            backend,
        }
    }

    /// The backend this client dispatches to
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Create a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::GET, url)
    }

    /// Create a POST request
    pub fn post(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::POST, url)
    }

    /// Create a PUT request
    pub fn put(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::PUT, url)
    }

    /// Create a DELETE request
    pub fn delete(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::DELETE, url)
    }

    /// Create a PATCH request
    pub fn patch(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::PATCH, url)
    }

    /// Create a HEAD request
    pub fn head(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::HEAD, url)
    }

    /// Upload a file as `multipart/form-data`
    pub fn upload(&self, url: &str) -> UploadBuilder {
        UploadBuilder::new(self.clone(), url)
    }

    /// Download a URL into memory or onto disk
    pub fn download(&self, url: &str) -> DownloadBuilder {
        DownloadBuilder::new(self.clone(), url)
    }

    /// Execute a request.
    ///
    /// Fails with [`Error::InvalidRequest`](crate::Error::InvalidRequest)
    /// before anything is sent when the URL is missing or malformed.
    pub async fn request(&self, request: Request) -> Result<Response> {
        request.resolved_url()?;
        self.engine.request(request).await
    }

    /// Execute an upload
    pub async fn upload_file(&self, upload: UploadRequest) -> Result<()> {
        upload.resolved_url()?;
        self.engine.upload_file(upload).await
    }

    /// Execute a download
    pub async fn download_file(&self, download: DownloadRequest) -> Result<DownloadResponse> {
        download.resolved_url()?;
        self.engine.download_file(download).await
    }

    /// Set a cookie for `url`
    pub fn set_cookie(&self, url: &str, cookie: &Cookie) -> Result<()> {
        cookies::set_cookie(self.backend.cookies(), url, cookie)
    }

    /// Get the cookies visible to `url`
    pub fn get_cookies(&self, url: &str) -> Result<Vec<Cookie>> {
        cookies::get_cookies(self.backend.cookies(), url)
    }

    /// Delete the cookie named `key` for `url`
    pub fn delete_cookie(&self, url: &str, key: &str) -> Result<()> {
        cookies::delete_cookie(self.backend.cookies(), url, key)
    }

    /// Expire every cookie visible to `url`
    pub fn clear_cookies(&self, url: &str) -> Result<()> {
        cookies::clear_cookies(self.backend.cookies(), url)
    }
}

/// Builder for creating HTTP clients
#[derive(Default)]
pub struct ClientBuilder {
    config: BackendConfig,
    transport: Option<Arc<dyn Transport>>,
    cookie_storage: Option<Arc<dyn CookieStorage>>,
    file_system: Option<Arc<dyn FileSystem>>,
    files_root: Option<PathBuf>,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Add a default header, ignored if the name or value is invalid
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            http::HeaderName::from_bytes(name.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.config
                    .default_headers
                    .get_or_insert_with(http::HeaderMap::new)
                    .insert(name, value);
            }
            _ => tracing::warn!(%name, "ignoring invalid default header"),
        }
        self
    }

    /// Share a cookie jar with the transport and the cookie operations
    pub fn cookie_jar(mut self, cookie_jar: CookieJar) -> Self {
        self.config.cookie_jar = Some(cookie_jar);
        self
    }

    /// Use a custom transport instead of the platform default
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use a custom cookie storage
    pub fn cookie_storage(mut self, storage: impl CookieStorage + 'static) -> Self {
        self.cookie_storage = Some(Arc::new(storage));
        self
    }

    /// Use a custom filesystem collaborator
    pub fn file_system(mut self, files: impl FileSystem + 'static) -> Self {
        self.file_system = Some(Arc::new(files));
        self
    }

    /// Root directory for the default local filesystem
    pub fn files_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.files_root = Some(root.into());
        self
    }

    /// Build the client
    pub fn build(mut self) -> Result<Client> {
        let jar = self
            .config
            .cookie_jar
            .get_or_insert_with(CookieJar::new)
            .clone();

        let transport = match self.transport.take() {
            Some(transport) => transport,
            None => default_transport(self.config)?,
        };

        let cookie_storage = self
            .cookie_storage
            .unwrap_or_else(|| Arc::new(jar) as Arc<dyn CookieStorage>);

        let file_system = match (self.file_system, self.files_root) {
            (Some(files), _) => files,
            (None, Some(root)) => Arc::new(LocalFileSystem::with_root(root)) as Arc<dyn FileSystem>,
            (None, None) => Arc::new(LocalFileSystem::default()) as Arc<dyn FileSystem>,
        };

        Ok(Client::with_backend(Backend::from_parts(
            transport,
            cookie_storage,
            file_system,
        )))
    }
}

#[cfg(feature = "backend-reqwest")]
fn default_transport(config: BackendConfig) -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(crate::backend::reqwest::ReqwestBackend::with_config(config)?))
}

#[cfg(not(feature = "backend-reqwest"))]
fn default_transport(_config: BackendConfig) -> Result<Arc<dyn Transport>> {
    Err(crate::Error::InvalidRequest(
        "No transport configured and no default backend is enabled".to_string(),
    ))
}
