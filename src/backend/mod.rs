//! Backend abstraction for HTTP client implementations
//!
//! A [`Backend`] bundles the three collaborators the core talks to: a
//! [`Transport`] that performs exchanges, a [`CookieStorage`] and a
//! [`FileSystem`]. One backend is chosen when the client is built and stays
//! fixed for its lifetime.

pub mod cookie_store;
pub mod types;

#[cfg(feature = "backend-reqwest")]
pub mod reqwest;

use crate::Result;
use crate::fs::{FileSystem, LocalFileSystem};
use async_trait::async_trait;
use self::cookie_store::CookieJar;
use std::sync::Arc;
use std::time::Duration;
use types::{BackendRequest, BackendResponse};
use url::Url;

/// Performs one HTTP exchange
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the response head with a streaming body.
    ///
    /// Any status code is a successful exchange; only transport failures are
    /// errors.
    async fn execute(&self, request: BackendRequest) -> Result<BackendResponse>;
}

/// String-based cookie storage scoped by URL
pub trait CookieStorage: Send + Sync {
    /// Cookies visible to `url` as a `name=value; name2=value2` string, or
    /// `None` when there are none
    fn cookie_string(&self, url: &Url) -> Result<Option<String>>;

    /// Apply a single `Set-Cookie`-style write in the context of `url`
    fn write_cookie(&self, url: &Url, set_cookie: &str) -> Result<()>;

    /// Expire every cookie named `name` that is visible to `url`.
    ///
    /// `expiry` is the `Set-Cookie` string that expires it at the root path.
    /// Stores that track cookie paths should also drop same-named cookies
    /// stored under narrower paths or parent domains.
    fn expire_cookie(&self, url: &Url, name: &str, expiry: &str) -> Result<()> {
        let _ = name;
        self.write_cookie(url, expiry)
    }
}

/// Configuration for backend creation
#[derive(Clone, Debug, Default)]
pub struct BackendConfig {
    /// Request timeout
    pub timeout: Option<Duration>,
    /// Connection timeout
    pub connect_timeout: Option<Duration>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Default headers to add to all requests
    pub default_headers: Option<http::HeaderMap>,
    /// Cookie jar shared with the transport
    pub cookie_jar: Option<CookieJar>,
}

/// The collaborators a client dispatches to
#[derive(Clone)]
pub struct Backend {
    transport: Arc<dyn Transport>,
    cookies: Arc<dyn CookieStorage>,
    files: Arc<dyn FileSystem>,
}

impl Backend {
    /// Assemble a backend from explicit collaborators
    pub fn new(
        transport: impl Transport + 'static,
        cookies: impl CookieStorage + 'static,
        files: impl FileSystem + 'static,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            cookies: Arc::new(cookies),
            files: Arc::new(files),
        }
    }

    /// Assemble a backend from shared collaborators
    pub fn from_parts(
        transport: Arc<dyn Transport>,
        cookies: Arc<dyn CookieStorage>,
        files: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            transport,
            cookies,
            files,
        }
    }

    /// Auto-select the best backend for the platform
    #[cfg(feature = "backend-reqwest")]
    pub fn default_for_platform() -> Result<Self> {
        Self::reqwest_with_config(BackendConfig::default())
    }

    /// Use the reqwest backend
    #[cfg(feature = "backend-reqwest")]
    pub fn reqwest() -> Result<Self> {
        Self::reqwest_with_config(BackendConfig::default())
    }

    /// Use the reqwest backend with configuration.
    ///
    /// The configured cookie jar (or a fresh one) serves both the transport
    /// and the cookie operations.
    #[cfg(feature = "backend-reqwest")]
    pub fn reqwest_with_config(mut config: BackendConfig) -> Result<Self> {
        let jar = config.cookie_jar.get_or_insert_with(CookieJar::new).clone();
        let transport = reqwest::ReqwestBackend::with_config(config)?;
        Ok(Self::new(transport, jar, LocalFileSystem::default()))
    }

    /// Replace the filesystem collaborator
    pub fn with_file_system(mut self, files: impl FileSystem + 'static) -> Self {
        self.files = Arc::new(files);
        self
    }

    /// Replace the cookie storage
    pub fn with_cookie_storage(mut self, cookies: impl CookieStorage + 'static) -> Self {
        self.cookies = Arc::new(cookies);
        self
    }

    /// The transport
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// The cookie storage
    pub fn cookies(&self) -> &dyn CookieStorage {
        self.cookies.as_ref()
    }

    /// The filesystem collaborator
    pub fn files(&self) -> &dyn FileSystem {
        self.files.as_ref()
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
