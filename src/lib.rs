//! One HTTP request/response contract over swappable platform backends
//!
//! Application code describes a request once; the content type decides how
//! the body is encoded and how the response is decoded, whichever backend
//! ends up performing the exchange. Cookies and file transfers go through
//! injected collaborators so they can be swapped per platform or faked in
//! tests.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub use backend::cookie_store::CookieJar;
pub use backend::types::{BackendRequest, BackendResponse, ExtraOptions};
pub use backend::{Backend, BackendConfig, CookieStorage, Transport};
pub use body::{Body, ResponseData, WireBody};
pub use client::{
    Client, ClientBuilder, Download, DownloadBuilder, DownloadRequest, DownloadResponse,
    UploadBuilder, UploadRequest, UploadSource,
};
pub use cookies::Cookie;
pub use error::{Error, Result};
pub use fs::{Directory, FileRef, FileSystem, LocalFileSystem};
pub use headers::Headers;
pub use http::Method;
pub use multipart::MultipartPart;
pub use request::{Request, RequestBuilder};
pub use response::Response;

pub mod backend;
pub mod codec;
pub mod cookies;
pub mod fs;
pub mod headers;
pub mod multipart;
pub mod transfer;

mod body;
mod client;
mod error;
mod request;
mod response;
