//! In-process cookie storage using cookie_store
//!
//! `CookieJar` is the default [`CookieStorage`] for every backend. It keeps
//! RFC 6265 cookies in memory and can be shared with the reqwest transport so
//! that cookies written through the jar go out on requests and `Set-Cookie`
//! responses land back in it.

use super::CookieStorage;
use crate::{Error, Result};
use cookie_store::{CookieError, CookieStore};
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// RFC 6265 cookie storage shared between clones
#[derive(Clone, Debug, Default)]
pub struct CookieJar {
    store: Arc<Mutex<CookieStore>>,
}

impl CookieJar {
    /// Create an empty jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired cookies across all origins.
    ///
    /// A poisoned store is logged and counted as empty.
    pub fn len(&self) -> usize {
        match self.lock() {
            Ok(store) => store.iter_unexpired().count(),
            Err(e) => {
                tracing::warn!(error = %e, "cookie store unavailable, reporting it as empty");
                0
            }
        }
    }

    /// Whether the jar holds no unexpired cookies
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, CookieStore>> {
        self.store
            .lock()
            .map_err(|e| Error::CookieStore(format!("Failed to lock cookie store: {}", e)))
    }

    /// Store cookies from `Set-Cookie` header values received for `url`
    pub fn store_response_cookies<'a>(
        &self,
        url: &Url,
        set_cookies: impl Iterator<Item = &'a str>,
    ) -> Result<()> {
        let mut store = self.lock()?;
        for set_cookie in set_cookies {
            if let Err(e) = store.parse(set_cookie, url) {
                tracing::debug!(%url, error = %e, "ignoring rejected Set-Cookie");
            }
        }
        Ok(())
    }
}

impl CookieStorage for CookieJar {
    fn cookie_string(&self, url: &Url) -> Result<Option<String>> {
        let store = self.lock()?;
        let pairs: Vec<String> = store
            .get_request_values(url)
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();

        if pairs.is_empty() {
            Ok(None)
        } else {
            Ok(Some(pairs.join("; ")))
        }
    }

    fn write_cookie(&self, url: &Url, set_cookie: &str) -> Result<()> {
        let mut store = self.lock()?;
        match store.parse(set_cookie, url) {
            Ok(_) => {
                tracing::trace!(%url, "cookie written");
                Ok(())
            }
            // Expiring a cookie that was never stored
            Err(CookieError::Expired) => Ok(()),
            Err(e) => Err(Error::CookieStore(format!(
                "Failed to store cookie for {}: {}",
                url, e
            ))),
        }
    }
    fn expire_cookie(&self, url: &Url, name: &str, expiry: &str) -> Result<()> {
        let mut store = self.lock()?;
        let mut removed = 0;
        for domain in domain_candidates(url) {
            for path in path_candidates(url) {
                let visible = store
                    .get(&domain, &path, name)
                    .is_some_and(|cookie| cookie.matches(url));
                if visible && store.remove(&domain, &path, name).is_some() {
                    removed += 1;
                }
            }
        }
        drop(store);
        tracing::trace!(%url, %name, removed, "expired stored cookies");

        // Cookies stored under the root path were removed above already
        self.write_cookie(url, expiry)
    }
}

/// The host of `url` followed by each of its parent domains
fn domain_candidates(url: &Url) -> Vec<String> {
    let Some(host) = url.host_str() else {
        return Vec::new();
    };
    let host = host.to_ascii_lowercase();
    let mut candidates = vec![host.clone()];
    if url.domain().is_some() {
        let mut rest = host.as_str();
        while let Some((_, parent)) = rest.split_once('.') {
            candidates.push(parent.to_string());
            rest = parent;
        }
    }
    candidates
}

/// Every cookie path that can path-match `url`: `/`, then each prefix of the
/// URL path with and without a trailing slash
fn path_candidates(url: &Url) -> Vec<String> {
    let mut candidates = vec!["/".to_string()];
    let mut prefix = String::new();
    for segment in url.path().split('/').filter(|segment| !segment.is_empty()) {
        prefix.push('/');
        prefix.push_str(segment);
        candidates.push(prefix.clone());
        candidates.push(format!("{}/", prefix));
    }
    candidates
}

#[cfg(feature = "backend-reqwest")]
impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &http::HeaderValue>, url: &Url) {
        let values = cookie_headers.filter_map(|value| value.to_str().ok());
        if let Err(e) = self.store_response_cookies(url, values) {
            tracing::warn!(%url, error = %e, "failed to store response cookies");
        }
    }

    fn cookies(&self, url: &Url) -> Option<http::HeaderValue> {
        match self.cookie_string(url) {
            Ok(Some(header)) => http::HeaderValue::from_str(&header).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(%url, error = %e, "failed to read cookies for request");
                None
            }
        }
    }
}
