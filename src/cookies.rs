//! Cookie operations over a [`CookieStorage`]
//!
//! These work on the raw `name=value; name2=value2` view of the store, the
//! same view a browser exposes, so every backend behaves identically.

use crate::backend::CookieStorage;
use crate::request::validate_url;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

const EPOCH_EXPIRY: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// An HTTP cookie as seen by application code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub key: String,
    /// Cookie value
    pub value: String,
    /// Lifetime in days; `None` for a session cookie
    #[serde(default, rename = "ageDays", skip_serializing_if = "Option::is_none")]
    pub age_days: Option<u32>,
}

impl Cookie {
    /// Create a session cookie
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            age_days: None,
        }
    }

    /// Expire the cookie `days` days from now
    pub fn age_days(mut self, days: u32) -> Self {
        self.age_days = Some(days);
        self
    }

    /// The `Set-Cookie` string written to the store
    fn to_set_cookie(&self, now: OffsetDateTime) -> Result<String> {
        let mut set_cookie = format!("{}={}", self.key, self.value);
        // Zero days means a session cookie
        if let Some(days) = self.age_days.filter(|days| *days > 0) {
            let expires = http_date(now + Duration::days(i64::from(days)))?;
            set_cookie.push_str(&format!("; expires={}", expires));
        }
        set_cookie.push_str("; path=/");
        Ok(set_cookie)
    }
}

/// Format `at` as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
fn http_date(at: OffsetDateTime) -> Result<String> {
    let format = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    at.to_offset(time::UtcOffset::UTC)
        .format(format)
        .map_err(|e| Error::Internal(format!("Failed to format cookie expiry: {}", e)))
}

/// Split a raw cookie string into cookies, keeping store order
pub fn parse_cookie_string(raw: &str) -> Vec<Cookie> {
    raw.split(';')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| match fragment.split_once('=') {
            Some((key, value)) => Cookie::new(key.trim(), value.trim()),
            None => Cookie::new(fragment, ""),
        })
        .collect()
}

/// Set a cookie visible to `url`
pub fn set_cookie(store: &dyn CookieStorage, url: &str, cookie: &Cookie) -> Result<()> {
    let url = validate_url(url)?;
    let set_cookie = cookie.to_set_cookie(OffsetDateTime::now_utc())?;
    tracing::debug!(%url, key = %cookie.key, "setting cookie");
    store.write_cookie(&url, &set_cookie)
}

/// All cookies visible to `url`; empty when there are none
pub fn get_cookies(store: &dyn CookieStorage, url: &str) -> Result<Vec<Cookie>> {
    let url = validate_url(url)?;
    Ok(store
        .cookie_string(&url)?
        .map(|raw| parse_cookie_string(&raw))
        .unwrap_or_default())
}

/// Expire the cookie named `key` immediately
pub fn delete_cookie(store: &dyn CookieStorage, url: &str, key: &str) -> Result<()> {
    let url = validate_url(url)?;
    tracing::debug!(%url, %key, "deleting cookie");
    store.expire_cookie(&url, key, &format!("{}=; Max-Age=0; path=/", key))
}

/// Expire every cookie visible to `url`, one write per cookie
pub fn clear_cookies(store: &dyn CookieStorage, url: &str) -> Result<()> {
    let url = validate_url(url)?;
    let Some(raw) = store.cookie_string(&url)? else {
        return Ok(());
    };

    for cookie in parse_cookie_string(&raw) {
        store.expire_cookie(
            &url,
            &cookie.key,
            &format!("{}=; expires={}; path=/", cookie.key, EPOCH_EXPIRY),
        )?;
    }
    tracing::debug!(%url, "cleared cookies");
    Ok(())
}
