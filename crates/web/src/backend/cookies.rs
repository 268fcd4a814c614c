//! Per-session cookie jar for backend credentials.
//!
//! The backend authenticates with cookies (session cookie plus an XSRF
//! double-submit token). Each browser session gets its own jar, persisted in
//! the tower-session, so one shared `reqwest::Client` can serve every viewer
//! without mixing credentials.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

/// Cookie name the backend uses for its CSRF double-submit token.
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// An ordered name → value cookie map for one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar(BTreeMap<String, String>);

impl CookieJar {
    /// Create an empty jar.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Whether the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a cookie value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Insert or replace a cookie.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Remove every cookie (logout).
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Render the jar as a `Cookie` request header value.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Fold the `Set-Cookie` headers of a backend response into the jar.
    ///
    /// Only the name and value are kept; attributes (Path, Expires, ...) are
    /// the backend's concern, not ours. A cookie set to an empty value or
    /// `deleted` is treated as a removal.
    pub fn absorb(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(reqwest::header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if value.is_empty() || value == "deleted" {
                self.0.remove(name);
            } else {
                self.0.insert(name.to_owned(), value.to_owned());
            }
        }
    }

    /// The percent-decoded XSRF token, if the jar has been CSRF-primed.
    #[must_use]
    pub fn xsrf_token(&self) -> Option<String> {
        self.get(XSRF_COOKIE)
            .map(|raw| urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), Into::into))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::{HeaderValue, SET_COOKIE};

    use super::*;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for v in values {
            map.append(SET_COOKIE, HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn test_absorb_keeps_name_value_only() {
        let mut jar = CookieJar::new();
        jar.absorb(&headers(&[
            "XSRF-TOKEN=abc123; path=/; samesite=lax",
            "app_session=s3cr3t; path=/; httponly",
        ]));
        assert_eq!(jar.get("XSRF-TOKEN"), Some("abc123"));
        assert_eq!(jar.get("app_session"), Some("s3cr3t"));
    }

    #[test]
    fn test_absorb_overwrites_existing() {
        let mut jar = CookieJar::new();
        jar.insert("app_session", "old");
        jar.absorb(&headers(&["app_session=new; path=/"]));
        assert_eq!(jar.get("app_session"), Some("new"));
    }

    #[test]
    fn test_absorb_removes_deleted_cookies() {
        let mut jar = CookieJar::new();
        jar.insert("app_session", "old");
        jar.absorb(&headers(&["app_session=deleted; expires=Thu, 01 Jan 1970"]));
        assert_eq!(jar.get("app_session"), None);
    }

    #[test]
    fn test_cookie_header_format() {
        let mut jar = CookieJar::new();
        assert_eq!(jar.cookie_header(), None);
        jar.insert("b", "2");
        jar.insert("a", "1");
        // BTreeMap keeps a stable order
        assert_eq!(jar.cookie_header().unwrap(), "a=1; b=2");
    }

    #[test]
    fn test_xsrf_token_percent_decoded() {
        let mut jar = CookieJar::new();
        jar.insert(XSRF_COOKIE, "abc%3D%3D");
        assert_eq!(jar.xsrf_token().unwrap(), "abc==");
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut jar = CookieJar::new();
        jar.insert("app_session", "x");
        let json = serde_json::to_string(&jar).unwrap();
        let parsed: CookieJar = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, jar);
    }
}
