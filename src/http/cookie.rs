// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar for a single-origin session
//!
//! The jar is keyed by cookie name only: a later write with the same name
//! replaces the earlier one, whatever its domain or path.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// A single HTTP cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to (empty = any host)
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HttpOnly flag
    pub http_only: bool,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Check if the cookie should be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        if !self.domain_matches(host) {
            return false;
        }

        if !url.path().starts_with(&self.path) {
            return false;
        }

        if self.secure && url.scheme() != "https" {
            return false;
        }

        !self.is_expired()
    }

    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }

        let domain = self.domain.trim_start_matches('.');
        host == domain || host.ends_with(&format!(".{}", domain))
    }

    /// Parse a Set-Cookie header value
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));

        // Default domain to request host
        cookie.domain = url.host_str().unwrap_or("").to_string();

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let attr = attr.trim().to_lowercase();
                let val = val.trim();
                match attr.as_str() {
                    "domain" => cookie.domain = val.trim_start_matches('.').to_string(),
                    "path" => cookie.path = val.to_string(),
                    "expires" => {
                        // Max-Age wins over Expires when both are present
                        if cookie.expires.is_none() {
                            if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
                                cookie.expires = Some(dt.with_timezone(&Utc));
                            }
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            cookie.expires = Some(expiry_after(secs));
                        }
                    }
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        Some(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Thread-safe cookie storage, one entry per cookie name
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Arc<DashMap<String, Cookie>>,
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cookie, replacing any cookie with the same name.
    ///
    /// An already expired cookie is a deletion.
    pub fn add(&self, cookie: Cookie) {
        if cookie.is_expired() {
            self.cookies.remove(&cookie.name);
        } else {
            self.cookies.insert(cookie.name.clone(), cookie);
        }
    }

    /// Store a plain name/value pair valid for every request
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.add(Cookie::new(name, value));
    }

    /// Merge a name/value mapping into the jar
    pub fn extend(&self, cookies: &HashMap<String, String>) {
        for (name, value) in cookies {
            self.set(name.clone(), value.clone());
        }
    }

    /// Add a cookie from a Set-Cookie header
    pub fn add_from_header(&self, header: &str, url: &Url) {
        if let Some(cookie) = Cookie::parse(header, url) {
            self.add(cookie);
        }
    }

    /// Get a cookie value by name
    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|c| !c.is_expired())
            .map(|c| c.value.clone())
    }

    /// Check whether a cookie with this name is held
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get all cookies that should be sent to a URL
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.remove_expired();
        self.cookies
            .iter()
            .filter(|entry| entry.value().matches(url))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Get Cookie header value for a URL
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|c| c.to_header_value())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Names of all live cookies
    pub fn names(&self) -> HashSet<String> {
        self.remove_expired();
        self.cookies.iter().map(|e| e.key().clone()).collect()
    }

    /// Name/value view of every live cookie, regardless of domain or path
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.remove_expired();
        self.cookies
            .iter()
            .map(|e| (e.key().clone(), e.value().value.clone()))
            .collect()
    }

    /// Remove a specific cookie
    pub fn remove(&self, name: &str) {
        self.cookies.remove(name);
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.clear();
    }

    fn remove_expired(&self) {
        self.cookies.retain(|_, c| !c.is_expired());
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Expiry `secs` from now, saturating instead of overflowing
fn expiry_after(secs: i64) -> DateTime<Utc> {
    chrono::Duration::try_seconds(secs)
        .and_then(|age| Utc::now().checked_add_signed(age))
        .unwrap_or(if secs > 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_parsing() {
        let url = Url::parse("https://forum.example.com/session.json").unwrap();
        let header = "_t=abc123; Domain=forum.example.com; Path=/; Secure; HttpOnly";
        let cookie = Cookie::parse(header, &url).unwrap();

        assert_eq!(cookie.name, "_t");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, "forum.example.com");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
        assert!(cookie.http_only);
    }

    #[test]
    fn test_cookie_defaults_to_request_host() {
        let url = Url::parse("https://forum.example.com/").unwrap();
        let cookie = Cookie::parse("cf_clearance=xyz", &url).unwrap();

        assert_eq!(cookie.domain, "forum.example.com");
        assert!(cookie.matches(&Url::parse("https://forum.example.com/latest.json").unwrap()));
        assert!(!cookie.matches(&Url::parse("https://other.example.com/").unwrap()));
    }

    #[test]
    fn test_malformed_set_cookie_is_ignored() {
        let url = Url::parse("https://forum.example.com/").unwrap();
        assert!(Cookie::parse("no-equals-sign", &url).is_none());
        assert!(Cookie::parse("=value", &url).is_none());
    }

    #[test]
    fn test_last_write_wins_by_name() {
        let jar = CookieJar::new();
        let url = Url::parse("https://forum.example.com/").unwrap();

        jar.set("_forum_session", "from-caller");
        jar.add_from_header("_forum_session=from-server; Path=/", &url);

        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get("_forum_session").as_deref(), Some("from-server"));
    }

    #[test]
    fn test_max_age_zero_deletes() {
        let jar = CookieJar::new();
        let url = Url::parse("https://forum.example.com/").unwrap();

        jar.set("_t", "token");
        jar.add_from_header("_t=; Max-Age=0; Path=/", &url);

        assert!(!jar.contains("_t"));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_out_of_range_max_age_saturates() {
        let jar = CookieJar::new();
        let url = Url::parse("https://forum.example.com/").unwrap();

        let cookie = Cookie::parse("cf_clearance=x; Max-Age=99999999999999; Path=/", &url).unwrap();
        assert!(!cookie.is_expired());
        assert_eq!(cookie.expires, Some(DateTime::<Utc>::MAX_UTC));

        jar.add(cookie);
        assert_eq!(jar.get("cf_clearance").as_deref(), Some("x"));

        jar.add_from_header("cf_clearance=x; Max-Age=-99999999999999; Path=/", &url);
        assert!(!jar.contains("cf_clearance"));
    }

    #[test]
    fn test_path_and_secure_restrict_header() {
        let jar = CookieJar::new();
        let url = Url::parse("http://forum.example.com/latest.json").unwrap();

        jar.add(Cookie::new("scoped", "1").path("/admin"));
        jar.add(Cookie::new("tls_only", "1").secure(true));
        jar.set("plain", "1");

        assert_eq!(jar.get_cookie_header(&url).as_deref(), Some("plain=1"));
        assert_eq!(jar.snapshot().len(), 3);
    }

    #[test]
    fn test_extend_and_snapshot() {
        let jar = CookieJar::new();
        let mut supplied = HashMap::new();
        supplied.insert("a".to_string(), "1".to_string());
        supplied.insert("b".to_string(), "2".to_string());
        jar.extend(&supplied);

        let snapshot = jar.snapshot();
        assert_eq!(snapshot.get("a").map(String::as_str), Some("1"));
        assert_eq!(snapshot.get("b").map(String::as_str), Some("2"));
        assert!(jar.names().contains("a"));
    }
}
