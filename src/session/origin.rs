// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session identity

use std::fmt;

/// Scheme + host (+ port) prefix of a URL; the only key for session identity.
///
/// Derived purely textually: the first three `/`-delimited segments of the
/// URL, so `https://forum.example.com:8443/t/1.json` becomes
/// `https://forum.example.com:8443`. A query or fragment directly after the
/// host is cut off.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin(String);

impl Origin {
    /// Derive the origin of a request URL
    pub fn from_url(url: &str) -> Self {
        let mut origin = url.split('/').take(3).collect::<Vec<_>>().join("/");
        if let Some(end) = origin.find(|c| c == '?' || c == '#') {
            origin.truncate(end);
        }
        Origin(origin)
    }

    /// Absolute URL for a path on this origin
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }

    /// The origin as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_from_url() {
        assert_eq!(
            Origin::from_url("https://forum.example.com/t/topic/1.json?page=2").as_str(),
            "https://forum.example.com"
        );
        assert_eq!(
            Origin::from_url("http://localhost:4200/latest.json").as_str(),
            "http://localhost:4200"
        );
        assert_eq!(
            Origin::from_url("https://forum.example.com").as_str(),
            "https://forum.example.com"
        );
    }

    #[test]
    fn test_query_without_path_is_cut() {
        assert_eq!(
            Origin::from_url("https://forum.example.com?x=1").as_str(),
            "https://forum.example.com"
        );
        assert_eq!(
            Origin::from_url("https://forum.example.com#top").as_str(),
            "https://forum.example.com"
        );
        assert_eq!(
            Origin::from_url("https://forum.example.com?next=/latest.json")
                .join("/session/csrf.json"),
            "https://forum.example.com/session/csrf.json"
        );
    }

    #[test]
    fn test_same_host_different_path_same_origin() {
        assert_eq!(
            Origin::from_url("https://forum.example.com/about.json"),
            Origin::from_url("https://forum.example.com/session/csrf.json")
        );
        assert_ne!(
            Origin::from_url("https://forum.example.com/about.json"),
            Origin::from_url("http://forum.example.com/about.json")
        );
    }

    #[test]
    fn test_join() {
        let origin = Origin::from_url("https://forum.example.com/latest.json");
        assert_eq!(
            origin.join("/session/csrf.json"),
            "https://forum.example.com/session/csrf.json"
        );
    }
}
