// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Login decision
//!
//! Decides, from the request URL, the caller's credentials and the cookies
//! in play, whether a login handshake should run before the real request.
//!
//! Order of checks:
//! 1. no credentials supplied -> no login
//! 2. URL is a known public endpoint -> no login
//! 3. a session-indicator cookie is present -> already authenticated
//! 4. username or password missing -> no login
//! 5. otherwise -> authenticate

use std::collections::HashSet;

use super::credentials::{Credentials, LoginCredentials};

/// Cookie names whose presence means the caller is already logged in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookieNames(Vec<String>);

impl Default for SessionCookieNames {
    fn default() -> Self {
        Self::new(["_t", "_forum_session", "authentication_data"])
    }
}

impl SessionCookieNames {
    /// Create from a list of cookie names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// First indicator cookie present in `observed`, in configured order
    pub fn find_in<'a>(&'a self, observed: &HashSet<String>) -> Option<&'a str> {
        self.0
            .iter()
            .find(|name| observed.contains(name.as_str()))
            .map(String::as_str)
    }

    /// Configured names
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

/// URL fragments of endpoints readable without logging in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicEndpoints(Vec<String>);

impl Default for PublicEndpoints {
    fn default() -> Self {
        Self::new([
            "/about.json",
            "/site.json",
            "/categories.json",
            "/tags.json",
            "/latest.json",
        ])
    }
}

impl PublicEndpoints {
    /// Create from a list of path fragments
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    /// An empty allow-list: every URL is treated as private
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// The matching fragment, if the URL contains one anywhere (query
    /// strings and trailing segments included)
    pub fn matching(&self, url: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|endpoint| url.contains(endpoint.as_str()))
            .map(String::as_str)
    }
}

/// Outcome of the login decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginDecision {
    /// Caller supplied no credentials
    NoCredentials,
    /// URL is public; login is not needed
    PublicEndpoint { endpoint: String },
    /// A session cookie is already present
    AlreadyAuthenticated { cookie: String },
    /// Username or password missing
    IncompleteCredentials,
    /// Run the login handshake with these credentials
    Authenticate(LoginCredentials),
}

impl LoginDecision {
    /// Check if a login handshake should run
    pub fn should_login(&self) -> bool {
        matches!(self, LoginDecision::Authenticate(_))
    }
}

/// Applies the login decision policy
#[derive(Debug, Clone, Default)]
pub struct LoginDecider {
    session_cookies: SessionCookieNames,
    public_endpoints: PublicEndpoints,
}

impl LoginDecider {
    /// Create a decider from its two rule sets
    pub fn new(session_cookies: SessionCookieNames, public_endpoints: PublicEndpoints) -> Self {
        Self {
            session_cookies,
            public_endpoints,
        }
    }

    /// Decide whether to log in.
    ///
    /// `observed_cookies` is the union of the session's cookies and the
    /// cookies supplied with this call.
    pub fn decide(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
        observed_cookies: &HashSet<String>,
    ) -> LoginDecision {
        let Some(credentials) = credentials else {
            return LoginDecision::NoCredentials;
        };

        if let Some(endpoint) = self.public_endpoints.matching(url) {
            return LoginDecision::PublicEndpoint {
                endpoint: endpoint.to_string(),
            };
        }

        if let Some(cookie) = self.session_cookies.find_in(observed_cookies) {
            return LoginDecision::AlreadyAuthenticated {
                cookie: cookie.to_string(),
            };
        }

        match credentials.complete() {
            Some(login) => LoginDecision::Authenticate(login),
            None => LoginDecision::IncompleteCredentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookies(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    const PRIVATE_URL: &str = "https://forum.example.com/notifications.json";

    #[test]
    fn test_no_credentials_no_login() {
        let decider = LoginDecider::default();
        assert_eq!(
            decider.decide(PRIVATE_URL, None, &cookies(&[])),
            LoginDecision::NoCredentials
        );
    }

    #[test]
    fn test_each_session_cookie_skips_login() {
        let decider = LoginDecider::default();
        let creds = Credentials::new("alice", "secret");

        for name in ["_t", "_forum_session", "authentication_data"] {
            let decision = decider.decide(PRIVATE_URL, Some(&creds), &cookies(&["cf_clearance", name]));
            assert_eq!(
                decision,
                LoginDecision::AlreadyAuthenticated {
                    cookie: name.to_string()
                }
            );
        }
    }

    #[test]
    fn test_public_endpoints_skip_login_regardless_of_cookies() {
        let decider = LoginDecider::default();
        let creds = Credentials::new("alice", "secret");

        for url in [
            "https://forum.example.com/about.json",
            "https://forum.example.com/site.json",
            "https://forum.example.com/categories.json",
            "https://forum.example.com/tags.json",
            "https://forum.example.com/latest.json?page=2",
        ] {
            let decision = decider.decide(url, Some(&creds), &cookies(&[]));
            assert!(matches!(decision, LoginDecision::PublicEndpoint { .. }), "{}", url);

            let decision = decider.decide(url, Some(&creds), &cookies(&["_t"]));
            assert!(!decision.should_login(), "{}", url);
        }
    }

    #[test]
    fn test_missing_password_is_incomplete() {
        let decider = LoginDecider::default();
        let creds = Credentials {
            username: Some("alice".to_string()),
            ..Default::default()
        };
        assert_eq!(
            decider.decide(PRIVATE_URL, Some(&creds), &cookies(&[])),
            LoginDecision::IncompleteCredentials
        );
    }

    #[test]
    fn test_authenticate_when_nothing_else_applies() {
        let decider = LoginDecider::default();
        let creds = Credentials::new("alice", "secret").second_factor("123456");
        let decision = decider.decide(PRIVATE_URL, Some(&creds), &cookies(&["cf_clearance"]));

        assert!(decision.should_login());
        match decision {
            LoginDecision::Authenticate(login) => {
                assert_eq!(login.username, "alice");
                assert_eq!(login.second_factor_token.as_deref(), Some("123456"));
            }
            other => panic!("expected Authenticate, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_rule_sets() {
        let decider = LoginDecider::new(
            SessionCookieNames::new(["sid"]),
            PublicEndpoints::none(),
        );
        let creds = Credentials::new("alice", "secret");

        assert!(decider
            .decide("https://forum.example.com/about.json", Some(&creds), &cookies(&["_t"]))
            .should_login());
        assert_eq!(
            decider.decide(PRIVATE_URL, Some(&creds), &cookies(&["sid"])),
            LoginDecision::AlreadyAuthenticated {
                cookie: "sid".to_string()
            }
        );
    }
}
