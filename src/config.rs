// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bridge configuration

use std::str::FromStr;
use std::time::Duration;

use crate::auth::{PublicEndpoints, SessionCookieNames, DEFAULT_CSRF_TIMEOUT, DEFAULT_LOGIN_TIMEOUT};
use crate::error::Error;
use crate::http::{HttpClientConfig, DEFAULT_TIMEOUT};
use crate::session::DEFAULT_WARMUP_TIMEOUT;

/// What to do when the login handshake fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginFailurePolicy {
    /// Log the failure and send the real request anyway; public content
    /// still loads
    #[default]
    Continue,
    /// Return the login failure as the result and skip the real request
    Abort,
}

impl FromStr for LoginFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" | "lenient" => Ok(LoginFailurePolicy::Continue),
            "abort" | "strict" => Ok(LoginFailurePolicy::Abort),
            other => Err(Error::Config(format!("Unknown login failure policy: {}", other))),
        }
    }
}

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Transport settings for every session
    pub http: HttpClientConfig,
    /// Behaviour when login fails
    pub login_failure: LoginFailurePolicy,
    /// Timeout of the warm-up GET
    pub warmup_timeout: Duration,
    /// Timeout of the CSRF fetch
    pub csrf_timeout: Duration,
    /// Timeout of the login POST
    pub login_timeout: Duration,
    /// Timeout of the caller's request when it gives none
    pub default_timeout: Duration,
    /// Cookies that mean "already logged in"
    pub session_cookies: SessionCookieNames,
    /// URLs that never trigger a login
    pub public_endpoints: PublicEndpoints,
    /// Decompress `br` bodies by hand when the transport left them encoded
    pub manual_brotli: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let manual_brotli = cfg!(feature = "brotli");
        Self {
            // Exactly one side decodes `br`: the client or the body decoder
            http: HttpClientConfig {
                auto_brotli: !manual_brotli,
                ..HttpClientConfig::default()
            },
            login_failure: LoginFailurePolicy::default(),
            warmup_timeout: DEFAULT_WARMUP_TIMEOUT,
            csrf_timeout: DEFAULT_CSRF_TIMEOUT,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            default_timeout: DEFAULT_TIMEOUT,
            session_cookies: SessionCookieNames::default(),
            public_endpoints: PublicEndpoints::default(),
            manual_brotli,
        }
    }
}

impl BridgeConfig {
    /// Create a new bridge config
    pub fn new() -> Self {
        Self::default()
    }

    /// Failed logins abort the request
    pub fn strict() -> Self {
        Self {
            login_failure: LoginFailurePolicy::Abort,
            ..Default::default()
        }
    }

    /// Failed logins are logged and the request goes ahead
    pub fn lenient() -> Self {
        Self {
            login_failure: LoginFailurePolicy::Continue,
            ..Default::default()
        }
    }

    /// Set login failure policy
    pub fn login_failure(mut self, policy: LoginFailurePolicy) -> Self {
        self.login_failure = policy;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http.user_agent = user_agent.into();
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.http.proxy = Some(proxy.into());
        self
    }

    /// Accept invalid TLS certificates
    pub fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.http.accept_invalid_certs = ignore;
        self
    }

    /// Set warm-up timeout
    pub fn warmup_timeout(mut self, timeout: Duration) -> Self {
        self.warmup_timeout = timeout;
        self
    }

    /// Set CSRF fetch timeout
    pub fn csrf_timeout(mut self, timeout: Duration) -> Self {
        self.csrf_timeout = timeout;
        self
    }

    /// Set login POST timeout
    pub fn login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Set default request timeout
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Replace the session-indicator cookie names
    pub fn session_cookies(mut self, names: SessionCookieNames) -> Self {
        self.session_cookies = names;
        self
    }

    /// Replace the public endpoint allow-list
    pub fn public_endpoints(mut self, endpoints: PublicEndpoints) -> Self {
        self.public_endpoints = endpoints;
        self
    }

    /// Enable/disable manual Brotli decoding; the client decodes `br`
    /// itself whenever manual decoding is off
    pub fn manual_brotli(mut self, enabled: bool) -> Self {
        self.manual_brotli = enabled && cfg!(feature = "brotli");
        self.http.auto_brotli = !self.manual_brotli;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.login_failure, LoginFailurePolicy::Continue);
        assert_eq!(config.warmup_timeout, Duration::from_secs(15));
        assert_eq!(config.csrf_timeout, Duration::from_secs(10));
        assert_eq!(config.login_timeout, Duration::from_secs(30));
        assert_eq!(config.default_timeout, Duration::from_secs(30));
        assert_eq!(config.manual_brotli, cfg!(feature = "brotli"));
        assert_ne!(config.manual_brotli, config.http.auto_brotli);
        assert_eq!(
            config.session_cookies.names(),
            ["_t", "_forum_session", "authentication_data"]
        );
    }

    #[test]
    fn test_presets() {
        assert_eq!(BridgeConfig::strict().login_failure, LoginFailurePolicy::Abort);
        assert_eq!(BridgeConfig::lenient().login_failure, LoginFailurePolicy::Continue);
    }

    #[test]
    fn test_builder() {
        let config = BridgeConfig::new()
            .user_agent("bridge-test")
            .proxy("http://127.0.0.1:8080")
            .ignore_https_errors(true)
            .manual_brotli(false)
            .default_timeout(Duration::from_secs(5));

        assert_eq!(config.http.user_agent, "bridge-test");
        assert_eq!(config.http.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert!(config.http.accept_invalid_certs);
        assert!(!config.manual_brotli);
        assert!(config.http.auto_brotli);
        assert_eq!(config.default_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("strict".parse::<LoginFailurePolicy>().unwrap(), LoginFailurePolicy::Abort);
        assert_eq!("Continue".parse::<LoginFailurePolicy>().unwrap(), LoginFailurePolicy::Continue);
        assert!("sometimes".parse::<LoginFailurePolicy>().is_err());
    }
}
