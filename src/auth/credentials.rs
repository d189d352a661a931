// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Login credentials

use std::fmt;

use serde::Deserialize;

/// Credentials as supplied by the caller; any field may be missing
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub second_factor_token: Option<String>,
}

impl Credentials {
    /// Create credentials from a username and password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            second_factor_token: None,
        }
    }

    /// Add a second-factor token
    pub fn second_factor(mut self, token: impl Into<String>) -> Self {
        self.second_factor_token = Some(token.into());
        self
    }

    /// Both username and password present and non-empty
    pub fn complete(&self) -> Option<LoginCredentials> {
        let username = non_empty(&self.username)?;
        let password = non_empty(&self.password)?;
        Some(LoginCredentials {
            username: username.to_string(),
            password: password.to_string(),
            second_factor_token: non_empty(&self.second_factor_token).map(str::to_string),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "second_factor_token",
                &self.second_factor_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Credentials good enough to attempt a login
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
    pub second_factor_token: Option<String>,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field(
                "second_factor_token",
                &self.second_factor_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
