// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Discourse login handshake
//!
//! CSRF token first, then a JSON POST to `/session.json` carrying the token
//! both as a header and as the session's default header.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::credentials::LoginCredentials;
use super::csrf::fetch_csrf_token;
use crate::error::{Error, Result};
use crate::http::{headers, Request};
use crate::session::Session;

/// Path of the login endpoint
pub const LOGIN_PATH: &str = "/session.json";

/// Default timeout of the login POST
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeouts of the two handshake requests
#[derive(Debug, Clone, Copy)]
pub struct LoginTimeouts {
    pub csrf: Duration,
    pub login: Duration,
}

impl Default for LoginTimeouts {
    fn default() -> Self {
        Self {
            csrf: super::csrf::DEFAULT_CSRF_TIMEOUT,
            login: DEFAULT_LOGIN_TIMEOUT,
        }
    }
}

/// Body of the login POST
#[derive(Serialize)]
struct LoginPayload<'a> {
    login: &'a str,
    password: &'a str,
    remember: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    second_factor_token: Option<&'a str>,
}

/// A completed login
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    /// Token the login was made with
    pub csrf_token: String,
    /// Parsed response body
    pub body: serde_json::Value,
}

/// Log in to the forum through `session`.
///
/// Fails with an authentication error when no CSRF token can be obtained,
/// when the endpoint answers anything but 200, or when the request itself
/// fails.
pub async fn login(
    session: &Session,
    credentials: &LoginCredentials,
    timeouts: LoginTimeouts,
) -> Result<LoginSuccess> {
    let csrf_token = fetch_csrf_token(session, timeouts.csrf)
        .await
        .ok_or_else(|| Error::auth("Failed to obtain CSRF token"))?;

    let origin = session.origin();
    let url = origin.join(LOGIN_PATH);
    let payload = LoginPayload {
        login: &credentials.username,
        password: &credentials.password,
        remember: true,
        second_factor_token: credentials.second_factor_token.as_deref(),
    };

    let request = Request::post(&url)?
        .json(&payload)?
        .header(headers::ACCEPT, "application/json")
        .header(headers::REFERER, origin.join("/login"))
        .header(headers::X_CSRF_TOKEN, &csrf_token)
        .header(headers::X_REQUESTED_WITH, "XMLHttpRequest")
        .timeout(timeouts.login);

    debug!(username = %credentials.username, "Attempting login");

    let response = session.execute(request).await.map_err(|e| {
        warn!(error = %e, "Login request failed");
        Error::Authentication {
            reason: format!("Login exception: {}", e),
            url: Some(url.clone()),
            status: None,
            body: None,
        }
    })?;

    if response.status_code() != 200 {
        warn!(status = response.status_code(), "Login failed");
        return Err(Error::auth_response(
            format!("Login failed with status {}", response.status_code()),
            url,
            response.status_code(),
            response.text_lossy(),
        ));
    }

    let body: serde_json::Value = response.json().map_err(|e| {
        Error::auth_response(
            format!("Login response is not JSON: {}", e),
            url.clone(),
            200,
            response.text_lossy(),
        )
    })?;

    info!(username = %credentials.username, "Login successful");

    Ok(LoginSuccess { csrf_token, body })
}
