// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSRF token retrieval from `/session/csrf.json`

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::http::{headers, Request};
use crate::session::Session;

/// Path of the anti-forgery token endpoint
pub const CSRF_PATH: &str = "/session/csrf.json";

/// Default timeout of the CSRF fetch
pub const DEFAULT_CSRF_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct CsrfPayload {
    #[serde(default)]
    csrf: Option<String>,
}

/// Fetch a CSRF token and install it as the session's `X-CSRF-Token`
/// default header.
///
/// Returns `None` on any failure; the reason is logged.
pub async fn fetch_csrf_token(session: &Session, timeout: Duration) -> Option<String> {
    match try_fetch_csrf_token(session, timeout).await {
        Ok(token) => Some(token),
        Err(e) => {
            warn!(origin = %session.origin(), error = %e, "Failed to obtain CSRF token");
            None
        }
    }
}

/// Like [`fetch_csrf_token`] but keeps the reason for failure
pub async fn try_fetch_csrf_token(session: &Session, timeout: Duration) -> Result<String> {
    let url = session.origin().join(CSRF_PATH);
    let request = Request::get(&url)?
        .header(headers::ACCEPT, "application/json")
        .timeout(timeout);

    let response = session.execute(request).await?;

    if response.status_code() != 200 {
        warn!(
            status = response.status_code(),
            preview = %response.preview(200),
            "CSRF endpoint refused; the challenge bypass may have failed"
        );
        return Err(Error::auth_response(
            format!("CSRF endpoint returned HTTP {}", response.status_code()),
            url,
            response.status_code(),
            response.text_lossy(),
        ));
    }

    let payload: CsrfPayload = response.json()?;
    let token = payload
        .csrf
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::auth("CSRF response has no csrf field"))?;

    session.set_csrf_token(&token)?;
    debug!(
        token_prefix = %token.chars().take(8).collect::<String>(),
        "Obtained CSRF token"
    );

    Ok(token)
}
