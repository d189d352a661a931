// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! A live, origin-bound session

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use super::origin::Origin;
use crate::error::Result;
use crate::http::{headers, CookieJar, Request, Response, Transport};

/// How the warm-up request went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarmupOutcome {
    /// The origin answered; the bypass layer had its chance to set cookies
    Warmed {
        status: u16,
        /// Anti-bot clearance cookies present after warm-up
        clearance_cookies: Vec<String>,
    },
    /// Warm-up failed; the session is usable but starts without
    /// warm-up cookies
    Degraded { reason: String },
}

impl WarmupOutcome {
    /// Check if the session runs without warm-up cookies
    pub fn is_degraded(&self) -> bool {
        matches!(self, WarmupOutcome::Degraded { .. })
    }
}

/// Cookie names set by anti-bot challenge layers
pub fn is_clearance_cookie(name: &str) -> bool {
    name.starts_with("cf_") || name.starts_with("__cf")
}

/// One transport bound to one origin
pub struct Session {
    origin: Origin,
    transport: Arc<dyn Transport>,
    warmup: WarmupOutcome,
}

impl Session {
    pub(crate) fn new(origin: Origin, transport: Arc<dyn Transport>, warmup: WarmupOutcome) -> Self {
        Self {
            origin,
            transport,
            warmup,
        }
    }

    /// Origin this session is bound to
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Result of the warm-up request made when the session was created
    pub fn warmup(&self) -> &WarmupOutcome {
        &self.warmup
    }

    /// Send a request through the session's transport
    pub async fn execute(&self, request: Request) -> Result<Response> {
        self.transport.execute(request).await
    }

    /// The session's cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        self.transport.cookie_jar()
    }

    /// Merge caller-supplied cookies, overwriting per name
    pub fn apply_cookies(&self, cookies: &HashMap<String, String>) {
        self.cookie_jar().extend(cookies);
    }

    /// Names of every cookie the session holds
    pub fn cookie_names(&self) -> HashSet<String> {
        self.cookie_jar().names()
    }

    /// Every cookie the session holds, not just ones set by the last response
    pub fn cookies(&self) -> BTreeMap<String, String> {
        self.cookie_jar().snapshot()
    }

    /// CSRF token installed in the session's default headers, if any
    pub fn csrf_token(&self) -> Option<String> {
        self.transport.default_header(headers::X_CSRF_TOKEN)
    }

    /// Install a CSRF token so every later request carries it
    pub fn set_csrf_token(&self, token: &str) -> Result<()> {
        self.transport.set_default_header(headers::X_CSRF_TOKEN, token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("origin", &self.origin)
            .field("warmup", &self.warmup)
            .field("cookies", &self.cookie_jar().len())
            .finish()
    }
}
