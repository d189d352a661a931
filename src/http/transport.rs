// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport capability seam
//!
//! The session layer only needs something that can send a request, keep
//! cookies between requests and carry per-session default headers. Whatever
//! does the anti-bot work sits behind this trait.

use std::sync::Arc;

use async_trait::async_trait;

use super::cookie::CookieJar;
use super::request::Request;
use super::response::Response;
use crate::error::Result;

/// A reusable HTTP client with persistent cookies and default headers
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request, applying default headers and stored cookies, and
    /// record any cookies the response sets
    async fn execute(&self, request: Request) -> Result<Response>;

    /// The transport's cookie jar
    fn cookie_jar(&self) -> &CookieJar;

    /// Read a session-level default header
    fn default_header(&self, name: &str) -> Option<String>;

    /// Set a session-level default header sent with every later request
    fn set_default_header(&self, name: &str, value: &str) -> Result<()>;
}

/// Creates fresh transports for new sessions
pub trait TransportFactory: Send + Sync {
    /// Build a transport with an empty cookie jar
    fn create(&self) -> Result<Arc<dyn Transport>>;
}
