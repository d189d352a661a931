// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP transport layer
//!
//! Provides the transport capability sessions are built on: a reqwest client
//! with its own cookie jar, mutable per-session headers and raw response
//! bodies left for the bridge to decode.

mod client;
mod cookie;
mod request;
mod response;
mod transport;

pub use client::{HttpClient, HttpClientConfig};
pub use cookie::{Cookie, CookieJar};
pub use request::{Request, DEFAULT_TIMEOUT};
pub use response::Response;
pub use transport::{Transport, TransportFactory};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const CONTENT_ENCODING: &str = "content-encoding";
    pub const REFERER: &str = "referer";
    pub const X_CSRF_TOKEN: &str = "x-csrf-token";
    pub const X_REQUESTED_WITH: &str = "x-requested-with";
}
