// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Discourse Bridge - Authenticated Forum API Calls over Stdin/Stdout
//!
//! A process-local bridge that runs HTTP requests against a Discourse
//! forum API on behalf of a calling program. One JSON request description
//! in, one ASCII-escaped JSON response description out.
//!
//! ## Features
//!
//! - Session reuse: one warmed-up session per origin, cookies kept across calls
//! - Login decision: skips login for public endpoints and existing sessions
//! - CSRF handshake: token fetch, then JSON login with optional second factor
//! - Cookie round-trip: caller cookies merged in, the whole jar returned
//! - Body decoding: manual Brotli, charset re-detection, lossy fallback
//! - Serve mode: newline-delimited requests against one long-lived session
//!
//! ## Example
//!
//! ```rust,no_run
//! use discourse_bridge::{BridgeConfig, BridgeRequest, Executor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = Executor::new(BridgeConfig::default());
//!
//!     let response = executor
//!         .execute(BridgeRequest::get("https://forum.example.com/latest.json"))
//!         .await;
//!
//!     println!("{}", response.to_json()?);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod bridge;
pub mod config;
pub mod error;
pub mod http;
pub mod redact;
pub mod session;

// Re-exports for convenience

// Bridge
pub use bridge::{
    decode_body, to_ascii_json, BodyDecoder, BridgeRequest, BridgeResponse, DecodeStrategy,
    DecodedBody, Executor, FailureBody, SuccessBody,
};

// Config
pub use config::{BridgeConfig, LoginFailurePolicy};

// Auth
pub use auth::{Credentials, LoginDecider, LoginDecision, PublicEndpoints, SessionCookieNames};

// Session
pub use session::{Origin, Session, SessionRegistry, WarmupOutcome};

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{Cookie, CookieJar, HttpClient, HttpClientConfig, Request, Response, Transport};

/// Discourse bridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
