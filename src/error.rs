// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the Discourse bridge
//!
//! Every failure that can leave the executor is one of these variants.
//! `error_type()` maps them onto the `error_type` strings of the wire
//! protocol, so the caller sees the same taxonomy regardless of which stage
//! failed.

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wire name for stdin that is not JSON at all
pub const JSON_DECODE_ERROR: &str = "JSONDecodeError";
/// Wire name for well-formed JSON that is not a usable request description
pub const INPUT_ERROR: &str = "InputError";
/// Wire name for CSRF and login failures
pub const AUTHENTICATION_ERROR: &str = "AuthenticationError";
/// Wire name for network, TLS, DNS and timeout failures
pub const TRANSPORT_ERROR: &str = "TransportError";

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport failed (connect, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Input on stdin was not JSON
    #[error("Invalid JSON input: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Input was JSON but not a valid request description
    #[error("Invalid request: {0}")]
    Input(String),

    /// CSRF fetch or login handshake failed
    #[error("{reason}")]
    Authentication {
        reason: String,
        url: Option<String>,
        status: Option<u16>,
        body: Option<String>,
    },

    /// Transport-level failure not raised by reqwest itself
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Classify a failed parse of the request description.
    ///
    /// Syntax and EOF errors mean the input was not JSON; data errors mean
    /// it was JSON of the wrong shape.
    pub fn from_input_json(err: serde_json::Error) -> Self {
        if err.is_data() {
            Error::Input(err.to_string())
        } else {
            Error::InvalidJson(err)
        }
    }

    /// Create an input error
    pub fn input<S: Into<String>>(msg: S) -> Self {
        Error::Input(msg.into())
    }

    /// Create an authentication error
    pub fn auth(reason: impl Into<String>) -> Self {
        Error::Authentication {
            reason: reason.into(),
            url: None,
            status: None,
            body: None,
        }
    }

    /// Create an authentication error carrying the server's answer
    pub fn auth_response(
        reason: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Error::Authentication {
            reason: reason.into(),
            url: Some(url.into()),
            status: Some(status),
            body: Some(body.into()),
        }
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Error::Transport(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Http(e) if e.is_timeout())
    }

    /// Check if this is an authentication error
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Check if this came from the network rather than from the caller
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Transport(_))
    }

    /// The `error_type` string reported on the wire
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => JSON_DECODE_ERROR,
            Error::Input(_) | Error::Url(_) => INPUT_ERROR,
            Error::Authentication { .. } => AUTHENTICATION_ERROR,
            Error::Http(_) | Error::Transport(_) => TRANSPORT_ERROR,
            Error::Io(_) => "IOError",
            Error::Serialization(_) => "SerializationError",
            Error::Config(_) => "ConfigError",
        }
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body kept for diagnostics, if any
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Error::Authentication { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Authentication { url, .. } => url.as_deref(),
            Error::Http(e) => e.url().map(|u| u.as_str()),
            _ => None,
        }
    }
}
