// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Wire protocol: request and response descriptions
//!
//! Requests arrive as one JSON object; responses leave as one ASCII-escaped
//! JSON object with either the success or the failure shape.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::http::Request;

fn default_method() -> String {
    "GET".to_string()
}

/// One request description as sent by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeRequest {
    /// Target URL; its first three `/`-separated segments select the session
    pub url: String,
    /// HTTP method, case-insensitive
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    /// Cookies to merge into the session before anything else happens
    #[serde(default)]
    pub cookies: Option<HashMap<String, String>>,
    /// Timeout in seconds
    #[serde(default)]
    pub timeout: Option<f64>,
    #[serde(default)]
    pub login: Option<Credentials>,
}

impl BridgeRequest {
    /// Parse a request description.
    ///
    /// Input that is not JSON is a `JSONDecodeError`; JSON of the wrong
    /// shape is an `InputError`.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(Error::from_input_json)
    }

    /// Create a GET description for `url`
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: None,
            body: None,
            cookies: None,
            timeout: None,
            login: None,
        }
    }

    /// Timeout to apply; missing, non-positive or unrepresentable values
    /// fall back to `default`
    pub fn effective_timeout(&self, default: Duration) -> Duration {
        self.timeout
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or(default)
    }

    /// Validate the description and build the outgoing request.
    ///
    /// Fails with an input error on a bad method, URL or header.
    pub fn to_request(&self, default_timeout: Duration) -> Result<Request> {
        let method = Request::parse_method(&self.method)?;
        let mut request = Request::new(method, &self.url)?;

        if !matches!(request.url.scheme(), "http" | "https") {
            return Err(Error::input(format!(
                "Unsupported URL scheme: {}",
                request.url.scheme()
            )));
        }

        if let Some(headers) = &self.headers {
            request = request.try_headers(headers)?;
        }
        if let Some(body) = &self.body {
            request = request.body(body.clone());
        }

        Ok(request.timeout(self.effective_timeout(default_timeout)))
    }
}

/// Success shape of a response description
#[derive(Debug, Clone, Serialize)]
pub struct SuccessBody {
    pub success: bool,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// Every cookie the session holds after the call
    pub cookies: BTreeMap<String, String>,
    pub csrf_token: Option<String>,
    /// A login handshake was attempted during this call, successful or not
    pub logged_in: bool,
}

/// Failure shape of a response description
#[derive(Debug, Clone, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// One response description
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BridgeResponse {
    Success(SuccessBody),
    Failure(FailureBody),
}

impl BridgeResponse {
    /// Build the failure shape for an error
    pub fn failure(err: &Error) -> Self {
        BridgeResponse::Failure(FailureBody {
            success: false,
            error: err.to_string(),
            error_type: err.error_type().to_string(),
            status: err.status_code(),
            body: err.response_body().map(str::to_string),
        })
    }

    /// Check if this is the success shape
    pub fn is_success(&self) -> bool {
        matches!(self, BridgeResponse::Success(_))
    }

    /// Process exit code for a one-shot invocation
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Serialize as ASCII-only JSON
    pub fn to_json(&self) -> Result<String> {
        to_ascii_json(self)
    }
}

/// JSON formatter that escapes every non-ASCII character as `\uXXXX`
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize `value` as JSON with all non-ASCII text escaped
pub fn to_ascii_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_description() {
        let request = BridgeRequest::from_json(
            r#"{
                "url": "https://forum.example.com/posts.json",
                "method": "post",
                "headers": {"Accept": "application/json"},
                "body": "{\"raw\":\"hello\"}",
                "cookies": {"_t": "abc"},
                "timeout": 12.5,
                "login": {"username": "alice", "password": "secret", "second_factor_token": "123456"}
            }"#,
        )
        .unwrap();

        assert_eq!(request.method, "post");
        assert_eq!(request.cookies.as_ref().unwrap()["_t"], "abc");
        assert_eq!(
            request.login.as_ref().unwrap().second_factor_token.as_deref(),
            Some("123456")
        );

        let outgoing = request.to_request(Duration::from_secs(30)).unwrap();
        assert_eq!(outgoing.method, reqwest::Method::POST);
        assert_eq!(outgoing.timeout, Some(Duration::from_millis(12_500)));
        assert_eq!(outgoing.headers["accept"], "application/json");
        assert_eq!(outgoing.body.as_deref(), Some(&b"{\"raw\":\"hello\"}"[..]));
    }

    #[test]
    fn test_minimal_description_defaults() {
        let request = BridgeRequest::from_json(
            r#"{"url": "https://forum.example.com/latest.json", "headers": null}"#,
        )
        .unwrap();
        assert_eq!(request.method, "GET");
        assert!(request.login.is_none());

        let outgoing = request.to_request(Duration::from_secs(30)).unwrap();
        assert_eq!(outgoing.method, reqwest::Method::GET);
        assert_eq!(outgoing.timeout, Some(Duration::from_secs(30)));
        assert!(outgoing.body.is_none());
    }

    #[test]
    fn test_bad_timeouts_fall_back() {
        let mut request = BridgeRequest::get("https://forum.example.com/");
        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            request.timeout = Some(bad);
            assert_eq!(
                request.effective_timeout(Duration::from_secs(30)),
                Duration::from_secs(30)
            );
        }
    }

    #[test]
    fn test_malformed_json_vs_wrong_shape() {
        let err = BridgeRequest::from_json(r#"{"url": }"#).unwrap_err();
        assert_eq!(err.error_type(), "JSONDecodeError");

        let err = BridgeRequest::from_json(r#"{"method": "GET"}"#).unwrap_err();
        assert_eq!(err.error_type(), "InputError");
    }

    #[test]
    fn test_invalid_method_and_url_are_input_errors() {
        let mut request = BridgeRequest::get("https://forum.example.com/");
        request.method = "GE T".to_string();
        assert_eq!(
            request.to_request(Duration::from_secs(1)).unwrap_err().error_type(),
            "InputError"
        );

        for url in ["not a url", "ftp://forum.example.com/file"] {
            let request = BridgeRequest::get(url);
            assert_eq!(
                request.to_request(Duration::from_secs(1)).unwrap_err().error_type(),
                "InputError"
            );
        }
    }

    #[test]
    fn test_success_shape() {
        let response = BridgeResponse::Success(SuccessBody {
            success: true,
            status: 200,
            headers: BTreeMap::new(),
            body: "ok".to_string(),
            cookies: BTreeMap::new(),
            csrf_token: None,
            logged_in: false,
        });

        let value: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["status"], 200);
        assert!(value["csrf_token"].is_null());
        assert_eq!(value["logged_in"], false);
        assert_eq!(response.exit_code(), 0);
    }

    #[test]
    fn test_failure_shape_omits_absent_fields() {
        let response = BridgeResponse::failure(&Error::transport("connection refused"));
        let json = response.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error_type"], "TransportError");
        assert!(value.get("status").is_none());
        assert!(value.get("body").is_none());
        assert_eq!(response.exit_code(), 1);

        let response = BridgeResponse::failure(&Error::auth_response(
            "Login failed with status 403",
            "https://forum.example.com/session.json",
            403,
            "denied",
        ));
        let value: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        assert_eq!(value["status"], 403);
        assert_eq!(value["body"], "denied");
    }

    #[test]
    fn test_output_is_ascii_escaped() {
        let json = to_ascii_json(&serde_json::json!({"title": "café 😀", "quote": "a\"b"})).unwrap();

        assert!(json.is_ascii());
        assert!(json.contains("caf\\u00e9 \\ud83d\\ude00"));
        assert!(json.contains("a\\\"b"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "café 😀");
    }
}
