// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request types

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP request representation
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url.as_ref())?,
            headers: HeaderMap::new(),
            body: None,
            timeout: Some(DEFAULT_TIMEOUT),
        })
    }

    /// Create a new GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a new POST request
    pub fn post(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    /// Parse a method name as given by the caller (case-insensitive)
    pub fn parse_method(method: &str) -> Result<Method> {
        let upper = method.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Err(Error::input("HTTP method must not be empty"));
        }
        Method::from_bytes(upper.as_bytes())
            .map_err(|_| Error::input(format!("Invalid HTTP method: {}", method)))
    }

    /// Set a header, replacing any previous value
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set multiple headers.
    ///
    /// Fails on the first header that is not valid HTTP.
    pub fn try_headers(mut self, headers: &HashMap<String, String>) -> Result<Self> {
        for (name, value) in headers {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|_| Error::input(format!("Invalid header name: {}", name)))?;
            let header_value = HeaderValue::try_from(value.as_str())
                .map_err(|_| Error::input(format!("Invalid value for header {}", name)))?;
            self.headers.insert(header_name, header_value);
        }
        Ok(self)
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        let json = serde_json::to_vec(data)?;
        self.body = Some(Bytes::from(json));
        self = self.header("content-type", "application/json");
        Ok(self)
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the URL as string
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    /// Get the host
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}
