// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::Client;

use super::cookie::CookieJar;
use super::request::Request;
use super::response::Response;
use super::transport::{Transport, TransportFactory};
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};
use crate::redact::redact_secrets;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Default headers
    pub default_headers: HeaderMap,
    /// Let the client decode `br` bodies itself
    pub auto_brotli: bool,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            "accept",
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.9,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            "accept-language",
            HeaderValue::from_static("en-US,en;q=0.5"),
        );
        default_headers.insert("accept-encoding", HeaderValue::from_static("gzip, br"));

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers,
            auto_brotli: false,
            proxy: None,
        }
    }
}

/// HTTP client with its own cookie jar and mutable session headers
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    cookie_jar: CookieJar,
    /// Headers added to every request (CSRF token and the like)
    session_headers: Arc<RwLock<HeaderMap>>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone())
            .gzip(true)
            .brotli(config.auto_brotli)
            .cookie_store(false); // We handle cookies ourselves

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            config,
            cookie_jar: CookieJar::new(),
            session_headers: Arc::new(RwLock::new(HeaderMap::new())),
        })
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Session headers, then the request's own headers, then the jar's cookies
    fn build_headers(&self, request: &Request) -> HeaderMap {
        let mut headers = self.session_headers.read().clone();
        for name in request.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in request.headers.iter() {
            headers.append(name.clone(), value.clone());
        }

        if let Some(jar_cookies) = self.cookie_jar.get_cookie_header(&request.url) {
            let merged = match headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
                Some(existing) if !existing.trim().is_empty() => {
                    format!("{}; {}", existing.trim_end_matches(';').trim(), jar_cookies)
                }
                _ => jar_cookies,
            };
            if let Ok(value) = HeaderValue::from_str(&merged) {
                headers.insert(COOKIE, value);
            }
        }

        headers
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(&self, request: Request) -> Result<Response> {
        let start = Instant::now();
        let headers = self.build_headers(&request);

        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(
                method = %request.method,
                url = %request.url,
                headers = %redact_secrets(&format!("{:?}", headers)),
                "Sending request"
            );
        }

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        for cookie in headers.get_all(SET_COOKIE) {
            if let Ok(cookie_str) = cookie.to_str() {
                self.cookie_jar.add_from_header(cookie_str, &final_url);
            }
        }

        let body = response.bytes().await?;
        let response_time = start.elapsed().as_millis() as u64;

        Ok(Response::new(status, headers, body, final_url, response_time))
    }

    fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    fn default_header(&self, name: &str) -> Option<String> {
        self.session_headers
            .read()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    fn set_default_header(&self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::try_from(name)
            .map_err(|e| Error::Config(format!("Invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| Error::Config(format!("Invalid value for header {}: {}", name, e)))?;
        self.session_headers.write().insert(name, value);
        Ok(())
    }
}

impl TransportFactory for HttpClientConfig {
    fn create(&self) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(HttpClient::with_config(self.clone())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.config().user_agent, DEFAULT_USER_AGENT);
        assert!(!client.config().auto_brotli);
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let config = HttpClientConfig {
            proxy: Some("ftp://proxy.example.com:21".to_string()),
            ..Default::default()
        };
        let err = HttpClient::with_config(config).err().unwrap();
        assert_eq!(err.error_type(), "ConfigError");
    }

    #[test]
    fn test_session_headers() {
        let client = HttpClient::new().unwrap();
        assert!(client.default_header("x-csrf-token").is_none());
        client.set_default_header("X-CSRF-Token", "abc").unwrap();
        assert_eq!(client.default_header("x-csrf-token").as_deref(), Some("abc"));
        assert!(client.set_default_header("bad header", "v").is_err());
    }

    #[test]
    fn test_request_headers_override_session_headers() {
        let client = HttpClient::new().unwrap();
        client.set_default_header("x-csrf-token", "session").unwrap();
        client.cookie_jar().set("_t", "tok");

        let request = Request::get("https://forum.example.com/latest.json")
            .unwrap()
            .header("x-csrf-token", "explicit")
            .header("cookie", "caller=1;");
        let headers = client.build_headers(&request);

        assert_eq!(headers.get("x-csrf-token").unwrap(), "explicit");
        assert_eq!(headers.get("cookie").unwrap(), "caller=1; _t=tok");
    }

    #[tokio::test]
    async fn test_execute_sends_cookies_and_stores_set_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest.json"))
            .and(header("cookie", "_t=tok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "cf_clearance=cf1; Path=/")
                    .set_body_raw("{}", "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        client.cookie_jar().set("_t", "tok");

        let response = client
            .execute(Request::get(format!("{}/latest.json", server.uri())).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status_code(), 200);
        assert_eq!(client.cookie_jar().get("cf_clearance").as_deref(), Some("cf1"));
        assert_eq!(client.cookie_jar().get("_t").as_deref(), Some("tok"));
    }
}
