// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request executor
//!
//! Runs one request description end to end: session, cookies, login
//! decision, the real request and body decoding. Every failure becomes a
//! failure description; nothing escapes as a panic or an `Err`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn, Level};

use super::decode::BodyDecoder;
use super::protocol::{BridgeRequest, BridgeResponse, SuccessBody};
use crate::auth::{login, LoginDecider, LoginDecision, LoginTimeouts};
use crate::config::{BridgeConfig, LoginFailurePolicy};
use crate::error::{Error, Result};
use crate::session::{Origin, Session, SessionRegistry};

/// Executes request descriptions against a session registry
pub struct Executor {
    config: BridgeConfig,
    registry: Arc<SessionRegistry>,
    decider: LoginDecider,
    decoder: BodyDecoder,
}

impl Executor {
    /// Create an executor with its own registry
    pub fn new(config: BridgeConfig) -> Self {
        let registry = Arc::new(SessionRegistry::new(
            Arc::new(config.http.clone()),
            config.warmup_timeout,
        ));
        Self::with_registry(config, registry)
    }

    /// Create an executor over an existing registry
    pub fn with_registry(config: BridgeConfig, registry: Arc<SessionRegistry>) -> Self {
        let decider = LoginDecider::new(
            config.session_cookies.clone(),
            config.public_endpoints.clone(),
        );
        let decoder = BodyDecoder::new(config.manual_brotli);

        Self {
            config,
            registry,
            decider,
            decoder,
        }
    }

    /// Get the config
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Get the session registry
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Parse and execute one JSON request description
    pub async fn handle_json(&self, input: &str) -> BridgeResponse {
        match BridgeRequest::from_json(input) {
            Ok(request) => self.execute(request).await,
            Err(e) => {
                error!(error_type = e.error_type(), error = %e, "Rejected request description");
                BridgeResponse::failure(&e)
            }
        }
    }

    /// Execute one request description
    pub async fn execute(&self, request: BridgeRequest) -> BridgeResponse {
        match self.try_execute(&request).await {
            Ok(body) => BridgeResponse::Success(body),
            Err(e) => {
                error!(
                    url = %request.url,
                    error_type = e.error_type(),
                    error = %e,
                    "Request failed"
                );
                BridgeResponse::failure(&e)
            }
        }
    }

    async fn try_execute(&self, input: &BridgeRequest) -> Result<SuccessBody> {
        // Validated before any session is touched
        let request = input.to_request(self.config.default_timeout)?;
        let origin = Origin::from_url(&input.url);

        let session = self.registry.get_or_create(&origin).await?;

        if let Some(cookies) = &input.cookies {
            debug!(count = cookies.len(), "Merging caller cookies into session");
            session.apply_cookies(cookies);
        }

        let logged_in = self.authenticate(&session, input).await?;

        info!(method = %request.method, url = %request.url, "Sending request");
        let response = session.execute(request).await?;
        info!(
            status = response.status_code(),
            time_ms = response.response_time_ms,
            "Response received"
        );

        let decoded = self.decoder.decode(&response);
        debug!(
            strategy = ?decoded.strategy,
            length = decoded.text.len(),
            "Decoded body"
        );
        log_body_shape(&decoded.text);

        Ok(SuccessBody {
            success: true,
            status: response.status_code(),
            headers: response.header_map(),
            body: decoded.text,
            cookies: session.cookies(),
            csrf_token: session.csrf_token(),
            logged_in,
        })
    }

    /// Run the login decision and, if needed, the handshake.
    ///
    /// Returns whether a login handshake was attempted during this call,
    /// whatever its outcome. A failed login is an error only under
    /// [`LoginFailurePolicy::Abort`].
    async fn authenticate(&self, session: &Session, input: &BridgeRequest) -> Result<bool> {
        let mut observed: HashSet<String> = session.cookie_names();
        if let Some(cookies) = &input.cookies {
            observed.extend(cookies.keys().cloned());
        }

        let credentials = match self.decider.decide(&input.url, input.login.as_ref(), &observed) {
            LoginDecision::Authenticate(credentials) => credentials,
            LoginDecision::NoCredentials => return Ok(false),
            LoginDecision::PublicEndpoint { endpoint } => {
                info!(endpoint = %endpoint, "Public endpoint, skipping login");
                return Ok(false);
            }
            LoginDecision::AlreadyAuthenticated { cookie } => {
                info!(cookie = %cookie, "Session cookie present, skipping login");
                return Ok(false);
            }
            LoginDecision::IncompleteCredentials => {
                warn!("Username or password missing, skipping login");
                return Ok(false);
            }
        };

        let timeouts = LoginTimeouts {
            csrf: self.config.csrf_timeout,
            login: self.config.login_timeout,
        };

        match login(session, &credentials, timeouts).await {
            Ok(_) => Ok(true),
            Err(e) => self.on_login_failure(e),
        }
    }

    fn on_login_failure(&self, err: Error) -> Result<bool> {
        match self.config.login_failure {
            LoginFailurePolicy::Abort => Err(err),
            LoginFailurePolicy::Continue => {
                warn!(error = %err, "Login failed, sending request anyway");
                Ok(true)
            }
        }
    }
}

fn log_body_shape(text: &str) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => {
            let keys: Vec<&str> = map.keys().take(10).map(String::as_str).collect();
            debug!(keys = ?keys, "Body is a JSON object");
        }
        Ok(serde_json::Value::Array(items)) => {
            debug!(len = items.len(), "Body is a JSON array");
        }
        Ok(_) => debug!("Body is a JSON scalar"),
        Err(_) => {
            let preview: String = text.chars().take(200).collect();
            debug!(preview = %preview, "Body is not JSON");
        }
    }
}
