// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Single-slot session registry
//!
//! Holds at most one live session. Asking for a different origin replaces
//! the session wholesale, cookies included. The slot sits behind an async
//! mutex so get-or-create (warm-up included) is atomic even if callers
//! overlap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::origin::Origin;
use super::session::{is_clearance_cookie, Session, WarmupOutcome};
use crate::error::Result;
use crate::http::{Request, Transport, TransportFactory};

/// Default timeout of the warm-up GET
pub const DEFAULT_WARMUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Owns the process's one live session
pub struct SessionRegistry {
    factory: Arc<dyn TransportFactory>,
    warmup_timeout: Duration,
    current: Mutex<Option<Arc<Session>>>,
    sessions_created: AtomicU64,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new(factory: Arc<dyn TransportFactory>, warmup_timeout: Duration) -> Self {
        Self {
            factory,
            warmup_timeout,
            current: Mutex::new(None),
            sessions_created: AtomicU64::new(0),
        }
    }

    /// Return the session for `origin`, creating and warming a new one if
    /// there is none or the cached one is bound elsewhere
    pub async fn get_or_create(&self, origin: &Origin) -> Result<Arc<Session>> {
        let mut slot = self.current.lock().await;

        if let Some(session) = slot.as_ref() {
            if session.origin() == origin {
                debug!(origin = %origin, "Reusing session");
                return Ok(Arc::clone(session));
            }
            info!(
                previous = %session.origin(),
                next = %origin,
                "Origin changed, discarding previous session"
            );
        }

        let transport = self.factory.create()?;
        let warmup = warm_up(transport.as_ref(), origin, self.warmup_timeout).await;
        let session = Arc::new(Session::new(origin.clone(), transport, warmup));

        *slot = Some(Arc::clone(&session));
        self.sessions_created.fetch_add(1, Ordering::Relaxed);

        Ok(session)
    }

    /// The cached session, if any
    pub async fn current(&self) -> Option<Arc<Session>> {
        self.current.lock().await.clone()
    }

    /// Number of sessions constructed over the registry's lifetime
    pub fn sessions_created(&self) -> u64 {
        self.sessions_created.load(Ordering::Relaxed)
    }
}

/// Best-effort GET against the origin so the bypass layer can establish its
/// cookies. Never fails; problems become a degraded outcome.
async fn warm_up(transport: &dyn Transport, origin: &Origin, timeout: Duration) -> WarmupOutcome {
    debug!(origin = %origin, "Warming up session");

    let request = match Request::get(origin.as_str()) {
        Ok(request) => request.timeout(timeout),
        Err(e) => {
            warn!(origin = %origin, error = %e, "Session warm-up skipped");
            return WarmupOutcome::Degraded {
                reason: e.to_string(),
            };
        }
    };

    match transport.execute(request).await {
        Ok(response) => {
            let mut clearance_cookies: Vec<String> = transport
                .cookie_jar()
                .names()
                .into_iter()
                .filter(|name| is_clearance_cookie(name))
                .collect();
            clearance_cookies.sort();

            if clearance_cookies.is_empty() {
                debug!(
                    status = response.status_code(),
                    "Warm-up done, no clearance cookies yet"
                );
            } else {
                debug!(
                    status = response.status_code(),
                    cookies = ?clearance_cookies,
                    "Warm-up obtained clearance cookies"
                );
            }

            WarmupOutcome::Warmed {
                status: response.status_code(),
                clearance_cookies,
            }
        }
        Err(e) => {
            warn!(origin = %origin, error = %e, "Session warm-up failed, continuing without it");
            WarmupOutcome::Degraded {
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClientConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Factory that counts how many transports it built
    #[derive(Default)]
    struct CountingFactory {
        config: HttpClientConfig,
        created: AtomicU64,
    }

    impl TransportFactory for CountingFactory {
        fn create(&self) -> Result<Arc<dyn Transport>> {
            self.created.fetch_add(1, Ordering::Relaxed);
            self.config.create()
        }
    }

    async fn warm_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "cf_clearance=cleared; Path=/")
                    .set_body_string("<html></html>"),
            )
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_same_origin_reuses_session_without_second_warmup() {
        let server = warm_server().await;
        let factory = Arc::new(CountingFactory::default());
        let registry = SessionRegistry::new(factory.clone(), DEFAULT_WARMUP_TIMEOUT);
        let origin = Origin::from_url(&format!("{}/latest.json", server.uri()));

        let first = registry.get_or_create(&origin).await.unwrap();
        let second = registry.get_or_create(&origin).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.sessions_created(), 1);
        assert_eq!(factory.created.load(Ordering::Relaxed), 1);
        assert_eq!(
            first.warmup(),
            &WarmupOutcome::Warmed {
                status: 200,
                clearance_cookies: vec!["cf_clearance".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_origin_change_replaces_session_and_cookies() {
        let first_server = warm_server().await;
        let second_server = warm_server().await;
        let registry =
            SessionRegistry::new(Arc::new(HttpClientConfig::default()), DEFAULT_WARMUP_TIMEOUT);

        let first_origin = Origin::from_url(&first_server.uri());
        let second_origin = Origin::from_url(&second_server.uri());

        let first = registry.get_or_create(&first_origin).await.unwrap();
        first.cookie_jar().set("_t", "first-origin");

        let second = registry.get_or_create(&second_origin).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.origin(), &second_origin);
        assert!(!second.cookie_names().contains("_t"));
        assert_eq!(registry.sessions_created(), 2);
        assert_eq!(
            registry.current().await.unwrap().origin(),
            &second_origin
        );
    }

    #[tokio::test]
    async fn test_failed_warmup_is_degraded_not_fatal() {
        let registry =
            SessionRegistry::new(Arc::new(HttpClientConfig::default()), Duration::from_secs(2));
        // Nothing listens on port 1
        let origin = Origin::from_url("http://127.0.0.1:1/latest.json");

        let session = registry.get_or_create(&origin).await.unwrap();

        assert!(session.warmup().is_degraded());
        assert_eq!(registry.sessions_created(), 1);
    }
}
