//! Signing keys for strict ID token verification.
//!
//! `GoogleKeySource` keeps the provider's JWKS document in memory and refreshes
//! it on demand: when the cached copy is older than the TTL, or when a token
//! names a `kid` the cached copy does not know (key rotation).
//!
//! Lookups of cached keys read a snapshot and never wait on a refresh. Refreshes
//! are single-flight: concurrent misses share one fetch, and an unknown `kid`
//! seen shortly after a successful fetch is rejected without fetching again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

#[derive(Debug, Error)]
pub enum KeySourceError {
    /// Transport failure or a non-success answer from the key endpoint.
    #[error("signing keys unavailable: {0}")]
    Unavailable(String),

    #[error("no signing key with kid `{0}`")]
    UnknownKey(String),
}

/// Where strict verification gets the public key for a token's `kid`.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn signing_key(&self, kid: &str) -> Result<Jwk, KeySourceError>;
}

struct CachedKeys {
    jwks: JwkSet,
    fetched_at: Instant,
}

impl CachedKeys {
    fn find(&self, kid: &str) -> Result<Jwk, KeySourceError> {
        self.jwks
            .find(kid)
            .cloned()
            .ok_or_else(|| KeySourceError::UnknownKey(kid.to_string()))
    }
}

/// JWKS fetched over HTTPS from the identity provider.
pub struct GoogleKeySource {
    http: reqwest::Client,
    certs_url: String,
    ttl: Duration,
    min_refresh_interval: Duration,
    cache: ArcSwapOption<CachedKeys>,
    // Held for the duration of a fetch; stores when the last fetch finished.
    refresh: Mutex<Option<Instant>>,
}

impl std::fmt::Debug for GoogleKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleKeySource")
            .field("certs_url", &self.certs_url)
            .field("ttl", &self.ttl)
            .field("min_refresh_interval", &self.min_refresh_interval)
            .finish()
    }
}

impl GoogleKeySource {
    pub fn new(
        certs_url: impl Into<String>,
        ttl: Duration,
        min_refresh_interval: Duration,
        request_timeout: Duration,
    ) -> Result<Self, KeySourceError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| KeySourceError::Unavailable(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            certs_url: certs_url.into(),
            ttl,
            min_refresh_interval,
            cache: ArcSwapOption::empty(),
            refresh: Mutex::new(None),
        })
    }

    fn cached(&self, kid: &str) -> Option<Jwk> {
        let snapshot = self.cache.load();
        let entry = (*snapshot).as_ref()?;
        if entry.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        entry.jwks.find(kid).cloned()
    }

    async fn refresh(&self, kid: &str) -> Result<Jwk, KeySourceError> {
        let requested_at = Instant::now();
        let mut last_attempt = self.refresh.lock().await;
        let current = self.cache.load_full();

        // Someone else fetched while we waited for the lock: use their result.
        if last_attempt.is_some_and(|at| at >= requested_at) {
            return match current {
                Some(entry) => entry.find(kid),
                None => Err(KeySourceError::Unavailable(
                    "key refresh failed moments ago".to_string(),
                )),
            };
        }

        if let Some(entry) = &current {
            let age = entry.fetched_at.elapsed();
            if age < self.min_refresh_interval && age < self.ttl {
                debug!(%kid, "unknown kid inside the refresh interval");
                return entry.find(kid);
            }
        }

        let fetched = self.fetch().await;
        *last_attempt = Some(Instant::now());
        let jwks = fetched?;
        info!(keys = jwks.keys.len(), "signing keys refreshed");

        let entry = Arc::new(CachedKeys {
            jwks,
            fetched_at: Instant::now(),
        });
        self.cache.store(Some(Arc::clone(&entry)));

        entry.find(kid)
    }

    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        debug!(url = %self.certs_url, "fetching signing keys");

        let response = self
            .http
            .get(&self.certs_url)
            .send()
            .await
            .map_err(|e| KeySourceError::Unavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(KeySourceError::Unavailable(format!(
                "key endpoint answered {}",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| KeySourceError::Unavailable(format!("invalid key document: {e}")))
    }
}

#[async_trait]
impl KeySource for GoogleKeySource {
    async fn signing_key(&self, kid: &str) -> Result<Jwk, KeySourceError> {
        if let Some(jwk) = self.cached(kid) {
            return Ok(jwk);
        }
        self.refresh(kid).await
    }
}

/// A fixed key set, for local development against self-issued tokens.
#[derive(Debug, Clone)]
pub struct StaticKeySource {
    jwks: JwkSet,
}

impl StaticKeySource {
    pub fn new(jwks: JwkSet) -> Self {
        Self { jwks }
    }

    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(document)?))
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn signing_key(&self, kid: &str) -> Result<Jwk, KeySourceError> {
        self.jwks
            .find(kid)
            .cloned()
            .ok_or_else(|| KeySourceError::UnknownKey(kid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const JWKS: &str = include_str!("../../../tests/fixtures/jwks.json");

    fn source(server: &MockServer, ttl: Duration) -> GoogleKeySource {
        source_with_interval(server, ttl, Duration::ZERO)
    }

    fn source_with_interval(
        server: &MockServer,
        ttl: Duration,
        min_refresh_interval: Duration,
    ) -> GoogleKeySource {
        GoogleKeySource::new(
            format!("{}/oauth2/v3/certs", server.uri()),
            ttl,
            min_refresh_interval,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn jwks_response() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(JWKS, "application/json")
    }

    #[tokio::test]
    async fn fetches_once_and_serves_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/certs"))
            .respond_with(jwks_response())
            .expect(1)
            .mount(&server)
            .await;

        let keys = source(&server, Duration::from_secs(3600));
        let first = keys.signing_key("trusted-key-1").await.unwrap();
        let second = keys.signing_key("trusted-key-1").await.unwrap();

        assert_eq!(first.common.key_id.as_deref(), Some("trusted-key-1"));
        assert_eq!(second.common.key_id, first.common.key_id);
    }

    #[tokio::test]
    async fn unknown_kid_triggers_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/certs"))
            .respond_with(jwks_response())
            .expect(2)
            .mount(&server)
            .await;

        let keys = source(&server, Duration::from_secs(3600));
        keys.signing_key("trusted-key-1").await.unwrap();

        let err = keys.signing_key("rotated-away").await.unwrap_err();
        assert!(matches!(err, KeySourceError::UnknownKey(kid) if kid == "rotated-away"));
    }

    #[tokio::test]
    async fn stale_cache_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/certs"))
            .respond_with(jwks_response())
            .expect(2)
            .mount(&server)
            .await;

        let keys = source(&server, Duration::ZERO);
        keys.signing_key("trusted-key-1").await.unwrap();
        keys.signing_key("trusted-key-1").await.unwrap();
    }

    #[tokio::test]
    async fn unknown_kids_inside_refresh_interval_do_not_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/certs"))
            .respond_with(jwks_response())
            .expect(1)
            .mount(&server)
            .await;

        let keys = source_with_interval(&server, Duration::from_secs(3600), Duration::from_secs(60));
        keys.signing_key("trusted-key-1").await.unwrap();

        for i in 0..5 {
            let err = keys.signing_key(&format!("bogus-{i}")).await.unwrap_err();
            assert!(matches!(err, KeySourceError::UnknownKey(_)));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn slow_refresh_does_not_hold_up_cached_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/certs"))
            .respond_with(jwks_response())
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/certs"))
            .respond_with(jwks_response().set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let keys = Arc::new(source(&server, Duration::from_secs(3600)));
        keys.signing_key("trusted-key-1").await.unwrap();

        let misses: Vec<_> = (0..5)
            .map(|i| {
                let keys = Arc::clone(&keys);
                tokio::spawn(async move { keys.signing_key(&format!("bogus-{i}")).await })
            })
            .collect();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let started = Instant::now();
        keys.signing_key("trusted-key-1").await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(500));

        for miss in misses {
            let err = miss.await.unwrap().unwrap_err();
            assert!(matches!(err, KeySourceError::UnknownKey(_)));
        }

        // One warm-up fetch plus one shared refresh for all five misses.
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn endpoint_failure_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source(&server, Duration::from_secs(60))
            .signing_key("trusted-key-1")
            .await
            .unwrap_err();
        assert!(matches!(err, KeySourceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn static_source_knows_only_its_keys() {
        let keys = StaticKeySource::from_json(JWKS).unwrap();
        assert!(keys.signing_key("trusted-key-1").await.is_ok());
        assert!(matches!(
            keys.signing_key("other").await,
            Err(KeySourceError::UnknownKey(_))
        ));
    }
}
