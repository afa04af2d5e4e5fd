// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Behaviour
//!
//! - The key set lives at `https://{domain}/.well-known/jwks.json`
//! - Keys are cached with a configurable TTL
//! - Refreshes are single-flight: concurrent callers that find the cache
//!   stale wait for one fetch and share its outcome
//! - An unknown `kid` forces one refresh, at most once per
//!   `min_refresh_interval`, to pick up rotated keys
//! - Stale cache is used on fetch failure, and no new fetch is attempted
//!   for `min_refresh_interval` after one fails
//! - Fetch failures surface as `AuthError::JwksUnavailable`

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default timeout for a single JWKS request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum age of the cached set before an unknown `kid` may trigger a refetch.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// JWKS cache entry.
struct CacheEntry {
    jwks: Arc<JwkSet>,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entry: Option<CacheEntry>,
    /// Completed fetch attempts, successful or not
    attempts: u64,
    /// Reason the most recent attempt failed, if it did
    last_error: Option<String>,
    /// When the most recent attempt failed
    failed_at: Option<Instant>,
}

impl CacheState {
    fn fresh(&self, max_age: Duration) -> Option<Arc<JwkSet>> {
        self.entry
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < max_age)
            .map(|entry| entry.jwks.clone())
    }

    /// The stale set, while a recent failure holds off further fetches.
    fn cooling_down(&self, cooldown: Duration) -> Option<Arc<JwkSet>> {
        let failed_at = self.failed_at?;
        if failed_at.elapsed() >= cooldown {
            return None;
        }
        self.entry.as_ref().map(|entry| entry.jwks.clone())
    }

    /// Outcome of the latest attempt: its key set, or a stale one after a failure.
    fn latest(&self, jwks_url: &Url) -> Result<Arc<JwkSet>, AuthError> {
        match (&self.last_error, &self.entry) {
            (None, Some(entry)) => Ok(entry.jwks.clone()),
            (Some(reason), Some(entry)) => {
                tracing::warn!(
                    url = %jwks_url,
                    %reason,
                    age_secs = entry.fetched_at.elapsed().as_secs(),
                    "JWKS refresh failed, serving stale key set"
                );
                Ok(entry.jwks.clone())
            }
            (Some(reason), None) => Err(AuthError::JwksUnavailable(reason.clone())),
            (None, None) => Err(AuthError::JwksUnavailable(
                "no key set has been fetched".to_string(),
            )),
        }
    }
}

/// JWKS manager with caching.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct JwksManager {
    /// JWKS endpoint
    jwks_url: Url,
    /// Cache TTL
    cache_ttl: Duration,
    /// Cooldown for refetches caused by an unknown `kid`
    min_refresh_interval: Duration,
    /// Cached JWKS
    cache: Arc<RwLock<CacheState>>,
    /// Held for the duration of a fetch
    refresh_lock: Arc<Mutex<()>>,
    /// HTTP client
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint, usually [`JwksManager::url_for_domain`]
    /// - `fetch_timeout`: Upper bound for one request to the endpoint
    pub fn new(jwks_url: Url, fetch_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self {
            jwks_url,
            cache_ttl: DEFAULT_CACHE_TTL,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            cache: Arc::new(RwLock::new(CacheState::default())),
            refresh_lock: Arc::new(Mutex::new(())),
            client,
        })
    }

    /// The well-known JWKS location for an issuer domain.
    pub fn url_for_domain(domain: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("https://{domain}/.well-known/jwks.json"))
    }

    /// Create with custom cache TTL. A zero TTL disables caching.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Create with custom cooldown for unknown-`kid` refetches.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &Url {
        &self.jwks_url
    }

    /// Find the key whose `kid` matches.
    ///
    /// `Ok(None)` means the key set was available but holds no such key.
    pub async fn find_key(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        let jwks = self.get_jwks().await?;
        if let Some(jwk) = jwks.find(kid) {
            return Ok(Some(jwk.clone()));
        }

        // The provider may have rotated keys since the cached fetch.
        tracing::debug!(kid, "Key id not in cached JWKS, checking for rotation");
        let jwks = self.refresh_if_older_than(self.min_refresh_interval).await?;
        Ok(jwks.find(kid).cloned())
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let _flight = self.refresh_lock.lock().await;
        let jwks = self.fetch_jwks().await;
        self.record(jwks).await.map(|_| ())
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        self.cache.read().await.fresh(self.cache_ttl).is_some()
    }

    /// Drop the cached key set.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        cache.entry = None;
        cache.last_error = None;
        cache.failed_at = None;
    }

    /// Whether the last refresh failed and an older key set is being served.
    pub async fn serving_stale(&self) -> bool {
        let cache = self.cache.read().await;
        cache.last_error.is_some() && cache.entry.is_some()
    }

    /// Fetch JWKS (with caching).
    async fn get_jwks(&self) -> Result<Arc<JwkSet>, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(jwks) = cache.fresh(self.cache_ttl) {
                return Ok(jwks);
            }
            if let Some(jwks) = cache.cooling_down(self.min_refresh_interval) {
                return Ok(jwks);
            }
        }

        self.refresh_if_older_than(self.cache_ttl).await
    }

    /// Refresh unless the cached set is younger than `max_age`.
    ///
    /// Callers that queued behind an in-flight fetch take that fetch's outcome
    /// instead of issuing another request.
    async fn refresh_if_older_than(&self, max_age: Duration) -> Result<Arc<JwkSet>, AuthError> {
        let seen_attempts = self.cache.read().await.attempts;
        let _flight = self.refresh_lock.lock().await;

        {
            let cache = self.cache.read().await;
            if let Some(jwks) = cache.fresh(max_age) {
                return Ok(jwks);
            }
            if let Some(jwks) = cache.cooling_down(self.min_refresh_interval) {
                return Ok(jwks);
            }
            if cache.attempts != seen_attempts {
                return cache.latest(&self.jwks_url);
            }
        }

        let jwks = self.fetch_jwks().await;
        self.record(jwks).await
    }

    /// Store the outcome of a fetch.
    async fn record(&self, fetched: Result<JwkSet, AuthError>) -> Result<Arc<JwkSet>, AuthError> {
        let mut cache = self.cache.write().await;
        cache.attempts += 1;

        match fetched {
            Ok(jwks) => {
                let jwks = Arc::new(jwks);
                cache.entry = Some(CacheEntry {
                    jwks: jwks.clone(),
                    fetched_at: Instant::now(),
                });
                cache.last_error = None;
                cache.failed_at = None;
                Ok(jwks)
            }
            Err(AuthError::JwksUnavailable(reason)) => {
                cache.last_error = Some(reason);
                cache.failed_at = Some(Instant::now());
                cache.latest(&self.jwks_url)
            }
            Err(other) => Err(other),
        }
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        tracing::info!(url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .client
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(|e| AuthError::JwksUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::JwksUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::JwksUnavailable(e.to_string()))?;

        tracing::debug!(keys = jwks.keys.len(), "JWKS fetched");
        Ok(jwks)
    }
}

/// Convert a JWK to a DecodingKey.
///
/// Only the key-type parameters are used (`n`/`e` for RSA, `x`/`y` for EC).
pub fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            DecodingKey::from_rsa_components(&rsa.n, &rsa.e).map_err(|e| {
                tracing::debug!(error = %e, "Unusable RSA key in JWKS");
                AuthError::UnparsableToken
            })
        }
        AlgorithmParameters::EllipticCurve(ec) => {
            DecodingKey::from_ec_components(&ec.x, &ec.y).map_err(|e| {
                tracing::debug!(error = %e, "Unusable EC key in JWKS");
                AuthError::UnparsableToken
            })
        }
        _ => Err(AuthError::UnparsableToken),
    }
}
