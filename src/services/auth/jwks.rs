//! Trusted key set (JWKS) used to verify access token signatures.
//!
//! - `KeySource` produces the raw key set (remote endpoint, or a fixed set).
//! - `KeySetCache` owns a parsed snapshot, populated lazily on first use and
//!   repopulated once it is older than the configured TTL. `refresh()` is the
//!   only other way the snapshot changes.
//! - A failed repopulation keeps serving the stale snapshot and holds off
//!   further fetches for `RETRY_BACKOFF`. With no snapshot at all, lookups
//!   during the backoff fail fast with `KeySetError::BackingOff` instead of
//!   waiting on the issuer again.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("key set fetch failed: {0}")]
    Fetch(String),
    #[error("key set endpoint returned status {0}")]
    Status(u16),
    #[error("key set parse failed: {0}")]
    Parse(String),
    #[error("key set fetch backing off after a failure")]
    BackingOff,
}

#[async_trait]
pub trait KeySource: Send + Sync {
    // Returns a short label for logs.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<JwkSet, KeySetError>;
}

/// Fetches the key set from the issuer's published JWKS endpoint.
#[derive(Debug, Clone)]
pub struct RemoteKeySource {
    client: reqwest::Client,
    url: Url,
}

impl RemoteKeySource {
    pub fn new(url: Url) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| KeySetError::Fetch(e.to_string()))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeySource for RemoteKeySource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| KeySetError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KeySetError::Status(response.status().as_u16()));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| KeySetError::Parse(e.to_string()))
    }
}

/// A fixed key set (offline development, tests).
#[derive(Debug, Clone)]
pub struct StaticKeySource {
    keys: JwkSet,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    fn describe(&self) -> String {
        "static".to_string()
    }

    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        Ok(self.keys.clone())
    }
}

/// A verification key paired with the algorithm it signs with.
#[derive(Clone)]
pub struct TrustedKey {
    pub key: DecodingKey,
    pub algorithm: Algorithm,
}

impl std::fmt::Debug for TrustedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TrustedKey")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

const RETRY_BACKOFF: Duration = Duration::from_secs(30);

struct Snapshot {
    keys: HashMap<String, TrustedKey>,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    snapshot: Option<Snapshot>,
    // set by a failed lazy fetch; no fetch is attempted before this instant
    retry_at: Option<Instant>,
}

impl CacheState {
    fn backing_off(&self) -> bool {
        self.retry_at.is_some_and(|at| Instant::now() < at)
    }

    // Some(lookup) when the current state can answer without fetching.
    fn answer(&self, kid: &str, ttl: Duration) -> Option<Result<Option<TrustedKey>, KeySetError>> {
        match &self.snapshot {
            Some(s) if s.fetched_at.elapsed() < ttl || self.backing_off() => {
                Some(Ok(s.keys.get(kid).cloned()))
            }
            None if self.backing_off() => Some(Err(KeySetError::BackingOff)),
            _ => None,
        }
    }
}

pub struct KeySetCache {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl std::fmt::Debug for KeySetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySetCache")
            .field("source", &self.source.describe())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl KeySetCache {
    pub fn new(source: Arc<dyn KeySource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Look up a key by `kid`, populating the snapshot first if it is empty or stale.
    pub async fn get(&self, kid: &str) -> Result<Option<TrustedKey>, KeySetError> {
        if let Some(answer) = self.state.read().await.answer(kid, self.ttl) {
            return answer;
        }

        let mut state = self.state.write().await;

        // another request may have repopulated (or failed) while we waited for the lock
        if let Some(answer) = state.answer(kid, self.ttl) {
            return answer;
        }

        match self.load().await {
            Ok(fresh) => {
                let key = fresh.keys.get(kid).cloned();
                state.snapshot = Some(fresh);
                state.retry_at = None;
                Ok(key)
            }
            Err(err) => {
                state.retry_at = Some(Instant::now() + RETRY_BACKOFF);
                match &state.snapshot {
                    Some(stale) => {
                        tracing::warn!(
                            age_secs = stale.fetched_at.elapsed().as_secs(),
                            "serving stale trusted key set"
                        );
                        Ok(stale.keys.get(kid).cloned())
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Refetch the key set now. Returns the number of usable keys.
    pub async fn refresh(&self) -> Result<usize, KeySetError> {
        let fresh = self.load().await?;
        let count = fresh.keys.len();

        let mut state = self.state.write().await;
        state.snapshot = Some(fresh);
        state.retry_at = None;

        Ok(count)
    }

    async fn load(&self) -> Result<Snapshot, KeySetError> {
        tracing::debug!(source = %self.source.describe(), "fetching trusted key set");

        let set = self.source.fetch().await.map_err(|err| {
            tracing::warn!(source = %self.source.describe(), error = %err, "trusted key set fetch failed");
            err
        })?;

        let keys = parse_key_set(&set);
        tracing::info!(keys = keys.len(), "trusted key set loaded");

        Ok(Snapshot {
            keys,
            fetched_at: Instant::now(),
        })
    }
}

/// Turn a JWKS into `kid → TrustedKey`, skipping keys we cannot verify with.
pub fn parse_key_set(set: &JwkSet) -> HashMap<String, TrustedKey> {
    let mut keys = HashMap::new();

    for jwk in &set.keys {
        let Some(kid) = &jwk.common.key_id else {
            tracing::warn!("JWK missing kid, skipping");
            continue;
        };

        let Some(algorithm) = signing_algorithm(jwk) else {
            tracing::warn!(kid = %kid, "unsupported JWK algorithm, skipping");
            continue;
        };

        match DecodingKey::from_jwk(jwk) {
            Ok(key) => {
                keys.insert(kid.clone(), TrustedKey { key, algorithm });
            }
            Err(err) => {
                tracing::warn!(kid = %kid, error = %err, "failed to build decoding key, skipping");
            }
        }
    }

    keys
}

/// Asymmetric algorithm a key signs with: the declared `alg` if present,
/// otherwise inferred from the key type. Symmetric keys are never trusted.
fn signing_algorithm(jwk: &Jwk) -> Option<Algorithm> {
    if let Some(declared) = &jwk.common.key_algorithm {
        return match declared {
            KeyAlgorithm::RS256 => Some(Algorithm::RS256),
            KeyAlgorithm::RS384 => Some(Algorithm::RS384),
            KeyAlgorithm::RS512 => Some(Algorithm::RS512),
            KeyAlgorithm::PS256 => Some(Algorithm::PS256),
            KeyAlgorithm::PS384 => Some(Algorithm::PS384),
            KeyAlgorithm::PS512 => Some(Algorithm::PS512),
            KeyAlgorithm::ES256 => Some(Algorithm::ES256),
            KeyAlgorithm::ES384 => Some(Algorithm::ES384),
            KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
            _ => None,
        };
    }

    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => Some(Algorithm::RS256),
        AlgorithmParameters::EllipticCurve(params) => match params.curve {
            EllipticCurve::P256 => Some(Algorithm::ES256),
            EllipticCurve::P384 => Some(Algorithm::ES384),
            _ => None,
        },
        AlgorithmParameters::OctetKeyPair(_) => Some(Algorithm::EdDSA),
        _ => None,
    }
}
