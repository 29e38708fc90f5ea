//! JWKS fetching and caching (spec §4.9, §5: "fetched lazily... cached with a
//! bounded TTL", "on a cache miss it is refetched").

use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum JwksError {
    #[error("failed to fetch JWKS: {0}")]
    Fetch(String),
    #[error("key '{0}' not found in JWKS")]
    KeyNotFound(String),
}

/// Abstracts *where* the key set comes from, so tests can avoid real network
/// I/O while production uses an HTTP fetch against the configured JWKS URL.
#[async_trait::async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, JwksError>;
}

/// Fetches a JWKS document over HTTP (the default production source).
pub struct HttpKeySource {
    url: String,
    client: reqwest::Client,
}

impl HttpKeySource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), client: reqwest::Client::new() }
    }
}

#[async_trait::async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| JwksError::Fetch(e.to_string()))?;
        let resp = resp.error_for_status().map_err(|e| JwksError::Fetch(e.to_string()))?;
        resp.json::<JwkSet>().await.map_err(|e| JwksError::Fetch(e.to_string()))
    }
}

/// A fixed key set, useful for tests and for statically-configured deployments.
pub struct StaticKeySource(pub JwkSet);

#[async_trait::async_trait]
impl KeySource for StaticKeySource {
    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        Ok(self.0.clone())
    }
}

struct CacheEntry {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Per-instance JWKS cache: append-or-replace-only, bounded TTL, refetched on
/// miss. There is exactly one of these per process instance (spec §5).
pub struct JwksCache {
    source: Box<dyn KeySource>,
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl JwksCache {
    pub fn new(source: impl KeySource + 'static, ttl: Duration) -> Self {
        Self { source: Box::new(source), ttl, entry: RwLock::new(None) }
    }

    /// Look up the key with the given `kid`, refreshing the cache if it is
    /// missing or stale.
    pub async fn find(&self, kid: &str) -> Result<jsonwebtoken::jwk::Jwk, JwksError> {
        if let Some(jwk) = self.lookup_fresh(kid).await {
            return Ok(jwk);
        }
        self.refresh().await?;
        self.lookup_fresh(kid).await.ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    async fn lookup_fresh(&self, kid: &str) -> Option<jsonwebtoken::jwk::Jwk> {
        let guard = self.entry.read().await;
        let entry = guard.as_ref()?;
        if entry.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        entry.keys.find(kid).cloned()
    }

    async fn refresh(&self) -> Result<(), JwksError> {
        let keys = self.source.fetch().await?;
        let mut guard = self.entry.write().await;
        *guard = Some(CacheEntry { keys, fetched_at: Instant::now() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::jwk::{
        AlgorithmParameters, CommonParameters, Jwk, PublicKeyUse, RSAKeyParameters, RSAKeyType,
    };

    fn sample_jwk(kid: &str) -> Jwk {
        Jwk {
            common: CommonParameters {
                public_key_use: Some(PublicKeyUse::Signature),
                key_operations: None,
                key_algorithm: None,
                key_id: Some(kid.to_string()),
                x509_url: None,
                x509_chain: None,
                x509_sha1_fingerprint: None,
                x509_sha256_fingerprint: None,
            },
            algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
                key_type: RSAKeyType::RSA,
                n: "AQAB".to_string(),
                e: "AQAB".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn finds_key_after_refresh() {
        let set = JwkSet { keys: vec![sample_jwk("k1")] };
        let cache = JwksCache::new(StaticKeySource(set), Duration::from_secs(60));
        let jwk = cache.find("k1").await.unwrap();
        assert_eq!(jwk.common.key_id.as_deref(), Some("k1"));
        assert!(matches!(jwk.algorithm, AlgorithmParameters::RSA(_)));
    }

    #[tokio::test]
    async fn missing_key_errors() {
        let set = JwkSet { keys: vec![sample_jwk("k1")] };
        let cache = JwksCache::new(StaticKeySource(set), Duration::from_secs(60));
        let err = cache.find("missing").await.unwrap_err();
        assert!(matches!(err, JwksError::KeyNotFound(_)));
    }
}
