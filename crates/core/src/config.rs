//! Process-wide immutable configuration (spec §6.4).
//!
//! Loaded once at init from environment variables, the way the teacher's
//! `main.rs` reads `JWT_SECRET`. Nothing here is mutated after load; the
//! handler wiring clones an `Arc<AppConfig>` into every request.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Object-store container name.
    pub bucket: String,
    /// Key prefix rooting all data (`json/` by default).
    pub prefix: String,
    /// Value returned for `Access-Control-Allow-Origin`.
    pub cors_origin: String,
    /// Rejects inbound bodies larger than this many bytes.
    pub max_body_bytes: usize,
    /// Expected `iss` claim; also the base for the default JWKS URL.
    pub user_pool_issuer: String,
    /// Expected `aud` claim.
    pub client_id: String,
    /// Overrides the default JWKS URL (`<issuer>/.well-known/jwks.json`).
    pub jwks_url: String,
    /// TTL for the cached public-key set.
    pub jwks_cache_ttl: Duration,
}

impl AppConfig {
    /// Load configuration from the process environment, falling back to
    /// permissive dev defaults (logging a warning) so `cargo run` works
    /// out of the box against the in-memory store.
    pub fn from_env() -> Self {
        let bucket = env_or_warn("OBJECT_STORE_BUCKET", "dev-bucket");
        let prefix = std::env::var("OBJECT_STORE_PREFIX").unwrap_or_else(|_| "json/".to_string());
        let cors_origin = std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string());
        let max_body_bytes = std::env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1_048_576);
        let user_pool_issuer = env_or_warn("USER_POOL_ISSUER", "https://dev-issuer.invalid/");
        let client_id = env_or_warn("CLIENT_ID", "dev-client");
        let jwks_url = std::env::var("JWKS_URL")
            .unwrap_or_else(|_| format!("{}.well-known/jwks.json", ensure_trailing_slash(&user_pool_issuer)));
        let jwks_cache_ttl_secs = std::env::var("JWKS_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        Self {
            bucket,
            prefix,
            cors_origin,
            max_body_bytes,
            user_pool_issuer,
            client_id,
            jwks_url,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
        }
    }

    /// Build a config directly, bypassing the environment (tests).
    pub fn for_tests() -> Self {
        Self {
            bucket: "test-bucket".to_string(),
            prefix: "json/".to_string(),
            cors_origin: "*".to_string(),
            max_body_bytes: 1_048_576,
            user_pool_issuer: "https://test-issuer.invalid/".to_string(),
            client_id: "test-client".to_string(),
            jwks_url: "https://test-issuer.invalid/.well-known/jwks.json".to_string(),
            jwks_cache_ttl: Duration::from_secs(3600),
        }
    }
}

fn ensure_trailing_slash(s: &str) -> String {
    if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{s}/")
    }
}

fn env_or_warn(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        tracing::warn!("{key} not set; using insecure dev default");
        default.to_string()
    })
}
