//! Token verification against the issuer's JWKS (spec §4.9, §6.3).

use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::{AuthenticatedUser, RawClaims};
use crate::jwks::{JwksCache, JwksError};

#[derive(Debug, Error)]
pub enum TokenValidationError {
    #[error("missing token")]
    MissingToken,
    #[error("malformed token header: {0}")]
    MalformedHeader(String),
    #[error("signing key unavailable: {0}")]
    KeyUnavailable(#[from] JwksError),
    #[error("token verification failed: {0}")]
    Invalid(String),
}

/// Verifies a bearer token's signature, `iss`/`aud`/`exp`/`nbf`, and projects
/// it into an `AuthenticatedUser`. Decoupled from *where* the request came
/// from (header vs. cookie) — that extraction lives in the HTTP layer.
#[async_trait::async_trait]
pub trait JwtValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, TokenValidationError>;
}

pub struct JwksJwtValidator {
    issuer: String,
    audience: String,
    jwks: Arc<JwksCache>,
}

impl JwksJwtValidator {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>, jwks: Arc<JwksCache>) -> Self {
        Self { issuer: issuer.into(), audience: audience.into(), jwks }
    }
}

#[async_trait::async_trait]
impl JwtValidator for JwksJwtValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, TokenValidationError> {
        if token.trim().is_empty() {
            return Err(TokenValidationError::MissingToken);
        }

        let header = decode_header(token).map_err(|e| TokenValidationError::MalformedHeader(e.to_string()))?;
        let kid = header.kid.ok_or_else(|| TokenValidationError::MalformedHeader("missing kid".to_string()))?;
        let jwk = self.jwks.find(&kid).await?;
        let decoding_key =
            DecodingKey::from_jwk(&jwk).map_err(|e| TokenValidationError::Invalid(e.to_string()))?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let decoded = decode::<RawClaims>(token, &decoding_key, &validation)
            .map_err(|e| TokenValidationError::Invalid(e.to_string()))?;

        Ok(AuthenticatedUser::from(decoded.claims))
    }
}
