//! Authentication and role model: JWT verification against the issuer's
//! JWKS, and the role type used by the role-guard middleware.

mod claims;
mod jwks;
mod roles;
mod validator;

pub use claims::{AudienceClaim, AuthenticatedUser, RawClaims};
pub use jwks::{HttpKeySource, JwksCache, JwksError, KeySource, StaticKeySource};
pub use roles::Role;
pub use validator::{JwksJwtValidator, JwtValidator, TokenValidationError};
