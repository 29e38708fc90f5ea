//! JWT claims model and the authenticated-user projection (spec §4.9, §6.3).

use serde::{Deserialize, Serialize};

use crate::Role;

/// The raw payload of a verified token, deserialized loosely enough to cover
/// the handful of shapes real identity providers use for roles.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawClaims {
    pub sub: String,
    pub iss: String,
    pub aud: AudienceClaim,
    pub exp: i64,
    #[serde(default)]
    pub nbf: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, rename = "custom:role")]
    pub custom_role: Option<String>,
    #[serde(default, rename = "cognito:groups")]
    pub groups: Option<Vec<String>>,
}

/// `aud` may be a single string or an array of strings per the JWT spec.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AudienceClaim {
    Single(String),
    Many(Vec<String>),
}

impl AudienceClaim {
    pub fn contains(&self, expected: &str) -> bool {
        match self {
            AudienceClaim::Single(s) => s == expected,
            AudienceClaim::Many(v) => v.iter().any(|s| s == expected),
        }
    }
}

impl RawClaims {
    /// Derive the role in order of preference: `role`, then `custom:role`,
    /// then the first entry of `cognito:groups`, defaulting to `"user"`.
    pub fn derive_role(&self) -> Role {
        if let Some(r) = &self.role {
            return Role::new(r.clone());
        }
        if let Some(r) = &self.custom_role {
            return Role::new(r.clone());
        }
        if let Some(groups) = &self.groups {
            if let Some(first) = groups.first() {
                return Role::new(first.clone());
            }
        }
        Role::new("user")
    }
}

/// The authenticated identity attached to a request after the auth
/// middleware runs (spec §4.9: "Attaches a user record to the request").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
}

impl From<RawClaims> for AuthenticatedUser {
    fn from(claims: RawClaims) -> Self {
        let role = claims.derive_role();
        Self { user_id: claims.sub, email: claims.email, role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<&str>, custom_role: Option<&str>, groups: Option<Vec<&str>>) -> RawClaims {
        RawClaims {
            sub: "u1".to_string(),
            iss: "https://issuer.example/".to_string(),
            aud: AudienceClaim::Single("client".to_string()),
            exp: 9_999_999_999,
            nbf: None,
            email: Some("u1@example.com".to_string()),
            role: role.map(str::to_string),
            custom_role: custom_role.map(str::to_string),
            groups: groups.map(|g| g.into_iter().map(str::to_string).collect()),
        }
    }

    #[test]
    fn prefers_role_claim() {
        let c = claims(Some("admin"), Some("manager"), Some(vec!["ops"]));
        assert_eq!(c.derive_role().as_str(), "admin");
    }

    #[test]
    fn falls_back_to_custom_role() {
        let c = claims(None, Some("manager"), Some(vec!["ops"]));
        assert_eq!(c.derive_role().as_str(), "manager");
    }

    #[test]
    fn falls_back_to_first_group() {
        let c = claims(None, None, Some(vec!["ops", "eng"]));
        assert_eq!(c.derive_role().as_str(), "ops");
    }

    #[test]
    fn defaults_to_user() {
        let c = claims(None, None, None);
        assert_eq!(c.derive_role().as_str(), "user");
    }

    #[test]
    fn audience_matches_single_or_array() {
        assert!(AudienceClaim::Single("a".into()).contains("a"));
        assert!(AudienceClaim::Many(vec!["a".into(), "b".into()]).contains("b"));
        assert!(!AudienceClaim::Single("a".into()).contains("b"));
    }
}
