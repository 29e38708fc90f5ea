//! `UserProfile`: a pure aggregate for a user's public profile (spec §3
//! "UserProfile").

use apiv2_core::{DomainError, DomainResult, Identifier};
use serde::{Deserialize, Serialize};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Identifier,
    pub name: String,
    #[serde(rename = "externalId")]
    pub external_id: i64,
}

impl UserProfile {
    pub fn new(id: Identifier, name: impl Into<String>, external_id: i64) -> DomainResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        validate_external_id(external_id)?;
        Ok(Self { id, name, external_id })
    }

    pub fn rename(&self, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, ..self.clone() })
    }

    /// Full replace: both fields are required, producing a wholly new instance.
    pub fn replace(&self, name: impl Into<String>, external_id: i64) -> DomainResult<Self> {
        UserProfile::new(self.id.clone(), name, external_id)
    }

    /// Shallow merge: unspecified fields keep the current value.
    pub fn merge(&self, name: Option<String>, external_id: Option<i64>) -> DomainResult<Self> {
        let name = name.unwrap_or_else(|| self.name.clone());
        let external_id = external_id.unwrap_or(self.external_id);
        UserProfile::new(self.id.clone(), name, external_id)
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    let len = name.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(DomainError::validation_field(
            format!("name must be {NAME_MIN}-{NAME_MAX} characters"),
            "name",
        ));
    }
    Ok(())
}

fn validate_external_id(external_id: i64) -> DomainResult<()> {
    if external_id < 1 {
        return Err(DomainError::validation_field("externalId must be >= 1", "externalId"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> Identifier {
        Identifier::parse("u1").unwrap()
    }

    #[test]
    fn constructs_valid_profile() {
        let p = UserProfile::new(id(), "Alice", 1).unwrap();
        assert_eq!(p.name, "Alice");
        assert_eq!(p.external_id, 1);
    }

    #[test]
    fn rejects_short_name() {
        assert!(UserProfile::new(id(), "A", 1).is_err());
    }

    #[test]
    fn rejects_long_name() {
        assert!(UserProfile::new(id(), "a".repeat(101), 1).is_err());
    }

    #[test]
    fn rejects_nonpositive_external_id() {
        assert!(UserProfile::new(id(), "Alice", 0).is_err());
        assert!(UserProfile::new(id(), "Alice", -5).is_err());
    }

    #[test]
    fn merge_preserves_unspecified_fields() {
        let p = UserProfile::new(id(), "Alice", 1).unwrap();
        let merged = p.merge(None, Some(2)).unwrap();
        assert_eq!(merged.name, "Alice");
        assert_eq!(merged.external_id, 2);
    }

    #[test]
    fn replace_requires_both_fields() {
        let p = UserProfile::new(id(), "Alice", 1).unwrap();
        let replaced = p.replace("Bob", 9).unwrap();
        assert_eq!(replaced.name, "Bob");
        assert_eq!(replaced.external_id, 9);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn valid_names_always_construct(name in "[A-Za-z ]{2,100}") {
                prop_assert!(UserProfile::new(id(), name, 1).is_ok());
            }

            #[test]
            fn non_positive_external_ids_always_reject(external_id in i64::MIN..=0) {
                prop_assert!(UserProfile::new(id(), "Alice", external_id).is_err());
            }
        }
    }
}
