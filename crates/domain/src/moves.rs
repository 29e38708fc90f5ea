//! `Move`: an immutable value object recording one player's contribution to
//! a round (spec §3 "Move").

use apiv2_core::{DomainError, DomainResult, Identifier, ValueObject};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub id: Identifier,
    #[serde(rename = "userId")]
    pub user_id: Identifier,
    pub value: f64,
    #[serde(rename = "valueDecorated")]
    pub value_decorated: String,
}

impl ValueObject for Move {}

impl Move {
    pub fn new(
        id: Identifier,
        user_id: Identifier,
        value: f64,
        value_decorated: impl Into<String>,
    ) -> DomainResult<Self> {
        if !value.is_finite() {
            return Err(DomainError::validation_field("value must be finite", "value"));
        }
        Ok(Self { id, user_id, value, value_decorated: value_decorated.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    #[test]
    fn constructs_with_finite_value() {
        let mv = Move::new(id("m1"), id("u1"), 3.5, "three and a half").unwrap();
        assert_eq!(mv.value, 3.5);
        assert_eq!(mv.value_decorated, "three and a half");
    }

    #[test]
    fn rejects_nan_and_infinite() {
        let err = Move::new(id("m1"), id("u1"), f64::NAN, "x").unwrap_err();
        assert_eq!(err.field(), Some("value"));
        assert!(Move::new(id("m1"), id("u1"), f64::INFINITY, "x").is_err());
        assert!(Move::new(id("m1"), id("u1"), f64::NEG_INFINITY, "x").is_err());
    }
}
