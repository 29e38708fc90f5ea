use apiv2_core::{EntityMetadata, Identifier};
use serde::{Deserialize, Serialize};

use crate::user_entity::UserEntity;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub id: String,
    pub name: String,
    #[serde(rename = "externalId")]
    pub external_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceUserRequest {
    pub name: String,
    #[serde(rename = "externalId")]
    pub external_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct MergeUserRequest {
    pub name: Option<String>,
    #[serde(rename = "externalId")]
    pub external_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "externalId")]
    pub external_id: i64,
    pub etag: String,
}

impl UserResponse {
    pub fn new(entity: &UserEntity, metadata: &EntityMetadata) -> apiv2_core::DomainResult<Self> {
        let profile = entity.profile()?;
        Ok(Self {
            id: profile.id.to_string(),
            name: profile.name,
            external_id: profile.external_id,
            etag: metadata.etag.clone(),
        })
    }
}

/// Used by the external `/me` controller, which has no conditional-request
/// context of its own to source an id from besides the request itself.
pub fn parse_id(raw: impl Into<String>) -> apiv2_core::DomainResult<Identifier> {
    Identifier::parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_reflects_profile_and_etag() {
        let entity = UserEntity::new(Identifier::parse("u1").unwrap(), "Alice", 1).unwrap();
        let metadata = EntityMetadata::new("\"v1\"", 3, "2024-01-01T00:00:00Z");
        let resp = UserResponse::new(&entity, &metadata).unwrap();
        assert_eq!(resp.id, "u1");
        assert_eq!(resp.name, "Alice");
        assert_eq!(resp.external_id, 1);
        assert_eq!(resp.etag, "\"v1\"");
    }
}
