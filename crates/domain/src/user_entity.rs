//! `UserEntity`: the persistence-shaped wrapper around `UserProfile` (spec
//! §4.3 "Entity wrappers").
//!
//! Every mutating operation follows the same three steps: project the
//! wrapper to the pure aggregate, apply the aggregate operation, reproject
//! the result back into a wrapper that still carries whatever etag/metadata
//! this instance was loaded (or last saved) with.

use apiv2_core::{DomainResult, EntityMetadata, Identifier};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::user_profile::UserProfile;

#[derive(Debug, Clone, Deserialize, Serialize)]
struct UserData {
    name: String,
    #[serde(rename = "externalId")]
    external_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserEntity {
    document: Document,
    metadata: Option<EntityMetadata>,
}

impl UserEntity {
    pub fn new(id: Identifier, name: impl Into<String>, external_id: i64) -> DomainResult<Self> {
        let profile = UserProfile::new(id, name, external_id)?;
        Ok(Self::from_profile(&profile, None))
    }

    /// Loads a wrapper from a persisted document, validating its shape the
    /// way `fromJSON` does (including re-running aggregate invariants).
    pub fn from_document(document: Document, metadata: EntityMetadata) -> DomainResult<Self> {
        let entity = Self { document, metadata: Some(metadata) };
        entity.profile()?; // validates shape
        Ok(entity)
    }

    pub fn id(&self) -> &Identifier {
        &self.document.id
    }

    pub fn metadata(&self) -> Option<&EntityMetadata> {
        self.metadata.as_ref()
    }

    pub fn with_metadata(&self, metadata: EntityMetadata) -> Self {
        Self { document: self.document.clone(), metadata: Some(metadata) }
    }

    /// The `data` subtree that is persisted (the id is carried only in the key).
    pub fn to_json(&self) -> serde_json::Value {
        self.document.data.clone()
    }

    pub fn profile(&self) -> DomainResult<UserProfile> {
        let data: UserData = serde_json::from_value(self.document.data.clone())
            .map_err(|e| apiv2_core::DomainError::validation(format!("malformed user document: {e}")))?;
        UserProfile::new(self.document.id.clone(), data.name, data.external_id)
    }

    pub fn rename(&self, name: impl Into<String>) -> DomainResult<Self> {
        let profile = self.profile()?.rename(name)?;
        Ok(Self::from_profile(&profile, self.metadata.clone()))
    }

    pub fn replace(&self, name: impl Into<String>, external_id: i64) -> DomainResult<Self> {
        let profile = self.profile()?.replace(name, external_id)?;
        Ok(Self::from_profile(&profile, self.metadata.clone()))
    }

    pub fn merge(&self, name: Option<String>, external_id: Option<i64>) -> DomainResult<Self> {
        let profile = self.profile()?.merge(name, external_id)?;
        Ok(Self::from_profile(&profile, self.metadata.clone()))
    }

    fn from_profile(profile: &UserProfile, metadata: Option<EntityMetadata>) -> Self {
        let data = serde_json::to_value(UserData { name: profile.name.clone(), external_id: profile.external_id })
            .expect("UserData always serializes");
        Self { document: Document::new(profile.id.clone(), data), metadata }
    }
}
