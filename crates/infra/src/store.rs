//! `ObjectStore`: the narrow external-collaborator seam the core depends on
//! (spec §1 Out-of-scope, §4.5). Mirrors the teacher's `EventStore` trait —
//! a small async surface with one in-memory implementation for tests/dev
//! and one production-backed implementation behind a feature flag.

use async_trait::async_trait;
use thiserror::Error;

/// Read-only metadata the store attaches to an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub etag: String,
    pub size: u64,
    pub last_modified: String,
}

/// A fetched object: its bytes plus the metadata attached at write time.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub meta: ObjectMeta,
}

/// A write precondition, translated by the repository layer from the
/// caller's `If-Match`/`If-None-Match` headers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Precondition {
    #[default]
    None,
    /// `If-Match: <etag>` — succeed only if the stored etag still matches.
    IfMatch(String),
    /// `If-None-Match: *` — succeed only if no object exists yet.
    IfNoneMatchAny,
}

#[derive(Debug, Clone)]
pub struct ListedObject {
    pub key: String,
    pub object: StoredObject,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub items: Vec<ListedObject>,
    pub next_cursor: Option<String>,
}

/// Store-native failure signals (spec §4.5 "Error mapping"). The repository
/// layer, not this trait, is responsible for translating these into
/// `DomainError`.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object not found")]
    NotFound,
    #[error("precondition failed")]
    PreconditionFailed,
    #[error("object already exists")]
    AlreadyExists,
    #[error("object store I/O error: {0}")]
    Io(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches an object's bytes and metadata. `Ok(None)` on a clean miss —
    /// per spec, "object-absent on GET" maps to `null`, not an error.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, ObjectStoreError>;

    /// Probes metadata without fetching the body. Errors `NotFound` when
    /// absent (spec: "object-absent on HEAD" maps to `NotFound`).
    async fn head(&self, key: &str) -> Result<ObjectMeta, ObjectStoreError>;

    /// Writes an object, honoring `precondition`. Errors `AlreadyExists` for
    /// a failed `IfNoneMatchAny`, `PreconditionFailed` for a failed
    /// `IfMatch`.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        precondition: Precondition,
    ) -> Result<ObjectMeta, ObjectStoreError>;

    /// Deletes an object, honoring `precondition`. Errors `NotFound` when
    /// absent, `PreconditionFailed` on an `IfMatch` mismatch.
    async fn delete(&self, key: &str, precondition: Precondition) -> Result<(), ObjectStoreError>;

    /// Lists objects under `prefix`, forwarding `limit`/`cursor` to the
    /// store's native pagination.
    async fn list(
        &self,
        prefix: &str,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<ObjectPage, ObjectStoreError>;
}
