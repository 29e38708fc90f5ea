//! The repository layer: a single generic `ObjectStoreRepository<T>`
//! instantiated for documents, users and games — three instances of one
//! contract (spec §4.4), rather than three near-duplicate implementations.

use std::sync::Arc;

use apiv2_core::{DomainError, DomainResult, EntityMetadata, Identifier};
use apiv2_domain::{Document, GameEntity, UserEntity};

use crate::store::{ObjectStore, ObjectStoreError, Precondition as StorePrecondition};

/// Caller-supplied preconditions, translated 1:1 from `If-Match`/
/// `If-None-Match` request headers at the controller boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Precondition {
    #[default]
    None,
    IfMatch(String),
    IfNoneMatchAny,
}

impl From<Precondition> for StorePrecondition {
    fn from(p: Precondition) -> Self {
        match p {
            Precondition::None => StorePrecondition::None,
            Precondition::IfMatch(etag) => StorePrecondition::IfMatch(etag),
            Precondition::IfNoneMatchAny => StorePrecondition::IfNoneMatchAny,
        }
    }
}

/// The shape `ObjectStoreRepository<T>` needs from an entity wrapper to
/// persist and reload it.
pub trait RepoItem: Sized {
    /// Key prefix this kind is stored under, e.g. `"documents/"`.
    fn prefix() -> &'static str;
    fn id(&self) -> &Identifier;
    fn metadata(&self) -> Option<&EntityMetadata>;
    fn with_metadata(&self, metadata: EntityMetadata) -> Self;
    /// The `data` subtree persisted under the key; the id lives in the key.
    fn to_data(&self) -> serde_json::Value;
    /// Rebuilds (and re-validates) an item from a stored document.
    fn from_data(id: Identifier, data: serde_json::Value, metadata: EntityMetadata) -> DomainResult<Self>;
}

/// Infra-local wrapper giving plain `Document` the metadata slot `RepoItem`
/// needs; `apiv2_domain::Document` itself stays free of persistence concerns.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub document: Document,
    pub metadata: Option<EntityMetadata>,
}

impl DocumentRecord {
    pub fn new(document: Document) -> Self {
        Self { document, metadata: None }
    }
}

impl RepoItem for DocumentRecord {
    fn prefix() -> &'static str {
        "documents/"
    }

    fn id(&self) -> &Identifier {
        &self.document.id
    }

    fn metadata(&self) -> Option<&EntityMetadata> {
        self.metadata.as_ref()
    }

    fn with_metadata(&self, metadata: EntityMetadata) -> Self {
        Self { document: self.document.clone(), metadata: Some(metadata) }
    }

    fn to_data(&self) -> serde_json::Value {
        self.document.data.clone()
    }

    fn from_data(id: Identifier, data: serde_json::Value, metadata: EntityMetadata) -> DomainResult<Self> {
        Ok(Self { document: Document::new(id, data), metadata: Some(metadata) })
    }
}

impl RepoItem for UserEntity {
    fn prefix() -> &'static str {
        "users/"
    }

    fn id(&self) -> &Identifier {
        UserEntity::id(self)
    }

    fn metadata(&self) -> Option<&EntityMetadata> {
        UserEntity::metadata(self)
    }

    fn with_metadata(&self, metadata: EntityMetadata) -> Self {
        UserEntity::with_metadata(self, metadata)
    }

    fn to_data(&self) -> serde_json::Value {
        self.to_json()
    }

    fn from_data(id: Identifier, data: serde_json::Value, metadata: EntityMetadata) -> DomainResult<Self> {
        UserEntity::from_document(Document::new(id, data), metadata)
    }
}

impl RepoItem for GameEntity {
    fn prefix() -> &'static str {
        "games/"
    }

    fn id(&self) -> &Identifier {
        GameEntity::id(self)
    }

    fn metadata(&self) -> Option<&EntityMetadata> {
        GameEntity::metadata(self)
    }

    fn with_metadata(&self, metadata: EntityMetadata) -> Self {
        GameEntity::with_metadata(self, metadata)
    }

    fn to_data(&self) -> serde_json::Value {
        self.to_json()
    }

    fn from_data(id: Identifier, data: serde_json::Value, metadata: EntityMetadata) -> DomainResult<Self> {
        GameEntity::from_document(Document::new(id, data), metadata)
    }
}

/// Maps store-native failures onto the domain error taxonomy (spec §4.5).
fn map_store_error(err: ObjectStoreError, precondition_was_if_none_match_any: bool) -> DomainError {
    match err {
        ObjectStoreError::NotFound => DomainError::NotFound,
        ObjectStoreError::AlreadyExists => DomainError::conflict("object already exists"),
        ObjectStoreError::PreconditionFailed if precondition_was_if_none_match_any => {
            DomainError::conflict("object already exists")
        }
        ObjectStoreError::PreconditionFailed => DomainError::PreconditionFailed,
        ObjectStoreError::Io(message) => DomainError::internal(message),
    }
}

pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

pub struct ObjectStoreRepository<T: RepoItem> {
    store: Arc<dyn ObjectStore>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: RepoItem> ObjectStoreRepository<T> {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store, _marker: std::marker::PhantomData }
    }

    fn key(id: &Identifier) -> String {
        format!("{}{}", T::prefix(), id.as_str())
    }

    pub async fn find_by_id(&self, id: &Identifier) -> DomainResult<Option<T>> {
        let key = Self::key(id);
        match self.store.get(&key).await {
            Ok(Some(object)) => {
                let data: serde_json::Value = serde_json::from_slice(&object.bytes)
                    .map_err(|e| DomainError::internal(format!("corrupt stored object: {e}")))?;
                let metadata = EntityMetadata::new(object.meta.etag, object.meta.size, object.meta.last_modified);
                T::from_data(id.clone(), data, metadata).map(Some)
            }
            Ok(None) => Ok(None),
            Err(e) => Err(map_store_error(e, false)),
        }
    }

    pub async fn get_metadata(&self, id: &Identifier) -> DomainResult<EntityMetadata> {
        let key = Self::key(id);
        self.store
            .head(&key)
            .await
            .map(|meta| EntityMetadata::new(meta.etag, meta.size, meta.last_modified))
            .map_err(|e| map_store_error(e, false))
    }

    pub async fn save(&self, item: &T, precondition: Precondition) -> DomainResult<T> {
        let is_if_none_match_any = matches!(precondition, Precondition::IfNoneMatchAny);
        let key = Self::key(item.id());
        let bytes = serde_json::to_vec(&item.to_data()).expect("entity data always serializes");
        let meta = self
            .store
            .put(&key, bytes, "application/json", precondition.into())
            .await
            .map_err(|e| map_store_error(e, is_if_none_match_any))?;
        Ok(item.with_metadata(EntityMetadata::new(meta.etag, meta.size, meta.last_modified)))
    }

    pub async fn delete(&self, id: &Identifier, precondition: Precondition) -> DomainResult<()> {
        let key = Self::key(id);
        self.store.delete(&key, precondition.into()).await.map_err(|e| map_store_error(e, false))
    }

    pub async fn find_all(
        &self,
        prefix: Option<&str>,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> DomainResult<Page<T>> {
        let full_prefix = match prefix {
            Some(sub) => format!("{}{}", T::prefix(), sub),
            None => T::prefix().to_string(),
        };
        let page = self.store.list(&full_prefix, limit, cursor).await.map_err(|e| map_store_error(e, false))?;
        let items = page
            .items
            .into_iter()
            .map(|listed| {
                let id = Identifier::parse(
                    listed.key.strip_prefix(T::prefix()).unwrap_or(&listed.key).to_string(),
                )?;
                let data: serde_json::Value = serde_json::from_slice(&listed.object.bytes)
                    .map_err(|e| DomainError::internal(format!("corrupt stored object: {e}")))?;
                let metadata = EntityMetadata::new(
                    listed.object.meta.etag,
                    listed.object.meta.size,
                    listed.object.meta.last_modified,
                );
                T::from_data(id, data, metadata)
            })
            .collect::<DomainResult<Vec<T>>>()?;
        Ok(Page { items, next_cursor: page.next_cursor })
    }
}
