//! `InMemoryObjectStore`: a `RwLock<HashMap<...>>`-backed `ObjectStore`,
//! used in tests and local/dev runs. Grounded directly on the teacher's
//! `InMemoryEventStore` (same lock-and-map shape, same `Default`/`new()`
//! pair), adapted to the object-store's key/bytes/etag contract instead of
//! append-only event streams.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::store::{ListedObject, ObjectMeta, ObjectPage, ObjectStore, ObjectStoreError, Precondition, StoredObject};

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    etag: String,
    last_modified: String,
    generation: u64,
}

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, Entry>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn etag_for(generation: u64) -> String {
        format!("\"{generation}\"")
    }

    /// Deterministic stand-in for a store-assigned timestamp; tests only
    /// assert its presence and format, not wall-clock accuracy.
    fn timestamp_for(generation: u64) -> String {
        format!("1970-01-01T00:00:{generation:02}Z")
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, ObjectStoreError> {
        let objects = self.objects.read().expect("object store lock poisoned");
        Ok(objects.get(key).map(|entry| StoredObject {
            bytes: entry.bytes.clone(),
            meta: ObjectMeta {
                etag: entry.etag.clone(),
                size: entry.bytes.len() as u64,
                last_modified: entry.last_modified.clone(),
            },
        }))
    }

    async fn head(&self, key: &str) -> Result<ObjectMeta, ObjectStoreError> {
        let objects = self.objects.read().expect("object store lock poisoned");
        objects
            .get(key)
            .map(|entry| ObjectMeta {
                etag: entry.etag.clone(),
                size: entry.bytes.len() as u64,
                last_modified: entry.last_modified.clone(),
            })
            .ok_or(ObjectStoreError::NotFound)
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        precondition: Precondition,
    ) -> Result<ObjectMeta, ObjectStoreError> {
        let mut objects = self.objects.write().expect("object store lock poisoned");
        let existing = objects.get(key);
        match (&precondition, existing) {
            (Precondition::IfNoneMatchAny, Some(_)) => return Err(ObjectStoreError::AlreadyExists),
            (Precondition::IfMatch(expected), Some(entry)) if expected != &entry.etag => {
                return Err(ObjectStoreError::PreconditionFailed);
            }
            (Precondition::IfMatch(_), None) => return Err(ObjectStoreError::PreconditionFailed),
            _ => {}
        }
        let generation = existing.map(|e| e.generation + 1).unwrap_or(1);
        let entry = Entry {
            bytes,
            etag: Self::etag_for(generation),
            last_modified: Self::timestamp_for(generation),
            generation,
        };
        let meta = ObjectMeta { etag: entry.etag.clone(), size: entry.bytes.len() as u64, last_modified: entry.last_modified.clone() };
        objects.insert(key.to_string(), entry);
        Ok(meta)
    }

    async fn delete(&self, key: &str, precondition: Precondition) -> Result<(), ObjectStoreError> {
        let mut objects = self.objects.write().expect("object store lock poisoned");
        let Some(entry) = objects.get(key) else {
            return Err(ObjectStoreError::NotFound);
        };
        if let Precondition::IfMatch(expected) = &precondition {
            if expected != &entry.etag {
                return Err(ObjectStoreError::PreconditionFailed);
            }
        }
        objects.remove(key);
        Ok(())
    }

    async fn list(
        &self,
        prefix: &str,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<ObjectPage, ObjectStoreError> {
        let objects = self.objects.read().expect("object store lock poisoned");
        let mut keys: Vec<&String> = objects.keys().filter(|k| k.starts_with(prefix)).collect();
        keys.sort();

        let start = match cursor {
            Some(cursor) => keys.iter().position(|k| k.as_str() > cursor).unwrap_or(keys.len()),
            None => 0,
        };
        let limit = limit.unwrap_or(usize::MAX);
        let page: Vec<&String> = keys[start..].iter().take(limit).copied().collect();
        let next_cursor = if start + page.len() < keys.len() { page.last().map(|k| k.to_string()) } else { None };

        let items = page
            .into_iter()
            .map(|key| {
                let entry = &objects[key];
                ListedObject {
                    key: key.clone(),
                    object: StoredObject {
                        bytes: entry.bytes.clone(),
                        meta: ObjectMeta {
                            etag: entry.etag.clone(),
                            size: entry.bytes.len() as u64,
                            last_modified: entry.last_modified.clone(),
                        },
                    },
                }
            })
            .collect();

        Ok(ObjectPage { items, next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryObjectStore::new();
        store.put("k1", b"hello".to_vec(), "application/json", Precondition::None).await.unwrap();
        let fetched = store.get("k1").await.unwrap().unwrap();
        assert_eq!(fetched.bytes, b"hello");
    }

    #[tokio::test]
    async fn get_of_missing_key_is_none() {
        let store = InMemoryObjectStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn head_of_missing_key_is_not_found() {
        let store = InMemoryObjectStore::new();
        assert!(matches!(store.head("missing").await, Err(ObjectStoreError::NotFound)));
    }

    #[tokio::test]
    async fn if_none_match_any_rejects_existing_object() {
        let store = InMemoryObjectStore::new();
        store.put("k1", b"one".to_vec(), "application/json", Precondition::None).await.unwrap();
        let result = store.put("k1", b"two".to_vec(), "application/json", Precondition::IfNoneMatchAny).await;
        assert!(matches!(result, Err(ObjectStoreError::AlreadyExists)));
    }

    #[tokio::test]
    async fn if_match_rejects_stale_etag() {
        let store = InMemoryObjectStore::new();
        store.put("k1", b"one".to_vec(), "application/json", Precondition::None).await.unwrap();
        let result = store.put("k1", b"two".to_vec(), "application/json", Precondition::IfMatch("\"999\"".to_string())).await;
        assert!(matches!(result, Err(ObjectStoreError::PreconditionFailed)));
    }

    #[tokio::test]
    async fn if_match_succeeds_with_current_etag() {
        let store = InMemoryObjectStore::new();
        let meta = store.put("k1", b"one".to_vec(), "application/json", Precondition::None).await.unwrap();
        let result = store.put("k1", b"two".to_vec(), "application/json", Precondition::IfMatch(meta.etag)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn delete_honors_if_match_precondition() {
        let store = InMemoryObjectStore::new();
        store.put("k1", b"one".to_vec(), "application/json", Precondition::None).await.unwrap();
        let result = store.delete("k1", Precondition::IfMatch("\"999\"".to_string())).await;
        assert!(matches!(result, Err(ObjectStoreError::PreconditionFailed)));
        store.delete("k1", Precondition::None).await.unwrap();
        assert!(store.get("k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_of_missing_key_is_not_found() {
        let store = InMemoryObjectStore::new();
        assert!(matches!(store.delete("missing", Precondition::None).await, Err(ObjectStoreError::NotFound)));
    }

    #[tokio::test]
    async fn list_filters_by_prefix_and_paginates() {
        let store = InMemoryObjectStore::new();
        for key in ["documents/a", "documents/b", "documents/c", "users/u1"] {
            store.put(key, b"x".to_vec(), "application/json", Precondition::None).await.unwrap();
        }
        let page = store.list("documents/", Some(2), None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_some());

        let page2 = store.list("documents/", Some(2), page.next_cursor.as_deref()).await.unwrap();
        assert_eq!(page2.items.len(), 1);
        assert!(page2.next_cursor.is_none());
    }
}
