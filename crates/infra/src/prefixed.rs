//! A thin `ObjectStore` decorator that roots every key under a fixed
//! prefix, so one bucket can host several logical deployments side by side
//! (spec §6.4 `OBJECT_STORE_PREFIX`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::store::{ListedObject, ObjectMeta, ObjectPage, ObjectStore, ObjectStoreError, Precondition, StoredObject};

pub struct PrefixedObjectStore {
    inner: Arc<dyn ObjectStore>,
    prefix: String,
}

impl PrefixedObjectStore {
    pub fn new(inner: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self { inner, prefix: prefix.into() }
    }

    fn rooted(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl ObjectStore for PrefixedObjectStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, ObjectStoreError> {
        self.inner.get(&self.rooted(key)).await
    }

    async fn head(&self, key: &str) -> Result<ObjectMeta, ObjectStoreError> {
        self.inner.head(&self.rooted(key)).await
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        precondition: Precondition,
    ) -> Result<ObjectMeta, ObjectStoreError> {
        self.inner.put(&self.rooted(key), bytes, content_type, precondition).await
    }

    async fn delete(&self, key: &str, precondition: Precondition) -> Result<(), ObjectStoreError> {
        self.inner.delete(&self.rooted(key), precondition).await
    }

    async fn list(&self, prefix: &str, limit: Option<usize>, cursor: Option<&str>) -> Result<ObjectPage, ObjectStoreError> {
        let page = self.inner.list(&self.rooted(prefix), limit, cursor).await?;
        let items = page
            .items
            .into_iter()
            .map(|listed| ListedObject {
                key: listed.key.strip_prefix(self.prefix.as_str()).unwrap_or(&listed.key).to_string(),
                object: listed.object,
            })
            .collect();
        Ok(ObjectPage { items, next_cursor: page.next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryObjectStore;

    #[tokio::test]
    async fn roots_keys_under_the_configured_prefix() {
        let inner: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        let store = PrefixedObjectStore::new(inner.clone(), "json/");
        store.put("documents/d1", b"{}".to_vec(), "application/json", Precondition::None).await.unwrap();

        assert!(inner.get("json/documents/d1").await.unwrap().is_some());
        assert!(store.get("documents/d1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_strips_the_prefix_back_off() {
        let inner: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        let store = PrefixedObjectStore::new(inner, "json/");
        store.put("documents/d1", b"{}".to_vec(), "application/json", Precondition::None).await.unwrap();

        let page = store.list("documents/", None, None).await.unwrap();
        assert_eq!(page.items[0].key, "documents/d1");
    }
}
