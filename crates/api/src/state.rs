//! Wires the three per-kind services onto a concrete `ObjectStore`, rooted
//! under the configured key prefix (spec §4.6, §6.4).

use std::sync::Arc;

use apiv2_core::AppConfig;
use apiv2_domain::{GameEntity, UserEntity};
use apiv2_infra::{DocumentRecord, InMemoryObjectStore, ObjectStore, ObjectStoreRepository, PrefixedObjectStore};

use crate::services::{DocumentService, GameService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentService>,
    pub users: Arc<UserService>,
    pub games: Arc<GameService>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, config: &AppConfig) -> Self {
        let store: Arc<dyn ObjectStore> = Arc::new(PrefixedObjectStore::new(store, config.prefix.clone()));
        Self {
            documents: Arc::new(DocumentService::new(Arc::new(ObjectStoreRepository::<DocumentRecord>::new(
                store.clone(),
            )))),
            users: Arc::new(UserService::new(Arc::new(ObjectStoreRepository::<UserEntity>::new(store.clone())))),
            games: Arc::new(GameService::new(Arc::new(ObjectStoreRepository::<GameEntity>::new(store)))),
        }
    }

    pub fn in_memory(config: &AppConfig) -> Self {
        Self::new(Arc::new(InMemoryObjectStore::new()), config)
    }

    #[cfg(feature = "s3")]
    pub async fn s3(config: &AppConfig) -> Self {
        let store = apiv2_infra::S3ObjectStore::from_env(config.bucket.clone()).await;
        Self::new(Arc::new(store), config)
    }
}
