//! S3-backed `ObjectStore`, enabled by the `s3` feature. Maps SDK-native
//! conditional-write failures onto the same `ObjectStoreError` contract the
//! in-memory store satisfies (spec §4.4, §4.5).

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{instrument, warn};

use crate::store::{ListedObject, ObjectMeta, ObjectPage, ObjectStore, ObjectStoreError, Precondition, StoredObject};

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self { client, bucket: bucket.into() }
    }

    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, ObjectStoreError> {
        match self.client.get_object().bucket(&self.bucket).key(key).send().await {
            Ok(output) => {
                let etag = output.e_tag().unwrap_or_default().to_string();
                let last_modified = output
                    .last_modified()
                    .map(|dt| dt.to_string())
                    .unwrap_or_default();
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| ObjectStoreError::Io(e.to_string()))?
                    .into_bytes()
                    .to_vec();
                let size = bytes.len() as u64;
                Ok(Some(StoredObject { bytes, meta: ObjectMeta { etag, size, last_modified } }))
            }
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => {
                warn!(error = %err, key, "s3 get failed");
                Err(ObjectStoreError::Io(err.to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn head(&self, key: &str) -> Result<ObjectMeta, ObjectStoreError> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(output) => Ok(ObjectMeta {
                etag: output.e_tag().unwrap_or_default().to_string(),
                size: output.content_length().unwrap_or_default().max(0) as u64,
                last_modified: output.last_modified().map(|dt| dt.to_string()).unwrap_or_default(),
            }),
            Err(err) if is_not_found(&err) => Err(ObjectStoreError::NotFound),
            Err(err) => Err(ObjectStoreError::Io(err.to_string())),
        }
    }

    #[instrument(skip(self, bytes))]
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        precondition: Precondition,
    ) -> Result<ObjectMeta, ObjectStoreError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes.clone()));

        request = match &precondition {
            Precondition::None => request,
            Precondition::IfMatch(etag) => request.if_match(etag),
            Precondition::IfNoneMatchAny => request.if_none_match("*"),
        };

        match request.send().await {
            Ok(output) => Ok(ObjectMeta {
                etag: output.e_tag().unwrap_or_default().to_string(),
                size: bytes.len() as u64,
                last_modified: chrono::Utc::now().to_rfc3339(),
            }),
            Err(err) if is_precondition_failed(&err) => {
                if matches!(precondition, Precondition::IfNoneMatchAny) {
                    Err(ObjectStoreError::AlreadyExists)
                } else {
                    Err(ObjectStoreError::PreconditionFailed)
                }
            }
            Err(err) => Err(ObjectStoreError::Io(err.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str, precondition: Precondition) -> Result<(), ObjectStoreError> {
        if let Precondition::IfMatch(expected) = &precondition {
            let current = self.head(key).await?;
            if &current.etag != expected {
                return Err(ObjectStoreError::PreconditionFailed);
            }
        }
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| ObjectStoreError::Io(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        prefix: &str,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<ObjectPage, ObjectStoreError> {
        let mut request = self.client.list_objects_v2().bucket(&self.bucket).prefix(prefix);
        if let Some(limit) = limit {
            request = request.max_keys(limit as i32);
        }
        if let Some(cursor) = cursor {
            request = request.continuation_token(cursor);
        }
        let output = request.send().await.map_err(|e| ObjectStoreError::Io(e.to_string()))?;

        let mut items = Vec::new();
        for object in output.contents() {
            let Some(key) = object.key() else { continue };
            if let Some(stored) = self.get(key).await? {
                items.push(ListedObject { key: key.to_string(), object: stored });
            }
        }
        Ok(ObjectPage { items, next_cursor: output.next_continuation_token().map(str::to_string) })
    }
}

fn is_not_found(err: &aws_sdk_s3::error::SdkError<impl std::fmt::Debug>) -> bool {
    format!("{err:?}").contains("NoSuchKey") || format!("{err:?}").contains("NotFound")
}

fn is_precondition_failed(err: &aws_sdk_s3::error::SdkError<impl std::fmt::Debug>) -> bool {
    format!("{err:?}").contains("PreconditionFailed") || format!("{err:?}").contains("412")
}
