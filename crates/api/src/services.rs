//! Application services: one per persisted kind, orchestrating a repository
//! and the entity wrapper's project/apply/reproject operations (spec §4.6).
//! Controllers never touch `apiv2_infra` directly — they go through here.

use std::sync::Arc;

use apiv2_core::{DomainError, DomainResult, EntityMetadata, Identifier};
use apiv2_domain::dto::{
    CreateDocumentRequest, CreateGameRequest, CreateUserRequest, DocumentResponse, GameResponse,
    MergeDocumentRequest, MergeGameRequest, MergeUserRequest, NamesResponse, ReplaceDocumentRequest,
    ReplaceGameRequest, ReplaceUserRequest, RoundResponse, UserResponse,
};
use apiv2_domain::{Document, GameEntity, UserEntity};
use apiv2_infra::{DocumentRecord, ObjectStoreRepository, Precondition};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Opaque cursors cross the HTTP boundary base64url-encoded; the repository
/// layer only ever sees the decoded store-native token (spec §4.4 `findAll`).
fn encode_cursor(raw: String) -> String {
    URL_SAFE_NO_PAD.encode(raw)
}

fn decode_cursor(token: &str) -> DomainResult<String> {
    let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| DomainError::validation("malformed cursor"))?;
    String::from_utf8(bytes).map_err(|_| DomainError::validation("malformed cursor"))
}

/// `true` when the caller's `If-None-Match` matches the stored etag
/// (weak comparison is not needed: every etag this API issues is strong).
fn etag_matches(if_none_match: Option<&str>, current: &str) -> bool {
    if_none_match.is_some_and(|candidate| candidate == "*" || candidate == current)
}

/// Result of a conditional read: either the current representation, or a
/// signal that it hasn't changed. The etag rides along on both branches so
/// a 304 can still carry `ETag` (spec §4.7 "NotModified ... preserves the
/// current etag header").
pub enum GetResult<T> {
    Found(T),
    NotModified { etag: String },
}

pub struct DocumentService {
    repo: Arc<ObjectStoreRepository<DocumentRecord>>,
}

impl DocumentService {
    pub fn new(repo: Arc<ObjectStoreRepository<DocumentRecord>>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, req: CreateDocumentRequest) -> DomainResult<DocumentResponse> {
        let (id, data) = req.into_parts()?;
        let record = DocumentRecord::new(Document::new(id.clone(), data));
        let saved = self.repo.save(&record, Precondition::IfNoneMatchAny).await?;
        let metadata = saved.metadata.clone().expect("save always returns metadata");
        Ok(DocumentResponse::new(&id, saved.document.data, &metadata))
    }

    pub async fn get(&self, id: &Identifier, if_none_match: Option<&str>) -> DomainResult<GetResult<DocumentResponse>> {
        let record = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let metadata = record.metadata.clone().expect("loaded records always carry metadata");
        if etag_matches(if_none_match, &metadata.etag) {
            return Ok(GetResult::NotModified { etag: metadata.etag });
        }
        Ok(GetResult::Found(DocumentResponse::new(id, record.document.data, &metadata)))
    }

    pub async fn get_metadata(&self, id: &Identifier) -> DomainResult<EntityMetadata> {
        self.repo.get_metadata(id).await
    }

    pub async fn replace(
        &self,
        id: &Identifier,
        req: ReplaceDocumentRequest,
        if_match: Option<&str>,
    ) -> DomainResult<DocumentResponse> {
        let existing = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let record = DocumentRecord { document: existing.document.with_data(req.data), metadata: existing.metadata };
        let saved = self.repo.save(&record, precondition_from(if_match)).await?;
        let metadata = saved.metadata.clone().expect("save always returns metadata");
        Ok(DocumentResponse::new(id, saved.document.data, &metadata))
    }

    pub async fn merge(
        &self,
        id: &Identifier,
        req: MergeDocumentRequest,
        if_match: Option<&str>,
    ) -> DomainResult<DocumentResponse> {
        let existing = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let record = DocumentRecord { document: existing.document.merged(req.data), metadata: existing.metadata };
        let saved = self.repo.save(&record, precondition_from(if_match)).await?;
        let metadata = saved.metadata.clone().expect("save always returns metadata");
        Ok(DocumentResponse::new(id, saved.document.data, &metadata))
    }

    pub async fn delete(&self, id: &Identifier, if_match: Option<&str>) -> DomainResult<()> {
        self.repo.delete(id, precondition_from(if_match)).await
    }

    pub async fn list(
        &self,
        prefix: Option<&str>,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> DomainResult<apiv2_domain::dto::ListResponse<DocumentResponse>> {
        let decoded = cursor.map(decode_cursor).transpose()?;
        let page = self.repo.find_all(prefix, limit, decoded.as_deref()).await?;
        let items = page
            .items
            .into_iter()
            .map(|record| {
                let metadata = record.metadata.clone().expect("listed records always carry metadata");
                DocumentResponse::new(&record.document.id.clone(), record.document.data, &metadata)
            })
            .collect();
        Ok(apiv2_domain::dto::ListResponse::new(items, page.next_cursor.map(encode_cursor)))
    }
}

pub struct UserService {
    repo: Arc<ObjectStoreRepository<UserEntity>>,
}

impl UserService {
    pub fn new(repo: Arc<ObjectStoreRepository<UserEntity>>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, req: CreateUserRequest) -> DomainResult<UserResponse> {
        let id = Identifier::parse(req.id)?;
        let entity = UserEntity::new(id, req.name, req.external_id)?;
        let saved = self.repo.save(&entity, Precondition::IfNoneMatchAny).await?;
        UserResponse::new(&saved, saved.metadata().expect("save always returns metadata"))
    }

    pub async fn get(&self, id: &Identifier, if_none_match: Option<&str>) -> DomainResult<GetResult<UserResponse>> {
        let entity = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let metadata = entity.metadata().expect("loaded entities always carry metadata");
        if etag_matches(if_none_match, &metadata.etag) {
            return Ok(GetResult::NotModified { etag: metadata.etag.clone() });
        }
        UserResponse::new(&entity, metadata).map(GetResult::Found)
    }

    pub async fn get_metadata(&self, id: &Identifier) -> DomainResult<EntityMetadata> {
        self.repo.get_metadata(id).await
    }

    pub async fn replace(
        &self,
        id: &Identifier,
        req: ReplaceUserRequest,
        if_match: Option<&str>,
    ) -> DomainResult<UserResponse> {
        let existing = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let replaced = existing.replace(req.name, req.external_id)?;
        let saved = self.repo.save(&replaced, precondition_from(if_match)).await?;
        UserResponse::new(&saved, saved.metadata().expect("save always returns metadata"))
    }

    pub async fn merge(
        &self,
        id: &Identifier,
        req: MergeUserRequest,
        if_match: Option<&str>,
    ) -> DomainResult<UserResponse> {
        let existing = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let merged = existing.merge(req.name, req.external_id)?;
        let saved = self.repo.save(&merged, precondition_from(if_match)).await?;
        UserResponse::new(&saved, saved.metadata().expect("save always returns metadata"))
    }

    pub async fn delete(&self, id: &Identifier, if_match: Option<&str>) -> DomainResult<()> {
        self.repo.delete(id, precondition_from(if_match)).await
    }

    /// Users list as `{names, nextCursor}` rather than full items — the one
    /// kind whose listing surface is names-only (spec §6.1's users example).
    pub async fn list_names(
        &self,
        prefix: Option<&str>,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> DomainResult<NamesResponse> {
        let decoded = cursor.map(decode_cursor).transpose()?;
        let page = self.repo.find_all(prefix, limit, decoded.as_deref()).await?;
        let names = page.items.iter().map(|entity| entity.id().to_string()).collect();
        Ok(NamesResponse::new(names, page.next_cursor.map(encode_cursor)))
    }
}

pub struct GameService {
    repo: Arc<ObjectStoreRepository<GameEntity>>,
}

impl GameService {
    pub fn new(repo: Arc<ObjectStoreRepository<GameEntity>>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, req: CreateGameRequest) -> DomainResult<GameResponse> {
        let (id, game_type, users_ids) = req.into_parts()?;
        let entity = GameEntity::new(id, game_type, users_ids)?;
        let saved = self.repo.save(&entity, Precondition::IfNoneMatchAny).await?;
        GameResponse::new(&saved, saved.metadata().expect("save always returns metadata"))
    }

    pub async fn get(&self, id: &Identifier, if_none_match: Option<&str>) -> DomainResult<GetResult<GameResponse>> {
        let entity = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let metadata = entity.metadata().expect("loaded entities always carry metadata");
        if etag_matches(if_none_match, &metadata.etag) {
            return Ok(GetResult::NotModified { etag: metadata.etag.clone() });
        }
        GameResponse::new(&entity, metadata).map(GetResult::Found)
    }

    pub async fn get_metadata(&self, id: &Identifier) -> DomainResult<EntityMetadata> {
        self.repo.get_metadata(id).await
    }

    pub async fn replace(
        &self,
        id: &Identifier,
        req: ReplaceGameRequest,
        if_match: Option<&str>,
    ) -> DomainResult<GameResponse> {
        let existing = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let (game_type, users_ids, rounds, is_finished) = req.into_parts()?;
        let replaced = existing.replace(game_type, users_ids, rounds, is_finished)?;
        let saved = self.repo.save(&replaced, precondition_from(if_match)).await?;
        GameResponse::new(&saved, saved.metadata().expect("save always returns metadata"))
    }

    pub async fn merge(
        &self,
        id: &Identifier,
        req: MergeGameRequest,
        if_match: Option<&str>,
    ) -> DomainResult<GameResponse> {
        let existing = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let (game_type, users_ids, is_finished) = req.into_parts()?;
        let merged = existing.merge(game_type, users_ids, is_finished)?;
        let saved = self.repo.save(&merged, precondition_from(if_match)).await?;
        GameResponse::new(&saved, saved.metadata().expect("save always returns metadata"))
    }

    pub async fn delete(&self, id: &Identifier, if_match: Option<&str>) -> DomainResult<()> {
        self.repo.delete(id, precondition_from(if_match)).await
    }

    pub async fn list(
        &self,
        prefix: Option<&str>,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> DomainResult<apiv2_domain::dto::ListResponse<GameResponse>> {
        let decoded = cursor.map(decode_cursor).transpose()?;
        let page = self.repo.find_all(prefix, limit, decoded.as_deref()).await?;
        let items = page
            .items
            .iter()
            .map(|entity| GameResponse::new(entity, entity.metadata().expect("listed entities always carry metadata")))
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(apiv2_domain::dto::ListResponse::new(items, page.next_cursor.map(encode_cursor)))
    }

    pub async fn add_round(
        &self,
        id: &Identifier,
        round: apiv2_domain::Round,
        if_match: Option<&str>,
    ) -> DomainResult<RoundResponse> {
        let existing = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let updated = existing.add_round(round.clone())?;
        self.repo.save(&updated, precondition_from(if_match)).await?;
        Ok(RoundResponse::from(&round))
    }

    pub async fn add_move(
        &self,
        id: &Identifier,
        round_id: &Identifier,
        mv: apiv2_domain::Move,
        if_match: Option<&str>,
    ) -> DomainResult<GameResponse> {
        let existing = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let updated = existing.add_move_to_round(round_id, mv)?;
        let saved = self.repo.save(&updated, precondition_from(if_match)).await?;
        GameResponse::new(&saved, saved.metadata().expect("save always returns metadata"))
    }

    pub async fn finish_round(
        &self,
        id: &Identifier,
        round_id: &Identifier,
        if_match: Option<&str>,
    ) -> DomainResult<GameResponse> {
        let existing = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let updated = existing.finish_round(round_id)?;
        let saved = self.repo.save(&updated, precondition_from(if_match)).await?;
        GameResponse::new(&saved, saved.metadata().expect("save always returns metadata"))
    }

    pub async fn finish(&self, id: &Identifier, if_match: Option<&str>) -> DomainResult<GameResponse> {
        let existing = self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        let updated = existing.finish()?;
        let saved = self.repo.save(&updated, precondition_from(if_match)).await?;
        GameResponse::new(&saved, saved.metadata().expect("save always returns metadata"))
    }
}

fn precondition_from(if_match: Option<&str>) -> Precondition {
    match if_match {
        Some(etag) => Precondition::IfMatch(etag.to_string()),
        None => Precondition::None,
    }
}
