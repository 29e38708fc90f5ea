//! `/apiv2/internal/documents` controller (spec §6.1 "documents").

use apiv2_core::{DomainResult, Identifier};
use apiv2_domain::dto::{CreateDocumentRequest, MergeDocumentRequest, ReplaceDocumentRequest};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::httpx::{problem_response, ResponseBuilder};
use crate::routes::{if_match, if_none_match};
use crate::services::GetResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(get_one).put(replace).patch(merge).delete(delete_one))
        .route("/:id/meta", get(get_meta))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub prefix: Option<String>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

fn parse_id(raw: String) -> DomainResult<Identifier> {
    Identifier::parse(raw)
}

async fn create(State(state): State<AppState>, Json(req): Json<CreateDocumentRequest>) -> Response {
    match state.documents.create(req).await {
        Ok(resp) => ResponseBuilder::created(&resp)
            .with_etag(&resp.etag)
            .with_location(&format!("/apiv2/internal/documents/{}", resp.id))
            .into_response(),
        Err(e) => problem_response(e, "/apiv2/internal/documents"),
    }
}

async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Response {
    match state.documents.list(q.prefix.as_deref(), q.limit, q.cursor.as_deref()).await {
        Ok(page) => ResponseBuilder::ok(&page).into_response(),
        Err(e) => problem_response(e, "/apiv2/internal/documents"),
    }
}

async fn get_one(State(state): State<AppState>, Path(raw_id): Path<String>, headers: HeaderMap) -> Response {
    let instance = format!("/apiv2/internal/documents/{raw_id}");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.documents.get(&id, if_none_match(&headers).as_deref()).await {
        Ok(GetResult::Found(resp)) => ResponseBuilder::ok(&resp).with_etag(&resp.etag).into_response(),
        Ok(GetResult::NotModified { etag }) => ResponseBuilder::not_modified().with_etag(&etag).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn get_meta(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let instance = format!("/apiv2/internal/documents/{raw_id}/meta");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.documents.get_metadata(&id).await {
        Ok(meta) => ResponseBuilder::ok(&meta).with_etag(&meta.etag).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn replace(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ReplaceDocumentRequest>,
) -> Response {
    let instance = format!("/apiv2/internal/documents/{raw_id}");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.documents.replace(&id, req, if_match(&headers).as_deref()).await {
        Ok(resp) => ResponseBuilder::ok(&resp).with_etag(&resp.etag).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn merge(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<MergeDocumentRequest>,
) -> Response {
    let instance = format!("/apiv2/internal/documents/{raw_id}");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.documents.merge(&id, req, if_match(&headers).as_deref()).await {
        Ok(resp) => ResponseBuilder::ok(&resp).with_etag(&resp.etag).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn delete_one(State(state): State<AppState>, Path(raw_id): Path<String>, headers: HeaderMap) -> Response {
    let instance = format!("/apiv2/internal/documents/{raw_id}");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.documents.delete(&id, if_match(&headers).as_deref()).await {
        Ok(()) => ResponseBuilder::no_content().into_response(),
        Err(e) => problem_response(e, &instance),
    }
}
