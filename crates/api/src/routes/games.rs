//! `/apiv2/internal/games` controller, including the game-specific round
//! and move operations that don't fit the create/get/replace/merge/delete
//! shape the other two kinds share (spec §6.1 "games", §4.11).

use apiv2_core::{DomainResult, Identifier};
use apiv2_domain::dto::{AddMoveRequest, AddRoundRequest, CreateGameRequest, MergeGameRequest, ReplaceGameRequest};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
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
        .route("/:id/finish", patch(finish_game))
        .route("/:id/rounds", post(add_round))
        .route("/:id/rounds/:round_id/moves", post(add_move))
        .route("/:id/rounds/:round_id/finish", patch(finish_round))
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

async fn create(State(state): State<AppState>, Json(req): Json<CreateGameRequest>) -> Response {
    match state.games.create(req).await {
        Ok(resp) => ResponseBuilder::created(&resp)
            .with_etag(&resp.etag)
            .with_location(&format!("/apiv2/internal/games/{}", resp.id))
            .into_response(),
        Err(e) => problem_response(e, "/apiv2/internal/games"),
    }
}

async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Response {
    match state.games.list(q.prefix.as_deref(), q.limit, q.cursor.as_deref()).await {
        Ok(page) => ResponseBuilder::ok(&page).into_response(),
        Err(e) => problem_response(e, "/apiv2/internal/games"),
    }
}

async fn get_one(State(state): State<AppState>, Path(raw_id): Path<String>, headers: HeaderMap) -> Response {
    let instance = format!("/apiv2/internal/games/{raw_id}");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.games.get(&id, if_none_match(&headers).as_deref()).await {
        Ok(GetResult::Found(resp)) => ResponseBuilder::ok(&resp).with_etag(&resp.etag).into_response(),
        Ok(GetResult::NotModified { etag }) => ResponseBuilder::not_modified().with_etag(&etag).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn get_meta(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let instance = format!("/apiv2/internal/games/{raw_id}/meta");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.games.get_metadata(&id).await {
        Ok(meta) => ResponseBuilder::ok(&meta).with_etag(&meta.etag).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn replace(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ReplaceGameRequest>,
) -> Response {
    let instance = format!("/apiv2/internal/games/{raw_id}");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.games.replace(&id, req, if_match(&headers).as_deref()).await {
        Ok(resp) => ResponseBuilder::ok(&resp).with_etag(&resp.etag).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn merge(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<MergeGameRequest>,
) -> Response {
    let instance = format!("/apiv2/internal/games/{raw_id}");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.games.merge(&id, req, if_match(&headers).as_deref()).await {
        Ok(resp) => ResponseBuilder::ok(&resp).with_etag(&resp.etag).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn delete_one(State(state): State<AppState>, Path(raw_id): Path<String>, headers: HeaderMap) -> Response {
    let instance = format!("/apiv2/internal/games/{raw_id}");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.games.delete(&id, if_match(&headers).as_deref()).await {
        Ok(()) => ResponseBuilder::no_content().into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn finish_game(State(state): State<AppState>, Path(raw_id): Path<String>, headers: HeaderMap) -> Response {
    let instance = format!("/apiv2/internal/games/{raw_id}/finish");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.games.finish(&id, if_match(&headers).as_deref()).await {
        Ok(resp) => ResponseBuilder::ok(&resp).with_etag(&resp.etag).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn add_round(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<AddRoundRequest>,
) -> Response {
    let instance = format!("/apiv2/internal/games/{raw_id}/rounds");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    let round = match req.into_round() {
        Ok(round) => round,
        Err(e) => return problem_response(e, &instance),
    };
    match state.games.add_round(&id, round, if_match(&headers).as_deref()).await {
        Ok(resp) => ResponseBuilder::created(&resp).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn add_move(
    State(state): State<AppState>,
    Path((raw_id, raw_round_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<AddMoveRequest>,
) -> Response {
    let instance = format!("/apiv2/internal/games/{raw_id}/rounds/{raw_round_id}/moves");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    let round_id = match parse_id(raw_round_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    let mv = match req.into_move() {
        Ok(mv) => mv,
        Err(e) => return problem_response(e, &instance),
    };
    match state.games.add_move(&id, &round_id, mv, if_match(&headers).as_deref()).await {
        Ok(resp) => ResponseBuilder::created(&resp).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}

async fn finish_round(
    State(state): State<AppState>,
    Path((raw_id, raw_round_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let instance = format!("/apiv2/internal/games/{raw_id}/rounds/{raw_round_id}/finish");
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    let round_id = match parse_id(raw_round_id) {
        Ok(id) => id,
        Err(e) => return problem_response(e, &instance),
    };
    match state.games.finish_round(&id, &round_id, if_match(&headers).as_deref()).await {
        Ok(resp) => ResponseBuilder::ok(&resp).with_etag(&resp.etag).into_response(),
        Err(e) => problem_response(e, &instance),
    }
}
