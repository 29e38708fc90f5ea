//! Request/response DTOs (spec §4.6). Requests validate on construction;
//! responses are plain serializable shapes built from a loaded aggregate
//! plus its metadata.

mod document;
mod game;
mod user;

pub use document::{CreateDocumentRequest, DocumentResponse, MergeDocumentRequest, ReplaceDocumentRequest};
pub use game::{
    AddMoveRequest, AddRoundRequest, CreateGameRequest, GameResponse, MergeGameRequest, ReplaceGameRequest,
    RoundResponse,
};
pub use user::{CreateUserRequest, MergeUserRequest, ReplaceUserRequest, UserResponse};

use serde::Serialize;

/// A page of listing results; `nextCursor` is present only when more data
/// remains (spec §4.4 `findAll`).
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }
}

/// Alternate listing shape used by the users kind, per the design note on
/// listing response ambiguity: `{items}` for documents/games, `{names}` for
/// users.
#[derive(Debug, Serialize)]
pub struct NamesResponse {
    pub names: Vec<String>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl NamesResponse {
    pub fn new(names: Vec<String>, next_cursor: Option<String>) -> Self {
        Self { names, next_cursor }
    }
}
