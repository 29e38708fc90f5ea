use apiv2_core::{DomainResult, EntityMetadata, Identifier};
use serde::{Deserialize, Serialize};

use crate::game_entity::GameEntity;
use crate::moves::Move;
use crate::round::Round;

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub game_type: String,
    #[serde(rename = "usersIds")]
    pub users_ids: Vec<String>,
}

impl CreateGameRequest {
    pub fn into_parts(self) -> DomainResult<(Identifier, String, Vec<Identifier>)> {
        let id = Identifier::parse(self.id)?;
        let users_ids = self.users_ids.into_iter().map(Identifier::parse).collect::<DomainResult<_>>()?;
        Ok((id, self.game_type, users_ids))
    }
}

/// Wire shape of a move, used in full-replace payloads.
#[derive(Debug, Deserialize)]
pub struct MoveInput {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub value: f64,
    #[serde(rename = "valueDecorated")]
    pub value_decorated: String,
}

impl MoveInput {
    pub fn into_move(self) -> DomainResult<Move> {
        Move::new(Identifier::parse(self.id)?, Identifier::parse(self.user_id)?, self.value, self.value_decorated)
    }
}

/// Wire shape of a round, used in full-replace payloads.
#[derive(Debug, Deserialize)]
pub struct RoundInput {
    pub id: String,
    #[serde(default)]
    pub moves: Vec<MoveInput>,
    #[serde(rename = "isFinished", default)]
    pub is_finished: bool,
    pub time: f64,
}

impl RoundInput {
    pub fn into_round(self) -> DomainResult<Round> {
        let moves = self.moves.into_iter().map(MoveInput::into_move).collect::<DomainResult<_>>()?;
        Round::from_parts(Identifier::parse(self.id)?, moves, self.is_finished, self.time)
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplaceGameRequest {
    #[serde(rename = "type")]
    pub game_type: String,
    #[serde(rename = "usersIds")]
    pub users_ids: Vec<String>,
    #[serde(default)]
    pub rounds: Vec<RoundInput>,
    #[serde(rename = "isFinished", default)]
    pub is_finished: bool,
}

impl ReplaceGameRequest {
    pub fn into_parts(self) -> DomainResult<(String, Vec<Identifier>, Vec<Round>, bool)> {
        let users_ids = self.users_ids.into_iter().map(Identifier::parse).collect::<DomainResult<_>>()?;
        let rounds = self.rounds.into_iter().map(RoundInput::into_round).collect::<DomainResult<_>>()?;
        Ok((self.game_type, users_ids, rounds, self.is_finished))
    }
}

#[derive(Debug, Deserialize)]
pub struct MergeGameRequest {
    #[serde(rename = "type")]
    pub game_type: Option<String>,
    #[serde(rename = "usersIds")]
    pub users_ids: Option<Vec<String>>,
    #[serde(rename = "isFinished")]
    pub is_finished: Option<bool>,
}

impl MergeGameRequest {
    pub fn into_parts(self) -> DomainResult<(Option<String>, Option<Vec<Identifier>>, Option<bool>)> {
        let users_ids = self.users_ids.map(|ids| ids.into_iter().map(Identifier::parse).collect()).transpose()?;
        Ok((self.game_type, users_ids, self.is_finished))
    }
}

#[derive(Debug, Deserialize)]
pub struct AddRoundRequest {
    pub id: String,
    #[serde(default)]
    pub time: f64,
}

impl AddRoundRequest {
    pub fn into_round(self) -> DomainResult<Round> {
        Round::new(Identifier::parse(self.id)?, self.time)
    }
}

#[derive(Debug, Deserialize)]
pub struct AddMoveRequest {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub value: f64,
    #[serde(rename = "valueDecorated")]
    pub value_decorated: String,
}

impl AddMoveRequest {
    pub fn into_move(self) -> DomainResult<Move> {
        Move::new(Identifier::parse(self.id)?, Identifier::parse(self.user_id)?, self.value, self.value_decorated)
    }
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub value: f64,
    #[serde(rename = "valueDecorated")]
    pub value_decorated: String,
}

impl From<&Move> for MoveResponse {
    fn from(mv: &Move) -> Self {
        Self {
            id: mv.id.to_string(),
            user_id: mv.user_id.to_string(),
            value: mv.value,
            value_decorated: mv.value_decorated.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoundResponse {
    pub id: String,
    pub moves: Vec<MoveResponse>,
    #[serde(rename = "isFinished")]
    pub is_finished: bool,
    pub time: f64,
}

impl From<&Round> for RoundResponse {
    fn from(round: &Round) -> Self {
        Self {
            id: round.id.to_string(),
            moves: round.moves.iter().map(MoveResponse::from).collect(),
            is_finished: round.is_finished,
            time: round.time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub game_type: String,
    #[serde(rename = "usersIds")]
    pub users_ids: Vec<String>,
    pub rounds: Vec<RoundResponse>,
    #[serde(rename = "isFinished")]
    pub is_finished: bool,
    pub etag: String,
}

impl GameResponse {
    pub fn new(entity: &GameEntity, metadata: &EntityMetadata) -> DomainResult<Self> {
        let game = entity.game()?;
        Ok(Self {
            id: game.id.to_string(),
            game_type: game.game_type,
            users_ids: game.users_ids.iter().map(Identifier::to_string).collect(),
            rounds: game.rounds.iter().map(RoundResponse::from).collect(),
            is_finished: game.is_finished,
            etag: metadata.etag.clone(),
        })
    }
}
