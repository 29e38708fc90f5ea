//! `GameEntity`: the persistence-shaped wrapper around `Game` (spec §4.3
//! "Entity wrappers"), following the same project/apply/reproject pattern
//! as `UserEntity`.

use apiv2_core::{DomainResult, EntityMetadata, Identifier};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::game::Game;
use crate::moves::Move;
use crate::round::Round;

#[derive(Debug, Clone, Deserialize)]
struct RawMove {
    id: Identifier,
    #[serde(rename = "userId")]
    user_id: Identifier,
    value: f64,
    #[serde(rename = "valueDecorated")]
    value_decorated: String,
}

impl RawMove {
    fn validate(self) -> DomainResult<Move> {
        Move::new(self.id, self.user_id, self.value, self.value_decorated)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawRound {
    id: Identifier,
    #[serde(default)]
    moves: Vec<RawMove>,
    #[serde(rename = "isFinished", default)]
    is_finished: bool,
    time: f64,
}

impl RawRound {
    fn validate(self) -> DomainResult<Round> {
        let moves = self.moves.into_iter().map(RawMove::validate).collect::<DomainResult<_>>()?;
        Round::from_parts(self.id, moves, self.is_finished, self.time)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GameData {
    #[serde(rename = "type")]
    game_type: String,
    #[serde(rename = "usersIds")]
    users_ids: Vec<Identifier>,
    rounds: Vec<RawRound>,
    #[serde(rename = "isFinished")]
    is_finished: bool,
}

#[derive(Debug, Serialize)]
struct GameDataOut<'a> {
    #[serde(rename = "type")]
    game_type: &'a str,
    #[serde(rename = "usersIds")]
    users_ids: &'a [Identifier],
    rounds: &'a [Round],
    #[serde(rename = "isFinished")]
    is_finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameEntity {
    document: Document,
    metadata: Option<EntityMetadata>,
}

impl GameEntity {
    pub fn new(id: Identifier, game_type: impl Into<String>, users_ids: Vec<Identifier>) -> DomainResult<Self> {
        let game = Game::new(id, game_type, users_ids)?;
        Ok(Self::from_game(&game, None))
    }

    /// Loads a wrapper from a persisted document, validating its shape
    /// (including round/move subtrees) the way `fromJSON` does.
    pub fn from_document(document: Document, metadata: EntityMetadata) -> DomainResult<Self> {
        let entity = Self { document, metadata: Some(metadata) };
        entity.game()?; // validates shape
        Ok(entity)
    }

    pub fn id(&self) -> &Identifier {
        &self.document.id
    }

    pub fn metadata(&self) -> Option<&EntityMetadata> {
        self.metadata.as_ref()
    }

    pub fn with_metadata(&self, metadata: EntityMetadata) -> Self {
        Self { document: self.document.clone(), metadata: Some(metadata) }
    }

    /// The `data` subtree that is persisted (the id is carried only in the key).
    pub fn to_json(&self) -> serde_json::Value {
        self.document.data.clone()
    }

    pub fn game(&self) -> DomainResult<Game> {
        let data: GameData = serde_json::from_value(self.document.data.clone())
            .map_err(|e| apiv2_core::DomainError::validation(format!("malformed game document: {e}")))?;
        let rounds = data.rounds.into_iter().map(RawRound::validate).collect::<DomainResult<_>>()?;
        Game::from_parts(self.document.id.clone(), data.game_type, data.users_ids, rounds, data.is_finished)
    }

    pub fn replace(
        &self,
        game_type: impl Into<String>,
        users_ids: Vec<Identifier>,
        rounds: Vec<Round>,
        is_finished: bool,
    ) -> DomainResult<Self> {
        let game = Game::from_parts(self.document.id.clone(), game_type, users_ids, rounds, is_finished)?;
        Ok(Self::from_game(&game, self.metadata.clone()))
    }

    pub fn merge(
        &self,
        game_type: Option<String>,
        users_ids: Option<Vec<Identifier>>,
        is_finished: Option<bool>,
    ) -> DomainResult<Self> {
        let current = self.game()?;
        let game = Game::from_parts(
            current.id.clone(),
            game_type.unwrap_or(current.game_type),
            users_ids.unwrap_or(current.users_ids),
            current.rounds,
            is_finished.unwrap_or(current.is_finished),
        )?;
        Ok(Self::from_game(&game, self.metadata.clone()))
    }

    pub fn add_round(&self, round: Round) -> DomainResult<Self> {
        let game = self.game()?.add_round(round)?;
        Ok(Self::from_game(&game, self.metadata.clone()))
    }

    pub fn add_move_to_round(&self, round_id: &Identifier, mv: Move) -> DomainResult<Self> {
        let game = self.game()?.add_move_to_round(round_id, mv)?;
        Ok(Self::from_game(&game, self.metadata.clone()))
    }

    pub fn finish_round(&self, round_id: &Identifier) -> DomainResult<Self> {
        let game = self.game()?.finish_round(round_id)?;
        Ok(Self::from_game(&game, self.metadata.clone()))
    }

    pub fn finish(&self) -> DomainResult<Self> {
        let game = self.game()?.finish()?;
        Ok(Self::from_game(&game, self.metadata.clone()))
    }

    fn from_game(game: &Game, metadata: Option<EntityMetadata>) -> Self {
        let data = serde_json::to_value(GameDataOut {
            game_type: &game.game_type,
            users_ids: &game.users_ids,
            rounds: &game.rounds,
            is_finished: game.is_finished,
        })
        .expect("GameDataOut always serializes");
        Self { document: Document::new(game.id.clone(), data), metadata }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn users(n: usize) -> Vec<Identifier> {
        (0..n).map(|i| id(&format!("u{i}"))).collect()
    }

    fn metadata() -> EntityMetadata {
        EntityMetadata::new("\"v1\"", 10, "2024-01-01T00:00:00Z")
    }

    #[test]
    fn new_has_no_metadata() {
        let entity = GameEntity::new(id("g1"), "chess", users(2)).unwrap();
        assert!(entity.metadata().is_none());
    }

    #[test]
    fn round_trips_through_document() {
        let entity = GameEntity::new(id("g1"), "chess", users(2)).unwrap();
        let loaded = GameEntity::from_document(Document::new(id("g1"), entity.to_json()), metadata()).unwrap();
        assert_eq!(loaded.game().unwrap().game_type, "chess");
    }

    #[test]
    fn add_round_carries_forward_metadata() {
        let entity = GameEntity::new(id("g1"), "chess", users(2)).unwrap().with_metadata(metadata());
        let round = Round::new(id("r1"), 0.0).unwrap();
        let entity2 = entity.add_round(round).unwrap();
        assert_eq!(entity2.game().unwrap().rounds.len(), 1);
        assert_eq!(entity2.metadata(), Some(&metadata()));
    }

    #[test]
    fn add_move_to_round_and_finish_round_roundtrip() {
        let entity = GameEntity::new(id("g1"), "chess", users(2))
            .unwrap()
            .add_round(Round::new(id("r1"), 0.0).unwrap())
            .unwrap();
        let mv = Move::new(id("m1"), id("u0"), 1.0, "one").unwrap();
        let entity = entity.add_move_to_round(&id("r1"), mv).unwrap();
        assert_eq!(entity.game().unwrap().rounds[0].moves.len(), 1);
        let entity = entity.finish_round(&id("r1")).unwrap();
        assert!(entity.game().unwrap().rounds[0].is_finished);
    }

    #[test]
    fn finish_marks_finished_and_rejects_further_mutation() {
        let entity = GameEntity::new(id("g1"), "chess", users(2)).unwrap();
        let entity = entity.finish().unwrap();
        assert!(entity.game().unwrap().is_finished);
        assert!(entity.add_round(Round::new(id("r1"), 0.0).unwrap()).is_err());
    }

    #[test]
    fn merge_preserves_unspecified_fields() {
        let entity = GameEntity::new(id("g1"), "chess", users(2)).unwrap();
        let merged = entity.merge(None, None, Some(true)).unwrap();
        let game = merged.game().unwrap();
        assert_eq!(game.game_type, "chess");
        assert!(game.is_finished);
    }

    #[test]
    fn rejects_malformed_document() {
        let doc = Document::new(id("g1"), serde_json::json!({"type": "chess"}));
        assert!(GameEntity::from_document(doc, metadata()).is_err());
    }
}
