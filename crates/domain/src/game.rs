//! `Game`: a pure aggregate for a multi-round game (spec §3 "Game", §4.11
//! state machine `open -> finished`).

use std::collections::HashSet;

use apiv2_core::{DomainError, DomainResult, Identifier};
use serde::{Deserialize, Serialize};

use crate::moves::Move;
use crate::round::Round;

const TYPE_MAX: usize = 100;
const USERS_MIN: usize = 1;
const USERS_MAX: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Identifier,
    #[serde(rename = "type")]
    pub game_type: String,
    #[serde(rename = "usersIds")]
    pub users_ids: Vec<Identifier>,
    pub rounds: Vec<Round>,
    #[serde(rename = "isFinished")]
    pub is_finished: bool,
}

impl Game {
    pub fn new(id: Identifier, game_type: impl Into<String>, users_ids: Vec<Identifier>) -> DomainResult<Self> {
        let game_type = game_type.into();
        validate_type(&game_type)?;
        validate_users(&users_ids)?;
        Ok(Self { id, game_type, users_ids, rounds: Vec::new(), is_finished: false })
    }

    /// Reconstructs a game from persisted state, re-validating its shape.
    pub fn from_parts(
        id: Identifier,
        game_type: impl Into<String>,
        users_ids: Vec<Identifier>,
        rounds: Vec<Round>,
        is_finished: bool,
    ) -> DomainResult<Self> {
        let game_type = game_type.into();
        validate_type(&game_type)?;
        validate_users(&users_ids)?;
        Ok(Self { id, game_type, users_ids, rounds, is_finished })
    }

    pub fn add_round(&self, round: Round) -> DomainResult<Self> {
        self.ensure_open()?;
        let mut rounds = self.rounds.clone();
        rounds.push(round);
        Ok(Self { rounds, ..self.clone() })
    }

    pub fn add_move_to_round(&self, round_id: &Identifier, mv: Move) -> DomainResult<Self> {
        self.ensure_open()?;
        let index = self.round_index(round_id)?;
        let mut rounds = self.rounds.clone();
        rounds[index] = rounds[index].add_move(mv)?;
        Ok(Self { rounds, ..self.clone() })
    }

    pub fn finish_round(&self, round_id: &Identifier) -> DomainResult<Self> {
        self.ensure_open()?;
        let index = self.round_index(round_id)?;
        let mut rounds = self.rounds.clone();
        rounds[index] = rounds[index].finish()?;
        Ok(Self { rounds, ..self.clone() })
    }

    pub fn finish(&self) -> DomainResult<Self> {
        self.ensure_open()?;
        Ok(Self { is_finished: true, ..self.clone() })
    }

    fn ensure_open(&self) -> DomainResult<()> {
        if self.is_finished {
            return Err(DomainError::validation("game is already finished"));
        }
        Ok(())
    }

    fn round_index(&self, round_id: &Identifier) -> DomainResult<usize> {
        self.rounds
            .iter()
            .position(|r| &r.id == round_id)
            .ok_or_else(|| DomainError::validation_field(format!("no round '{round_id}'"), "roundId"))
    }
}

fn validate_type(game_type: &str) -> DomainResult<()> {
    if game_type.trim().is_empty() || game_type.chars().count() > TYPE_MAX {
        return Err(DomainError::validation_field(
            format!("type must be non-empty and at most {TYPE_MAX} characters"),
            "type",
        ));
    }
    Ok(())
}

fn validate_users(users_ids: &[Identifier]) -> DomainResult<()> {
    if !(USERS_MIN..=USERS_MAX).contains(&users_ids.len()) {
        return Err(DomainError::validation_field(
            format!("usersIds must contain {USERS_MIN}-{USERS_MAX} entries"),
            "usersIds",
        ));
    }
    let unique: HashSet<&Identifier> = users_ids.iter().collect();
    if unique.len() != users_ids.len() {
        return Err(DomainError::validation_field("usersIds must be unique", "usersIds"));
    }
    Ok(())
}
