//! `Round`: an ordered sequence of moves within a game (spec §3 "Round",
//! §4.11 state machine `open -> finished`).

use apiv2_core::{DomainError, DomainResult, Identifier, ValueObject};
use serde::{Deserialize, Serialize};

use crate::moves::Move;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: Identifier,
    pub moves: Vec<Move>,
    #[serde(rename = "isFinished")]
    pub is_finished: bool,
    pub time: f64,
}

impl ValueObject for Round {}

impl Round {
    pub fn new(id: Identifier, time: f64) -> DomainResult<Self> {
        if !time.is_finite() {
            return Err(DomainError::validation_field("time must be finite", "time"));
        }
        Ok(Self { id, moves: Vec::new(), is_finished: false, time })
    }

    /// Reconstructs a round from persisted state, re-validating its shape.
    pub fn from_parts(id: Identifier, moves: Vec<Move>, is_finished: bool, time: f64) -> DomainResult<Self> {
        if !time.is_finite() {
            return Err(DomainError::validation_field("time must be finite", "time"));
        }
        Ok(Self { id, moves, is_finished, time })
    }

    pub fn add_move(&self, mv: Move) -> DomainResult<Self> {
        if self.is_finished {
            return Err(DomainError::validation("round is already finished"));
        }
        let mut moves = self.moves.clone();
        moves.push(mv);
        Ok(Self { moves, ..self.clone() })
    }

    pub fn finish(&self) -> DomainResult<Self> {
        if self.is_finished {
            return Err(DomainError::validation("round is already finished"));
        }
        Ok(Self { is_finished: true, ..self.clone() })
    }
}
