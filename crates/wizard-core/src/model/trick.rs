use crate::model::card::Card;
use crate::model::player::PlayerId;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    leader: PlayerId,
    player_count: usize,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub position: PlayerId,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrickError {
    TrickComplete,
    OutOfTurn { expected: PlayerId, actual: PlayerId },
    AlreadyPlayed(PlayerId),
}

impl fmt::Display for TrickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrickError::TrickComplete => write!(f, "trick already complete"),
            TrickError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to play next but got {actual}")
            }
            TrickError::AlreadyPlayed(position) => {
                write!(f, "{position} has already played this trick")
            }
        }
    }
}

impl std::error::Error for TrickError {}

impl Trick {
    pub fn new(leader: PlayerId, player_count: usize) -> Self {
        Self {
            leader,
            player_count,
            plays: Vec::with_capacity(player_count),
        }
    }

    pub fn leader(&self) -> PlayerId {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == self.player_count
    }

    /// Suit that must be followed, if any.
    ///
    /// Leading Fools are skipped; the first other card decides. A Wizard there
    /// frees the rest of the trick from following, as in the published Wizard
    /// rules, so a later suited card never sets a led suit.
    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays
            .iter()
            .map(|play| play.card)
            .find(|card| !card.is_fool())
            .and_then(Card::suit)
    }

    pub fn expected_position(&self) -> PlayerId {
        self.plays
            .last()
            .map(|play| play.position.next(self.player_count))
            .unwrap_or(self.leader)
    }

    pub fn play(&mut self, position: PlayerId, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        if self.plays.iter().any(|play| play.position == position) {
            return Err(TrickError::AlreadyPlayed(position));
        }

        let expected = self.expected_position();
        if expected != position {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: position,
            });
        }

        self.plays.push(Play { position, card });
        Ok(())
    }

    /// Resolves the trick: first Wizard, then highest trump, then highest card
    /// of the led suit, then the first Fool.
    pub fn winner(&self, trump: Option<Suit>) -> Option<PlayerId> {
        if !self.is_complete() {
            return None;
        }

        if let Some(play) = self.plays.iter().find(|play| play.card.is_wizard()) {
            return Some(play.position);
        }

        let highest_of = |suit: Suit| {
            self.plays
                .iter()
                .filter(|play| play.card.suit() == Some(suit))
                .max_by_key(|play| play.card.rank())
                .map(|play| play.position)
        };

        if let Some(winner) = trump.and_then(highest_of) {
            return Some(winner);
        }

        if let Some(winner) = self.lead_suit().and_then(highest_of) {
            return Some(winner);
        }

        self.plays
            .iter()
            .find(|play| play.card.is_fool())
            .or_else(|| self.plays.first())
            .map(|play| play.position)
    }
}
