use crate::model::card::Card;
use crate::model::player::PlayerId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A single ply of a Wizard round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Bid { value: u8 },
    Play { card: Card, player: PlayerId },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Bid { value } => write!(f, "bid {value}"),
            Action::Play { card, player } => write!(f, "{player} plays {card}"),
        }
    }
}
