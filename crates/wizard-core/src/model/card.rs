use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A Wizard card. Special cards carry no suit and exist in identical copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Card {
    Suited { rank: Rank, suit: Suit },
    /// Always wins the trick; the first one played takes it.
    Wizard,
    /// Never wins unless the trick holds nothing but Fools.
    Fool,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Card::Suited { rank, suit }
    }

    /// Builds a suited card from a raw rank value, `None` when out of range.
    pub const fn suited(value: u8, suit: Suit) -> Option<Self> {
        match Rank::new(value) {
            Some(rank) => Some(Card::Suited { rank, suit }),
            None => None,
        }
    }

    pub const fn is_special(self) -> bool {
        matches!(self, Card::Wizard | Card::Fool)
    }

    pub const fn is_wizard(self) -> bool {
        matches!(self, Card::Wizard)
    }

    pub const fn is_fool(self) -> bool {
        matches!(self, Card::Fool)
    }

    pub const fn suit(self) -> Option<Suit> {
        match self {
            Card::Suited { suit, .. } => Some(suit),
            _ => None,
        }
    }

    pub const fn rank(self) -> Option<Rank> {
        match self {
            Card::Suited { rank, .. } => Some(rank),
            _ => None,
        }
    }

    /// Ordering key used for sorting hands: suited cards by suit then rank, specials last.
    pub fn sort_key(self) -> (u8, u8) {
        match self {
            Card::Suited { rank, suit } => (suit as u8, rank.value()),
            Card::Fool => (4, 0),
            Card::Wizard => (5, 0),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Suited { rank, suit } => write!(f, "{rank}{suit}"),
            Card::Wizard => f.write_str("Wizard"),
            Card::Fool => f.write_str("Fool"),
        }
    }
}
