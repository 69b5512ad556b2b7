use core::fmt;
use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// Seat index around the table, counted clockwise from the first seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < MAX_PLAYERS).then(|| Self(index as u8))
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn next(self, player_count: usize) -> PlayerId {
        PlayerId(((self.0 as usize + 1) % player_count) as u8)
    }

    pub const fn offset(self, steps: usize, player_count: usize) -> PlayerId {
        PlayerId(((self.0 as usize + steps) % player_count) as u8)
    }

    /// All seats of a table with `player_count` players, in turn order.
    pub fn seats(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count).map(|index| PlayerId(index as u8))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}
