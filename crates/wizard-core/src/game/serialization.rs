use crate::model::round::RoundState;
use serde::{Deserialize, Serialize};

/// Outcome of one finished round, as written to game logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundRecord {
    pub round: u8,
    pub bids: Vec<u8>,
    pub won: Vec<u8>,
    pub scores: Vec<i32>,
}

impl RoundRecord {
    /// `None` unless the round has been played out.
    pub fn capture(round: &RoundState) -> Option<Self> {
        if !round.is_complete() {
            return None;
        }
        Some(Self {
            round: round.round_number(),
            bids: round.bids().iter().map(|bid| bid.unwrap_or(0)).collect(),
            won: round.tricks_won().to_vec(),
            scores: round.round_points(),
        })
    }
}

/// Full record of a match: seed, table size, each round and the final totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchLog {
    pub seed: u64,
    pub player_count: usize,
    pub rounds: Vec<RoundRecord>,
    pub final_scores: Vec<i32>,
}

impl MatchLog {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
