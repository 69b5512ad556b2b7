pub mod heuristic;
mod ismcts;

pub use heuristic::HeuristicPolicy;
pub use ismcts::IsmctsPolicy;

use crate::bot::DecisionSource;
use wizard_core::model::card::Card;
use wizard_core::model::player::PlayerId;
use wizard_core::model::round::RoundState;

/// What a seat is allowed to look at when it has to act.
pub struct PolicyContext<'a> {
    pub seat: PlayerId,
    pub round: &'a RoundState,
}

impl<'a> PolicyContext<'a> {
    pub fn new(seat: PlayerId, round: &'a RoundState) -> Self {
        Self { seat, round }
    }
}

/// A seat's decision maker. Both methods return `None` when the seat has
/// nothing to decide.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    fn choose_bid(&mut self, ctx: &PolicyContext) -> Option<u8>;

    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Card>;

    /// How the most recent decision was made, for policies that search.
    fn last_source(&self) -> Option<DecisionSource> {
        None
    }
}
