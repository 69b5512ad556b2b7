pub mod bot;
pub mod policy;
pub mod search;

pub use bot::{
    BidPlanner, Decision, DecisionConfig, DecisionSource, FallbackReason, PlayPlanner,
};
pub use policy::{HeuristicPolicy, IsmctsPolicy, Policy, PolicyContext};

use rand::Rng;
use wizard_core::model::card::Card;
use wizard_core::model::player::PlayerId;
use wizard_core::model::round::RoundState;

/// Picks a bid for `player`, or `None` if it is not their turn to bid.
pub fn choose_bid<R: Rng + ?Sized>(
    state: &RoundState,
    player: PlayerId,
    config: &DecisionConfig,
    rng: &mut R,
) -> Option<Decision<u8>> {
    BidPlanner::choose(state, player, config, rng)
}

/// Picks a card for `player`, or `None` if they have no legal card to play.
pub fn choose_card<R: Rng + ?Sized>(
    state: &RoundState,
    player: PlayerId,
    config: &DecisionConfig,
    rng: &mut R,
) -> Option<Decision<Card>> {
    PlayPlanner::choose(state, player, config, rng)
}
