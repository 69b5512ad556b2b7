use super::{Policy, PolicyContext};
use crate::bot::{BidPlanner, DecisionConfig, DecisionSource, PlayPlanner};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wizard_core::model::card::Card;

/// Search-backed policy with its own random stream.
pub struct IsmctsPolicy {
    config: DecisionConfig,
    rng: SmallRng,
    last_source: Option<DecisionSource>,
}

impl IsmctsPolicy {
    pub fn new(config: DecisionConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
            last_source: None,
        }
    }
}

impl Policy for IsmctsPolicy {
    fn name(&self) -> &'static str {
        "ismcts"
    }

    fn choose_bid(&mut self, ctx: &PolicyContext) -> Option<u8> {
        let decision = BidPlanner::choose(ctx.round, ctx.seat, &self.config, &mut self.rng)?;
        self.last_source = Some(decision.source);
        Some(decision.choice)
    }

    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Card> {
        let decision = PlayPlanner::choose(ctx.round, ctx.seat, &self.config, &mut self.rng)?;
        self.last_source = Some(decision.source);
        Some(decision.choice)
    }

    fn last_source(&self) -> Option<DecisionSource> {
        self.last_source
    }
}
