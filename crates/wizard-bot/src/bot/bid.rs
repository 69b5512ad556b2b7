use super::{
    BID_TIME_FRACTION, BID_TRIAL_CAP, CandidateTally, Decision, DecisionConfig, DecisionSource,
    FallbackReason, MIN_SEARCH_ITERATIONS, NEUTRAL_SCORE,
};
use crate::policy::heuristic::heuristic_bid;
use crate::search::{Budget, is_win, random_playout};
use rand::Rng;
use tracing::{Level, event};
use wizard_core::belief::Determinizer;
use wizard_core::game::GameView;
use wizard_core::model::action::Action;
use wizard_core::model::player::PlayerId;
use wizard_core::model::round::{RoundPhase, RoundState};

/// Scores every legal bid by random playouts over many determinizations.
pub struct BidPlanner;

impl BidPlanner {
    /// `None` when `player` is not the one expected to bid.
    pub fn choose<R: Rng + ?Sized>(
        round: &RoundState,
        player: PlayerId,
        config: &DecisionConfig,
        rng: &mut R,
    ) -> Option<Decision<u8>> {
        if round.phase() != RoundPhase::Bidding || round.current_player() != Some(player) {
            return None;
        }

        let bids: Vec<u8> = (0..=round.round_number()).collect();
        if bids.len() <= 2 {
            return Some(fallback(round, player, FallbackReason::TrivialBidRange, rng));
        }
        if config.iteration_budget < MIN_SEARCH_ITERATIONS {
            return Some(fallback(round, player, FallbackReason::BudgetTooSmall, rng));
        }

        let budget = Budget::start(config.time_limit);
        let trials = (config.iterations_per_determinization / bids.len()).min(BID_TRIAL_CAP);
        let mut tally = CandidateTally::new(bids);
        let mut determinizations = 0usize;
        let mut total_trials = 0usize;
        let mut timed_out = false;

        'sampling: for _ in 0..config.max_determinizations {
            if !budget.within(BID_TIME_FRACTION) {
                timed_out = true;
                break;
            }
            let sample = Determinizer::determinize(round, player, rng);
            determinizations += 1;

            for index in 0..tally.candidates().len() {
                if !budget.within(BID_TIME_FRACTION) {
                    timed_out = true;
                    break 'sampling;
                }
                let bid = tally.candidates()[index];
                if let Some((score, ran)) = evaluate_bid(sample.state(), player, bid, trials, rng)
                {
                    tally.record(index, score);
                    total_trials += ran;
                }
            }
        }

        let Some((bid, mean)) = tally.best() else {
            let reason = if timed_out {
                FallbackReason::TimeExhausted
            } else {
                FallbackReason::NoSamples
            };
            return Some(fallback(round, player, reason, rng));
        };

        event!(
            target: "wizard_bot::bid",
            Level::DEBUG,
            seat = %player,
            round = round.round_number(),
            bid,
            win_rate = mean,
            determinizations,
            trials = total_trials,
            utilization = budget.utilization_percent(),
            reason = "search",
        );

        Some(Decision {
            choice: bid,
            source: DecisionSource::Search {
                determinizations,
                trials: total_trials,
            },
        })
    }
}

/// Win rate of `bid` over `trials` playouts and the playouts run. A rejected
/// bid scores neutral; `None` when there is no trial to run.
fn evaluate_bid<R: Rng + ?Sized>(
    state: &RoundState,
    player: PlayerId,
    bid: u8,
    trials: usize,
    rng: &mut R,
) -> Option<(f64, usize)> {
    if trials == 0 {
        return None;
    }
    let mut after = state.clone();
    if after.apply(&Action::Bid { value: bid }).is_err() {
        return Some((NEUTRAL_SCORE, 0));
    }

    let wins = (0..trials)
        .filter(|_| {
            let mut playout = after.clone();
            let scores = random_playout(&mut playout, &mut *rng);
            is_win(&scores, player)
        })
        .count();
    Some((wins as f64 / trials as f64, trials))
}

fn fallback<R: Rng + ?Sized>(
    round: &RoundState,
    player: PlayerId,
    reason: FallbackReason,
    rng: &mut R,
) -> Decision<u8> {
    let bid = heuristic_bid(round.hand(player), round.round_number(), rng);
    event!(
        target: "wizard_bot::bid",
        Level::DEBUG,
        seat = %player,
        round = round.round_number(),
        bid,
        reason = %reason,
        "falling back to heuristic bid"
    );
    Decision {
        choice: bid,
        source: DecisionSource::Fallback(reason),
    }
}
