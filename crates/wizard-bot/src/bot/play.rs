use super::{
    CARD_TIME_FRACTION, CARD_TRIAL_CAP, CandidateTally, Decision, DecisionConfig, DecisionSource,
    FallbackReason, NESTED_SEARCH_FRACTION, NEUTRAL_SCORE,
};
use crate::policy::heuristic::heuristic_card;
use crate::search::{Budget, Ismcts, is_win, random_playout};
use rand::Rng;
use tracing::{Level, event};
use wizard_core::belief::Determinizer;
use wizard_core::game::GameView;
use wizard_core::model::action::Action;
use wizard_core::model::card::Card;
use wizard_core::model::player::PlayerId;
use wizard_core::model::round::{RoundPhase, RoundState};

/// Scores every legal card with a nested search plus random playouts, averaged
/// over determinizations.
pub struct PlayPlanner;

impl PlayPlanner {
    /// `None` when `player` has no legal card to play.
    pub fn choose<R: Rng + ?Sized>(
        round: &RoundState,
        player: PlayerId,
        config: &DecisionConfig,
        rng: &mut R,
    ) -> Option<Decision<Card>> {
        if round.phase() != RoundPhase::Playing || round.current_player() != Some(player) {
            return None;
        }

        let legal = round.legal_cards(player);
        match legal.as_slice() {
            [] => return None,
            [only] => {
                return Some(Decision {
                    choice: *only,
                    source: DecisionSource::Forced,
                });
            }
            _ => {}
        }

        let budget = Budget::start(config.time_limit);
        let iterations = config.iterations_per_determinization / legal.len();
        let trials = (iterations / 2).min(CARD_TRIAL_CAP);
        let mut tally = CandidateTally::new(legal);
        let mut determinizations = 0usize;
        let mut total_trials = 0usize;
        let mut timed_out = false;

        'sampling: for _ in 0..config.max_determinizations {
            if !budget.within(CARD_TIME_FRACTION) {
                timed_out = true;
                break;
            }
            let sample = Determinizer::determinize(round, player, rng);
            determinizations += 1;

            for index in 0..tally.candidates().len() {
                if !budget.within(CARD_TIME_FRACTION) {
                    timed_out = true;
                    break 'sampling;
                }
                let card = tally.candidates()[index];
                let evaluation = CardEvaluation {
                    player,
                    card,
                    iterations,
                    trials,
                };
                if let Some((score, ran)) = evaluation.run(sample.state(), &budget, rng) {
                    tally.record(index, score);
                    total_trials += ran;
                }
            }
        }

        let Some((card, mean)) = tally.best() else {
            let reason = if timed_out {
                FallbackReason::TimeExhausted
            } else {
                FallbackReason::NoSamples
            };
            return fallback(round, player, tally.candidates(), reason);
        };

        event!(
            target: "wizard_bot::play",
            Level::DEBUG,
            seat = %player,
            legal_count = tally.candidates().len(),
            chosen = %card,
            win_rate = mean,
            determinizations,
            trials = total_trials,
            utilization = budget.utilization_percent(),
            reason = "search",
        );

        Some(Decision {
            choice: card,
            source: DecisionSource::Search {
                determinizations,
                trials: total_trials,
            },
        })
    }
}

struct CardEvaluation {
    player: PlayerId,
    card: Card,
    iterations: usize,
    trials: usize,
}

impl CardEvaluation {
    /// Score of playing the card in one determinization, plus the playouts
    /// actually run. A rejected play scores neutral; `None` when neither the
    /// nested search nor any playout produced a result.
    fn run<R: Rng + ?Sized>(
        &self,
        state: &RoundState,
        budget: &Budget,
        rng: &mut R,
    ) -> Option<(f64, usize)> {
        let mut after = state.clone();
        let action = Action::Play {
            card: self.card,
            player: self.player,
        };
        if after.apply(&action).is_err() {
            return Some((NEUTRAL_SCORE, 0));
        }

        let reply = Ismcts::new(self.iterations)
            .with_time_limit(budget.slice(NESTED_SEARCH_FRACTION))
            .run(&after, self.player, rng);
        event!(
            target: "wizard_bot::play",
            Level::TRACE,
            seat = %self.player,
            candidate = %self.card,
            reply = ?reply.action,
            reply_value = ?reply.value,
            iterations = reply.iterations,
        );
        let searched = reply.value.filter(|_| reply.iterations > 0);

        let wins = (0..self.trials)
            .filter(|_| {
                let mut playout = after.clone();
                let scores = random_playout(&mut playout, &mut *rng);
                is_win(&scores, self.player)
            })
            .count();
        let win_rate = (self.trials > 0).then(|| wins as f64 / self.trials as f64);

        combined_score(win_rate, searched).map(|score| (score, self.trials))
    }
}

/// Averages the playout win rate with the nested search value, the latter
/// mapped from `[-1, 1]` onto `[0, 1]`. Either part may be missing.
fn combined_score(win_rate: Option<f64>, searched: Option<f64>) -> Option<f64> {
    let searched = searched.map(|value| (value + 1.0) / 2.0);
    match (win_rate, searched) {
        (Some(rate), Some(value)) => Some((rate + value) / 2.0),
        (rate, value) => rate.or(value),
    }
}

fn fallback(
    round: &RoundState,
    player: PlayerId,
    legal: &[Card],
    reason: FallbackReason,
) -> Option<Decision<Card>> {
    let card = heuristic_card(legal, round.current_trick())?;
    event!(
        target: "wizard_bot::play",
        Level::DEBUG,
        seat = %player,
        legal_count = legal.len(),
        chosen = %card,
        reason = %reason,
        "falling back to heuristic card"
    );
    Some(Decision {
        choice: card,
        source: DecisionSource::Fallback(reason),
    })
}
