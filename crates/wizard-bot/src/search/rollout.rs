use rand::Rng;
use rand::seq::SliceRandom;
use wizard_core::game::GameView;
use wizard_core::model::player::PlayerId;

/// Upper bound on actions taken by one random playout.
pub const ROLLOUT_ACTION_CAP: usize = 100;

/// Plays uniformly random legal actions until the state is terminal, has no
/// legal action, rejects an action or the cap is hit. Returns the scores at
/// that point.
pub fn random_playout<G, R>(state: &mut G, rng: &mut R) -> Vec<i32>
where
    G: GameView,
    R: Rng + ?Sized,
{
    for _ in 0..ROLLOUT_ACTION_CAP {
        if state.is_terminal() {
            break;
        }
        let actions = state.legal_actions();
        let Some(action) = actions.choose(rng) else {
            break;
        };
        if state.apply(action).is_err() {
            break;
        }
    }
    state.final_scores()
}

/// `(score - mean) / max |score - mean|` for `player`, in `[-1, 1]`.
/// Zero when every score is equal or `player` has no score.
pub fn normalized_reward(scores: &[i32], player: PlayerId) -> f64 {
    let Some(&own) = scores.get(player.index()) else {
        return 0.0;
    };
    let mean = mean(scores);
    let spread = scores
        .iter()
        .map(|&score| (f64::from(score) - mean).abs())
        .fold(0.0_f64, f64::max);
    if spread <= f64::EPSILON {
        return 0.0;
    }
    (f64::from(own) - mean) / spread
}

/// A playout counts as a win when `player` finished at or above the mean.
pub fn is_win(scores: &[i32], player: PlayerId) -> bool {
    scores
        .get(player.index())
        .is_some_and(|&own| f64::from(own) >= mean(scores))
}

fn mean(scores: &[i32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(|&score| f64::from(score)).sum::<f64>() / scores.len() as f64
}
