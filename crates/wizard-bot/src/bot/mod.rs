mod bid;
mod play;

pub use bid::BidPlanner;
pub use play::PlayPlanner;

use std::fmt;
use std::time::Duration;

/// Below this iteration budget bids come from the heuristic.
pub const MIN_SEARCH_ITERATIONS: usize = 100;
/// Fraction of the time limit the bid loop may use.
pub const BID_TIME_FRACTION: f64 = 0.8;
/// Fraction of the time limit the card loop may use.
pub const CARD_TIME_FRACTION: f64 = 0.9;
/// Share of the remaining time given to each nested card search.
pub const NESTED_SEARCH_FRACTION: f64 = 0.1;
pub const BID_TRIAL_CAP: usize = 50;
pub const CARD_TRIAL_CAP: usize = 25;
/// Score for a candidate whose action was rejected.
pub const NEUTRAL_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionConfig {
    pub iteration_budget: usize,
    pub time_limit: Duration,
    /// Upper bound only; the clock normally stops sampling first.
    pub max_determinizations: usize,
    pub iterations_per_determinization: usize,
}

impl DecisionConfig {
    pub const fn new(iteration_budget: usize, time_limit: Duration) -> Self {
        Self {
            iteration_budget,
            time_limit,
            max_determinizations: 1000,
            iterations_per_determinization: 100,
        }
    }

    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn with_max_determinizations(mut self, count: usize) -> Self {
        self.max_determinizations = count;
        self
    }

    pub fn with_iterations_per_determinization(mut self, iterations: usize) -> Self {
        self.iterations_per_determinization = iterations;
        self
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let iteration_budget = read("WIZ_ITERATIONS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(defaults.iteration_budget);

        let time_limit = read("WIZ_TIME_LIMIT_MS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.time_limit);

        let max_determinizations = read("WIZ_DETERMINIZATIONS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|count| *count > 0)
            .unwrap_or(defaults.max_determinizations);

        Self {
            iteration_budget,
            time_limit,
            max_determinizations,
            ..defaults
        }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(2))
    }
}

/// A chosen action together with how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision<T> {
    pub choice: T,
    pub source: DecisionSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    /// Only one legal action; no search ran.
    Forced,
    Search {
        determinizations: usize,
        trials: usize,
    },
    Fallback(FallbackReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    TrivialBidRange,
    BudgetTooSmall,
    TimeExhausted,
    NoSamples,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FallbackReason::TrivialBidRange => "at most two legal bids",
            FallbackReason::BudgetTooSmall => "iteration budget below search minimum",
            FallbackReason::TimeExhausted => "time limit reached before any sample",
            FallbackReason::NoSamples => "no candidate was evaluated",
        };
        f.write_str(label)
    }
}

/// Running win-rate totals per candidate, in candidate order.
#[derive(Debug)]
pub(crate) struct CandidateTally<T> {
    candidates: Vec<T>,
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl<T: Copy> CandidateTally<T> {
    pub(crate) fn new(candidates: Vec<T>) -> Self {
        let len = candidates.len();
        Self {
            candidates,
            sums: vec![0.0; len],
            counts: vec![0; len],
        }
    }

    pub(crate) fn candidates(&self) -> &[T] {
        &self.candidates
    }

    pub(crate) fn record(&mut self, index: usize, score: f64) {
        self.sums[index] += score;
        self.counts[index] += 1;
    }

    pub(crate) fn mean(&self, index: usize) -> Option<f64> {
        (self.counts[index] > 0).then(|| self.sums[index] / self.counts[index] as f64)
    }

    /// Highest mean among evaluated candidates; ties keep the earliest.
    pub(crate) fn best(&self) -> Option<(T, f64)> {
        let mut best: Option<(T, f64)> = None;
        for (index, &candidate) in self.candidates.iter().enumerate() {
            let Some(mean) = self.mean(index) else {
                continue;
            };
            match best {
                Some((_, best_mean)) if mean <= best_mean => {}
                _ => best = Some((candidate, mean)),
            }
        }
        best
    }
}
