mod permutations;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};
use wizard_bot::bot::{DecisionConfig, DecisionSource};
use wizard_bot::policy::{HeuristicPolicy, IsmctsPolicy, Policy, PolicyContext};
use wizard_core::game::match_state::MatchState;
use wizard_core::game::serialization::MatchLog;
use wizard_core::model::player::{MAX_PLAYERS, MIN_PLAYERS, PlayerId};
use wizard_core::model::round::RoundPhase;

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig, ResolvedOutputs};

use permutations::SeatPermutations;

pub(crate) const MAX_SEAT_PERMUTATIONS: usize = 24;

/// Primary entry point for orchestrating tournaments.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    seat_permutations: SeatPermutations,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub matches_played: usize,
    pub permutations: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub match_log_dir: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&agents.len()) {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        if config.matches.permutations > MAX_SEAT_PERMUTATIONS {
            return Err(RunnerError::PermutationLimit {
                requested: config.matches.permutations,
                max: MAX_SEAT_PERMUTATIONS,
            });
        }

        let seat_permutations = SeatPermutations::new(agents.len(), config.matches.permutations);

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
            seat_permutations,
        })
    }

    /// Execute the tournament, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let permutations = self.seat_permutations.as_slice();
        let mut rng = StdRng::seed_from_u64(self.config.matches.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;
        let match_log_dir = self.outputs.report_dir().join("matches");
        fs::create_dir_all(&match_log_dir)?;

        for match_index in 0..self.config.matches.count {
            let base_seed = rng.next_u64();

            for (perm_index, perm) in permutations.iter().enumerate() {
                let match_id = match_id(match_index, perm_index);
                let outcome = self.play_match(match_index, perm_index, base_seed, perm)?;
                analytics.record_match(&match_id, &outcome)?;
                write_match_log(&match_log_dir, &match_id, &outcome.log)?;
                rows_written += write_match_rows(
                    &mut writer,
                    &self.config,
                    &match_id,
                    match_index,
                    perm_index,
                    base_seed,
                    &outcome,
                )?;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.report_dir().join("telemetry.jsonl"));

        Ok(RunSummary {
            matches_played: self.config.matches.count,
            permutations: permutations.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            match_log_dir,
            telemetry_path,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn match_id(match_index: usize, permutation_index: usize) -> String {
    format!("M{match_index:05}_P{permutation_index:02}")
}

/// One pretty-printed `MatchLog` per match, named after the match id.
fn write_match_log(dir: &Path, match_id: &str, log: &MatchLog) -> Result<(), RunnerError> {
    fs::write(dir.join(format!("{match_id}.json")), log.to_json()?)?;
    Ok(())
}

fn write_match_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    match_id: &str,
    match_index: usize,
    permutation_index: usize,
    base_seed: u64,
    outcome: &MatchOutcome,
) -> Result<usize, RunnerError> {
    let mut rows_written = 0usize;
    for seat_result in &outcome.seat_results {
        let row = MatchLogRow {
            run_id: config.run_id.clone(),
            match_id: match_id.to_string(),
            match_index,
            permutation_index,
            match_seed: base_seed,
            seat: seat_result.seat.index(),
            bot: seat_result.agent_name.clone(),
            seating: outcome.seating.clone(),
            rounds_played: outcome.rounds_played,
            final_score: seat_result.final_score,
            rank: seat_result.rank,
            round_scores: seat_result.round_scores.clone(),
            exact_bids: seat_result.exact_bids,
            fallbacks: seat_result.metrics.fallbacks,
            speed_ms_decision: seat_result.metrics.avg_ms_per_decision,
            decisions: seat_result.metrics.decisions,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

impl TournamentRunner {
    fn play_match(
        &self,
        match_index: usize,
        permutation_index: usize,
        base_seed: u64,
        permutation: &[usize],
    ) -> Result<MatchOutcome, RunnerError> {
        let mut match_state = MatchState::with_seed(self.agents.len(), base_seed)
            .map_err(|err| RunnerError::game(format!("dealing failed: {err}")))?;
        let mut seats = build_seat_states(permutation, &self.agents, base_seed)?;
        let round_cap = self
            .config
            .matches
            .rounds
            .unwrap_or_else(|| match_state.max_rounds());

        loop {
            if match_state.is_round_ready_for_scoring() {
                let record = match_state
                    .finish_round_and_start_next()
                    .map_err(|err| RunnerError::game(format!("dealing failed: {err}")))?;
                if let Some(record) = record.filter(|_| self.logging_enabled) {
                    event!(
                        target: "wizard_bench::round",
                        Level::INFO,
                        run_id = %self.config.run_id,
                        match_index = match_index as u32,
                        permutation_index = permutation_index as u32,
                        round = record.round,
                        bids = ?record.bids,
                        won = ?record.won,
                        scores = ?record.scores,
                    );
                }
                if match_state.is_over() || match_state.history().len() >= usize::from(round_cap)
                {
                    break;
                }
                continue;
            }

            let round = match_state.round();
            let phase = round.phase();
            let round_number = round.round_number();
            let actor = round
                .current_player()
                .ok_or_else(|| RunnerError::game("round stalled with no seat to act".into()))?;
            let seat_state = &mut seats[actor.index()];
            let ctx = PolicyContext::new(actor, round);

            match phase {
                RoundPhase::Bidding => {
                    let start = Instant::now();
                    let bid = seat_state.policy.choose_bid(&ctx).ok_or_else(|| {
                        RunnerError::game(format!("{} declined to bid", seat_state.agent_name))
                    })?;
                    let source = seat_state.policy.last_source();
                    let elapsed_ms = seat_state.metrics.record(start.elapsed(), source);

                    if self.logging_enabled && tracing::enabled!(Level::INFO) {
                        event!(
                            target: "wizard_bench::bid",
                            Level::INFO,
                            run_id = %self.config.run_id,
                            match_index = match_index as u32,
                            permutation_index = permutation_index as u32,
                            round = round_number,
                            seat = actor.index() as u32,
                            bid,
                            source = ?source,
                            elapsed_ms
                        );
                    }

                    match_state
                        .round_mut()
                        .process_bid(bid)
                        .map_err(|err| RunnerError::game(format!("invalid bid {bid}: {err}")))?;
                }
                RoundPhase::Playing => {
                    let start = Instant::now();
                    let card = seat_state.policy.choose_play(&ctx).ok_or_else(|| {
                        RunnerError::game(format!("{} declined to play", seat_state.agent_name))
                    })?;
                    let source = seat_state.policy.last_source();
                    let elapsed_ms = seat_state.metrics.record(start.elapsed(), source);

                    if self.logging_enabled && tracing::enabled!(Level::INFO) {
                        event!(
                            target: "wizard_bench::play",
                            Level::INFO,
                            run_id = %self.config.run_id,
                            match_index = match_index as u32,
                            permutation_index = permutation_index as u32,
                            round = round_number,
                            seat = actor.index() as u32,
                            card = %card,
                            source = ?source,
                            elapsed_ms
                        );
                    }

                    if let Err(err) = match_state.round_mut().play_card(actor, card) {
                        return Err(RunnerError::game(format!(
                            "invalid card play: {err} (seat: {actor}, card: {card})"
                        )));
                    }
                }
                RoundPhase::Complete => {
                    return Err(RunnerError::game(
                        "completed round was not scored".to_string(),
                    ));
                }
            }
        }

        let log = match_state.to_log();
        let final_scores = &log.final_scores;
        let history = &log.rounds;
        let seating = seats
            .iter()
            .map(|seat| SeatSnapshot {
                seat: seat.seat.index(),
                bot: seat.agent_name.clone(),
            })
            .collect();

        let rounds_played = history.len() as u32;
        let mut seat_results = Vec::with_capacity(seats.len());
        for seat in seats {
            let index = seat.seat.index();
            let final_score = final_scores[index];
            seat_results.push(SeatResult {
                agent_name: seat.agent_name,
                seat: seat.seat,
                final_score,
                rank: rank_of(final_score, final_scores),
                round_scores: history.iter().map(|record| record.scores[index]).collect(),
                exact_bids: history
                    .iter()
                    .filter(|record| record.bids[index] == record.won[index])
                    .count() as u32,
                metrics: seat.metrics.finalize(),
            });
        }

        Ok(MatchOutcome {
            seating,
            seat_results,
            rounds_played,
            log,
        })
    }
}

/// 1 for the top score; tied seats share a rank.
fn rank_of(score: i32, all: &[i32]) -> u32 {
    1 + all.iter().filter(|&&other| other > score).count() as u32
}

/// Each seat gets its own policy stream so a seat's choices do not depend
/// on how many random draws its neighbours made.
fn policy_seed(base_seed: u64, seat: usize) -> u64 {
    base_seed ^ (seat as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn build_seat_states(
    permutation: &[usize],
    agents: &[AgentBlueprint],
    base_seed: u64,
) -> Result<Vec<SeatState>, RunnerError> {
    let mut seats = Vec::with_capacity(permutation.len());
    for (seat_idx, agent_idx) in permutation.iter().enumerate() {
        let seat = PlayerId::from_index(seat_idx).ok_or_else(|| {
            RunnerError::game(format!("invalid seat index generated: {seat_idx}"))
        })?;
        let agent = agents
            .get(*agent_idx)
            .ok_or(RunnerError::InvalidPermutation {
                index: seat_idx,
                agent_index: *agent_idx,
            })?;
        seats.push(SeatState::new(seat, agent, policy_seed(base_seed, seat_idx)));
    }
    Ok(seats)
}

struct SeatState {
    seat: PlayerId,
    agent_name: String,
    policy: Box<dyn Policy>,
    metrics: DecisionMetrics,
}

impl SeatState {
    fn new(seat: PlayerId, agent: &AgentBlueprint, seed: u64) -> Self {
        Self {
            seat,
            agent_name: agent.name.clone(),
            policy: agent.spawn_policy(seed),
            metrics: DecisionMetrics::default(),
        }
    }
}

pub struct MatchOutcome {
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
    pub rounds_played: u32,
    pub log: MatchLog,
}

#[derive(Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: usize,
    pub bot: String,
}

pub struct SeatResult {
    pub agent_name: String,
    pub seat: PlayerId,
    pub final_score: i32,
    pub rank: u32,
    pub round_scores: Vec<i32>,
    pub exact_bids: u32,
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
    fallbacks: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration, source: Option<DecisionSource>) -> f64 {
        self.total += duration;
        self.decisions += 1;
        if matches!(source, Some(DecisionSource::Fallback(_))) {
            self.fallbacks += 1;
        }
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            fallbacks: self.fallbacks,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub fallbacks: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct MatchLogRow {
    run_id: String,
    match_id: String,
    match_index: usize,
    permutation_index: usize,
    match_seed: u64,
    seat: usize,
    bot: String,
    seating: Vec<SeatSnapshot>,
    rounds_played: u32,
    final_score: i32,
    rank: u32,
    round_scores: Vec<i32>,
    exact_bids: u32,
    fallbacks: u32,
    speed_ms_decision: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("configuration requires {min} to {max} agents but found {found}", min = MIN_PLAYERS, max = MAX_PLAYERS)]
    SeatCount { found: usize },
    #[error("requested {requested} seat permutations exceeds maximum of {max}")]
    PermutationLimit { requested: usize, max: usize },
    #[error("permutation index {index} references invalid agent index {agent_index}")]
    InvalidPermutation { index: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid heuristic parameter for agent '{name}': {message}")]
    InvalidHeuristicParam { name: String, message: String },
    #[error("invalid ismcts parameter for agent '{name}': {message}")]
    InvalidIsmctsParam { name: String, message: String },
}

struct AgentBlueprint {
    name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Heuristic,
    Ismcts(IsmctsOptions),
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Heuristic => {
                if !config.params.is_null() && !config.params.is_mapping() {
                    return Err(AgentError::InvalidHeuristicParam {
                        name: config.name.clone(),
                        message: "expected mapping for heuristic params".to_string(),
                    });
                }
                AgentImplementation::Heuristic
            }
            AgentKind::Ismcts => {
                let options = IsmctsOptions::from_params(&config.name, &config.params)?;
                AgentImplementation::Ismcts(options)
            }
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    fn spawn_policy(&self, seed: u64) -> Box<dyn Policy> {
        match &self.implementation {
            AgentImplementation::Heuristic => Box::new(HeuristicPolicy::new(seed)),
            AgentImplementation::Ismcts(opts) => Box::new(IsmctsPolicy::new(opts.config, seed)),
        }
    }
}

struct IsmctsOptions {
    config: DecisionConfig,
}

impl IsmctsOptions {
    fn from_params(name: &str, params: &serde_yaml::Value) -> Result<Self, AgentError> {
        let mut config = DecisionConfig::default();
        if params.is_null() {
            return Ok(Self { config });
        }

        let mapping = params
            .as_mapping()
            .ok_or_else(|| AgentError::InvalidIsmctsParam {
                name: name.to_string(),
                message: "expected mapping for ismcts params".to_string(),
            })?;

        let positive = |key: &str, value: &serde_yaml::Value| -> Result<u64, AgentError> {
            value
                .as_u64()
                .filter(|v| *v > 0)
                .ok_or_else(|| AgentError::InvalidIsmctsParam {
                    name: name.to_string(),
                    message: format!("{key} must be a positive integer"),
                })
        };

        for (key, value) in mapping {
            match key.as_str() {
                Some("iterations") => {
                    config.iteration_budget = value.as_u64().ok_or_else(|| {
                        AgentError::InvalidIsmctsParam {
                            name: name.to_string(),
                            message: "iterations must be a non-negative integer".to_string(),
                        }
                    })? as usize;
                }
                Some("time_limit_ms") => {
                    config.time_limit =
                        Duration::from_millis(positive("time_limit_ms", value)?);
                }
                Some("determinizations") => {
                    config.max_determinizations = positive("determinizations", value)? as usize;
                }
                Some("iterations_per_determinization") => {
                    config.iterations_per_determinization =
                        positive("iterations_per_determinization", value)? as usize;
                }
                _ => {}
            }
        }

        Ok(Self { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter::FromIterator;

    fn params(entries: &[(&str, serde_yaml::Value)]) -> serde_yaml::Value {
        serde_yaml::Value::Mapping(serde_yaml::Mapping::from_iter(entries.iter().map(
            |(key, value)| (serde_yaml::Value::String((*key).into()), value.clone()),
        )))
    }

    fn two_seat_config(rounds: Option<u8>) -> BenchmarkConfig {
        let mut yaml = String::from(
            r#"
run_id: "unit"
matches:
  seed: 5
  count: 1
agents:
  - name: "a"
    kind: "heuristic"
  - name: "b"
    kind: "heuristic"
outputs:
  jsonl: "unused.jsonl"
  summary_md: "unused.md"
metrics:
  baseline: "a"
"#,
        );
        if let Some(rounds) = rounds {
            yaml = yaml.replace("count: 1\n", &format!("count: 1\n  rounds: {rounds}\n"));
        }
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
        cfg.validate().expect("config validates");
        cfg
    }

    #[test]
    fn ismcts_params_default_when_absent() {
        let options = IsmctsOptions::from_params("bot", &serde_yaml::Value::Null).unwrap();
        assert_eq!(options.config, DecisionConfig::default());
    }

    #[test]
    fn ismcts_params_override_the_budget() {
        let value = params(&[
            ("iterations", 400u64.into()),
            ("time_limit_ms", 150u64.into()),
            ("determinizations", 12u64.into()),
            ("iterations_per_determinization", 30u64.into()),
        ]);
        let options = IsmctsOptions::from_params("bot", &value).unwrap();
        assert_eq!(options.config.iteration_budget, 400);
        assert_eq!(options.config.time_limit, Duration::from_millis(150));
        assert_eq!(options.config.max_determinizations, 12);
        assert_eq!(options.config.iterations_per_determinization, 30);
    }

    #[test]
    fn ismcts_params_reject_zero_time_limit() {
        let value = params(&[("time_limit_ms", 0u64.into())]);
        assert!(matches!(
            IsmctsOptions::from_params("bot", &value),
            Err(AgentError::InvalidIsmctsParam { .. })
        ));
    }

    #[test]
    fn heuristic_params_must_be_a_mapping() {
        let config = AgentConfig {
            name: "bot".into(),
            kind: AgentKind::Heuristic,
            params: serde_yaml::Value::String("fast".into()),
        };
        assert!(AgentBlueprint::from_config(&config).is_err());
    }

    #[test]
    fn tied_scores_share_a_rank() {
        let scores = [40, 10, 40, -20];
        assert_eq!(rank_of(40, &scores), 1);
        assert_eq!(rank_of(10, &scores), 3);
        assert_eq!(rank_of(-20, &scores), 4);
    }

    #[test]
    fn policy_seeds_differ_per_seat() {
        assert_ne!(policy_seed(7, 0), policy_seed(7, 1));
        assert_eq!(policy_seed(7, 2), policy_seed(7, 2));
    }

    #[test]
    fn match_stops_at_the_round_cap() {
        let config = two_seat_config(Some(3));
        let outputs = config.resolved_outputs();
        let runner = TournamentRunner::new(config, outputs).unwrap();
        let outcome = runner.play_match(0, 0, 99, &[0, 1]).unwrap();

        assert_eq!(outcome.rounds_played, 3);
        for seat in &outcome.seat_results {
            assert_eq!(seat.round_scores.len(), 3);
            assert_eq!(seat.round_scores.iter().sum::<i32>(), seat.final_score);
            // one bid and one card per card dealt: 1 + 2 + 3 cards
            assert_eq!(seat.metrics.decisions, 3 + 6);
            assert_eq!(seat.metrics.fallbacks, 0);
        }
    }

    #[test]
    fn full_match_plays_every_round() {
        let config = two_seat_config(None);
        let outputs = config.resolved_outputs();
        let runner = TournamentRunner::new(config, outputs).unwrap();
        let outcome = runner.play_match(0, 1, 3, &[1, 0]).unwrap();

        assert_eq!(outcome.rounds_played, 30);
        assert_eq!(outcome.seat_results[0].agent_name, "b");
        assert_eq!(outcome.seating[1].bot, "a");
    }
}
