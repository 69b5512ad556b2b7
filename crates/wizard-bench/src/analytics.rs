use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig};
use crate::tournament::{DecisionSummary, MatchOutcome};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in tournament results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("baseline '{0}' missing for match {1}")]
    MissingBaselineMatch(String, String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    comparisons: HashMap<String, Vec<f64>>,
    agent_order: Vec<String>,
    latency_budget_ms: u64,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.clone(), config.metrics.latency_budget_ms),
            );
            order.push(agent.name.clone());
        }

        Ok(Self {
            baseline,
            agents,
            comparisons: HashMap::new(),
            agent_order: order,
            latency_budget_ms: config.metrics.latency_budget_ms,
        })
    }

    pub fn record_match(
        &mut self,
        match_id: &str,
        outcome: &MatchOutcome,
    ) -> Result<(), AnalyticsError> {
        let top_score = outcome
            .seat_results
            .iter()
            .map(|seat| seat.final_score)
            .max()
            .unwrap_or(0);

        let baseline_score = outcome
            .seat_results
            .iter()
            .find(|seat| seat.agent_name == self.baseline)
            .map(|seat| f64::from(seat.final_score))
            .ok_or_else(|| {
                AnalyticsError::MissingBaselineMatch(self.baseline.clone(), match_id.to_string())
            })?;

        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;
            acc.record_match(
                f64::from(seat.final_score),
                seat.final_score == top_score,
                seat.exact_bids,
                outcome.rounds_played,
                &seat.metrics,
            );

            if seat.agent_name != self.baseline {
                self.comparisons
                    .entry(seat.agent_name.clone())
                    .or_default()
                    .push(f64::from(seat.final_score) - baseline_score);
            }
        }

        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let mut reports = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                reports.push(acc.into_report());
            }
        }

        let comparisons = reports
            .iter()
            .map(|report| {
                let (p_value, sample_size) = if report.name == self.baseline {
                    (1.0, report.matches)
                } else {
                    self.comparisons
                        .remove(&report.name)
                        .map(wilcoxon_signed_rank)
                        .unwrap_or((1.0, 0))
                };
                ComparisonReport {
                    agent: report.name.clone(),
                    p_value,
                    sample_size,
                }
            })
            .collect();

        AnalyticsSummary {
            baseline: self.baseline,
            agents: reports,
            comparisons,
            latency_budget_ms: self.latency_budget_ms,
        }
        .enrich()
    }
}

struct AgentAccumulator {
    config: AgentConfig,
    matches: u32,
    wins: u32,
    final_scores: Vec<f64>,
    exact_bids: u32,
    rounds: u32,
    total_latency_ms: f64,
    total_decisions: u64,
    fallbacks: u64,
    latency_budget_ms: u64,
}

impl AgentAccumulator {
    fn new(config: AgentConfig, latency_budget_ms: u64) -> Self {
        Self {
            config,
            matches: 0,
            wins: 0,
            final_scores: Vec::new(),
            exact_bids: 0,
            rounds: 0,
            total_latency_ms: 0.0,
            total_decisions: 0,
            fallbacks: 0,
            latency_budget_ms,
        }
    }

    fn record_match(
        &mut self,
        final_score: f64,
        is_winner: bool,
        exact_bids: u32,
        rounds: u32,
        metrics: &DecisionSummary,
    ) {
        self.matches += 1;
        self.final_scores.push(final_score);
        if is_winner {
            self.wins += 1;
        }
        self.exact_bids += exact_bids;
        self.rounds += rounds;
        self.total_latency_ms += metrics.total_ms;
        self.total_decisions += u64::from(metrics.decisions);
        self.fallbacks += u64::from(metrics.fallbacks);
    }

    fn into_report(self) -> AgentReport {
        let avg_score = mean(&self.final_scores);
        let ci95 = confidence_interval(&self.final_scores);
        let ratio = |num: f64, den: f64| if den == 0.0 { 0.0 } else { num / den };
        let avg_latency = ratio(self.total_latency_ms, self.total_decisions as f64);

        AgentReport {
            name: self.config.name,
            kind: self.config.kind,
            params: self.config.params,
            matches: self.matches as usize,
            avg_score,
            ci95,
            wins: self.wins as usize,
            exact_bid_rate: ratio(f64::from(self.exact_bids), f64::from(self.rounds)),
            fallback_rate: ratio(self.fallbacks as f64, self.total_decisions as f64),
            average_ms_per_decision: avg_latency,
            delta_vs_baseline: 0.0,
            over_budget: avg_latency > self.latency_budget_ms as f64,
        }
    }
}

fn wilcoxon_signed_rank(diffs: Vec<f64>) -> (f64, usize) {
    let mut paired: Vec<(f64, f64)> = diffs
        .into_iter()
        .filter(|d| d.abs() > f64::EPSILON)
        .map(|d| (d.abs(), d.signum()))
        .collect();
    let n = paired.len();
    if n == 0 {
        return (1.0, 0);
    }
    paired.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut w_plus = 0.0;
    let mut w_minus = 0.0;
    let mut tie_adjustment = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && (paired[j + 1].0 - paired[i].0).abs() < 1e-12 {
            j += 1;
        }
        let rank = (i + j + 2) as f64 / 2.0;
        for &(_, sign) in &paired[i..=j] {
            if sign > 0.0 {
                w_plus += rank;
            } else {
                w_minus += rank;
            }
        }
        let ties = (j - i + 1) as f64;
        if ties > 1.0 {
            tie_adjustment += (ties.powi(3) - ties) / 48.0;
        }
        i = j + 1;
    }

    let w = f64::min(w_plus, w_minus);
    let n_f = n as f64;
    let mean_w = n_f * (n_f + 1.0) / 4.0;
    let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
    if variance_w <= 0.0 {
        return (1.0, n);
    }

    let z = ((w - mean_w).abs() - 0.5) / variance_w.sqrt();
    let Ok(normal) = Normal::new(0.0, 1.0) else {
        return (1.0, n);
    };
    let p = 2.0 * (1.0 - normal.cdf(z));
    (p.clamp(0.0, 1.0), n)
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
    pub latency_budget_ms: u64,
}

impl AnalyticsSummary {
    pub fn enrich(mut self) -> Self {
        let baseline_avg = self
            .agents
            .iter()
            .find(|agent| agent.name == self.baseline)
            .map(|agent| agent.avg_score)
            .unwrap_or(0.0);

        for agent in &mut self.agents {
            agent.delta_vs_baseline = agent.avg_score - baseline_avg;
        }

        self
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Tournament Summary\n\n");
        rows.push_str(&format!(
            "Latency budget: {} ms average per decision\n\n",
            self.latency_budget_ms
        ));
        rows.push_str("| Agent | Kind | Matches | Avg score | Δ vs baseline | 95% CI | Win % | Exact bids % | Fallback % | Avg ms/decision | Over Budget | p-value |\n");
        rows.push_str("|-------|------|---------|-----------|----------------|--------|-------|--------------|------------|------------------|-------------|---------|\n");

        for agent in &self.agents {
            let p_value = self
                .comparisons
                .iter()
                .find(|c| c.agent == agent.name)
                .map(|c| c.p_value)
                .unwrap_or(1.0);
            let win_rate = if agent.matches == 0 {
                0.0
            } else {
                agent.wins as f64 / agent.matches as f64
            };

            rows.push_str(&format!(
                "| {name} | {kind:?} | {matches} | {avg:.1} | {delta:+.1} | [{ci_low:.1}, {ci_high:.1}] | {win:.1}% | {exact:.1}% | {fallback:.1}% | {latency:.2} | {over_budget} | {pval:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                matches = agent.matches,
                avg = agent.avg_score,
                delta = agent.delta_vs_baseline,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                win = win_rate * 100.0,
                exact = agent.exact_bid_rate * 100.0,
                fallback = agent.fallback_rate * 100.0,
                latency = agent.average_ms_per_decision,
                over_budget = if agent.over_budget { "Yes" } else { "No" },
                pval = p_value,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub params: serde_yaml::Value,
    pub matches: usize,
    pub avg_score: f64,
    pub ci95: (f64, f64),
    pub wins: usize,
    pub exact_bid_rate: f64,
    pub fallback_rate: f64,
    pub average_ms_per_decision: f64,
    #[serde(skip)]
    pub delta_vs_baseline: f64,
    #[serde(skip)]
    pub over_budget: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    pub sample_size: usize,
}

fn mean(points: &[f64]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().sum::<f64>() / points.len() as f64
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    let mean = mean(points);
    if points.len() < 2 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}
