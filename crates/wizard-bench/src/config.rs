use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;
use wizard_core::model::player::{MAX_PLAYERS, MIN_PLAYERS};
use wizard_core::model::round::max_rounds;

const DEFAULT_SEAT_PERMUTATIONS: usize = 1;
const DEFAULT_LATENCY_BUDGET_MS: u64 = 2_000;

/// Tournament description loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub matches: MatchConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            source,
            path: path.clone(),
        })?;
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                source,
                path: path.clone(),
            })?;
        cfg.validate()
            .map_err(|source| ConfigError::Invalid { path, source })?;
        Ok(cfg)
    }

    /// Checks every block and fills defaults. Safe to call again after
    /// command-line overrides.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if !is_identifier(&self.run_id) {
            return Err(ValidationError::RunId(self.run_id.clone()));
        }
        validate_agents(&mut self.agents)?;
        self.matches.validate(self.agents.len())?;
        self.outputs.validate()?;
        self.metrics.validate(&self.agents)?;
        if self.logging.tracing_level.trim().is_empty() {
            self.logging.tracing_level = default_tracing_level();
        }
        Ok(())
    }

    /// One seat per configured agent.
    pub fn player_count(&self) -> usize {
        self.agents.len()
    }

    /// Output paths with `{run_id}` substituted.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        let resolve = |template: &str| PathBuf::from(template.replace("{run_id}", &self.run_id));
        ResolvedOutputs {
            jsonl: resolve(&self.outputs.jsonl),
            summary_md: resolve(&self.outputs.summary_md),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MatchConfig {
    pub seed: Option<u64>,
    pub count: usize,
    #[serde(default = "default_permutations")]
    pub permutations: usize,
    /// Stop each match after this many rounds instead of the full schedule.
    #[serde(default)]
    pub rounds: Option<u8>,
}

impl MatchConfig {
    fn validate(&self, player_count: usize) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::Zero("matches.count"));
        }
        if self.permutations == 0 {
            return Err(ValidationError::Zero("matches.permutations"));
        }
        if let Some(rounds) = self.rounds {
            let max = max_rounds(player_count);
            if rounds == 0 || rounds > max {
                return Err(ValidationError::Rounds {
                    rounds,
                    max,
                    players: player_count,
                });
            }
        }
        Ok(())
    }
}

fn default_permutations() -> usize {
    DEFAULT_SEAT_PERMUTATIONS
}

/// One seat's decision maker and its tuning.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Heuristic,
    Ismcts,
}

/// Output path templates; `{run_id}` is substituted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.jsonl.trim().is_empty() {
            return Err(ValidationError::EmptyPath("outputs.jsonl"));
        }
        if self.summary_md.trim().is_empty() {
            return Err(ValidationError::EmptyPath("outputs.summary_md"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default)]
    pub baseline: Option<String>,
    /// Average milliseconds per decision before an agent is flagged.
    #[serde(default = "default_latency_budget_ms")]
    pub latency_budget_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            baseline: None,
            latency_budget_ms: DEFAULT_LATENCY_BUDGET_MS,
        }
    }
}

impl MetricsConfig {
    fn validate(&self, agents: &[AgentConfig]) -> Result<(), ValidationError> {
        let baseline = self
            .baseline
            .as_ref()
            .ok_or(ValidationError::MissingBaseline)?;
        if !agents.iter().any(|agent| &agent.name == baseline) {
            return Err(ValidationError::UnknownBaseline(baseline.clone()));
        }
        if self.latency_budget_ms == 0 {
            return Err(ValidationError::Zero("metrics.latency_budget_ms"));
        }
        Ok(())
    }
}

fn default_latency_budget_ms() -> u64 {
    DEFAULT_LATENCY_BUDGET_MS
}

/// Structured logging is off unless enabled.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> Option<Level> {
        self.tracing_level.trim().parse().ok()
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn is_identifier(text: &str) -> bool {
    !text.trim().is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn validate_agents(agents: &mut [AgentConfig]) -> Result<(), ValidationError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&agents.len()) {
        return Err(ValidationError::SeatCount(agents.len()));
    }

    let mut seen = HashSet::new();
    for agent in agents.iter_mut() {
        if !is_identifier(&agent.name.replace('/', "_")) {
            return Err(ValidationError::AgentName(agent.name.clone()));
        }
        if !seen.insert(agent.name.clone()) {
            return Err(ValidationError::DuplicateAgent(agent.name.clone()));
        }
        if agent.params.is_null() {
            agent.params = serde_yaml::Value::Mapping(Default::default());
        }
    }
    Ok(())
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

impl ResolvedOutputs {
    /// Directory holding the summary and, when enabled, the telemetry log.
    pub fn report_dir(&self) -> PathBuf {
        self.summary_md
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("run_id {0:?} must be non-empty and use only letters, digits, '.', '_' or '-'")]
    RunId(String),
    #[error("one agent per seat is required: between {min} and {max}, found {0}", min = MIN_PLAYERS, max = MAX_PLAYERS)]
    SeatCount(usize),
    #[error("agent name {0:?} is empty or contains invalid characters")]
    AgentName(String),
    #[error("agent name '{0}' defined more than once")]
    DuplicateAgent(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("matches.rounds must be between 1 and {max} for {players} players, got {rounds}")]
    Rounds { rounds: u8, max: u8, players: usize },
    #[error("{0}: path must not be empty")]
    EmptyPath(&'static str),
    #[error("metrics.baseline must name one of the agents")]
    MissingBaseline,
    #[error("baseline agent '{0}' is not defined in agents list")]
    UnknownBaseline(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "wizard_smoke"
matches:
  seed: 123
  count: 8
agents:
  - name: "heuristic"
    kind: "heuristic"
  - name: "search"
    kind: "ismcts"
    params:
      iterations: 1000
      time_limit_ms: 250
  - name: "search_fast"
    kind: "ismcts"
    params:
      time_limit_ms: 50
outputs:
  jsonl: "bench/out/{run_id}/matches.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
metrics:
  baseline: "heuristic"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    fn validated(yaml: &str) -> Result<BenchmarkConfig, ValidationError> {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(yaml).expect("parse yaml");
        cfg.validate().map(|_| cfg)
    }

    #[test]
    fn loads_and_validates_basic_config() {
        let cfg = validated(BASIC_YAML).expect("validate");

        assert_eq!(cfg.matches.permutations, DEFAULT_SEAT_PERMUTATIONS);
        assert_eq!(cfg.matches.rounds, None);
        assert_eq!(cfg.metrics.latency_budget_ms, DEFAULT_LATENCY_BUDGET_MS);
        assert_eq!(cfg.player_count(), 3);
        assert_eq!(cfg.agents[1].kind, AgentKind::Ismcts);
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));
        assert!(cfg.agents[0].params.is_mapping());

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/wizard_smoke/matches.jsonl")
        );
        assert_eq!(outputs.report_dir(), PathBuf::from("bench/out/wizard_smoke"));
    }

    #[test]
    fn from_path_reads_yaml_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bench.yaml");
        fs::write(&path, BASIC_YAML).expect("write config");
        let cfg = BenchmarkConfig::from_path(&path).expect("load");
        assert_eq!(cfg.run_id, "wizard_smoke");

        let missing = BenchmarkConfig::from_path(dir.path().join("absent.yaml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn rejects_missing_baseline() {
        let yaml = BASIC_YAML.replace("metrics:\n  baseline: \"heuristic\"\n", "");
        assert_eq!(validated(&yaml).unwrap_err(), ValidationError::MissingBaseline);
    }

    #[test]
    fn rejects_unknown_baseline() {
        let yaml = BASIC_YAML.replace("baseline: \"heuristic\"", "baseline: \"oracle\"");
        assert_eq!(
            validated(&yaml).unwrap_err(),
            ValidationError::UnknownBaseline("oracle".into())
        );
    }

    #[test]
    fn rejects_duplicate_agents() {
        let yaml = BASIC_YAML.replace("name: \"search_fast\"", "name: \"search\"");
        assert_eq!(
            validated(&yaml).unwrap_err(),
            ValidationError::DuplicateAgent("search".into())
        );
    }

    #[test]
    fn rejects_single_agent_table() {
        let yaml = r#"
run_id: "solo"
matches:
  count: 1
agents:
  - name: "alone"
    kind: "heuristic"
outputs:
  jsonl: "out.jsonl"
  summary_md: "summary.md"
metrics:
  baseline: "alone"
"#;
        assert_eq!(validated(yaml).unwrap_err(), ValidationError::SeatCount(1));
    }

    #[test]
    fn rejects_round_cap_beyond_schedule() {
        let yaml = BASIC_YAML.replace("count: 8\n", "count: 8\n  rounds: 21\n");
        assert_eq!(
            validated(&yaml).unwrap_err(),
            ValidationError::Rounds {
                rounds: 21,
                max: 20,
                players: 3
            }
        );

        let yaml = BASIC_YAML.replace("count: 8\n", "count: 8\n  rounds: 20\n");
        validated(&yaml).expect("twenty rounds fit three players");
    }

    #[test]
    fn rejects_zero_matches() {
        let yaml = BASIC_YAML.replace("count: 8", "count: 0");
        assert_eq!(
            validated(&yaml).unwrap_err(),
            ValidationError::Zero("matches.count")
        );
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("wizard_smoke", "wizard smoke");
        assert!(matches!(
            validated(&yaml).unwrap_err(),
            ValidationError::RunId(_)
        ));
    }

    #[test]
    fn summary_in_working_directory_reports_to_dot() {
        let outputs = ResolvedOutputs {
            jsonl: PathBuf::from("rows.jsonl"),
            summary_md: PathBuf::from("summary.md"),
        };
        assert_eq!(outputs.report_dir(), PathBuf::from("."));
    }

    #[test]
    fn outputs_resolve_template_multiple_occurrences() {
        let yaml = BASIC_YAML.replace(
            "bench/out/{run_id}/summary.md",
            "bench/out/{run_id}/{run_id}/summary.md",
        );
        let cfg = validated(&yaml).expect("valid");
        assert_eq!(
            cfg.resolved_outputs().summary_md,
            PathBuf::from("bench/out/wizard_smoke/wizard_smoke/summary.md")
        );
    }
}
