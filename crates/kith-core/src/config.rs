//! Configuration for the kith decision core
//!
//! Loaded from a `.toml` or `.json` file, merged with `KITH_*` environment
//! overrides, then validated.

use crate::errors::{KithError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "KITH_";

/// Which evaluation strategy answers policy questions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Ordinary Rust code
    #[default]
    Native,
    /// Forward-chaining Datalog rules
    Datalog,
    /// Backward-chaining goal proving over Horn clauses
    Logic,
    /// Boolean expressions in a declarative policy document
    Declarative,
}

impl StrategyKind {
    /// Every strategy, in a stable order.
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Native,
        StrategyKind::Datalog,
        StrategyKind::Logic,
        StrategyKind::Declarative,
    ];

    /// Lowercase label used in config files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Datalog => "datalog",
            Self::Logic => "logic",
            Self::Declarative => "declarative",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = KithError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "datalog" => Ok(Self::Datalog),
            "logic" => Ok(Self::Logic),
            "declarative" => Ok(Self::Declarative),
            other => Err(KithError::invalid(format!(
                "unknown strategy '{other}' (expected native, datalog, logic or declarative)"
            ))),
        }
    }
}

/// Run limits handed to the Datalog engine.
///
/// `max_facts` and `max_iterations` are floors: each evaluation raises them
/// to what its own fact count needs, so growing the graph never turns an
/// allow into an engine error. `max_time_ms` is an operator safety net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatalogLimits {
    /// Maximum number of facts the world may hold
    pub max_facts: u64,
    /// Maximum number of rule application rounds
    pub max_iterations: u64,
    /// Wall-clock ceiling per evaluation, in milliseconds
    pub max_time_ms: u64,
}

impl Default for DatalogLimits {
    fn default() -> Self {
        Self {
            max_facts: 10_000,
            max_iterations: 1_000,
            max_time_ms: 60_000,
        }
    }
}

/// Limits for the goal-proving strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicLimits {
    /// Resolution steps allowed per fact and clause before the proof is
    /// abandoned as an error
    pub steps_per_fact: u64,
}

impl Default for LogicLimits {
    fn default() -> Self {
        Self { steps_per_fact: 256 }
    }
}

/// Friend request side-effect behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FriendRequestConfig {
    /// Skip appending a requester already pending on the target
    pub deduplicate: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KithConfig {
    /// Evaluation strategy for every policy
    pub strategy: StrategyKind,
    /// Optional TOML file overriding the strategy's policy sources
    pub policy_file: Option<PathBuf>,
    /// Datalog engine limits
    pub datalog: DatalogLimits,
    /// Logic prover limits
    pub logic: LogicLimits,
    /// Friend request behavior
    pub friend_requests: FriendRequestConfig,
}

impl KithConfig {
    /// Load configuration from a file, choosing the format by extension.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KithError::invalid(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| KithError::invalid(format!("invalid TOML: {e}"))),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| KithError::invalid(format!("invalid JSON: {e}"))),
            _ => Err(KithError::invalid(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Load from `path` if given, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Merge `KITH_*` environment variables over the current values.
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.apply_overrides(std::env::vars())
    }

    /// Apply `KITH_*` style key/value overrides. Unrelated keys are ignored.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(key) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match key {
                "STRATEGY" => self.strategy = value.parse()?,
                "POLICY_FILE" => self.policy_file = Some(PathBuf::from(value)),
                "FRIEND_REQUESTS_DEDUPLICATE" => {
                    self.friend_requests.deduplicate = parse_value(key, value)?;
                }
                "DATALOG_MAX_FACTS" => self.datalog.max_facts = parse_value(key, value)?,
                "DATALOG_MAX_ITERATIONS" => {
                    self.datalog.max_iterations = parse_value(key, value)?;
                }
                "DATALOG_MAX_TIME_MS" => self.datalog.max_time_ms = parse_value(key, value)?,
                "LOGIC_STEPS_PER_FACT" => {
                    self.logic.steps_per_fact = parse_value(key, value)?;
                }
                _ => {
                    tracing::debug!(key = %key, "ignoring unknown {ENV_PREFIX} override");
                }
            }
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.datalog.max_facts == 0
            || self.datalog.max_iterations == 0
            || self.datalog.max_time_ms == 0
        {
            return Err(KithError::invalid("datalog limits must be non-zero"));
        }
        if self.logic.steps_per_fact == 0 {
            return Err(KithError::invalid("logic.steps_per_fact must be non-zero"));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| KithError::invalid(format!("invalid value for {ENV_PREFIX}{key}: '{value}'")))
}
