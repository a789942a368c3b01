//! Policy program sources
//!
//! Every rule-driven strategy ships built-in programs. A policy file may
//! replace any of them:
//!
//! ```toml
//! [logic]
//! "entry.read" = "allow(user, user);"
//!
//! [declarative]
//! "friend.request" = "declares(friends, target, actor) || reachable(friends, actor, target)"
//! ```
//!
//! Unknown tables and unknown policy names are rejected.

use crate::policy::PolicyName;
use kith_core::{KithConfig, KithError, Result, StrategyKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN: &str = include_str!("../policies/default.toml");

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PolicyDocument {
    datalog: BTreeMap<String, String>,
    logic: BTreeMap<String, String>,
    declarative: BTreeMap<String, String>,
}

/// Program text per strategy and policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySources {
    programs: BTreeMap<(StrategyKind, PolicyName), String>,
}

impl PolicySources {
    /// The programs compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN)
    }

    /// Parse a policy document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let document: PolicyDocument = toml::from_str(source)
            .map_err(|e| KithError::invalid(format!("invalid policy document: {e}")))?;

        let mut programs = BTreeMap::new();
        for (kind, table) in [
            (StrategyKind::Datalog, document.datalog),
            (StrategyKind::Logic, document.logic),
            (StrategyKind::Declarative, document.declarative),
        ] {
            for (name, program) in table {
                let policy: PolicyName = name.parse()?;
                programs.insert((kind, policy), program);
            }
        }
        Ok(Self { programs })
    }

    /// Read and parse a policy file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KithError::invalid(format!("failed to read policy file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Built-in programs, overlaid with the configured policy file if any.
    pub fn for_config(config: &KithConfig) -> Result<Self> {
        let mut sources = Self::builtin()?;
        if let Some(path) = &config.policy_file {
            let overrides = Self::load(path)?;
            tracing::info!(
                path = %path.display(),
                programs = overrides.programs.len(),
                "policy file overrides built-in programs"
            );
            sources.overlay(overrides);
        }
        Ok(sources)
    }

    /// Replace programs with those defined in `other`.
    pub fn overlay(&mut self, other: PolicySources) {
        self.programs.extend(other.programs);
    }

    /// Program text for one strategy and policy.
    pub fn program(&self, kind: StrategyKind, policy: PolicyName) -> Option<&str> {
        self.programs.get(&(kind, policy)).map(String::as_str)
    }

    /// Set one program.
    pub fn set(&mut self, kind: StrategyKind, policy: PolicyName, program: impl Into<String>) {
        self.programs.insert((kind, policy), program.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_builtin_covers_every_rule_driven_strategy() {
        let sources = PolicySources::builtin().unwrap();
        for kind in [StrategyKind::Datalog, StrategyKind::Logic, StrategyKind::Declarative] {
            for policy in PolicyName::ALL {
                assert!(sources.program(kind, policy).is_some(), "{kind} {policy}");
            }
        }
        assert!(sources
            .program(StrategyKind::Native, PolicyName::EntryRead)
            .is_none());
    }

    #[test]
    fn test_unknown_policy_name_rejected() {
        let result = PolicySources::from_toml_str("[logic]\n\"entry.write\" = \"allow(_, _);\"");
        assert_matches!(result, Err(KithError::Invalid { .. }));
    }

    #[test]
    fn test_unknown_strategy_table_rejected() {
        let result = PolicySources::from_toml_str("[cedar]\n\"entry.read\" = \"permit;\"");
        assert_matches!(result, Err(KithError::Invalid { .. }));
    }

    #[test]
    fn test_policy_file_overlays_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[declarative]\n\"entry.read\" = \"true\"").unwrap();

        let config = KithConfig {
            policy_file: Some(file.path().to_path_buf()),
            ..KithConfig::default()
        };
        let sources = PolicySources::for_config(&config).unwrap();

        assert_eq!(
            sources.program(StrategyKind::Declarative, PolicyName::EntryRead),
            Some("true")
        );
        assert_eq!(
            sources.program(StrategyKind::Declarative, PolicyName::IdentityMatch),
            Some("presented == stored_token")
        );
    }

    #[test]
    fn test_missing_policy_file() {
        let config = KithConfig {
            policy_file: Some("/nonexistent/kith-policies.toml".into()),
            ..KithConfig::default()
        };
        assert_matches!(
            PolicySources::for_config(&config),
            Err(KithError::Invalid { .. })
        );
    }
}
