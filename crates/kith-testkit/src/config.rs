//! Configurations for exercising each strategy

use kith_core::{KithConfig, StrategyKind};
use std::io::Write;
use tempfile::NamedTempFile;

/// Default configuration with `kind` selected.
pub fn config_for(kind: StrategyKind) -> KithConfig {
    KithConfig {
        strategy: kind,
        ..KithConfig::default()
    }
}

/// One configuration per strategy.
pub fn all_strategy_configs() -> Vec<KithConfig> {
    StrategyKind::ALL.into_iter().map(config_for).collect()
}

/// A policy file on disk, removed when dropped.
pub fn policy_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create policy file");
    file.write_all(contents.as_bytes()).expect("write policy file");
    file
}

/// A configuration file on disk, removed when dropped.
pub fn config_file(config: &KithConfig) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create config file");
    let rendered = toml::to_string(config).expect("render config");
    file.write_all(rendered.as_bytes()).expect("write config file");
    file
}
