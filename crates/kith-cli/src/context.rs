//! Store, configuration and service assembled from command-line flags

use anyhow::{Context as _, Result};
use kith_authorization::AuthorizationService;
use kith_core::{KithConfig, StrategyKind};
use kith_store::{MemoryStore, Seed};
use std::path::Path;
use std::sync::Arc;

/// Seed used when no `--seed` is given.
pub const REFERENCE_SEED: &str = include_str!("../fixtures/reference.toml");

/// Everything a command needs.
#[derive(Debug)]
pub struct CliContext {
    /// Effective configuration
    pub config: KithConfig,
    /// Store seeded at startup
    pub store: Arc<MemoryStore>,
    /// Decisions under the configured strategy
    pub service: AuthorizationService,
}

impl CliContext {
    /// Load configuration and seed, then build the service.
    ///
    /// `strategy` overrides both the config file and `KITH_STRATEGY`.
    pub fn load(
        config_path: Option<&Path>,
        seed_path: Option<&Path>,
        strategy: Option<StrategyKind>,
    ) -> Result<Self> {
        let mut config = KithConfig::load(config_path).context("loading configuration")?;
        if let Some(kind) = strategy {
            config.strategy = kind;
        }

        let seed = match seed_path {
            Some(path) => Seed::load(path)?,
            None => Seed::from_toml_str(REFERENCE_SEED)?,
        };
        Self::from_parts(config, &seed)
    }

    /// Build from an already loaded configuration and seed.
    pub fn from_parts(config: KithConfig, seed: &Seed) -> Result<Self> {
        let store = Arc::new(MemoryStore::from_seed(seed).context("provisioning store")?);
        let service = AuthorizationService::new(store.clone(), &config)
            .with_context(|| format!("building {} strategy", config.strategy))?;
        Ok(Self {
            config,
            store,
            service,
        })
    }
}

#[cfg(test)]
impl CliContext {
    /// Default configuration over the bundled seed, without reading `KITH_*`.
    pub(crate) fn reference() -> Self {
        let seed = Seed::from_toml_str(REFERENCE_SEED).unwrap();
        Self::from_parts(KithConfig::default(), &seed).unwrap()
    }
}
