//! Tournament configuration loaded from TOML

use std::path::{Path, PathBuf};

use fencing_core::Rules;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest pool the automatic plan produces
pub const MAX_POOL_SIZE: usize = 7;

/// Engine configuration. Every field has a default, so an empty file is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Touches needed to win a pool bout
    pub pool_touches: u32,
    /// Touches needed to win an elimination bout
    pub de_touches: u32,
    /// Number of ranked teams entering the bracket
    pub direct_entry_limit: usize,
    /// Fixed number of pools; derived from the entry count when absent
    pub pool_count: Option<usize>,
    /// Seed for the pool draw; a fresh draw every run when absent
    pub seed: Option<u64>,
    /// Directory for the JSON record store
    pub state_dir: Option<PathBuf>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        let rules = Rules::default();
        Self {
            pool_touches: rules.pool_touches,
            de_touches: rules.de_touches,
            direct_entry_limit: rules.direct_entry_limit,
            pool_count: None,
            seed: None,
            state_dir: None,
        }
    }
}

impl TournamentConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn rules(&self) -> Rules {
        Rules {
            pool_touches: self.pool_touches,
            de_touches: self.de_touches,
            direct_entry_limit: self.direct_entry_limit,
        }
    }

    /// Pools to draw for `entrants` teams
    pub fn pools_for(&self, entrants: usize) -> usize {
        self.pool_count
            .unwrap_or_else(|| entrants.div_ceil(MAX_POOL_SIZE))
            .max(1)
    }

    /// Random source for the pool draw
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
