//! Fit configuration.
//!
//! A [`Config`] describes how many chains to run and how each chain is tuned
//! and sampled. Builder setters panic on out-of-range values; configurations
//! read from JSON go through [`Config::validate`] instead.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sdt_core::constants::DEFAULT_SEED;
use sdt_core::NutsConfig;

/// Largest accepted tree depth (trajectories of up to `2^20` steps).
pub const MAX_TREE_DEPTH_LIMIT: usize = 20;

/// Errors in a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("draws must be > 0")]
    ZeroDraws,

    #[error("chains must be > 0")]
    ZeroChains,

    #[error("target_accept must be in (0, 1), got {0}")]
    TargetAccept(f64),

    #[error("max_tree_depth must be in 1..=20, got {0}")]
    TreeDepth(usize),

    #[error("init_jitter must be finite and >= 0, got {0}")]
    InitJitter(f64),

    #[error("r_hat_warning must be > 1, got {0}")]
    RHatWarning(f64),

    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sampling configuration for a multi-chain fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Retained draws per chain.
    ///
    /// Default: 2,000
    pub draws: usize,

    /// Warmup iterations per chain, discarded after adaptation.
    ///
    /// Default: 1,000
    pub tune: usize,

    /// Number of independent chains, run in parallel.
    ///
    /// Default: 4
    pub chains: usize,

    /// Target acceptance statistic for step-size adaptation.
    ///
    /// Default: 0.95
    pub target_accept: f64,

    /// Maximum NUTS tree depth.
    ///
    /// Default: 10
    pub max_tree_depth: usize,

    /// Base seed; each chain derives its own stream from it.
    pub seed: u64,

    /// Half-width of the uniform jitter around zero used for initial
    /// positions on the unconstrained scale.
    ///
    /// Default: 1.0
    pub init_jitter: f64,

    /// R̂ above this value is reported as a warning.
    ///
    /// Default: 1.01
    pub r_hat_warning: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            draws: 2_000,
            tune: 1_000,
            chains: 4,
            target_accept: 0.95,
            max_tree_depth: 10,
            seed: DEFAULT_SEED,
            init_jitter: 1.0,
            r_hat_warning: 1.01,
        }
    }
}

impl Config {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Short runs for smoke tests and interactive use.
    ///
    /// - 500 draws, 500 warmup, 2 chains
    /// - target_accept 0.9
    pub fn quick() -> Self {
        Self {
            draws: 500,
            tune: 500,
            chains: 2,
            target_accept: 0.9,
            ..Self::default()
        }
    }

    /// Long runs for final analyses.
    ///
    /// - 4,000 draws, 2,000 warmup, 4 chains
    /// - target_accept 0.99, tree depth 12
    pub fn thorough() -> Self {
        Self {
            draws: 4_000,
            tune: 2_000,
            target_accept: 0.99,
            max_tree_depth: 12,
            ..Self::default()
        }
    }

    /// Read a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set retained draws per chain.
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0.
    pub fn draws(mut self, n: usize) -> Self {
        assert!(n > 0, "draws must be > 0 (got {})", n);
        self.draws = n;
        self
    }

    /// Set warmup iterations per chain. Zero disables adaptation.
    pub fn tune(mut self, n: usize) -> Self {
        self.tune = n;
        self
    }

    /// Set the number of chains.
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0.
    pub fn chains(mut self, n: usize) -> Self {
        assert!(n > 0, "chains must be > 0 (got {})", n);
        self.chains = n;
        self
    }

    /// Set the target acceptance statistic.
    ///
    /// # Panics
    ///
    /// Panics if `p` is not in (0, 1).
    pub fn target_accept(mut self, p: f64) -> Self {
        assert!(
            p > 0.0 && p < 1.0,
            "target_accept must be in (0, 1), got {}",
            p
        );
        self.target_accept = p;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is 0 or above [`MAX_TREE_DEPTH_LIMIT`].
    pub fn max_tree_depth(mut self, depth: usize) -> Self {
        assert!(
            (1..=MAX_TREE_DEPTH_LIMIT).contains(&depth),
            "max_tree_depth must be in 1..={}, got {}",
            MAX_TREE_DEPTH_LIMIT,
            depth
        );
        self.max_tree_depth = depth;
        self
    }

    /// Set the base seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the initial-position jitter.
    ///
    /// # Panics
    ///
    /// Panics if `jitter` is negative or not finite.
    pub fn init_jitter(mut self, jitter: f64) -> Self {
        assert!(
            jitter.is_finite() && jitter >= 0.0,
            "init_jitter must be finite and >= 0, got {}",
            jitter
        );
        self.init_jitter = jitter;
        self
    }

    /// Set the R̂ warning threshold.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is not above 1.
    pub fn r_hat_warning(mut self, threshold: f64) -> Self {
        assert!(threshold > 1.0, "r_hat_warning must be > 1, got {}", threshold);
        self.r_hat_warning = threshold;
        self
    }

    /// Check every field, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.draws == 0 {
            return Err(ConfigError::ZeroDraws);
        }
        if self.chains == 0 {
            return Err(ConfigError::ZeroChains);
        }
        if !(self.target_accept > 0.0 && self.target_accept < 1.0) {
            return Err(ConfigError::TargetAccept(self.target_accept));
        }
        if !(1..=MAX_TREE_DEPTH_LIMIT).contains(&self.max_tree_depth) {
            return Err(ConfigError::TreeDepth(self.max_tree_depth));
        }
        if !(self.init_jitter.is_finite() && self.init_jitter >= 0.0) {
            return Err(ConfigError::InitJitter(self.init_jitter));
        }
        if !(self.r_hat_warning > 1.0) {
            return Err(ConfigError::RHatWarning(self.r_hat_warning));
        }
        Ok(())
    }

    /// Seed of one chain's RNG stream.
    pub fn chain_seed(&self, chain: usize) -> u64 {
        splitmix64(self.seed ^ splitmix64(chain as u64))
    }

    /// Sampler settings for one chain.
    pub fn chain_config(&self, chain: usize) -> NutsConfig {
        NutsConfig {
            tune: self.tune,
            draws: self.draws,
            target_accept: self.target_accept,
            max_tree_depth: self.max_tree_depth,
            seed: self.chain_seed(chain),
        }
    }
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
