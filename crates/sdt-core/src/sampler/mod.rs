//! No-U-Turn sampling of a differentiable log density.
//!
//! The sampler sees a model only through [`LogDensity`]: a dimension and a
//! function returning the log density and its gradient at an unconstrained
//! position. It knows nothing of priors, links or likelihoods.
//!
//! ## Algorithm
//!
//! - NUTS with slice sampling and recursive trajectory doubling
//!   (Hoffman & Gelman 2014, Algorithm 6)
//! - Diagonal inverse metric estimated during tuning in doubling windows
//! - Dual-averaging step-size adaptation toward `target_accept`
//!
//! Tuning draws are discarded; the chain returns `draws` post-tuning
//! positions together with per-draw [`SampleStats`].

mod adapt;
mod nuts;

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

pub use adapt::{DualAveraging, VarianceAccumulator, WindowSchedule};
pub use nuts::NutsSampler;

use crate::constants::DEFAULT_SEED;

/// A differentiable log density over an unconstrained parameter vector.
pub trait LogDensity {
    /// Number of unconstrained parameters.
    fn dim(&self) -> usize;

    /// Log density at `position` (up to a constant); writes ∂/∂position into `gradient`.
    ///
    /// May return `-inf` for positions of zero density.
    fn log_density_gradient(&self, position: &[f64], gradient: &mut [f64]) -> f64;
}

/// Errors raised before a chain can start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SamplerError {
    /// The initial position has the wrong length.
    #[error("initial position has {got} elements, model expects {expected}")]
    DimensionMismatch {
        /// Model dimension.
        expected: usize,
        /// Length of the supplied position.
        got: usize,
    },

    /// The log density is not finite at the initial position.
    #[error("log density is not finite at the initial position")]
    NonFiniteInitialDensity,
}

/// Settings of a single NUTS chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutsConfig {
    /// Warmup (adaptation) iterations, discarded.
    pub tune: usize,
    /// Retained post-warmup draws.
    pub draws: usize,
    /// Target mean acceptance statistic for step-size adaptation, in (0, 1).
    pub target_accept: f64,
    /// Maximum tree depth; trajectories hold at most `2^depth` leapfrog steps.
    pub max_tree_depth: usize,
    /// RNG seed for this chain.
    pub seed: u64,
}

impl Default for NutsConfig {
    fn default() -> Self {
        Self {
            tune: 1000,
            draws: 1000,
            target_accept: 0.8,
            max_tree_depth: 10,
            seed: DEFAULT_SEED,
        }
    }
}

/// Per-draw sampler statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    /// Mean Metropolis acceptance probability over the trajectory.
    pub accept_stat: f64,
    /// Step size used for this transition.
    pub step_size: f64,
    /// Depth of the final tree.
    pub tree_depth: usize,
    /// Number of leapfrog steps taken.
    pub n_leapfrog: usize,
    /// True if the trajectory diverged.
    pub divergent: bool,
    /// Log density at the returned position.
    pub log_density: f64,
}

/// Output of one chain.
#[derive(Debug, Clone)]
pub struct Chain {
    /// Post-warmup positions on the unconstrained scale.
    pub draws: Vec<Vec<f64>>,
    /// Statistics of each retained draw.
    pub stats: Vec<SampleStats>,
    /// Adapted step size.
    pub step_size: f64,
    /// Adapted diagonal inverse metric.
    pub inv_metric: Vec<f64>,
}

impl Chain {
    /// Number of divergent post-warmup transitions.
    pub fn divergences(&self) -> usize {
        self.stats.iter().filter(|s| s.divergent).count()
    }

    /// Mean acceptance statistic over retained draws.
    pub fn mean_accept_stat(&self) -> f64 {
        if self.stats.is_empty() {
            return 0.0;
        }
        self.stats.iter().map(|s| s.accept_stat).sum::<f64>() / self.stats.len() as f64
    }

    /// Mean tree depth over retained draws.
    pub fn mean_tree_depth(&self) -> f64 {
        if self.stats.is_empty() {
            return 0.0;
        }
        self.stats.iter().map(|s| s.tree_depth as f64).sum::<f64>() / self.stats.len() as f64
    }

    /// Number of transitions that hit the maximum tree depth.
    pub fn max_depth_hits(&self, max_tree_depth: usize) -> usize {
        self.stats.iter().filter(|s| s.tree_depth >= max_tree_depth).count()
    }
}
