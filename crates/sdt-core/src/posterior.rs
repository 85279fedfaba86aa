//! Posterior draws collected from one or more chains.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::model::ParameterLayout;
use crate::sampler::{Chain, SampleStats};

/// Errors looking up parameters in a [`Posterior`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PosteriorError {
    /// No parameter (or block) with this name.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
}

/// Constrained posterior draws, kept per chain.
///
/// Draws are stored as `[chain][draw][parameter]` in layout order; scale
/// parameters are on their natural (positive) scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posterior {
    layout: ParameterLayout,
    names: Vec<String>,
    chains: Vec<Vec<Vec<f64>>>,
    stats: Vec<Vec<SampleStats>>,
}

impl Posterior {
    /// Constrain and collect the draws of each chain.
    pub fn from_chains(layout: &ParameterLayout, chains: &[Chain]) -> Self {
        Self {
            layout: layout.clone(),
            names: layout.flat_names(),
            chains: chains
                .iter()
                .map(|chain| chain.draws.iter().map(|d| layout.constrain(d)).collect())
                .collect(),
            stats: chains.iter().map(|chain| chain.stats.clone()).collect(),
        }
    }

    /// Layout the draws were produced under.
    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    /// Element-wise parameter names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of chains.
    pub fn n_chains(&self) -> usize {
        self.chains.len()
    }

    /// Draws per chain (the shortest chain if lengths differ).
    pub fn n_draws(&self) -> usize {
        self.chains.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Total number of draws across chains.
    pub fn total_draws(&self) -> usize {
        self.chains.iter().map(Vec::len).sum()
    }

    /// Sampler statistics per chain.
    pub fn sample_stats(&self) -> &[Vec<SampleStats>] {
        &self.stats
    }

    /// Divergent transitions across all chains.
    pub fn divergences(&self) -> usize {
        self.stats.iter().flatten().filter(|s| s.divergent).count()
    }

    fn index_of(&self, name: &str) -> Result<usize, PosteriorError> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| PosteriorError::UnknownParameter(name.into()))
    }

    /// Draws of one scalar element, per chain.
    pub fn param(&self, name: &str) -> Result<Vec<Vec<f64>>, PosteriorError> {
        let i = self.index_of(name)?;
        Ok(self
            .chains
            .iter()
            .map(|chain| chain.iter().map(|draw| draw[i]).collect())
            .collect())
    }

    /// Draws of one scalar element, chains concatenated.
    pub fn flatten(&self, name: &str) -> Result<Vec<f64>, PosteriorError> {
        let i = self.index_of(name)?;
        Ok(self
            .chains
            .iter()
            .flat_map(|chain| chain.iter().map(move |draw| draw[i]))
            .collect())
    }

    /// Every retained draw (constrained scale), chains concatenated.
    pub fn draws(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.chains.iter().flatten().map(Vec::as_slice)
    }

    /// Posterior mean of every element of a block, in block order.
    pub fn block_means(&self, block: &str) -> Result<Vec<f64>, PosteriorError> {
        let block = self
            .layout
            .block(block)
            .ok_or_else(|| PosteriorError::UnknownParameter(block.into()))?;
        let total = self.total_draws().max(1) as f64;
        let mut sums = alloc::vec![0.0; block.len()];
        for draw in self.chains.iter().flatten() {
            for (sum, value) in sums.iter_mut().zip(&draw[block.range()]) {
                *sum += value;
            }
        }
        Ok(sums.into_iter().map(|s| s / total).collect())
    }
}
