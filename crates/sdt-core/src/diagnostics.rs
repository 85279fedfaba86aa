//! Posterior summary statistics and convergence diagnostics.
//!
//! Multi-chain inputs are slices of per-chain draw sequences, as returned by
//! [`Posterior::param`].

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::constants::HDI_PROB;
use crate::math;
use crate::posterior::{Posterior, PosteriorError};

/// Autocorrelation lags beyond this are never summed.
const MAX_ESS_LAG: usize = 250;

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Population standard deviation (divisor `n`); NaN for an empty slice.
pub fn std_dev(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    let m = mean(samples);
    math::sqrt(samples.iter().map(|&x| math::sq(x - m)).sum::<f64>() / samples.len() as f64)
}

/// Shortest interval containing a `prob` fraction of the samples.
///
/// Returns `(NaN, NaN)` for an empty slice.
pub fn hdi(samples: &[f64], prob: f64) -> (f64, f64) {
    let n = samples.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let width = (math::floor(prob * n as f64) as usize).min(n - 1);
    let mut best = 0;
    for i in 1..n - width {
        if sorted[i + width] - sorted[i] < sorted[best + width] - sorted[best] {
            best = i;
        }
    }
    (sorted[best], sorted[best + width])
}

/// Effective sample size of a single chain.
///
/// Sums lag autocorrelations until the first one drops below 0.05.
pub fn chain_ess(chain: &[f64]) -> f64 {
    let n = chain.len();
    if n < 2 {
        return n as f64;
    }

    let m = mean(chain);
    let var = chain.iter().map(|&x| math::sq(x - m)).sum::<f64>() / n as f64;
    if var < 1e-12 {
        return n as f64;
    }

    let mut sum_rho = 0.0;
    for k in 1..=MAX_ESS_LAG.min(n / 2) {
        let rho_k = autocorrelation(chain, k, m, var);
        if rho_k < 0.05 {
            break;
        }
        sum_rho += rho_k;
    }

    n as f64 / (1.0 + 2.0 * sum_rho)
}

fn autocorrelation(chain: &[f64], k: usize, mean: f64, var: f64) -> f64 {
    let n = chain.len();
    if k >= n {
        return 0.0;
    }

    let cov: f64 = (0..(n - k))
        .map(|i| (chain[i] - mean) * (chain[i + k] - mean))
        .sum::<f64>()
        / (n - k) as f64;

    cov / var
}

/// Effective sample size over several chains (per-chain ESS, summed).
pub fn effective_sample_size(chains: &[Vec<f64>]) -> f64 {
    chains.iter().map(|c| chain_ess(c)).sum()
}

/// Split-chain potential scale reduction factor.
///
/// Each chain is halved and the halves compared as separate chains. Returns
/// NaN when there are fewer than two draws per half.
pub fn split_r_hat(chains: &[Vec<f64>]) -> f64 {
    let half = chains.iter().map(|c| c.len() / 2).min().unwrap_or(0);
    if half < 2 {
        return f64::NAN;
    }

    let mut halves: Vec<&[f64]> = Vec::with_capacity(chains.len() * 2);
    for chain in chains {
        let offset = chain.len() - 2 * half;
        halves.push(&chain[offset..offset + half]);
        halves.push(&chain[offset + half..]);
    }

    let n = half as f64;
    let m = halves.len() as f64;
    let means: Vec<f64> = halves.iter().map(|h| mean(h)).collect();
    let grand = mean(&means);

    let between = n / (m - 1.0) * means.iter().map(|&x| math::sq(x - grand)).sum::<f64>();
    let within = halves
        .iter()
        .zip(&means)
        .map(|(h, &hm)| h.iter().map(|&x| math::sq(x - hm)).sum::<f64>() / (n - 1.0))
        .sum::<f64>()
        / m;

    if within <= 0.0 {
        return if between <= 0.0 { 1.0 } else { f64::INFINITY };
    }

    let var_plus = (n - 1.0) / n * within + between / n;
    math::sqrt(var_plus / within)
}

/// One row of a posterior summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub name: String,
    pub mean: f64,
    pub sd: f64,
    pub hdi_low: f64,
    pub hdi_high: f64,
    pub mcse_mean: f64,
    pub ess: f64,
    pub r_hat: f64,
}

impl ParameterSummary {
    /// Summarize per-chain draws of one scalar parameter.
    pub fn from_chains(name: &str, chains: &[Vec<f64>]) -> Self {
        let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
        let sd = std_dev(&pooled);
        let ess = effective_sample_size(chains);
        let (hdi_low, hdi_high) = hdi(&pooled, HDI_PROB);
        Self {
            name: name.into(),
            mean: mean(&pooled),
            sd,
            hdi_low,
            hdi_high,
            mcse_mean: if ess > 0.0 { sd / math::sqrt(ess) } else { f64::NAN },
            ess,
            r_hat: split_r_hat(chains),
        }
    }
}

/// Summary rows for the named scalar parameters, in the order given.
pub fn summarize<S: AsRef<str>>(
    posterior: &Posterior,
    var_names: &[S],
) -> Result<Vec<ParameterSummary>, PosteriorError> {
    var_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            Ok(ParameterSummary::from_chains(name, &posterior.param(name)?))
        })
        .collect()
}
