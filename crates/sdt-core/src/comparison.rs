//! Stimulus vs difficulty effect comparison.
//!
//! For each target (d′ and criterion) the posterior mean and spread of the
//! stimulus and difficulty effects are reported, together with the fraction
//! of paired draws in which the stimulus effect is larger in magnitude.

use alloc::string::String;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{mean, std_dev};
use crate::math;
use crate::posterior::{Posterior, PosteriorError};

/// Errors from [`compare_effects`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    /// A draw sequence was empty.
    #[error("no posterior draws for '{parameter}'")]
    EmptySamples { parameter: String },

    /// Paired sequences differ in length.
    #[error("paired draw sequences differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    /// A required parameter is absent from the posterior.
    #[error("posterior has no parameter '{0}'")]
    MissingParameter(String),
}

impl From<PosteriorError> for ComparisonError {
    fn from(err: PosteriorError) -> Self {
        match err {
            PosteriorError::UnknownParameter(name) => ComparisonError::MissingParameter(name),
        }
    }
}

/// Posterior mean and standard deviation of one effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectStats {
    pub mean: f64,
    pub sd: f64,
}

impl EffectStats {
    fn of(samples: &[f64]) -> Self {
        Self {
            mean: mean(samples),
            sd: std_dev(samples),
        }
    }
}

/// Stimulus vs difficulty for a single target quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetComparison {
    pub stimulus: EffectStats,
    pub difficulty: EffectStats,
    /// Fraction of draws with `|stimulus| > |difficulty|`, in `[0, 1]`.
    pub prob_stimulus_larger: f64,
}

/// Comparison of effects on sensitivity and on bias.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectComparison {
    pub d_prime: TargetComparison,
    pub criterion: TargetComparison,
    pub n_draws: usize,
}

/// Compare the stimulus and difficulty effects on d′ and on the criterion.
pub fn compare_effects(
    stim_d: &[f64],
    diff_d: &[f64],
    stim_c: &[f64],
    diff_c: &[f64],
) -> Result<EffectComparison, ComparisonError> {
    let d_prime = compare_target(("stim_effect_d", stim_d), ("diff_effect_d", diff_d))?;
    let criterion = compare_target(("stim_effect_c", stim_c), ("diff_effect_c", diff_c))?;
    Ok(EffectComparison {
        d_prime,
        criterion,
        n_draws: stim_d.len(),
    })
}

fn compare_target(
    (stim_name, stim): (&str, &[f64]),
    (diff_name, diff): (&str, &[f64]),
) -> Result<TargetComparison, ComparisonError> {
    if stim.is_empty() {
        return Err(ComparisonError::EmptySamples {
            parameter: stim_name.into(),
        });
    }
    if diff.is_empty() {
        return Err(ComparisonError::EmptySamples {
            parameter: diff_name.into(),
        });
    }
    Ok(TargetComparison {
        stimulus: EffectStats::of(stim),
        difficulty: EffectStats::of(diff),
        prob_stimulus_larger: prob_abs_greater(stim, diff)?,
    })
}

/// Fraction of paired draws where `|a| > |b|`.
pub fn prob_abs_greater(a: &[f64], b: &[f64]) -> Result<f64, ComparisonError> {
    if a.len() != b.len() {
        return Err(ComparisonError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(ComparisonError::EmptySamples {
            parameter: String::new(),
        });
    }
    let wins = a
        .iter()
        .zip(b)
        .filter(|(x, y)| math::abs(**x) > math::abs(**y))
        .count();
    Ok(wins as f64 / a.len() as f64)
}

impl EffectComparison {
    /// Build the comparison from the fixed-effect draws of a fitted posterior.
    pub fn from_posterior(posterior: &Posterior) -> Result<Self, ComparisonError> {
        compare_effects(
            &posterior.flatten("stim_effect_d")?,
            &posterior.flatten("diff_effect_d")?,
            &posterior.flatten("stim_effect_c")?,
            &posterior.flatten("diff_effect_c")?,
        )
    }
}
