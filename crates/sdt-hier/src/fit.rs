//! Multi-chain fitting.
//!
//! Chains run in parallel on the rayon pool. Each chain draws its own initial
//! position and RNG stream from [`Config::chain_seed`], so results depend only
//! on the configuration, never on scheduling.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use sdt_core::diagnostics::{effective_sample_size, split_r_hat};
use sdt_core::{
    Chain, Hierarchy, LogDensity, ModelDims, NutsSampler, Posterior, SdtModel, TrialAggregate,
};

use crate::config::Config;
use crate::data::validate_aggregates;
use crate::Error;

/// Initial positions tried per chain before giving up.
pub const MAX_INIT_ATTEMPTS: usize = 100;

/// Sampler health across all chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerDiagnostics {
    pub chains: usize,
    pub draws_per_chain: usize,
    /// Divergent post-warmup transitions, summed over chains.
    pub divergences: usize,
    /// Transitions that stopped at the maximum tree depth.
    pub max_depth_hits: usize,
    pub mean_accept_stat: f64,
    pub mean_tree_depth: f64,
    /// Adapted step size of each chain.
    pub step_sizes: Vec<f64>,
    /// Largest split R̂ over all scalar parameters.
    pub max_r_hat: f64,
    /// Smallest effective sample size over all scalar parameters.
    pub min_ess: f64,
    /// R̂ above which a parameter counts as unconverged.
    pub r_hat_warning: f64,
}

impl SamplerDiagnostics {
    fn collect(chains: &[Chain], posterior: &Posterior, config: &Config) -> Self {
        let n = chains.len().max(1) as f64;
        let mut max_r_hat = f64::NAN;
        let mut min_ess = f64::NAN;
        for name in posterior.names() {
            if let Ok(draws) = posterior.param(name) {
                max_r_hat = max_r_hat.max(split_r_hat(&draws));
                min_ess = min_ess.min(effective_sample_size(&draws));
            }
        }
        Self {
            chains: chains.len(),
            draws_per_chain: posterior.n_draws(),
            divergences: chains.iter().map(Chain::divergences).sum(),
            max_depth_hits: chains.iter().map(|c| c.max_depth_hits(config.max_tree_depth)).sum(),
            mean_accept_stat: chains.iter().map(Chain::mean_accept_stat).sum::<f64>() / n,
            mean_tree_depth: chains.iter().map(Chain::mean_tree_depth).sum::<f64>() / n,
            step_sizes: chains.iter().map(|c| c.step_size).collect(),
            max_r_hat,
            min_ess,
            r_hat_warning: config.r_hat_warning,
        }
    }
}

/// A fitted model: posterior draws plus sampler diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fit {
    pub hierarchy: Hierarchy,
    pub dims: ModelDims,
    pub posterior: Posterior,
    pub diagnostics: SamplerDiagnostics,
}

/// Validate rows, declare the model and sample it.
pub fn fit_rows(
    rows: &[TrialAggregate],
    hierarchy: Hierarchy,
    config: &Config,
) -> Result<Fit, Error> {
    validate_aggregates(rows)?;
    let model = hierarchy.build(rows)?;
    fit(&model, config)
}

/// Sample a declared model with `config.chains` parallel chains.
pub fn fit(model: &SdtModel, config: &Config) -> Result<Fit, Error> {
    config.validate()?;

    tracing::info!(
        model = model.hierarchy().name(),
        participants = model.dims().participants,
        conditions = model.dims().conditions,
        parameters = model.dim(),
        chains = config.chains,
        draws = config.draws,
        tune = config.tune,
        "sampling"
    );

    let chains = (0..config.chains)
        .into_par_iter()
        .map(|chain| run_chain(model, config, chain))
        .collect::<Result<Vec<_>, _>>()?;

    let posterior = Posterior::from_chains(model.layout(), &chains);
    let diagnostics = SamplerDiagnostics::collect(&chains, &posterior, config);

    if diagnostics.divergences > 0 {
        tracing::warn!(
            divergences = diagnostics.divergences,
            "{} divergent transitions after tuning; consider a higher target_accept",
            diagnostics.divergences
        );
    }
    if diagnostics.max_r_hat > diagnostics.r_hat_warning {
        tracing::warn!(
            max_r_hat = diagnostics.max_r_hat,
            "chains have not converged (R-hat {:.3} > {})",
            diagnostics.max_r_hat,
            config.r_hat_warning
        );
    }
    tracing::info!(
        divergences = diagnostics.divergences,
        min_ess = diagnostics.min_ess,
        max_r_hat = diagnostics.max_r_hat,
        "sampling finished"
    );

    Ok(Fit {
        hierarchy: model.hierarchy(),
        dims: model.dims(),
        posterior,
        diagnostics,
    })
}

fn run_chain(model: &SdtModel, config: &Config, chain: usize) -> Result<Chain, Error> {
    let nuts = config.chain_config(chain);
    let init = initial_position(model, config.init_jitter, nuts.seed)
        .ok_or(Error::NoFiniteInitialPosition { chain, attempts: MAX_INIT_ATTEMPTS })?;

    let result = NutsSampler::new(nuts).sample(model, &init)?;
    tracing::debug!(
        chain,
        step_size = result.step_size,
        accept = result.mean_accept_stat(),
        divergences = result.divergences(),
        "chain finished"
    );
    Ok(result)
}

/// Jittered starting point with finite log density, if one is found.
fn initial_position(model: &SdtModel, jitter: f64, seed: u64) -> Option<Vec<f64>> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed ^ 0x5eed_1417);
    let mut gradient = vec![0.0; model.dim()];
    (0..MAX_INIT_ATTEMPTS)
        .map(|_| model.initial_position(&mut rng, jitter))
        .find(|position| model.log_density_gradient(position, &mut gradient).is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdt_core::{expected_counts, FixedEffects, SyntheticDesign, TrueEffects};

    fn rows() -> Vec<TrialAggregate> {
        let truth = TrueEffects {
            d: FixedEffects::new(1.0, 0.5, 0.0, 0.0),
            c: FixedEffects::new(0.2, 0.0, 0.0, 0.0),
        };
        let design = SyntheticDesign {
            participants: 3,
            participant_sd_d: 0.3,
            participant_sd_c: 0.2,
            ..SyntheticDesign::default()
        };
        expected_counts(&truth, &design)
    }

    fn tiny() -> Config {
        Config::quick().draws(100).tune(100)
    }

    #[test]
    fn test_fit_is_reproducible() {
        let a = fit_rows(&rows(), Hierarchy::ParticipantIntercept, &tiny()).unwrap();
        let b = fit_rows(&rows(), Hierarchy::ParticipantIntercept, &tiny()).unwrap();
        assert_eq!(
            a.posterior.flatten("stim_effect_d").unwrap(),
            b.posterior.flatten("stim_effect_d").unwrap()
        );
        assert_eq!(a.diagnostics.chains, 2);
        assert_eq!(a.diagnostics.draws_per_chain, 100);
        assert_eq!(a.posterior.total_draws(), 200);
    }

    #[test]
    fn test_sigma_draws_are_positive() {
        let fit = fit_rows(&rows(), Hierarchy::MatrixHierarchy, &tiny()).unwrap();
        assert!(fit.posterior.flatten("sigma_d").unwrap().iter().all(|&s| s > 0.0));
        assert_eq!(fit.dims, ModelDims::new(3, 4));
    }

    #[test]
    fn test_invalid_rows_fail_before_sampling() {
        let mut bad = rows();
        bad[0].hits = bad[0].signal_trials + 1;
        let err = fit_rows(&bad, Hierarchy::ParticipantIntercept, &tiny()).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }

    #[test]
    fn test_diagnostics_carry_r_hat_threshold() {
        let config = tiny().r_hat_warning(1.05);
        let fit = fit_rows(&rows(), Hierarchy::ParticipantIntercept, &config).unwrap();
        assert_eq!(fit.diagnostics.r_hat_warning, 1.05);
        assert_eq!(fit.diagnostics.step_sizes.len(), config.chains);
    }
}
