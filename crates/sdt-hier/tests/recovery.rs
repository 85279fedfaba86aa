//! Parameter recovery on synthetic data with known generating effects.
//!
//! Counts are the rounded expected counts, so each scenario is deterministic
//! up to the sampler seed.

use sdt_core::diagnostics::{hdi, mean};
use sdt_core::{expected_counts, FixedEffects, SyntheticDesign, TrueEffects, FIXED_EFFECTS};
use sdt_hier::{fit, fit_rows, Config, Fit, Hierarchy, TrialAggregate};

fn config() -> Config {
    Config::quick().draws(1000).tune(1000).target_accept(0.95)
}

fn posterior_mean(fit: &Fit, name: &str) -> f64 {
    mean(&fit.posterior.flatten(name).unwrap())
}

fn single_participant(truth: TrueEffects) -> Vec<TrialAggregate> {
    expected_counts(&truth, &SyntheticDesign::default())
}

const HIERARCHIES: [Hierarchy; 2] =
    [Hierarchy::MatrixHierarchy, Hierarchy::ParticipantIntercept];

#[test]
fn recovers_stimulus_effect_on_sensitivity() {
    let rows = single_participant(TrueEffects {
        d: FixedEffects::new(1.0, 1.0, 0.0, 0.0),
        c: FixedEffects::default(),
    });
    assert_eq!(rows.len(), 4);

    for hierarchy in HIERARCHIES {
        let fit = fit_rows(&rows, hierarchy, &config()).unwrap();
        let stim = posterior_mean(&fit, "stim_effect_d");
        let diff = posterior_mean(&fit, "diff_effect_d");
        assert!((stim - 1.0).abs() < 0.3, "{hierarchy:?}: stim_effect_d = {stim}");
        assert!(diff.abs() < 0.3, "{hierarchy:?}: diff_effect_d = {diff}");

        // The centered matrix hierarchy with one participant has a funnel in
        // sigma_d / sigma_c; divergences are counted, never fatal.
        assert_eq!(fit.diagnostics.divergences, fit.posterior.divergences());
        let total = fit.posterior.total_draws();
        let divergences = fit.diagnostics.divergences;
        assert!(divergences < total / 4, "{hierarchy:?}: {divergences} of {total} divergent");
    }
}

#[test]
fn null_effects_stay_credible() {
    let rows = expected_counts(
        &TrueEffects::default(),
        &SyntheticDesign {
            participants: 2,
            ..SyntheticDesign::default()
        },
    );

    for hierarchy in HIERARCHIES {
        let fit = fit_rows(&rows, hierarchy, &config()).unwrap();
        for name in FIXED_EFFECTS {
            let (lo, hi) = hdi(&fit.posterior.flatten(name).unwrap(), 0.95);
            assert!(
                lo < 0.0 && 0.0 < hi,
                "{hierarchy:?} {name}: 95% HDI [{lo}, {hi}] excludes 0"
            );
        }
    }
}

#[test]
fn ceiling_performance_gives_large_sensitivity() {
    let rows: Vec<TrialAggregate> = (0..4)
        .map(|c| TrialAggregate::new(1, c, 100, 100, 100, 0))
        .collect();

    for hierarchy in HIERARCHIES {
        let model = hierarchy.build(&rows).unwrap();
        let fit = fit(&model, &config()).unwrap();
        // Intercepts and participant offsets trade off, so check the
        // per-row latents the data actually identify.
        let latents = model.posterior_row_latents(&fit.posterior);
        assert_eq!(latents.len(), rows.len());
        for (row, (d, c)) in rows.iter().zip(latents) {
            assert!(d > 3.0, "{hierarchy:?} condition {}: d' = {d}", row.condition_id);
            // hit = σ(d - c) near 1 and fa = σ(-c) near 0 force d > c > 0.
            assert!(
                d > c && c > 0.0,
                "{hierarchy:?} condition {}: d' = {d}, c = {c}",
                row.condition_id
            );
        }
    }
}

#[test]
fn hierarchies_agree_on_shared_effects() {
    let truth = TrueEffects {
        d: FixedEffects::new(1.0, 0.8, -0.6, 0.0),
        c: FixedEffects::new(0.2, 0.0, 0.4, 0.0),
    };
    let rows = expected_counts(
        &truth,
        &SyntheticDesign {
            participants: 6,
            participant_sd_d: 0.3,
            participant_sd_c: 0.2,
            ..SyntheticDesign::default()
        },
    );

    let a = fit_rows(&rows, Hierarchy::MatrixHierarchy, &config()).unwrap();
    let b = fit_rows(&rows, Hierarchy::ParticipantIntercept, &config()).unwrap();

    let expected: [(&str, f64); 4] = [
        ("stim_effect_d", 0.8),
        ("diff_effect_d", -0.6),
        ("stim_effect_c", 0.0),
        ("diff_effect_c", 0.4),
    ];
    for (name, truth) in expected {
        let (ma, mb) = (posterior_mean(&a, name), posterior_mean(&b, name));
        assert!((ma - mb).abs() < 0.4, "{name}: matrix {ma} vs intercept {mb}");
        if truth != 0.0 {
            assert_eq!(ma.signum(), truth.signum(), "{name}: matrix {ma}");
            assert_eq!(mb.signum(), truth.signum(), "{name}: intercept {mb}");
        }
    }
}
