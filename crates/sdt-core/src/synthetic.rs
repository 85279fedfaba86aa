//! Synthetic aggregate data with known generating effects.
//!
//! Used by parameter-recovery tests and for trying the models without data.

use alloc::vec::Vec;

use rand::SeedableRng;
use rand_distr::{Binomial, Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::design::encode_condition;
use crate::likelihood::sdt_rates;
use crate::math;
use crate::types::{FixedEffects, TrialAggregate};

/// Generating fixed effects for d′ and for the criterion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrueEffects {
    pub d: FixedEffects,
    pub c: FixedEffects,
}

/// Shape of a synthetic experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticDesign {
    pub participants: u32,
    pub conditions: u32,
    pub signal_trials: u32,
    pub noise_trials: u32,
    /// Spread of participant offsets on d′.
    pub participant_sd_d: f64,
    /// Spread of participant offsets on the criterion.
    pub participant_sd_c: f64,
}

impl Default for SyntheticDesign {
    fn default() -> Self {
        Self {
            participants: 1,
            conditions: 4,
            signal_trials: 100,
            noise_trials: 100,
            participant_sd_d: 0.0,
            participant_sd_c: 0.0,
        }
    }
}

impl SyntheticDesign {
    /// Evenly spaced participant offsets spanning `[-sd, sd]`.
    fn spread_offsets(&self) -> Vec<(f64, f64)> {
        let p = self.participants;
        (0..p)
            .map(|i| {
                let z = if p > 1 {
                    -1.0 + 2.0 * i as f64 / (p - 1) as f64
                } else {
                    0.0
                };
                (z * self.participant_sd_d, z * self.participant_sd_c)
            })
            .collect()
    }

    fn rows<F>(&self, truth: &TrueEffects, offsets: &[(f64, f64)], mut counts: F) -> Vec<TrialAggregate>
    where
        F: FnMut(u32, f64, u32, f64) -> (u32, u32),
    {
        let mut rows = Vec::with_capacity((self.participants * self.conditions) as usize);
        for (p, &(off_d, off_c)) in offsets.iter().enumerate() {
            for condition in 0..self.conditions {
                let design = encode_condition(condition);
                let d = design.predict(&truth.d) + off_d;
                let c = design.predict(&truth.c) + off_c;
                let rates = sdt_rates(d, c);
                let (hits, false_alarms) = counts(
                    self.signal_trials,
                    rates.hit_rate,
                    self.noise_trials,
                    rates.false_alarm_rate,
                );
                rows.push(TrialAggregate::new(
                    p as u32 + 1,
                    condition,
                    self.signal_trials,
                    hits,
                    self.noise_trials,
                    false_alarms,
                ));
            }
        }
        rows
    }
}

/// Rounded expected counts under the generating effects.
///
/// Participant offsets are spread evenly over `[-sd, sd]`, so the result is
/// fully deterministic.
pub fn expected_counts(truth: &TrueEffects, design: &SyntheticDesign) -> Vec<TrialAggregate> {
    let offsets = design.spread_offsets();
    design.rows(truth, &offsets, |n_s, hit, n_n, fa| {
        (
            math::round(n_s as f64 * hit) as u32,
            math::round(n_n as f64 * fa) as u32,
        )
    })
}

/// Binomial counts under the generating effects.
///
/// Participant offsets are drawn from `Normal(0, sd)`.
pub fn simulate(truth: &TrueEffects, design: &SyntheticDesign, seed: u64) -> Vec<TrialAggregate> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let offsets: Vec<(f64, f64)> = (0..design.participants)
        .map(|_| {
            (
                gaussian(&mut rng, design.participant_sd_d),
                gaussian(&mut rng, design.participant_sd_c),
            )
        })
        .collect();
    design.rows(truth, &offsets, |n_s, hit, n_n, fa| {
        (binomial(&mut rng, n_s, hit), binomial(&mut rng, n_n, fa))
    })
}

fn gaussian(rng: &mut Xoshiro256PlusPlus, sd: f64) -> f64 {
    match Normal::new(0.0, sd) {
        Ok(dist) if sd > 0.0 => dist.sample(rng),
        _ => 0.0,
    }
}

fn binomial(rng: &mut Xoshiro256PlusPlus, n: u32, p: f64) -> u32 {
    match Binomial::new(u64::from(n), p) {
        Ok(dist) => dist.sample(rng) as u32,
        Err(_) => 0,
    }
}
