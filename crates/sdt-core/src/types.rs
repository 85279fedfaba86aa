//! Type aliases and common types.

use alloc::collections::BTreeSet;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Phase-space vector (positions, momenta, gradients) for the sampler.
pub type Vector = DVector<f64>;

/// Participant × condition matrix of latent values.
pub type LatentMatrix = DMatrix<f64>;

/// One row of the aggregate table: counts for a (participant, condition) pair.
///
/// Field names serialize to the column names of the behavioural data files
/// (`pnum`, `condition`, `nSignal`, `hits`, `nNoise`, `false_alarms`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialAggregate {
    /// Participant number, 1-based.
    #[serde(rename = "pnum")]
    pub participant_id: u32,

    /// Condition code in `[0, C)`.
    #[serde(rename = "condition")]
    pub condition_id: u32,

    /// Number of signal-present trials.
    #[serde(rename = "nSignal")]
    pub signal_trials: u32,

    /// "Yes" responses on signal trials.
    pub hits: u32,

    /// Number of signal-absent trials.
    #[serde(rename = "nNoise")]
    pub noise_trials: u32,

    /// "Yes" responses on noise trials.
    pub false_alarms: u32,
}

impl TrialAggregate {
    /// Create a row from its six fields.
    pub fn new(
        participant_id: u32,
        condition_id: u32,
        signal_trials: u32,
        hits: u32,
        noise_trials: u32,
        false_alarms: u32,
    ) -> Self {
        Self {
            participant_id,
            condition_id,
            signal_trials,
            hits,
            noise_trials,
            false_alarms,
        }
    }

    /// Zero-based participant index (`pnum - 1`).
    #[inline]
    pub fn participant_index(&self) -> usize {
        self.participant_id.saturating_sub(1) as usize
    }

    /// Condition index (the condition code itself).
    #[inline]
    pub fn condition_index(&self) -> usize {
        self.condition_id as usize
    }

    /// True if both counts are within their trial totals.
    pub fn counts_within_bounds(&self) -> bool {
        self.hits <= self.signal_trials && self.false_alarms <= self.noise_trials
    }
}

/// The four regression coefficients of one SDT target (d′ or criterion).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FixedEffects {
    /// Baseline value (stimulus = 0, difficulty = 0).
    pub intercept: f64,
    /// Effect of the stimulus factor.
    pub stimulus: f64,
    /// Effect of the difficulty factor.
    pub difficulty: f64,
    /// Stimulus × difficulty interaction.
    pub interaction: f64,
}

impl FixedEffects {
    /// Create coefficients in design order.
    pub fn new(intercept: f64, stimulus: f64, difficulty: f64, interaction: f64) -> Self {
        Self {
            intercept,
            stimulus,
            difficulty,
            interaction,
        }
    }

    /// Read four consecutive coefficients from a parameter slice.
    pub fn from_slice(values: &[f64]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// Coefficients as an array in design order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.intercept, self.stimulus, self.difficulty, self.interaction]
    }
}

/// Declared numbers of participants (P) and conditions (C).
///
/// Parameter cardinality follows these values, not the number of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDims {
    /// Number of participants, P.
    pub participants: usize,
    /// Number of conditions, C.
    pub conditions: usize,
}

impl ModelDims {
    /// Declare dimensions explicitly.
    pub fn new(participants: usize, conditions: usize) -> Self {
        Self {
            participants,
            conditions,
        }
    }

    /// Count distinct participant ids and distinct condition codes.
    pub fn from_rows(rows: &[TrialAggregate]) -> Self {
        let participants: BTreeSet<u32> = rows.iter().map(|r| r.participant_id).collect();
        let conditions: BTreeSet<u32> = rows.iter().map(|r| r.condition_id).collect();
        Self {
            participants: participants.len(),
            conditions: conditions.len(),
        }
    }

    /// Number of (participant, condition) cells, P × C.
    pub fn cells(&self) -> usize {
        self.participants * self.conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dims_count_distinct_values() {
        let rows = [
            TrialAggregate::new(1, 0, 10, 5, 10, 2),
            TrialAggregate::new(1, 1, 10, 5, 10, 2),
            TrialAggregate::new(2, 0, 10, 5, 10, 2),
            TrialAggregate::new(2, 3, 10, 5, 10, 2),
        ];
        let dims = ModelDims::from_rows(&rows);
        assert_eq!(dims, ModelDims::new(2, 3));
        assert_eq!(dims.cells(), 6);
    }

    #[test]
    fn test_participant_index_is_zero_based() {
        let row = TrialAggregate::new(3, 2, 10, 5, 10, 2);
        assert_eq!(row.participant_index(), 2);
        assert_eq!(row.condition_index(), 2);
    }

    #[test]
    fn test_counts_within_bounds() {
        assert!(TrialAggregate::new(1, 0, 10, 10, 10, 0).counts_within_bounds());
        assert!(!TrialAggregate::new(1, 0, 10, 11, 10, 0).counts_within_bounds());
        assert!(!TrialAggregate::new(1, 0, 10, 1, 10, 12).counts_within_bounds());
    }
}
