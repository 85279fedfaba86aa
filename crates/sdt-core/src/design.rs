//! Condition encoder for the 2×2 stimulus × difficulty design.
//!
//! A condition code decomposes as
//!
//! ```text
//! stimulus    = code mod 2
//! difficulty  = code div 2
//! interaction = stimulus × difficulty
//! ```
//!
//! Codes above 3 decode under the same arithmetic; their meaning outside a
//! 2×2 factorial design is left to the caller.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::types::{FixedEffects, TrialAggregate};

/// Regressors of a single condition code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionDesign {
    /// `code mod 2`.
    pub stimulus: f64,
    /// `code div 2`.
    pub difficulty: f64,
    /// `stimulus × difficulty`.
    pub interaction: f64,
}

impl ConditionDesign {
    /// Design row `[1, stimulus, difficulty, interaction]`.
    #[inline]
    pub fn row(&self) -> [f64; 4] {
        [1.0, self.stimulus, self.difficulty, self.interaction]
    }

    /// Linear predictor `intercept + stimulus·β_s + difficulty·β_d + interaction·β_i`.
    #[inline]
    pub fn predict(&self, effects: &FixedEffects) -> f64 {
        effects.intercept
            + effects.stimulus * self.stimulus
            + effects.difficulty * self.difficulty
            + effects.interaction * self.interaction
    }
}

/// Encode one condition code.
#[inline]
pub fn encode_condition(code: u32) -> ConditionDesign {
    let stimulus = (code % 2) as f64;
    let difficulty = (code / 2) as f64;
    ConditionDesign {
        stimulus,
        difficulty,
        interaction: stimulus * difficulty,
    }
}

/// Three same-length regressor columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignColumns {
    /// Stimulus regressor.
    pub stimulus: Vec<f64>,
    /// Difficulty regressor.
    pub difficulty: Vec<f64>,
    /// Interaction regressor.
    pub interaction: Vec<f64>,
}

impl DesignColumns {
    /// Encode an ordered sequence of condition codes.
    pub fn from_codes<I: IntoIterator<Item = u32>>(codes: I) -> Self {
        let mut columns = Self::default();
        for code in codes {
            let design = encode_condition(code);
            columns.stimulus.push(design.stimulus);
            columns.difficulty.push(design.difficulty);
            columns.interaction.push(design.interaction);
        }
        columns
    }

    /// Number of encoded codes.
    pub fn len(&self) -> usize {
        self.stimulus.len()
    }

    /// True if no codes were encoded.
    pub fn is_empty(&self) -> bool {
        self.stimulus.is_empty()
    }

    /// Design of the `i`-th encoded code.
    pub fn get(&self, i: usize) -> Option<ConditionDesign> {
        Some(ConditionDesign {
            stimulus: *self.stimulus.get(i)?,
            difficulty: *self.difficulty.get(i)?,
            interaction: *self.interaction.get(i)?,
        })
    }
}

/// Condition-indexed regressors for codes `0..conditions` (matrix hierarchy).
pub fn encode_conditions(conditions: usize) -> DesignColumns {
    DesignColumns::from_codes((0..conditions).map(|c| c as u32))
}

/// Row-level regressors from each row's condition id (participant-intercept hierarchy).
pub fn encode_rows(rows: &[TrialAggregate]) -> DesignColumns {
    DesignColumns::from_codes(rows.iter().map(|r| r.condition_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_of_2x2_design() {
        let cols = encode_conditions(4);
        assert_eq!(cols.stimulus, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(cols.difficulty, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(cols.interaction, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_encoding_properties_hold_for_any_code_count() {
        for c in [0usize, 1, 3, 4, 7, 16] {
            let cols = encode_conditions(c);
            assert_eq!(cols.len(), c);
            for i in 0..c {
                let d = cols.get(i).unwrap();
                assert_eq!(d.stimulus, (i % 2) as f64);
                assert!(d.stimulus == 0.0 || d.stimulus == 1.0);
                assert_eq!(d.difficulty, (i / 2) as f64);
                assert_eq!(d.interaction, d.stimulus * d.difficulty);
            }
        }
    }

    #[test]
    fn test_row_encoding_follows_condition_ids() {
        let rows = [
            TrialAggregate::new(1, 3, 10, 5, 10, 5),
            TrialAggregate::new(1, 0, 10, 5, 10, 5),
            TrialAggregate::new(2, 1, 10, 5, 10, 5),
        ];
        let cols = encode_rows(&rows);
        assert_eq!(cols.stimulus, [1.0, 0.0, 1.0]);
        assert_eq!(cols.difficulty, [1.0, 0.0, 0.0]);
        assert_eq!(cols.interaction, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_predict_is_linear_in_effects() {
        let effects = FixedEffects::new(0.5, 1.0, -0.25, 2.0);
        assert_eq!(encode_condition(0).predict(&effects), 0.5);
        assert_eq!(encode_condition(1).predict(&effects), 1.5);
        assert_eq!(encode_condition(2).predict(&effects), 0.25);
        assert_eq!(encode_condition(3).predict(&effects), 3.25);
        assert_eq!(encode_condition(3).row(), [1.0, 1.0, 1.0, 1.0]);
    }
}
