//! Hierarchical SDT models.
//!
//! One [`SdtModel`] carries everything the two competing models share:
//!
//! - Fixed effects for d′ and criterion, each `~ Normal(0, 1)`:
//!   intercept, stimulus, difficulty, stimulus × difficulty
//! - Hierarchical scales `sigma_d`, `sigma_c ~ HalfNormal(1)`
//! - The logistic link and binomial likelihood ([`crate::likelihood`])
//!
//! The latent structure is injected as a [`Hierarchy`]:
//! [`apply_matrix_hierarchy_model`] builds the P×C latent-matrix model,
//! [`apply_participant_intercept_model`] the per-participant offset model.
//!
//! Construction only declares the model; inference is run by a
//! [`LogDensity`] consumer such as [`crate::sampler::NutsSampler`].

mod hierarchy;
mod layout;
mod prior;

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use rand::Rng;

pub use hierarchy::{Hierarchy, ParseHierarchyError};
pub use layout::{ParameterBlock, ParameterLayout, Transform};
pub use prior::{half_normal_ln_pdf, normal_ln_pdf};

use crate::constants::{FIXED_EFFECTS, FIXED_EFFECT_PRIOR_SCALE, SCALES, SIGMA_PRIOR_SCALE};
use crate::design::{encode_conditions, encode_rows, ConditionDesign, DesignColumns};
use crate::likelihood::{sdt_rates, SdtRates};
use crate::math;
use crate::posterior::Posterior;
use crate::sampler::LogDensity;
use crate::types::{FixedEffects, LatentMatrix, ModelDims, TrialAggregate};

/// Flat indices of the d′ fixed effects.
pub const D_EFFECTS: Range<usize> = 0..4;

/// Flat indices of the criterion fixed effects.
pub const C_EFFECTS: Range<usize> = 4..8;

/// Flat index of `log(sigma_d)`.
pub const SIGMA_D: usize = 8;

/// Flat index of `log(sigma_c)`.
pub const SIGMA_C: usize = 9;

/// Number of parameters shared by both hierarchies.
pub const SHARED_PARAMS: usize = 10;

/// Errors raised while declaring a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// No aggregate rows were supplied.
    #[error("cannot build a model from an empty table")]
    EmptyData,

    /// A row's participant or condition falls outside the declared dimensions.
    #[error(
        "row (pnum={participant_id}, condition={condition_id}) outside declared \
         dimensions P={participants}, C={conditions}"
    )]
    IndexOutOfRange {
        /// Offending participant number.
        participant_id: u32,
        /// Offending condition code.
        condition_id: u32,
        /// Declared number of participants.
        participants: usize,
        /// Declared number of conditions.
        conditions: usize,
    },
}

/// Fixed effects and scales decoded from a position.
pub(crate) struct FixedPart {
    pub beta_d: FixedEffects,
    pub beta_c: FixedEffects,
    pub sigma_d: f64,
    pub sigma_c: f64,
}

impl FixedPart {
    fn decode(position: &[f64]) -> Self {
        Self {
            beta_d: FixedEffects::from_slice(&position[D_EFFECTS]),
            beta_c: FixedEffects::from_slice(&position[C_EFFECTS]),
            sigma_d: math::exp(position[SIGMA_D]),
            sigma_c: math::exp(position[SIGMA_C]),
        }
    }
}

/// A declared hierarchical SDT model bound to its observed rows.
#[derive(Debug, Clone)]
pub struct SdtModel {
    hierarchy: Hierarchy,
    dims: ModelDims,
    rows: Vec<TrialAggregate>,
    layout: ParameterLayout,
    /// Per condition (matrix hierarchy) or per row (participant intercept).
    design: Vec<ConditionDesign>,
    latent_offsets: (usize, usize),
}

/// Build the matrix-hierarchy model (P×C latent d′ and criterion cells).
pub fn apply_matrix_hierarchy_model(rows: &[TrialAggregate]) -> Result<SdtModel, ModelError> {
    SdtModel::new(Hierarchy::MatrixHierarchy, rows)
}

/// Build the participant-intercept model (P non-centered offsets per target).
pub fn apply_participant_intercept_model(
    rows: &[TrialAggregate],
) -> Result<SdtModel, ModelError> {
    SdtModel::new(Hierarchy::ParticipantIntercept, rows)
}

impl SdtModel {
    /// Declare a model with P and C taken as the number of distinct
    /// participant ids and condition codes.
    pub fn new(hierarchy: Hierarchy, rows: &[TrialAggregate]) -> Result<Self, ModelError> {
        Self::with_dims(hierarchy, rows, ModelDims::from_rows(rows))
    }

    /// Declare a model with explicit dimensions.
    ///
    /// Rows must index participants `1..=P` and conditions `0..C`. Counts
    /// are not checked here.
    pub fn with_dims(
        hierarchy: Hierarchy,
        rows: &[TrialAggregate],
        dims: ModelDims,
    ) -> Result<Self, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyData);
        }
        if let Some(row) = rows.iter().find(|r| {
            r.participant_id == 0
                || r.participant_index() >= dims.participants
                || r.condition_index() >= dims.conditions
        }) {
            return Err(ModelError::IndexOutOfRange {
                participant_id: row.participant_id,
                condition_id: row.condition_id,
                participants: dims.participants,
                conditions: dims.conditions,
            });
        }

        let mut layout = ParameterLayout::new();
        for name in FIXED_EFFECTS {
            layout.push(name, &[], Transform::Identity);
        }
        for name in SCALES {
            layout.push(name, &[], Transform::Log);
        }

        let [latent_d, latent_c] = hierarchy.latent_blocks();
        let (columns, latent_offsets) = match hierarchy {
            Hierarchy::MatrixHierarchy => {
                let shape = [dims.participants, dims.conditions];
                let off_d = layout.push(latent_d, &shape, Transform::Identity);
                let off_c = layout.push(latent_c, &shape, Transform::Identity);
                (encode_conditions(dims.conditions), (off_d, off_c))
            }
            Hierarchy::ParticipantIntercept => {
                let shape = [dims.participants];
                let off_d = layout.push(latent_d, &shape, Transform::Identity);
                let off_c = layout.push(latent_c, &shape, Transform::Identity);
                (encode_rows(rows), (off_d, off_c))
            }
        };

        tracing::debug!(
            hierarchy = hierarchy.name(),
            participants = dims.participants,
            conditions = dims.conditions,
            rows = rows.len(),
            dim = layout.dim(),
            "declared SDT model"
        );

        Ok(Self {
            hierarchy,
            dims,
            rows: rows.to_vec(),
            layout,
            design: designs(&columns),
            latent_offsets,
        })
    }

    /// The injected hierarchy strategy.
    pub fn hierarchy(&self) -> Hierarchy {
        self.hierarchy
    }

    /// Declared dimensions.
    pub fn dims(&self) -> ModelDims {
        self.dims
    }

    /// Observed rows.
    pub fn rows(&self) -> &[TrialAggregate] {
        &self.rows
    }

    /// Named layout of the parameter vector.
    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    /// Number of hierarchy-owned latent parameters: `2·P·C` or `2·P`.
    pub fn latent_cardinality(&self) -> usize {
        self.layout.dim() - SHARED_PARAMS
    }

    /// Uniform(−jitter, jitter) starting point on the unconstrained scale.
    pub fn initial_position<R: Rng>(&self, rng: &mut R, jitter: f64) -> Vec<f64> {
        if jitter <= 0.0 {
            return vec![0.0; self.layout.dim()];
        }
        (0..self.layout.dim())
            .map(|_| rng.random_range(-jitter..jitter))
            .collect()
    }

    /// Latent (d′, criterion) of every row at an unconstrained position.
    pub fn row_latents(&self, position: &[f64]) -> Vec<(f64, f64)> {
        let fixed = FixedPart::decode(position);
        let (off_d, off_c) = self.latent_offsets;
        match self.hierarchy {
            Hierarchy::MatrixHierarchy => self
                .rows
                .iter()
                .map(|row| {
                    let cell = row.participant_index() * self.dims.conditions + row.condition_index();
                    (position[off_d + cell], position[off_c + cell])
                })
                .collect(),
            Hierarchy::ParticipantIntercept => self
                .rows
                .iter()
                .zip(&self.design)
                .map(|(row, design)| {
                    let p = row.participant_index();
                    (
                        design.predict(&fixed.beta_d) + position[off_d + p] * fixed.sigma_d,
                        design.predict(&fixed.beta_c) + position[off_c + p] * fixed.sigma_c,
                    )
                })
                .collect(),
        }
    }

    /// Row latents averaged over every draw of a posterior fitted to this
    /// model.
    ///
    /// In the participant-intercept hierarchy the fixed intercepts and the
    /// participant offsets trade off, so only their sum per row is identified.
    pub fn posterior_row_latents(&self, posterior: &Posterior) -> Vec<(f64, f64)> {
        let mut sums = vec![(0.0, 0.0); self.rows.len()];
        let mut n = 0usize;
        for draw in posterior.draws() {
            let position = self.layout.unconstrain(draw);
            for (sum, (d, c)) in sums.iter_mut().zip(self.row_latents(&position)) {
                sum.0 += d;
                sum.1 += c;
            }
            n += 1;
        }
        let n = n.max(1) as f64;
        sums.into_iter().map(|(d, c)| (d / n, c / n)).collect()
    }

    /// Hit and false-alarm rates of every row at an unconstrained position.
    pub fn row_rates(&self, position: &[f64]) -> Vec<SdtRates> {
        self.row_latents(position)
            .into_iter()
            .map(|(d, c)| sdt_rates(d, c))
            .collect()
    }

    /// Per-cell (d′, criterion) matrices of shape P × C.
    ///
    /// The matrix hierarchy reads its latent cells directly; the
    /// participant-intercept hierarchy evaluates its predictor for every cell.
    pub fn cell_latents(&self, position: &[f64]) -> (LatentMatrix, LatentMatrix) {
        let (p_count, c_count) = (self.dims.participants, self.dims.conditions);
        let (off_d, off_c) = self.latent_offsets;
        match self.hierarchy {
            Hierarchy::MatrixHierarchy => (
                LatentMatrix::from_fn(p_count, c_count, |p, c| position[off_d + p * c_count + c]),
                LatentMatrix::from_fn(p_count, c_count, |p, c| position[off_c + p * c_count + c]),
            ),
            Hierarchy::ParticipantIntercept => {
                let fixed = FixedPart::decode(position);
                let by_condition = encode_conditions(c_count);
                let design = designs(&by_condition);
                (
                    LatentMatrix::from_fn(p_count, c_count, |p, c| {
                        design[c].predict(&fixed.beta_d) + position[off_d + p] * fixed.sigma_d
                    }),
                    LatentMatrix::from_fn(p_count, c_count, |p, c| {
                        design[c].predict(&fixed.beta_c) + position[off_c + p] * fixed.sigma_c
                    }),
                )
            }
        }
    }
}

impl LogDensity for SdtModel {
    fn dim(&self) -> usize {
        self.layout.dim()
    }

    fn log_density_gradient(&self, position: &[f64], gradient: &mut [f64]) -> f64 {
        gradient.fill(0.0);
        let fixed = FixedPart::decode(position);
        let mut lp = 0.0;

        for i in D_EFFECTS.chain(C_EFFECTS) {
            lp += normal_ln_pdf(position[i], 0.0, FIXED_EFFECT_PRIOR_SCALE);
            gradient[i] += prior::normal_ln_pdf_dx(position[i], 0.0, FIXED_EFFECT_PRIOR_SCALE);
        }

        for i in [SIGMA_D, SIGMA_C] {
            let (value, grad) = prior::half_normal_log_scale(position[i], SIGMA_PRIOR_SCALE);
            lp += value;
            gradient[i] += grad;
        }

        lp += match self.hierarchy {
            Hierarchy::MatrixHierarchy => {
                hierarchy::matrix_log_density(self, position, gradient, &fixed)
            }
            Hierarchy::ParticipantIntercept => {
                hierarchy::intercept_log_density(self, position, gradient, &fixed)
            }
        };

        lp
    }
}

fn designs(columns: &DesignColumns) -> Vec<ConditionDesign> {
    (0..columns.len()).filter_map(|i| columns.get(i)).collect()
}
