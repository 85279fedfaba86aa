//! Hierarchy strategies: how each row's latent d′ and criterion are formed.
//!
//! Both strategies share the fixed effects, scale priors and likelihood of
//! [`SdtModel`](super::SdtModel); they differ only in the latent structure.
//!
//! ```text
//! MatrixHierarchy:       d′[p,c] ~ N(μ_d[c], σ_d)         (P×C cells, centered)
//!                        row latent = d′[p_row, c_row]
//! ParticipantIntercept:  α[p] ~ N(0, 1)                    (P offsets, non-centered)
//!                        row latent = x_row·β_d + α[p_row]·σ_d
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::prior::normal_ln_pdf;
use super::{FixedPart, ModelError, SdtModel};
use crate::likelihood::row_log_likelihood;
use crate::types::TrialAggregate;

/// Latent-structure strategy injected into [`SdtModel`](super::SdtModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hierarchy {
    /// Per-(participant × condition) latent matrix around condition means.
    MatrixHierarchy,
    /// Per-participant scalar offsets scaled by the hierarchical SD.
    ParticipantIntercept,
}

impl Hierarchy {
    /// Short identifier used on the command line and in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Hierarchy::MatrixHierarchy => "matrix",
            Hierarchy::ParticipantIntercept => "intercept",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Hierarchy::MatrixHierarchy => "matrix hierarchy (P×C latent cells)",
            Hierarchy::ParticipantIntercept => "participant intercept (P scaled offsets)",
        }
    }

    /// Names of the hierarchy-owned latent blocks, d′ first.
    pub fn latent_blocks(&self) -> [&'static str; 2] {
        match self {
            Hierarchy::MatrixHierarchy => ["d_prime", "criterion"],
            Hierarchy::ParticipantIntercept => ["alpha_p", "c_p"],
        }
    }

    /// Declare this hierarchy's model over `rows`.
    pub fn build(self, rows: &[TrialAggregate]) -> Result<SdtModel, ModelError> {
        SdtModel::new(self, rows)
    }
}

impl fmt::Display for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error parsing a [`Hierarchy`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hierarchy '{0}' (expected 'matrix' or 'intercept')")]
pub struct ParseHierarchyError(pub alloc::string::String);

impl FromStr for Hierarchy {
    type Err = ParseHierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matrix" | "a" | "A" => Ok(Hierarchy::MatrixHierarchy),
            "intercept" | "b" | "B" => Ok(Hierarchy::ParticipantIntercept),
            other => Err(ParseHierarchyError(other.into())),
        }
    }
}

/// Latent prior plus likelihood for the matrix hierarchy.
pub(super) fn matrix_log_density(
    model: &SdtModel,
    position: &[f64],
    gradient: &mut [f64],
    fixed: &FixedPart,
) -> f64 {
    let n_cond = model.dims.conditions;
    let (off_d, off_c) = model.latent_offsets;
    let mut lp = 0.0;

    // d′[p,c] ~ N(μ_d[c], σ_d), criterion[p,c] ~ N(μ_c[c], σ_c)
    for (c, design) in model.design.iter().enumerate() {
        let x = design.row();
        let mu_d = design.predict(&fixed.beta_d);
        let mu_c = design.predict(&fixed.beta_c);

        for p in 0..model.dims.participants {
            let cell = p * n_cond + c;

            let z_d = (position[off_d + cell] - mu_d) / fixed.sigma_d;
            lp += normal_ln_pdf(position[off_d + cell], mu_d, fixed.sigma_d);
            let g_mu_d = z_d / fixed.sigma_d;
            gradient[off_d + cell] -= g_mu_d;
            for k in 0..4 {
                gradient[super::D_EFFECTS.start + k] += g_mu_d * x[k];
            }
            gradient[super::SIGMA_D] += z_d * z_d - 1.0;

            let z_c = (position[off_c + cell] - mu_c) / fixed.sigma_c;
            lp += normal_ln_pdf(position[off_c + cell], mu_c, fixed.sigma_c);
            let g_mu_c = z_c / fixed.sigma_c;
            gradient[off_c + cell] -= g_mu_c;
            for k in 0..4 {
                gradient[super::C_EFFECTS.start + k] += g_mu_c * x[k];
            }
            gradient[super::SIGMA_C] += z_c * z_c - 1.0;
        }
    }

    // Rows select their cell; no summing or averaging.
    for row in &model.rows {
        let cell = row.participant_index() * n_cond + row.condition_index();
        let ll = row_log_likelihood(row, position[off_d + cell], position[off_c + cell]);
        lp += ll.log_lik;
        gradient[off_d + cell] += ll.grad_d;
        gradient[off_c + cell] += ll.grad_c;
    }

    lp
}

/// Latent prior plus likelihood for the participant-intercept hierarchy.
pub(super) fn intercept_log_density(
    model: &SdtModel,
    position: &[f64],
    gradient: &mut [f64],
    fixed: &FixedPart,
) -> f64 {
    let (off_a, off_cp) = model.latent_offsets;
    let mut lp = 0.0;

    // alpha_p[p] ~ N(0, 1), c_p[p] ~ N(0, 1)
    for p in 0..model.dims.participants {
        let a = position[off_a + p];
        let cp = position[off_cp + p];
        lp += normal_ln_pdf(a, 0.0, 1.0) + normal_ln_pdf(cp, 0.0, 1.0);
        gradient[off_a + p] -= a;
        gradient[off_cp + p] -= cp;
    }

    for (row, design) in model.rows.iter().zip(&model.design) {
        let p = row.participant_index();
        let x = design.row();
        let a = position[off_a + p];
        let cp = position[off_cp + p];

        let d_prime = design.predict(&fixed.beta_d) + a * fixed.sigma_d;
        let criterion = design.predict(&fixed.beta_c) + cp * fixed.sigma_c;
        let ll = row_log_likelihood(row, d_prime, criterion);
        lp += ll.log_lik;

        for k in 0..4 {
            gradient[super::D_EFFECTS.start + k] += ll.grad_d * x[k];
            gradient[super::C_EFFECTS.start + k] += ll.grad_c * x[k];
        }
        gradient[off_a + p] += ll.grad_d * fixed.sigma_d;
        gradient[off_cp + p] += ll.grad_c * fixed.sigma_c;
        // σ = e^u, so ∂/∂u = σ·∂/∂σ
        gradient[super::SIGMA_D] += ll.grad_d * a * fixed.sigma_d;
        gradient[super::SIGMA_C] += ll.grad_c * cp * fixed.sigma_c;
    }

    lp
}
