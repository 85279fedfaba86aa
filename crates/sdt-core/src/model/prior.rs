//! Log densities of the priors used by both hierarchies.

use crate::constants::{LN_2, LOG_2PI};
use crate::math;

/// Normal(μ, σ) log density.
#[inline]
pub fn normal_ln_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    -0.5 * LOG_2PI - math::ln(sigma) - 0.5 * z * z
}

/// ∂/∂x of the Normal(μ, σ) log density.
#[inline]
pub fn normal_ln_pdf_dx(x: f64, mu: f64, sigma: f64) -> f64 {
    -(x - mu) / (sigma * sigma)
}

/// HalfNormal(σ) log density on `x > 0`.
#[inline]
pub fn half_normal_ln_pdf(x: f64, sigma: f64) -> f64 {
    LN_2 + normal_ln_pdf(x, 0.0, sigma)
}

/// HalfNormal(σ) log density of `x = e^u`, including the log-Jacobian `u`.
///
/// Returns `(value, ∂/∂u)`.
#[inline]
pub fn half_normal_log_scale(u: f64, sigma: f64) -> (f64, f64) {
    let x = math::exp(u);
    let value = half_normal_ln_pdf(x, sigma) + u;
    let grad = 1.0 - x * x / (sigma * sigma);
    (value, grad)
}
