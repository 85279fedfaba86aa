//! Logistic-link SDT likelihood.
//!
//! Latent sensitivity d′ and criterion c map to response probabilities via
//!
//! ```text
//! hit_rate         = σ(d′ − c)
//! false_alarm_rate = σ(−c)
//! ```
//!
//! and the observed counts are binomial:
//!
//! ```text
//! hits         ~ Binomial(signal_trials, hit_rate)
//! false_alarms ~ Binomial(noise_trials, false_alarm_rate)
//! ```
//!
//! This is the equal-variance SDT model with the logistic link standing in
//! for the normal CDF.

use crate::math;
use crate::types::TrialAggregate;

/// Hit and false-alarm probabilities of one (d′, c) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SdtRates {
    /// P("yes" | signal).
    pub hit_rate: f64,
    /// P("yes" | noise).
    pub false_alarm_rate: f64,
}

/// Map latent d′ and criterion to response probabilities.
///
/// Both rates lie in the open interval (0, 1) for every real input.
#[inline]
pub fn sdt_rates(d_prime: f64, criterion: f64) -> SdtRates {
    SdtRates {
        hit_rate: math::logistic(d_prime - criterion),
        false_alarm_rate: math::logistic(-criterion),
    }
}

/// Log-likelihood of one aggregate row and its partial derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLikelihood {
    /// `ln p(hits, false_alarms | d′, c)`; `-inf` for counts above trial totals.
    pub log_lik: f64,
    /// ∂ log_lik / ∂ d′.
    pub grad_d: f64,
    /// ∂ log_lik / ∂ c.
    pub grad_c: f64,
}

/// `ln C(n, k)`, or `-inf` when `k > n`.
pub fn ln_binomial_coefficient(n: u32, k: u32) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    let (n, k) = (n as f64, k as f64);
    math::ln_gamma(n + 1.0) - math::ln_gamma(k + 1.0) - math::ln_gamma(n - k + 1.0)
}

/// Binomial log-pmf with a logit-scale success probability.
///
/// Returns `(ln pmf, ∂/∂logit)`.
#[inline]
fn binomial_logit(k: u32, n: u32, logit: f64) -> (f64, f64) {
    if k > n {
        return (f64::NEG_INFINITY, 0.0);
    }
    let (kf, nf) = (k as f64, n as f64);
    let log_lik = ln_binomial_coefficient(n, k)
        + kf * math::ln_logistic(logit)
        + (nf - kf) * math::ln_logistic(-logit);
    let grad = kf - nf * math::logistic_raw(logit);
    (log_lik, grad)
}

/// Binomial log-likelihood of a row's hits and false alarms.
///
/// With `η_h = d′ − c` and `η_f = −c`:
///
/// ```text
/// ∂/∂d′ =  (hits − n_s σ(η_h))
/// ∂/∂c  = −(hits − n_s σ(η_h)) − (fa − n_n σ(η_f))
/// ```
pub fn row_log_likelihood(row: &TrialAggregate, d_prime: f64, criterion: f64) -> RowLikelihood {
    let (ll_hit, g_hit) = binomial_logit(row.hits, row.signal_trials, d_prime - criterion);
    let (ll_fa, g_fa) = binomial_logit(row.false_alarms, row.noise_trials, -criterion);
    RowLikelihood {
        log_lik: ll_hit + ll_fa,
        grad_d: g_hit,
        grad_c: -g_hit - g_fa,
    }
}
