//! Math functions for no_std compatibility.
//!
//! In no_std mode, f64 doesn't have transcendental methods like sqrt, ln, exp, etc.
//! This module provides these functions using libm, together with the
//! numerically stable logistic helpers the likelihood is built on.

/// Smallest probability the logistic link reports.
///
/// `logistic(x)` underflows to exactly 0.0 for `x < -745`; the result is
/// floored here so rates stay in the open interval (0, 1) in floating point.
pub const PROB_FLOOR: f64 = f64::MIN_POSITIVE;

/// Largest probability the logistic link reports (the largest f64 below 1).
pub const PROB_CEIL: f64 = 1.0 - f64::EPSILON / 2.0;

/// Square root.
#[inline]
pub fn sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}

/// Natural logarithm.
#[inline]
pub fn ln(x: f64) -> f64 {
    libm::log(x)
}

/// `ln(1 + x)`, accurate for small `x`.
#[inline]
pub fn ln_1p(x: f64) -> f64 {
    libm::log1p(x)
}

/// Exponential (e^x).
#[inline]
pub fn exp(x: f64) -> f64 {
    libm::exp(x)
}

/// Log-gamma function `ln Γ(x)`.
#[inline]
pub fn ln_gamma(x: f64) -> f64 {
    libm::lgamma(x)
}

/// Power (x^y).
#[inline]
pub fn pow(x: f64, y: f64) -> f64 {
    libm::pow(x, y)
}

/// Floor (round down).
#[inline]
pub fn floor(x: f64) -> f64 {
    libm::floor(x)
}

/// Round to nearest integer.
#[inline]
pub fn round(x: f64) -> f64 {
    libm::round(x)
}

/// Square (x^2).
#[inline]
pub fn sq(x: f64) -> f64 {
    x * x
}

/// Absolute value.
#[inline]
pub fn abs(x: f64) -> f64 {
    libm::fabs(x)
}

/// Logistic (inverse logit) function `1 / (1 + e^{-x})`.
///
/// Evaluated on the branch that never exponentiates a positive argument,
/// then bounded to `[PROB_FLOOR, PROB_CEIL]`.
#[inline]
pub fn logistic(x: f64) -> f64 {
    let p = if x >= 0.0 {
        1.0 / (1.0 + exp(-x))
    } else {
        let e = exp(x);
        e / (1.0 + e)
    };
    p.clamp(PROB_FLOOR, PROB_CEIL)
}

/// `ln(logistic(x))` without underflow.
///
/// ```text
/// x ≥ 0:  -ln(1 + e^{-x})
/// x < 0:   x - ln(1 + e^{x})
/// ```
#[inline]
pub fn ln_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        -ln_1p(exp(-x))
    } else {
        x - ln_1p(exp(x))
    }
}

/// Unclamped logistic, used where the derivative `n·σ(x)` must stay exact.
#[inline]
pub(crate) fn logistic_raw(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + exp(-x))
    } else {
        let e = exp(x);
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logistic_symmetry() {
        for &x in &[0.0, 0.5, 1.0, 3.0, 10.0] {
            let lhs = logistic(x) + logistic(-x);
            assert!((lhs - 1.0).abs() < 1e-12, "σ(x) + σ(-x) = {}", lhs);
        }
        assert!((logistic(0.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_logistic_saturates_inside_open_interval() {
        for &x in &[-1e6, -800.0, -50.0, 50.0, 800.0, 1e6] {
            let p = logistic(x);
            assert!(p > 0.0 && p < 1.0, "logistic({}) = {} left (0, 1)", x, p);
        }
    }

    #[test]
    fn test_ln_logistic_matches_naive_in_safe_range() {
        for i in -20..=20 {
            let x = i as f64 * 0.5;
            let naive = ln(1.0 / (1.0 + exp(-x)));
            assert!((ln_logistic(x) - naive).abs() < 1e-12);
        }
        // Far tail stays finite where the naive form gives -inf.
        assert!((ln_logistic(-1000.0) + 1000.0).abs() < 1e-9);
        assert!(ln_logistic(1000.0).abs() < 1e-300);
    }

    #[test]
    fn test_ln_gamma_factorials() {
        // Γ(5) = 24
        assert!((ln_gamma(5.0) - ln(24.0)).abs() < 1e-12);
        assert!(ln_gamma(1.0).abs() < 1e-12);
    }
}
