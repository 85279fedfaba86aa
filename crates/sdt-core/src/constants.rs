//! Constants used throughout the crate.

/// Default deterministic seed for RNG operations.
///
/// Same seed + same data = same draws. The value is the seed the
/// reference analysis scripts sampled with.
pub const DEFAULT_SEED: u64 = 6657;

/// Natural log of 2*pi, used in normal log-pdf computation.
pub const LOG_2PI: f64 = 1.8378770664093453;

/// Natural log of 2, used in the half-normal log-pdf.
pub const LN_2: f64 = core::f64::consts::LN_2;

/// Scale of the Normal(0, s) prior on every fixed-effect coefficient.
pub const FIXED_EFFECT_PRIOR_SCALE: f64 = 1.0;

/// Scale of the HalfNormal(s) prior on `sigma_d` and `sigma_c`.
pub const SIGMA_PRIOR_SCALE: f64 = 1.0;

/// Names of the eight fixed-effect coefficients, in layout order.
pub const FIXED_EFFECTS: [&str; 8] = [
    "intercept_d",
    "stim_effect_d",
    "diff_effect_d",
    "int_effect_d",
    "intercept_c",
    "stim_effect_c",
    "diff_effect_c",
    "int_effect_c",
];

/// Hierarchical standard deviations, in layout order.
pub const SCALES: [&str; 2] = ["sigma_d", "sigma_c"];

/// Probability mass of the highest-density interval in posterior summaries.
pub const HDI_PROB: f64 = 0.94;

/// Energy drop beyond which a NUTS trajectory is flagged divergent.
pub const MAX_ENERGY_ERROR: f64 = 1000.0;
