//! Core of the hierarchical Bayesian signal detection models.
//!
//! This crate holds everything needed to describe and sample the models
//! without touching the filesystem or threads: the condition encoder, the
//! logistic SDT likelihood, the two hierarchical model variants, a NUTS
//! sampler, posterior containers, diagnostics and the stimulus/difficulty
//! effect comparison. It builds under `no_std` with an allocator.
//!
//! # Features
//!
//! - `std` (default): Enable standard library support
//!
//! # Usage
//!
//! ```ignore
//! use sdt_core::{
//!     apply_participant_intercept_model, EffectComparison, NutsConfig, NutsSampler, Posterior,
//! };
//!
//! let model = apply_participant_intercept_model(&rows)?;
//! let chain = NutsSampler::new(NutsConfig::default()).sample(&model, &init)?;
//! let posterior = Posterior::from_chains(model.layout(), &[chain]);
//! let comparison = EffectComparison::from_posterior(&posterior)?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod comparison;
pub mod constants;
pub mod design;
pub mod diagnostics;
pub mod likelihood;
pub mod math;
pub mod model;
pub mod posterior;
pub mod sampler;
pub mod synthetic;
pub mod types;

// Re-export commonly used items at crate root
pub use comparison::{compare_effects, ComparisonError, EffectComparison, EffectStats};
pub use constants::FIXED_EFFECTS;
pub use design::{encode_condition, encode_conditions, ConditionDesign, DesignColumns};
pub use diagnostics::{summarize, ParameterSummary};
pub use likelihood::{row_log_likelihood, sdt_rates, SdtRates};
pub use model::{
    apply_matrix_hierarchy_model, apply_participant_intercept_model, Hierarchy, ModelError,
    ParameterLayout, SdtModel,
};
pub use posterior::{Posterior, PosteriorError};
pub use sampler::{Chain, LogDensity, NutsConfig, NutsSampler, SampleStats, SamplerError};
pub use synthetic::{expected_counts, simulate, SyntheticDesign, TrueEffects};
pub use types::{FixedEffects, ModelDims, TrialAggregate};
