//! Hierarchical Bayesian signal detection models for 2×2 factorial designs.
//!
//! This crate wraps `sdt-core` with everything that needs a standard library:
//! reading CSV data, running chains in parallel, and reporting.
//!
//! # Quick Start
//!
//! ```ignore
//! use sdt_hier::{data::load_aggregate_csv, fit_rows, Config, Hierarchy, Report};
//! use sdt_hier::report::{ReportSink, TerminalSink};
//! use std::path::Path;
//!
//! let rows = load_aggregate_csv(Path::new("sdt_data.csv"))?;
//! let fit = fit_rows(&rows, Hierarchy::ParticipantIntercept, &Config::default())?;
//! TerminalSink::new(std::io::stdout()).emit(&Report::from_fit(&fit)?)?;
//! ```
//!
//! # Models
//!
//! - [`Hierarchy::MatrixHierarchy`]: latent d′ and criterion per participant
//!   and condition, centered on the condition means
//! - [`Hierarchy::ParticipantIntercept`]: one non-centered offset per
//!   participant on each of d′ and criterion

pub mod config;
pub mod data;
mod error;
pub mod fit;
pub mod output;
pub mod report;

pub use config::{Config, ConfigError};
pub use data::DataError;
pub use error::{Error, Result};
pub use fit::{fit, fit_rows, Fit, SamplerDiagnostics};
pub use report::{JsonSink, Report, ReportSink, TerminalSink};

// Re-export the model core
pub use sdt_core::{
    apply_matrix_hierarchy_model, apply_participant_intercept_model, EffectComparison, Hierarchy,
    ParameterSummary, Posterior, SdtModel, TrialAggregate,
};
