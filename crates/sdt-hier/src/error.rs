//! Crate-level error type.

use sdt_core::{ComparisonError, ModelError, PosteriorError, SamplerError};

use crate::config::ConfigError;
use crate::data::DataError;

/// Any failure between reading data and writing a report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("model declaration failed: {0}")]
    Model(#[from] ModelError),

    #[error("sampler failed: {0}")]
    Sampler(#[from] SamplerError),

    #[error("no initial position with finite log density for chain {chain} after {attempts} attempts")]
    NoFiniteInitialPosition { chain: usize, attempts: usize },

    #[error(transparent)]
    Posterior(#[from] PosteriorError),

    #[error("effect comparison failed: {0}")]
    Comparison(#[from] ComparisonError),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
