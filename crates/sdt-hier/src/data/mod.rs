//! Loading and validating aggregate response counts.
//!
//! Two CSV layouts are supported:
//!
//! - **Aggregate**: one row per participant × condition with the columns
//!   `pnum, condition, hits, nSignal, false_alarms, nNoise`
//! - **Trial level**: one row per trial with `pnum, condition, signal,
//!   response` (0/1 flags), aggregated on load
//!
//! Columns may appear in any order; extra columns are ignored.
//!
//! # Example
//!
//! ```ignore
//! use sdt_hier::data::load_aggregate_csv;
//! use std::path::Path;
//!
//! let rows = load_aggregate_csv(Path::new("sdt_data.csv"))?;
//! println!("Loaded {} participant × condition rows", rows.len());
//! ```

mod csv;

pub use csv::{load_aggregate_csv, load_trial_csv};

use std::collections::BTreeSet;
use std::path::PathBuf;

use sdt_core::TrialAggregate;

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The input file does not exist.
    #[error("data file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// IO error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV at a specific line (1-indexed).
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A required column is absent from the header.
    #[error("missing column '{column}' (found: {found:?})")]
    MissingColumn { column: String, found: Vec<String> },

    /// A cell could not be read as the expected kind of value.
    #[error("invalid value for '{column}' at line {line}: '{value}'")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    /// A count exceeds its number of trials.
    #[error(
        "participant {participant_id}, condition {condition_id}: {count} {what} out of {trials} trials"
    )]
    CountExceedsTrials {
        participant_id: u32,
        condition_id: u32,
        what: &'static str,
        count: u32,
        trials: u32,
    },

    /// Participant ids are not exactly `1..=P`.
    #[error("participant ids must be 1..={expected}, found {found:?}")]
    NonContiguousParticipants { expected: usize, found: Vec<u32> },

    /// Condition codes are not exactly `0..C`.
    #[error("condition codes must be 0..{expected}, found {found:?}")]
    NonContiguousConditions { expected: usize, found: Vec<u32> },

    /// No data rows.
    #[error("no data rows")]
    Empty,
}

/// Check that rows can be handed to a model.
///
/// Counts must not exceed their trials, participant ids must be `1..=P` and
/// condition codes `0..C` without gaps.
pub fn validate_aggregates(rows: &[TrialAggregate]) -> Result<(), DataError> {
    if rows.is_empty() {
        return Err(DataError::Empty);
    }

    if let Some(row) = rows.iter().find(|r| !r.counts_within_bounds()) {
        let (what, count, trials) = if row.hits > row.signal_trials {
            ("hits", row.hits, row.signal_trials)
        } else {
            ("false alarms", row.false_alarms, row.noise_trials)
        };
        return Err(DataError::CountExceedsTrials {
            participant_id: row.participant_id,
            condition_id: row.condition_id,
            what,
            count,
            trials,
        });
    }

    let participants: BTreeSet<u32> = rows.iter().map(|r| r.participant_id).collect();
    if !participants.iter().copied().eq(1..=participants.len() as u32) {
        return Err(DataError::NonContiguousParticipants {
            expected: participants.len(),
            found: participants.into_iter().collect(),
        });
    }

    let conditions: BTreeSet<u32> = rows.iter().map(|r| r.condition_id).collect();
    if !conditions.iter().copied().eq(0..conditions.len() as u32) {
        return Err(DataError::NonContiguousConditions {
            expected: conditions.len(),
            found: conditions.into_iter().collect(),
        });
    }

    Ok(())
}
