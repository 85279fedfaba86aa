//! Fit reports and the sinks that emit them.

use std::io::Write;

use serde::{Deserialize, Serialize};

use sdt_core::constants::{FIXED_EFFECTS, SCALES};
use sdt_core::{summarize, EffectComparison, Hierarchy, ModelDims, ParameterSummary};

use crate::fit::{Fit, SamplerDiagnostics};
use crate::output::{json, terminal};
use crate::Error;

/// Everything printed after a fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub model: Hierarchy,
    pub dims: ModelDims,
    /// Summary rows for the fixed effects and hierarchical scales.
    pub summary: Vec<ParameterSummary>,
    pub comparison: EffectComparison,
    pub diagnostics: SamplerDiagnostics,
}

impl Report {
    /// Summarize a fit.
    pub fn from_fit(fit: &Fit) -> Result<Self, Error> {
        let names: Vec<&str> = FIXED_EFFECTS.iter().chain(SCALES.iter()).copied().collect();
        Ok(Self {
            model: fit.hierarchy,
            dims: fit.dims,
            summary: summarize(&fit.posterior, &names)?,
            comparison: EffectComparison::from_posterior(&fit.posterior)?,
            diagnostics: fit.diagnostics.clone(),
        })
    }

    /// Summary row for one parameter.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSummary> {
        self.summary.iter().find(|row| row.name == name)
    }
}

/// Destination for reports.
pub trait ReportSink {
    fn emit(&mut self, report: &Report) -> Result<(), Error>;
}

/// Human-readable text, coloured when the terminal supports it.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TerminalSink<W> {
    fn emit(&mut self, report: &Report) -> Result<(), Error> {
        self.out.write_all(terminal::format_report(report).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Pretty-printed JSON, one document per report.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn emit(&mut self, report: &Report) -> Result<(), Error> {
        writeln!(self.out, "{}", json::to_json_pretty(report)?)?;
        self.out.flush()?;
        Ok(())
    }
}
