//! JSON serialization for fit reports.

use crate::report::Report;

/// Serialize a report to a pretty-printed JSON string.
pub fn to_json_pretty(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
