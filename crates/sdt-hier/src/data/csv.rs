//! CSV parsing for aggregate and trial-level response data.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sdt_core::TrialAggregate;

use super::{validate_aggregates, DataError};

const AGGREGATE_COLUMNS: [&str; 6] = ["pnum", "condition", "hits", "nSignal", "false_alarms", "nNoise"];
const TRIAL_COLUMNS: [&str; 4] = ["pnum", "condition", "signal", "response"];

/// Load one row per participant × condition.
///
/// # Example file content
/// ```csv
/// pnum,condition,hits,nSignal,false_alarms,nNoise
/// 1,0,41,50,12,50
/// 1,1,45,50,9,50
/// ```
///
/// # Errors
/// Returns `DataError` if the file is missing or malformed, or if the rows
/// fail [`validate_aggregates`].
pub fn load_aggregate_csv(path: &Path) -> Result<Vec<TrialAggregate>, DataError> {
    let mut rows = Vec::new();
    for_each_record(path, &AGGREGATE_COLUMNS, |line, v| {
        rows.push(TrialAggregate::new(
            v.int(line, 0)?,
            v.int(line, 1)?,
            v.int(line, 3)?,
            v.int(line, 2)?,
            v.int(line, 5)?,
            v.int(line, 4)?,
        ));
        Ok(())
    })?;

    validate_aggregates(&rows)?;
    tracing::debug!(rows = rows.len(), path = %path.display(), "loaded aggregate data");
    Ok(rows)
}

/// Load one row per trial and aggregate per participant × condition.
///
/// `signal` is 1 on signal trials and 0 on noise trials; `response` is 1 for
/// a "yes" response.
///
/// # Example file content
/// ```csv
/// pnum,condition,signal,response
/// 1,0,1,1
/// 1,0,0,0
/// ```
pub fn load_trial_csv(path: &Path) -> Result<Vec<TrialAggregate>, DataError> {
    let mut cells: BTreeMap<(u32, u32), TrialAggregate> = BTreeMap::new();
    let mut trials = 0usize;
    for_each_record(path, &TRIAL_COLUMNS, |line, v| {
        let pnum = v.int(line, 0)?;
        let condition = v.int(line, 1)?;
        let signal = v.flag(line, 2)?;
        let response = v.flag(line, 3)?;

        let cell = cells
            .entry((pnum, condition))
            .or_insert_with(|| TrialAggregate::new(pnum, condition, 0, 0, 0, 0));
        if signal {
            cell.signal_trials += 1;
            cell.hits += u32::from(response);
        } else {
            cell.noise_trials += 1;
            cell.false_alarms += u32::from(response);
        }
        trials += 1;
        Ok(())
    })?;

    let rows: Vec<TrialAggregate> = cells.into_values().collect();
    validate_aggregates(&rows)?;
    tracing::debug!(trials, rows = rows.len(), path = %path.display(), "aggregated trial data");
    Ok(rows)
}

/// Values of the required columns on one line.
struct Record<'a> {
    names: &'a [&'a str],
    values: Vec<&'a str>,
}

impl Record<'_> {
    fn int(&self, line: usize, i: usize) -> Result<u32, DataError> {
        let raw = self.values[i];
        parse_count(raw).ok_or_else(|| DataError::InvalidValue {
            line,
            column: self.names[i].to_string(),
            value: raw.to_string(),
        })
    }

    fn flag(&self, line: usize, i: usize) -> Result<bool, DataError> {
        match self.int(line, i)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DataError::InvalidValue {
                line,
                column: self.names[i].to_string(),
                value: self.values[i].to_string(),
            }),
        }
    }
}

/// Non-negative integer, also accepting integral floats such as `12.0`.
fn parse_count(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let x: f64 = raw.parse().ok()?;
    (x >= 0.0 && x.fract() == 0.0 && x <= f64::from(u32::MAX)).then_some(x as u32)
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(|f| f.trim().trim_matches('"')).collect()
}

fn for_each_record<F>(path: &Path, columns: &[&str], mut f: F) -> Result<(), DataError>
where
    F: FnMut(usize, &Record<'_>) -> Result<(), DataError>,
{
    if !path.exists() {
        return Err(DataError::FileNotFound(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines().enumerate();

    // The first non-empty line is the header.
    let positions = loop {
        let Some((_, line_result)) = lines.next() else {
            return Err(DataError::Empty);
        };
        let line = line_result?;
        let line = line.trim();
        if !line.is_empty() {
            break column_positions(&split_fields(line), columns)?;
        }
    };

    for (line_num, line_result) in lines {
        let line = line_result?;
        let line = line.trim();
        let line_no = line_num + 1;

        // Skip empty lines
        if line.is_empty() {
            continue;
        }

        let fields = split_fields(line);
        let values = positions
            .iter()
            .map(|&p| {
                fields.get(p).copied().ok_or_else(|| DataError::Parse {
                    line: line_no,
                    message: format!("expected at least {} columns, got {}", p + 1, fields.len()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        f(line_no, &Record { names: columns, values })?;
    }

    Ok(())
}

fn column_positions(header: &[&str], columns: &[&str]) -> Result<Vec<usize>, DataError> {
    columns
        .iter()
        .map(|&column| {
            header
                .iter()
                .position(|h| *h == column)
                .ok_or_else(|| DataError::MissingColumn {
                    column: column.to_string(),
                    found: header.iter().map(|h| h.to_string()).collect(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count("12.5"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("abc"), None);
    }

    #[test]
    fn test_header_columns_any_order() {
        let header = split_fields("\"nNoise\", extra,pnum,condition,hits,nSignal,false_alarms");
        let positions = column_positions(&header, &AGGREGATE_COLUMNS).unwrap();
        assert_eq!(positions, vec![2, 3, 4, 5, 6, 0]);

        let err = column_positions(&header[1..], &AGGREGATE_COLUMNS).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "nNoise"));
    }
}
