//! Tests for CSV loading.

use std::io::Write;
use std::path::Path;

use sdt_hier::data::{load_aggregate_csv, load_trial_csv, DataError};
use sdt_hier::TrialAggregate;
use tempfile::NamedTempFile;

fn csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn aggregate_csv_loads_rows() {
    let file = csv(
        "pnum,condition,hits,nSignal,false_alarms,nNoise\n\
         1,0,41,50,12,50\n\
         1,1,45,50,9,50\n\
         \n\
         2,0,30,40,20,60\n\
         2,1,38,40,11,60\n",
    );
    let rows = load_aggregate_csv(file.path()).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], TrialAggregate::new(1, 0, 50, 41, 50, 12));
    assert_eq!(rows[2], TrialAggregate::new(2, 0, 40, 30, 60, 20));
}

#[test]
fn aggregate_csv_accepts_any_column_order_and_extras() {
    let file = csv(
        "nNoise,false_alarms,note,nSignal,hits,condition,pnum\n\
         50,12,a,50,41,0,1\n\
         50,9,b,50,45,1,1\n",
    );
    let rows = load_aggregate_csv(file.path()).unwrap();
    assert_eq!(rows[1], TrialAggregate::new(1, 1, 50, 45, 50, 9));
}

#[test]
fn missing_file_is_reported_before_anything_else() {
    let err = load_aggregate_csv(Path::new("/nonexistent/sdt_data.csv")).unwrap_err();
    assert!(matches!(err, DataError::FileNotFound(_)));
    assert!(err.to_string().contains("sdt_data.csv"));
}

#[test]
fn missing_column_is_reported() {
    let file = csv("pnum,condition,hits,nSignal,nNoise\n1,0,1,2,2\n");
    let err = load_aggregate_csv(file.path()).unwrap_err();
    assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "false_alarms"));
}

#[test]
fn counts_above_trials_are_rejected() {
    let file = csv("pnum,condition,hits,nSignal,false_alarms,nNoise\n1,0,51,50,0,50\n");
    let err = load_aggregate_csv(file.path()).unwrap_err();
    assert!(matches!(err, DataError::CountExceedsTrials { .. }));
}

#[test]
fn malformed_values_carry_line_numbers() {
    let file = csv("pnum,condition,hits,nSignal,false_alarms,nNoise\n1,0,4,50,x,50\n");
    match load_aggregate_csv(file.path()).unwrap_err() {
        DataError::InvalidValue { line, column, value } => {
            assert_eq!(line, 2);
            assert_eq!(column, "false_alarms");
            assert_eq!(value, "x");
        }
        other => panic!("unexpected error: {other}"),
    }

    let file = csv("pnum,condition,hits,nSignal,false_alarms,nNoise\n1,0,4\n");
    assert!(matches!(
        load_aggregate_csv(file.path()).unwrap_err(),
        DataError::Parse { line: 2, .. }
    ));
}

#[test]
fn header_only_is_empty() {
    let file = csv("pnum,condition,hits,nSignal,false_alarms,nNoise\n");
    assert!(matches!(load_aggregate_csv(file.path()), Err(DataError::Empty)));
    let file = csv("");
    assert!(matches!(load_aggregate_csv(file.path()), Err(DataError::Empty)));
}

#[test]
fn trial_csv_is_aggregated_per_cell() {
    let file = csv(
        "pnum,condition,signal,response,rt\n\
         1,0,1,1,0.41\n\
         1,0,1,0,0.52\n\
         1,0,0,1,0.47\n\
         1,0,0,0,0.60\n\
         1,0,0,0,0.38\n\
         1,1,1,1,0.33\n\
         1,1,0,0,0.45\n",
    );
    let rows = load_trial_csv(file.path()).unwrap();
    assert_eq!(
        rows,
        vec![
            TrialAggregate::new(1, 0, 2, 1, 3, 1),
            TrialAggregate::new(1, 1, 1, 1, 1, 0),
        ]
    );
}

#[test]
fn trial_flags_must_be_binary() {
    let file = csv("pnum,condition,signal,response\n1,0,2,1\n");
    assert!(matches!(
        load_trial_csv(file.path()).unwrap_err(),
        DataError::InvalidValue { ref column, .. } if column == "signal"
    ));
}
