//! Tests for reports and sinks.

use sdt_core::{expected_counts, FixedEffects, SyntheticDesign, TrueEffects};
use sdt_hier::{fit_rows, Config, Hierarchy, JsonSink, Report, ReportSink, TerminalSink};

fn report() -> Report {
    let truth = TrueEffects {
        d: FixedEffects::new(1.0, 0.5, 0.0, 0.0),
        c: FixedEffects::new(0.0, 0.0, 0.0, 0.0),
    };
    let design = SyntheticDesign {
        participants: 2,
        participant_sd_d: 0.2,
        ..SyntheticDesign::default()
    };
    let rows = expected_counts(&truth, &design);
    let config = Config::quick().draws(100).tune(100);
    let fit = fit_rows(&rows, Hierarchy::ParticipantIntercept, &config).unwrap();
    Report::from_fit(&fit).unwrap()
}

#[test]
fn report_summarizes_fixed_effects_and_scales() {
    let report = report();
    assert_eq!(report.summary.len(), 10);
    assert_eq!(report.summary[0].name, "intercept_d");
    assert_eq!(report.summary[9].name, "sigma_c");
    assert!(report.parameter("sigma_d").unwrap().mean > 0.0);
    assert!(report.parameter("alpha_p[0]").is_none());
    assert_eq!(report.comparison.n_draws, 200);
}

#[test]
fn json_sink_round_trips() {
    let report = report();
    let mut sink = JsonSink::new(Vec::new());
    sink.emit(&report).unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();
    let parsed: Report = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.model, Hierarchy::ParticipantIntercept);
    assert_eq!(parsed.summary.len(), report.summary.len());
}

#[test]
fn terminal_sink_prints_comparison() {
    colored::control::set_override(false);
    let mut sink = TerminalSink::new(Vec::new());
    sink.emit(&report()).unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert!(text.contains("Convergence Diagnostics"));
    assert!(text.contains("stim_effect_d"));
    assert!(text.contains("P(|Stimulus effect| > |Difficulty effect|) for criterion"));
}
