//! Terminal output formatting with colors.

use colored::Colorize;

use sdt_core::comparison::TargetComparison;
use sdt_core::ParameterSummary;

use crate::fit::SamplerDiagnostics;
use crate::report::Report;

/// Format a report for human-readable terminal output.
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();
    let sep = "\u{2500}".repeat(72);

    out.push_str(&format!(
        "\n  {} {} model, {} participants \u{00D7} {} conditions\n",
        "SDT".bold(),
        report.model.description(),
        report.dims.participants,
        report.dims.conditions
    ));
    out.push_str(&sep);
    out.push_str("\n\n  Convergence Diagnostics\n\n");
    out.push_str(&format_summary_table(&report.summary, report.diagnostics.r_hat_warning));

    out.push('\n');
    out.push_str(&format_diagnostics_section(&report.diagnostics));

    out.push('\n');
    out.push_str(&sep);
    out.push_str("\n\n  Effect Size Comparison\n\n");
    out.push_str(&format_target("d\u{2032} (sensitivity)", &report.comparison.d_prime));
    out.push_str(&format_target("c (decision criterion)", &report.comparison.criterion));

    out.push_str("\n  Posterior Probabilities\n\n");
    out.push_str(&format!(
        "    P(|Stimulus effect| > |Difficulty effect|) for d\u{2032}:       {:.3}\n",
        report.comparison.d_prime.prob_stimulus_larger
    ));
    out.push_str(&format!(
        "    P(|Stimulus effect| > |Difficulty effect|) for criterion: {:.3}\n",
        report.comparison.criterion.prob_stimulus_larger
    ));
    out
}

/// Format the `mean sd hdi mcse ess r_hat` table; R̂ above `r_hat_warning`
/// is shown in red.
pub fn format_summary_table(rows: &[ParameterSummary], r_hat_warning: f64) -> String {
    let mut out = format!(
        "    {:<15} {:>8} {:>8} {:>9} {:>9} {:>9} {:>9} {:>6}\n",
        "", "mean", "sd", "hdi_3%", "hdi_97%", "mcse_mean", "ess", "r_hat"
    );
    for row in rows {
        let r_hat = format!("{:>6.2}", row.r_hat);
        let r_hat = if row.r_hat > r_hat_warning {
            r_hat.red().to_string()
        } else {
            r_hat
        };
        out.push_str(&format!(
            "    {:<15} {:>8.3} {:>8.3} {:>9.3} {:>9.3} {:>9.3} {:>9.0} {}\n",
            row.name, row.mean, row.sd, row.hdi_low, row.hdi_high, row.mcse_mean, row.ess, r_hat
        ));
    }
    out
}

/// Format sampler health.
pub fn format_diagnostics_section(diagnostics: &SamplerDiagnostics) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "    Chains:       {} \u{00D7} {} draws\n",
        diagnostics.chains, diagnostics.draws_per_chain
    ));
    out.push_str(&format!(
        "    Acceptance:   {:.3} (mean tree depth {:.1})\n",
        diagnostics.mean_accept_stat, diagnostics.mean_tree_depth
    ));

    let divergences = if diagnostics.divergences == 0 {
        "0".green().to_string()
    } else {
        diagnostics.divergences.to_string().red().to_string()
    };
    out.push_str(&format!("    Divergences:  {}\n", divergences));
    out.push_str(&format!("    Max R\u{0302}:        {:.3}\n", diagnostics.max_r_hat));

    if diagnostics.max_r_hat > diagnostics.r_hat_warning {
        out.push_str(&format!(
            "    {} chains have not converged (R\u{0302} above {})\n",
            "\u{26A0}".yellow(),
            diagnostics.r_hat_warning
        ));
    }

    if diagnostics.max_depth_hits > 0 {
        out.push_str(&format!(
            "    {} {} transitions hit the maximum tree depth\n",
            "\u{26A0}".yellow(),
            diagnostics.max_depth_hits
        ));
    }
    out
}

fn format_target(label: &str, target: &TargetComparison) -> String {
    format!(
        "    {}:\n      Stimulus effect   = {:.3} \u{00B1} {:.3}\n      Difficulty effect = {:.3} \u{00B1} {:.3}\n",
        label.bold(),
        target.stimulus.mean,
        target.stimulus.sd,
        target.difficulty.mean,
        target.difficulty.sd
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, r_hat: f64) -> ParameterSummary {
        ParameterSummary {
            name: name.into(),
            mean: 0.5,
            sd: 0.1,
            hdi_low: 0.3,
            hdi_high: 0.7,
            mcse_mean: 0.002,
            ess: 2500.0,
            r_hat,
        }
    }

    #[test]
    fn test_summary_table_lists_rows() {
        colored::control::set_override(false);
        let table = format_summary_table(&[row("stim_effect_d", 1.0), row("sigma_c", 1.2)], 1.01);
        assert!(table.contains("stim_effect_d"));
        assert!(table.contains("sigma_c"));
        assert!(table.contains("r_hat"));
        assert_eq!(table.lines().count(), 3);
    }

    fn diagnostics(max_r_hat: f64, r_hat_warning: f64) -> SamplerDiagnostics {
        SamplerDiagnostics {
            chains: 4,
            draws_per_chain: 1000,
            divergences: 0,
            max_depth_hits: 0,
            mean_accept_stat: 0.93,
            mean_tree_depth: 3.2,
            step_sizes: vec![0.3; 4],
            max_r_hat,
            min_ess: 800.0,
            r_hat_warning,
        }
    }

    #[test]
    fn test_r_hat_warning_uses_configured_threshold() {
        let warning = "chains have not converged";
        let section = format_diagnostics_section(&diagnostics(1.03, 1.01));
        assert!(section.contains(warning));
        assert!(section.contains("above 1.01"));

        // A looser threshold accepts the same chains.
        let section = format_diagnostics_section(&diagnostics(1.03, 1.05));
        assert!(!section.contains(warning));
        assert!(section.contains("1.030"));
    }
}
