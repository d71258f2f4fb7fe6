use std::fmt::Write;

use super::types::ValidationReport;

/// Renders a report as plain text, one finding per line.
#[must_use]
pub fn format_report(report: &ValidationReport) -> String {
    let s = &report.summary;
    let mut out = String::new();
    let status = if report.valid { "VALID" } else { "INVALID" };
    let _ = writeln!(
        out,
        "{status}: {} error(s), {} warning(s) across {} panel(s), {} rule(s)",
        s.errors, s.warnings, s.panels, s.rules_run
    );
    if !report.errors.is_empty() {
        out.push_str("Errors:\n");
        for v in &report.errors {
            let _ = writeln!(out, "  {v}");
        }
    }
    if !report.warnings.is_empty() {
        out.push_str("Warnings:\n");
        for v in &report.warnings {
            let _ = writeln!(out, "  {v}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::types::{ValidationSummary, Violation};
    use super::*;

    #[test]
    fn report_lists_findings() {
        let report = ValidationReport {
            valid: false,
            errors: vec![Violation::error("dimensions.bounds", "too small").measured(4.0, 10.0)],
            warnings: vec![Violation::warning("extensions.long-fingers", "long")],
            summary: ValidationSummary {
                rules_run: 2,
                panels: 6,
                panel_pairs: 15,
                errors: 1,
                warnings: 1,
            },
        };
        let text = format_report(&report);
        assert!(text.starts_with("INVALID: 1 error(s), 1 warning(s)"));
        assert!(text.contains("[ERROR] dimensions.bounds: too small value=4.000 tol=10.000"));
        assert!(text.contains("[WARN] extensions.long-fingers"));
    }
}
