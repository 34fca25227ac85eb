use super::profile::ThresholdConfig;
use super::types::*;

/// Compute overall verdict using severity-first logic
/// Rule: any diagnostic at or above `fail_on`, too many warnings, or a file that
/// could not be linted -> FAIL
pub fn compute_verdict(
    summary: &LintSummary,
    thresholds: &ThresholdConfig,
    files: &[FileResult],
) -> Verdict {
    if !failure_reasons(summary, thresholds, files).is_empty() {
        Verdict::Fail
    } else {
        Verdict::Pass
    }
}

/// Why a run fails, one line per broken threshold
pub fn failure_reasons(
    summary: &LintSummary,
    thresholds: &ThresholdConfig,
    files: &[FileResult],
) -> Vec<String> {
    let mut reasons = vec![];

    let blocking = files
        .iter()
        .flat_map(|f| f.diagnostics.iter())
        .filter(|d| d.severity >= thresholds.fail_on)
        .count();
    if blocking > 0 {
        reasons.push(format!(
            "{} diagnostic(s) at or above {} severity",
            blocking, thresholds.fail_on
        ));
    }

    if let Some(max) = thresholds.max_warnings
        && summary.warnings > max
    {
        reasons.push(format!(
            "{} warning(s) exceed the limit of {}",
            summary.warnings, max
        ));
    }

    if summary.parse_errors > 0 {
        reasons.push(format!("{} file(s) could not be linted", summary.parse_errors));
    }

    reasons
}

/// Render narrative description
pub fn render_narrative(report: &LintReport) -> String {
    let s = &report.summary;
    format!(
        "Lint {} with profile '{}': {} error(s), {} warning(s), {} info(s) in {} of {} file(s).",
        report.verdict,
        report.profile,
        s.errors,
        s.warnings,
        s.infos,
        s.files_with_issues,
        s.files_checked
    )
}
