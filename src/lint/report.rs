//! Lint report rendering
//!
//! Renders a `LintReport` as terminal text, JSON or Markdown. Every format lists
//! files in path order and diagnostics in position order.

use crate::lint::types::*;
use crate::lint::verdict::render_narrative;
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

/// Report renderer for lint results
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn render(report: &LintReport, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(Self::render_text(report)),
            ReportFormat::Json => Self::render_json(report),
            ReportFormat::Markdown => Ok(Self::render_markdown(report)),
        }
    }

    pub fn render_json(report: &LintReport) -> Result<String> {
        serde_json::to_string_pretty(report).context("Failed to serialize lint report")
    }

    /// Compact, grep-friendly listing grouped by file
    pub fn render_text(report: &LintReport) -> String {
        let mut out = String::new();

        for file in report.files.iter().filter(|f| f.has_issues()) {
            let _ = writeln!(out, "{}", file.path);
            if let Some(error) = &file.parse_error {
                let _ = writeln!(out, "  parse error: {error}");
            }
            for d in &file.diagnostics {
                let _ = writeln!(
                    out,
                    "  {:<7} {:<7}  {}  {}",
                    Self::location(d),
                    d.severity,
                    d.message,
                    d.rule_id
                );
                if let Some(suggestion) = &d.suggestion {
                    let _ = writeln!(out, "  {:<7} {:<7}  -> {}", "", "", suggestion);
                }
            }
            out.push('\n');
        }

        let s = &report.summary;
        let _ = writeln!(
            out,
            "{} problem(s) ({} error(s), {} warning(s), {} info(s)) in {} of {} file(s)",
            s.problems(),
            s.errors,
            s.warnings,
            s.infos,
            s.files_with_issues,
            s.files_checked
        );
        if s.parse_errors > 0 {
            let _ = writeln!(out, "{} file(s) could not be linted", s.parse_errors);
        }
        let _ = writeln!(out, "Verdict: {} (profile {})", report.verdict, report.profile);
        out
    }

    /// Generate formatted markdown report
    pub fn render_markdown(report: &LintReport) -> String {
        let mut out = String::new();
        Self::write_header(&mut out, report);
        Self::write_summary(&mut out, report);
        if !report.rule_counts.is_empty() {
            Self::write_rule_counts(&mut out, report);
        }
        Self::write_files(&mut out, report);
        if report.diagnostics().any(|d| d.suggestion.is_some()) {
            Self::write_suggestions(&mut out, report);
        }
        out
    }

    fn write_header(out: &mut String, report: &LintReport) {
        out.push_str("# Lint Report\n\n");

        let verdict_emoji = match report.verdict {
            Verdict::Pass => "✅",
            Verdict::Fail => "❌",
        };
        let _ = writeln!(out, "**Verdict**: {} {}", verdict_emoji, report.verdict);
        let _ = writeln!(out, "**Profile**: {}", report.profile);
        let _ = writeln!(out, "**Generated**: {}", report.generated_at.to_rfc3339());
        let _ = writeln!(out, "**Duration**: {}ms\n", report.duration_ms);
        let _ = writeln!(out, "{}\n", render_narrative(report));
    }

    fn write_summary(out: &mut String, report: &LintReport) {
        let s = &report.summary;
        out.push_str("## Summary\n\n");
        let _ = writeln!(out, "- **Files checked**: {}", s.files_checked);
        let _ = writeln!(out, "- **Files with issues**: {}", s.files_with_issues);
        let _ = writeln!(out, "- **Errors**: {}", s.errors);
        let _ = writeln!(out, "- **Warnings**: {}", s.warnings);
        let _ = writeln!(out, "- **Info**: {}", s.infos);
        let _ = writeln!(out, "- **Unlintable files**: {}\n", s.parse_errors);
    }

    fn write_rule_counts(out: &mut String, report: &LintReport) {
        out.push_str("## Rules\n\n");
        out.push_str("| Rule | Count |\n");
        out.push_str("|------|-------|\n");
        for (rule_id, count) in &report.rule_counts {
            let _ = writeln!(out, "| `{rule_id}` | {count} |");
        }
        out.push('\n');
    }

    fn write_files(out: &mut String, report: &LintReport) {
        out.push_str("## Files\n\n");

        let files: Vec<_> = report.files.iter().filter(|f| f.has_issues()).collect();
        if files.is_empty() {
            out.push_str("*No problems found.*\n\n");
            return;
        }

        for file in files {
            let _ = writeln!(out, "### {}\n", file.path);
            if let Some(error) = &file.parse_error {
                let _ = writeln!(out, "**Parse error**: {}\n", Self::escape_markdown(error));
            }
            if file.diagnostics.is_empty() {
                continue;
            }
            out.push_str("| Location | Severity | Rule | Message |\n");
            out.push_str("|----------|----------|------|---------|\n");
            for d in &file.diagnostics {
                let _ = writeln!(
                    out,
                    "| {} | {} | `{}` | {} |",
                    Self::location(d),
                    Self::severity_text(d.severity),
                    d.rule_id,
                    Self::escape_markdown(&d.message)
                );
            }
            out.push('\n');
        }
    }

    /// Suggestions grouped by severity, most severe first
    fn write_suggestions(out: &mut String, report: &LintReport) {
        out.push_str("## Suggestions\n\n");

        for (severity, label) in [
            (Severity::Error, "### Errors"),
            (Severity::Warning, "### Warnings"),
            (Severity::Info, "### Info"),
        ] {
            let entries: Vec<_> = report
                .diagnostics()
                .filter(|d| d.severity == severity)
                .filter_map(|d| d.suggestion.as_ref().map(|s| (d, s)))
                .collect();
            if entries.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{label}\n");
            for (d, suggestion) in entries {
                let _ = writeln!(
                    out,
                    "- `{}:{}` ({}): {}",
                    d.path,
                    Self::location(d),
                    d.rule_id,
                    Self::escape_markdown(suggestion)
                );
            }
            out.push('\n');
        }
    }

    fn location(d: &Diagnostic) -> String {
        d.span
            .map(|span| span.start.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    fn severity_text(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }

    /// Escape markdown special characters in text
    fn escape_markdown(text: &str) -> String {
        text.replace('|', "\\|")
            .replace('\n', " ")
            .replace('\r', "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{Position, Span};
    use crate::source::FileKind;
    use chrono::Utc;

    fn diagnostic(rule: &str, severity: Severity, line: usize, suggestion: Option<&str>) -> Diagnostic {
        Diagnostic {
            rule_id: rule.to_string(),
            category: RuleCategory::Markup,
            severity,
            message: format!("{rule} message"),
            path: "index.html".to_string(),
            span: Some(Span::point(Position::new(line, 3))),
            suggestion: suggestion.map(str::to_string),
            fingerprint: "f".to_string(),
        }
    }

    fn create_test_report() -> LintReport {
        let files = vec![
            FileResult {
                path: "css/bad.css".to_string(),
                kind: FileKind::Css,
                diagnostics: vec![],
                duration_ms: 0,
                parse_error: Some("file is not valid UTF-8".to_string()),
            },
            FileResult {
                path: "index.html".to_string(),
                kind: FileKind::Html,
                diagnostics: vec![
                    diagnostic("img-alt", Severity::Error, 4, Some("Add alt")),
                    diagnostic("semantic-tags", Severity::Warning, 7, Some("Use <nav>")),
                ],
                duration_ms: 1,
                parse_error: None,
            },
            FileResult {
                path: "js/app.js".to_string(),
                kind: FileKind::Js,
                diagnostics: vec![],
                duration_ms: 1,
                parse_error: None,
            },
        ];
        LintReport {
            verdict: Verdict::Fail,
            profile: "recommended".to_string(),
            summary: LintSummary::from_files(&files),
            rule_counts: LintReport::rule_counts_for(&files),
            files,
            generated_at: Utc::now(),
            duration_ms: 12,
        }
    }

    #[test]
    fn text_lists_problem_files_only() {
        let text = ReportRenderer::render_text(&create_test_report());
        assert!(text.contains("index.html\n  4:3"));
        assert!(text.contains("parse error: file is not valid UTF-8"));
        assert!(text.contains("-> Add alt"));
        assert!(!text.contains("js/app.js"));
        assert!(text.contains("2 problem(s) (1 error(s), 1 warning(s), 0 info(s)) in 2 of 3 file(s)"));
        assert!(text.ends_with("Verdict: FAIL (profile recommended)\n"));
    }

    #[test]
    fn json_round_trips_through_serde() {
        let json = ReportRenderer::render(&create_test_report(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["verdict"], "fail");
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["files"][1]["diagnostics"][0]["severity"], "error");
        assert_eq!(value["files"][1]["diagnostics"][0]["span"]["start"]["line"], 4);

        let parsed: LintReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.files.len(), 3);
    }

    #[test]
    fn markdown_has_sections() {
        let md = ReportRenderer::render_markdown(&create_test_report());
        assert!(md.starts_with("# Lint Report"));
        assert!(md.contains("**Verdict**: ❌ FAIL"));
        assert!(md.contains("## Summary"));
        assert!(md.contains("| `img-alt` | 1 |"));
        assert!(md.contains("### index.html"));
        assert!(md.contains("| 4:3 | Error | `img-alt` | img-alt message |"));
        assert!(md.contains("**Parse error**: file is not valid UTF-8"));
    }

    #[test]
    fn markdown_suggestions_grouped_by_severity() {
        let md = ReportRenderer::render_markdown(&create_test_report());
        let errors = md.find("### Errors").unwrap();
        let warnings = md.find("### Warnings").unwrap();
        assert!(errors < warnings);
        assert!(md.contains("- `index.html:7:3` (semantic-tags): Use <nav>"));
        assert!(!md.contains("### Info"));
    }

    #[test]
    fn clean_report() {
        let mut report = create_test_report();
        report.files.retain(|f| f.path == "js/app.js");
        report.summary = LintSummary::from_files(&report.files);
        report.rule_counts = LintReport::rule_counts_for(&report.files);
        report.verdict = Verdict::Pass;

        let md = ReportRenderer::render_markdown(&report);
        assert!(md.contains("✅ PASS"));
        assert!(md.contains("*No problems found.*"));
        assert!(!md.contains("## Suggestions"));
        assert!(!md.contains("## Rules"));
    }

    #[test]
    fn escapes_markdown_in_messages() {
        let mut report = create_test_report();
        report.files[1].diagnostics[0].message = "a | b".to_string();
        let md = ReportRenderer::render_markdown(&report);
        assert!(md.contains("a \\| b"));
    }

    #[test]
    fn format_parses_from_str() {
        use std::str::FromStr;
        assert_eq!(ReportFormat::from_str("Markdown").unwrap(), ReportFormat::Markdown);
        assert_eq!(ReportFormat::default().to_string(), "text");
    }
}
