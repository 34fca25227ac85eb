use crate::parse::Span;
use crate::source::FileKind;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Severity level of a diagnostic
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Which part of the style guide a rule enforces
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RuleCategory {
    Markup,
    Styles,
    Scripts,
    Layout,
}

/// A violation as reported by a rule, before the executor stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    pub span: Option<Span>,
    pub suggestion: Option<String>,
}

impl Finding {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
            suggestion: None,
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// A finding attributed to a rule and a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostic {
    pub rule_id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    pub message: String,
    pub path: String,
    pub span: Option<Span>,
    pub suggestion: Option<String>,
    /// Stable hash of rule, path, position and message
    pub fingerprint: String,
}

impl Diagnostic {
    pub fn fingerprint_for(rule_id: &str, path: &str, span: Option<Span>, message: &str) -> String {
        let (line, column) = span
            .map(|s| (s.start.line, s.start.column))
            .unwrap_or((0, 0));
        let mut hasher = Sha256::new();
        hasher.update(format!("{rule_id}|{path}|{line}|{column}|{message}"));
        format!("{:x}", hasher.finalize())
    }

    /// Sort key: position first, rule id to break ties.
    pub fn sort_key(&self) -> (usize, usize, &str) {
        let (line, column) = self
            .span
            .map(|s| (s.start.line, s.start.column))
            .unwrap_or((0, 0));
        (line, column, self.rule_id.as_str())
    }
}

/// Outcome of linting a single file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileResult {
    pub path: String,
    pub kind: FileKind,
    pub diagnostics: Vec<Diagnostic>,
    pub duration_ms: u64,
    /// Set when the file could not be read, decoded or linted in time
    pub parse_error: Option<String>,
}

impl FileResult {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn has_issues(&self) -> bool {
        !self.diagnostics.is_empty() || self.parse_error.is_some()
    }
}

/// Overall verdict: Pass or Fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

/// Summary counts over a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LintSummary {
    pub files_checked: usize,
    pub files_with_issues: usize,
    pub parse_errors: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl LintSummary {
    pub fn from_files(files: &[FileResult]) -> Self {
        let mut summary = LintSummary {
            files_checked: files.len(),
            ..Default::default()
        };
        for file in files {
            if file.has_issues() {
                summary.files_with_issues += 1;
            }
            if file.parse_error.is_some() {
                summary.parse_errors += 1;
            }
            summary.errors += file.count(Severity::Error);
            summary.warnings += file.count(Severity::Warning);
            summary.infos += file.count(Severity::Info);
        }
        summary
    }

    pub fn problems(&self) -> usize {
        self.errors + self.warnings + self.infos
    }
}

/// Full result of a lint run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LintReport {
    pub verdict: Verdict,
    pub profile: String,
    pub summary: LintSummary,
    pub files: Vec<FileResult>,
    /// Diagnostic count per rule id, most frequent first
    pub rule_counts: IndexMap<String, usize>,
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl LintReport {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().flat_map(|f| f.diagnostics.iter())
    }

    pub fn rule_counts_for(files: &[FileResult]) -> IndexMap<String, usize> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for diagnostic in files.iter().flat_map(|f| f.diagnostics.iter()) {
            *counts.entry(diagnostic.rule_id.clone()).or_default() += 1;
        }
        counts.sort_by(|ka, va, kb, vb| vb.cmp(va).then_with(|| ka.cmp(kb)));
        counts
    }
}
