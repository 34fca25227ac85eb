//! Lint execution engine
//!
//! Runs every enabled rule over each file. Files are linted concurrently on the
//! tokio runtime, bounded by the profile's parallelism; parsing and rule
//! evaluation happen on the blocking pool and each file is bounded by the
//! profile's per-file timeout.

use crate::error::LintError;
use crate::lint::profile::LintProfile;
use crate::lint::rule::{Rule, RuleContext, RuleRegistry, RuleSettings};
use crate::lint::types::*;
use crate::lint::verdict::compute_verdict;
use crate::logging::file_span;
use crate::parse::ParsedFile;
use crate::source::{self, DiscoveredFile, FileKind, SourceFile, display_path};
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Lint execution engine
#[derive(Clone)]
pub struct LintExecutor {
    registry: Arc<RuleRegistry>,
    profile: Arc<LintProfile>,
    settings: Arc<RuleSettings>,
}

impl LintExecutor {
    /// Create new executor with registry, profile and rule settings
    pub fn new(registry: RuleRegistry, profile: LintProfile, settings: RuleSettings) -> Self {
        Self {
            registry: Arc::new(registry),
            profile: Arc::new(profile),
            settings: Arc::new(settings),
        }
    }

    pub fn profile(&self) -> &LintProfile {
        &self.profile
    }

    /// Rules the profile enables, in registry order
    pub fn enabled_rules(&self) -> Vec<&Arc<dyn Rule>> {
        self.registry
            .get_all()
            .iter()
            .filter(|rule| self.profile.is_enabled(rule.id()))
            .collect()
    }

    /// Lint one in-memory file. Parses once and hands the result to every rule.
    pub fn lint_source(&self, source: &SourceFile) -> FileResult {
        let start = Instant::now();
        let path = source.display_path();
        let parsed = ParsedFile::parse(source);
        let context = RuleContext {
            source,
            settings: &self.settings,
        };

        let mut diagnostics = vec![];
        for rule in self.enabled_rules() {
            if !rule.applies_to(source.kind) {
                continue;
            }
            let severity = self.profile.effective_severity(rule.as_ref());
            for finding in rule.check(&context, &parsed) {
                diagnostics.push(Diagnostic {
                    fingerprint: Diagnostic::fingerprint_for(
                        rule.id(),
                        &path,
                        finding.span,
                        &finding.message,
                    ),
                    rule_id: rule.id().to_string(),
                    category: rule.category(),
                    severity,
                    message: finding.message,
                    path: path.clone(),
                    span: finding.span,
                    suggestion: finding.suggestion,
                });
            }
        }
        diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::trace!(
            path = %path,
            diagnostic_count = diagnostics.len(),
            duration_ms = duration_ms,
            "File linted"
        );

        FileResult {
            path,
            kind: source.kind,
            diagnostics,
            duration_ms,
            parse_error: None,
        }
    }

    /// Load and lint one file within the per-file timeout
    async fn lint_file(&self, file: DiscoveredFile) -> FileResult {
        let start = Instant::now();
        let timeout_ms = self.profile.file_timeout_ms;

        let work = async {
            let source = source::load(&file).await?;
            let executor = self.clone();
            let result = tokio::task::spawn_blocking(move || executor.lint_source(&source))
                .await
                .map_err(|err| LintError::Parse {
                    path: file.relative_path.clone(),
                    message: format!("lint task failed: {err}"),
                })?;
            Ok::<_, LintError>(result)
        };

        let error = match tokio::time::timeout(Duration::from_millis(timeout_ms), work).await {
            Ok(Ok(result)) => return result,
            Ok(Err(err)) => err,
            Err(_) => LintError::Timeout {
                path: file.relative_path.clone(),
                timeout_ms,
            },
        };

        tracing::warn!(
            path = %file.relative_path.display(),
            category = error.category(),
            error = %error,
            "File could not be linted"
        );

        FileResult {
            path: display_path(&file.relative_path),
            kind: file.kind,
            diagnostics: vec![],
            duration_ms: start.elapsed().as_millis() as u64,
            parse_error: Some(error.to_string()),
        }
    }

    /// Lint every file, at most `worker_count` at a time. Results are sorted by path.
    pub async fn lint_files(&self, files: Vec<DiscoveredFile>) -> Vec<FileResult> {
        let workers = self.profile.worker_count();
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        tracing::debug!(
            file_count = files.len(),
            workers = workers,
            "Dispatching lint tasks"
        );

        // files whose task has not reported back yet
        let mut pending: HashMap<String, FileKind> = HashMap::new();

        for file in files {
            let executor = self.clone();
            let semaphore = semaphore.clone();
            let path = display_path(&file.relative_path);
            pending.insert(path.clone(), file.kind);
            let span = file_span(&path);
            tasks.spawn(
                async move {
                    // the semaphore is never closed
                    let _permit = semaphore.acquire_owned().await.ok();
                    executor.lint_file(file).await
                }
                .instrument(span),
            );
        }

        let mut results = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    pending.remove(&result.path);
                    results.push(result);
                }
                Err(err) => {
                    tracing::error!(error = %err, "Lint task panicked");
                    failures.push(err.to_string());
                }
            }
        }

        // a panicked task cannot name its file; whatever is still pending is it
        for (path, kind) in pending {
            let reason = failures
                .pop()
                .unwrap_or_else(|| "lint task did not complete".to_string());
            results.push(FileResult {
                path,
                kind,
                diagnostics: vec![],
                duration_ms: 0,
                parse_error: Some(format!("lint task failed: {reason}")),
            });
        }

        results.sort_by(|a, b| Path::new(&a.path).cmp(Path::new(&b.path)));
        results
    }

    /// Lint every file and assemble the report
    pub async fn run(&self, files: Vec<DiscoveredFile>) -> LintReport {
        let start = Instant::now();

        tracing::info!(
            profile = %self.profile.name,
            rule_count = self.enabled_rules().len(),
            file_count = files.len(),
            "Starting lint run"
        );

        let files = self.lint_files(files).await;
        let summary = LintSummary::from_files(&files);
        let verdict = compute_verdict(&summary, &self.profile.thresholds, &files);
        let rule_counts = LintReport::rule_counts_for(&files);
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            verdict = %verdict,
            errors = summary.errors,
            warnings = summary.warnings,
            duration_ms = duration_ms,
            "Completed lint run"
        );

        LintReport {
            verdict,
            profile: self.profile.name.clone(),
            summary,
            files,
            rule_counts,
            generated_at: Utc::now(),
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::profile::ParallelismConfig;
    use crate::parse::Position;
    use crate::source::FileKind;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    struct SlowRule;

    impl Rule for SlowRule {
        fn id(&self) -> &str {
            "slow-rule"
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Scripts
        }

        fn default_severity(&self) -> Severity {
            Severity::Warning
        }

        fn description(&self) -> &str {
            "Sleeps before reporting nothing"
        }

        fn applies_to(&self, kind: FileKind) -> bool {
            kind == FileKind::Js
        }

        fn check(&self, _context: &RuleContext<'_>, _parsed: &ParsedFile) -> Vec<Finding> {
            std::thread::sleep(Duration::from_millis(400));
            vec![]
        }
    }

    struct PanickingRule;

    impl Rule for PanickingRule {
        fn id(&self) -> &str {
            "panicking-rule"
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Markup
        }

        fn default_severity(&self) -> Severity {
            Severity::Error
        }

        fn description(&self) -> &str {
            "Panics on every file"
        }

        fn applies_to(&self, _kind: FileKind) -> bool {
            true
        }

        fn check(&self, _context: &RuleContext<'_>, _parsed: &ParsedFile) -> Vec<Finding> {
            panic!("rule bug");
        }
    }

    fn executor(profile: LintProfile) -> LintExecutor {
        LintExecutor::new(RuleRegistry::with_all_rules(), profile, RuleSettings::default())
    }

    fn discovered(root: &Path, rel: &str, contents: &[u8]) -> DiscoveredFile {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        DiscoveredFile {
            kind: FileKind::from_path(&path),
            path,
            relative_path: PathBuf::from(rel),
        }
    }

    #[test]
    fn lint_source_stamps_and_sorts_diagnostics() {
        let source = SourceFile::from_string(
            "js/app.js",
            "if (a == b) {}\nvar x = 1;\ndocument.write(x);",
        );
        let result = executor(LintProfile::recommended()).lint_source(&source);

        let ids: Vec<_> = result.diagnostics.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["eqeqeq", "no-var", "no-document-write"]);
        assert!(result.diagnostics.iter().all(|d| d.path == "js/app.js"));
        assert_eq!(result.diagnostics[2].severity, Severity::Error);
        assert_eq!(result.diagnostics[0].span.unwrap().start, Position::new(1, 7));
        assert!(result.parse_error.is_none());
    }

    #[test]
    fn profile_controls_rules_and_severity() {
        let source = SourceFile::from_string("js/app.js", "var x = 1 == 2;");

        let strict = executor(LintProfile::strict()).lint_source(&source);
        assert!(strict.diagnostics.iter().all(|d| d.severity == Severity::Error));

        let mut profile = LintProfile::recommended();
        profile.disabled_rules = vec!["eqeqeq".to_string()];
        let result = executor(profile).lint_source(&source);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].rule_id, "no-var");
    }

    #[test]
    fn rules_only_see_their_file_kinds() {
        let source = SourceFile::from_string("css/site.css", ".card { color: red; }");
        assert!(executor(LintProfile::recommended())
            .lint_source(&source)
            .diagnostics
            .is_empty());
    }

    #[tokio::test]
    async fn lint_files_sorts_results_and_records_parse_errors() {
        let dir = tempdir().unwrap();
        let files = vec![
            discovered(dir.path(), "js/b.js", b"let b = 1;"),
            discovered(dir.path(), "css/bad.css", &[0xff, 0xfe]),
            discovered(dir.path(), "js/a.js", b"var a = 1;"),
        ];

        let results = executor(LintProfile::recommended()).lint_files(files).await;
        let paths: Vec<_> = results.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["css/bad.css", "js/a.js", "js/b.js"]);
        assert!(results[0].parse_error.as_deref().unwrap().contains("UTF-8"));
        assert_eq!(results[1].diagnostics.len(), 1);
        assert!(results[2].diagnostics.is_empty());
    }

    #[tokio::test]
    async fn results_follow_path_component_order() {
        let dir = tempdir().unwrap();
        let files = vec![
            discovered(dir.path(), "css-x/a.css", b""),
            discovered(dir.path(), "css/a.css", b""),
        ];

        let results = executor(LintProfile::recommended()).lint_files(files).await;
        let paths: Vec<_> = results.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["css/a.css", "css-x/a.css"]);
    }

    #[tokio::test]
    async fn panicking_rule_fails_the_file_not_the_run() {
        let dir = tempdir().unwrap();
        let files = vec![
            discovered(dir.path(), "index.html", b"<p>hi</p>"),
            discovered(dir.path(), "js/app.js", b"let a = 1;"),
        ];

        let mut registry = RuleRegistry::new();
        registry.register(Arc::new(PanickingRule)).unwrap();
        let executor = LintExecutor::new(registry, LintProfile::recommended(), RuleSettings::default());

        let report = executor.run(files).await;
        assert_eq!(report.summary.files_checked, 2);
        assert_eq!(report.summary.parse_errors, 2);
        assert!(report.files.iter().all(|f| {
            f.parse_error
                .as_deref()
                .is_some_and(|e| e.contains("lint task failed"))
        }));
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[tokio::test]
    async fn serial_profile_lints_everything() {
        let dir = tempdir().unwrap();
        let files: Vec<_> = (0..5)
            .map(|i| discovered(dir.path(), &format!("js/f{i}.js"), b"var x;"))
            .collect();

        let mut profile = LintProfile::recommended();
        profile.parallelism = ParallelismConfig::Serial;
        let results = executor(profile).lint_files(files).await;
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.diagnostics.len() == 1));
    }

    #[tokio::test]
    async fn slow_files_time_out() {
        let dir = tempdir().unwrap();
        let files = vec![discovered(dir.path(), "js/slow.js", b"let x;")];

        let mut registry = RuleRegistry::new();
        registry.register(Arc::new(SlowRule)).unwrap();
        let mut profile = LintProfile::recommended();
        profile.file_timeout_ms = 100;

        let executor = LintExecutor::new(registry, profile, RuleSettings::default());
        let results = executor.lint_files(files).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].diagnostics.is_empty());
        assert!(results[0].parse_error.as_deref().unwrap().contains("exceeded 100ms"));
    }

    #[tokio::test]
    async fn run_builds_report() {
        let dir = tempdir().unwrap();
        let files = vec![
            discovered(
                dir.path(),
                "index.html",
                b"<!DOCTYPE html>\n<html lang=\"en\"><body><img src=\"a.png\"></body></html>",
            ),
            discovered(dir.path(), "js/app.js", b"var a = 1;"),
        ];

        let report = executor(LintProfile::recommended()).run(files).await;
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.profile, "recommended");
        assert_eq!(report.summary.files_checked, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.warnings, 1);
        assert_eq!(report.rule_counts.get("img-alt"), Some(&1));
    }
}
