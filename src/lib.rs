pub mod config;
pub mod error;
pub mod lint;
pub mod logging;
pub mod parse;
pub mod source;

pub use config::{CliArgs, LintConfig};
pub use error::{LintError, LintResult};
pub use lint::{
    LintExecutor, LintProfile, LintReport, ParallelismConfig, ReportFormat, ReportRenderer,
    RuleRegistry, Severity, Verdict,
};
pub use logging::{LoggingConfig, init_logging};

use anyhow::{Context, Result};
use source::SourceFilter;
use std::fmt::Write as _;
use std::path::Path;

/// Resolve the configured profile and apply command-line overrides on top of it.
pub fn build_profile(config: &LintConfig, registry: &RuleRegistry) -> Result<LintProfile> {
    let mut profile = LintProfile::resolve(&config.profile, registry)?;

    if let Some(rules) = &config.rules {
        profile.enabled_rules = rules.clone();
    }
    for id in &config.disabled_rules {
        if !profile.disabled_rules.contains(id) {
            profile.disabled_rules.push(id.clone());
        }
    }
    if let Some(max) = config.max_warnings {
        profile.thresholds.max_warnings = Some(max);
    }
    if let Some(jobs) = config.jobs {
        profile.parallelism = match jobs {
            1 => ParallelismConfig::Serial,
            n => ParallelismConfig::Parallel(n),
        };
    }

    profile
        .validate(registry)
        .context("Invalid rule selection")?;
    Ok(profile)
}

/// Discover, lint and summarize everything the configuration points at.
pub async fn run(config: LintConfig) -> Result<LintReport> {
    config.ensure_paths_exist()?;

    let registry = RuleRegistry::with_all_rules();
    let profile = build_profile(&config, &registry)?;
    let filter = SourceFilter::new(&config.include, &config.exclude)?;
    let files = source::discover(&config.paths, &filter)?;
    if files.is_empty() {
        return Err(LintError::NoInputs.into());
    }

    tracing::info!(
        paths = ?config.paths,
        profile = %profile.name,
        file_count = files.len(),
        "linting"
    );

    let executor = LintExecutor::new(registry, profile, config.settings.clone());
    Ok(executor.run(files).await)
}

/// Render the report and write it to `output`, or stdout when unset.
pub fn write_report(report: &LintReport, format: ReportFormat, output: Option<&Path>) -> Result<()> {
    let rendered = ReportRenderer::render(report, format)?;
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write report to {:?}", path)),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}

/// One line per rule: id, category, default severity and description.
pub fn rule_table(registry: &RuleRegistry) -> String {
    let width = registry.ids().map(str::len).max().unwrap_or(0);
    let mut out = String::new();
    for rule in registry.get_all() {
        let _ = writeln!(
            out,
            "{:<width$}  {:<7}  {:<7}  {}",
            rule.id(),
            rule.category().to_string(),
            rule.default_severity().to_string(),
            rule.description(),
        );
    }
    out
}
