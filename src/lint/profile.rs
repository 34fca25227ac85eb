use crate::error::{LintError, LintResult};
use crate::lint::rule::{Rule, RuleRegistry};
use crate::lint::types::Severity;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_FILE_TIMEOUT_MS: u64 = 10_000;
pub const MIN_FILE_TIMEOUT_MS: u64 = 100;

fn default_file_timeout_ms() -> u64 {
    DEFAULT_FILE_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Rules to run; empty means every registered rule
    #[serde(default)]
    pub enabled_rules: Vec<String>,
    #[serde(default)]
    pub disabled_rules: Vec<String>,
    #[serde(default)]
    pub severity_overrides: HashMap<String, Severity>,
    /// Report every warning as an error
    #[serde(default)]
    pub promote_warnings: bool,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub parallelism: ParallelismConfig,
    #[serde(default = "default_file_timeout_ms")]
    pub file_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParallelismConfig {
    #[default]
    Auto,
    Serial,
    Parallel(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Fail when more warnings than this are reported
    pub max_warnings: Option<usize>,
    /// Fail on any diagnostic at or above this severity
    pub fail_on: Severity,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            max_warnings: None,
            fail_on: Severity::Error,
        }
    }
}

impl LintProfile {
    pub const BUILTIN: &'static [&'static str] = &["recommended", "strict"];

    /// Load profile from TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context(format!("Failed to read profile from {:?}", path.as_ref()))?;

        let profile: LintProfile =
            toml::from_str(&content).context("Failed to parse profile TOML")?;

        Ok(profile)
    }

    /// Built-in profile by name, or a TOML profile file; validated against the registry.
    pub fn resolve(name_or_path: &str, registry: &RuleRegistry) -> Result<Self> {
        let profile = match name_or_path {
            "recommended" => Self::recommended(),
            "strict" => Self::strict(),
            other if Path::new(other).is_file() => Self::load_from_file(other)?,
            other => {
                return Err(LintError::InvalidProfile(format!(
                    "unknown profile '{other}' (expected {} or a TOML file)",
                    Self::BUILTIN.join(", ")
                ))
                .into());
            }
        };
        profile
            .validate(registry)
            .context(format!("Invalid profile '{}'", profile.name))?;
        Ok(profile)
    }

    /// All rules at their default severities, failing on errors only
    pub fn recommended() -> Self {
        Self {
            name: "recommended".to_string(),
            description: "All rules at default severities; fails on errors".to_string(),
            enabled_rules: vec![],
            disabled_rules: vec![],
            severity_overrides: HashMap::new(),
            promote_warnings: false,
            thresholds: ThresholdConfig::default(),
            parallelism: ParallelismConfig::Auto,
            file_timeout_ms: DEFAULT_FILE_TIMEOUT_MS,
        }
    }

    /// Warnings promoted to errors, no warnings tolerated
    pub fn strict() -> Self {
        Self {
            name: "strict".to_string(),
            description: "Warnings are errors; any violation fails the run".to_string(),
            promote_warnings: true,
            thresholds: ThresholdConfig {
                max_warnings: Some(0),
                fail_on: Severity::Error,
            },
            ..Self::recommended()
        }
    }

    /// Validate profile configuration
    pub fn validate(&self, registry: &RuleRegistry) -> LintResult<()> {
        let referenced = self
            .enabled_rules
            .iter()
            .chain(&self.disabled_rules)
            .chain(self.severity_overrides.keys());
        for id in referenced {
            if !registry.contains(id) {
                return Err(LintError::UnknownRule(id.clone()));
            }
        }

        if self.parallelism == ParallelismConfig::Parallel(0) {
            return Err(LintError::InvalidProfile(
                "parallelism must be at least 1".to_string(),
            ));
        }

        if self.file_timeout_ms < MIN_FILE_TIMEOUT_MS {
            return Err(LintError::InvalidProfile(format!(
                "file_timeout_ms must be at least {MIN_FILE_TIMEOUT_MS}ms, got {}",
                self.file_timeout_ms
            )));
        }

        Ok(())
    }

    pub fn is_enabled(&self, rule_id: &str) -> bool {
        let selected =
            self.enabled_rules.is_empty() || self.enabled_rules.iter().any(|id| id == rule_id);
        selected && !self.disabled_rules.iter().any(|id| id == rule_id)
    }

    /// Override first, then warning promotion, then the rule's default.
    pub fn effective_severity(&self, rule: &dyn Rule) -> Severity {
        if let Some(severity) = self.severity_overrides.get(rule.id()) {
            return *severity;
        }
        match rule.default_severity() {
            Severity::Warning if self.promote_warnings => Severity::Error,
            severity => severity,
        }
    }

    /// Number of files linted concurrently
    pub fn worker_count(&self) -> usize {
        match self.parallelism {
            ParallelismConfig::Serial => 1,
            ParallelismConfig::Parallel(n) => n.max(1),
            ParallelismConfig::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

impl Default for LintProfile {
    fn default() -> Self {
        Self::recommended()
    }
}
