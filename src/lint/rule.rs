//! Rule trait and registry

use crate::error::{LintError, LintResult};
use crate::lint::types::*;
use crate::parse::ParsedFile;
use crate::source::{FileKind, SourceFile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_BEM_PREFIXES: &[&str] = &["js-", "is-", "has-"];
pub const DEFAULT_CSS_DIRS: &[&str] = &["css", "styles"];
pub const DEFAULT_JS_DIRS: &[&str] = &["js", "scripts"];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BemSettings {
    /// Class prefixes exempt from BEM validation (state and JS hooks)
    pub allowed_prefixes: Vec<String>,
}

impl Default for BemSettings {
    fn default() -> Self {
        Self {
            allowed_prefixes: strings(DEFAULT_BEM_PREFIXES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub css_dirs: Vec<String>,
    pub js_dirs: Vec<String>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            css_dirs: strings(DEFAULT_CSS_DIRS),
            js_dirs: strings(DEFAULT_JS_DIRS),
        }
    }
}

/// Rule-specific settings shared by every file of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    pub bem: BemSettings,
    pub layout: LayoutSettings,
}

/// Context handed to every rule invocation
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub source: &'a SourceFile,
    pub settings: &'a RuleSettings,
}

/// A single style-guide convention
pub trait Rule: Send + Sync {
    /// Unique kebab-case identifier (e.g., "no-inline-style")
    fn id(&self) -> &str;

    fn category(&self) -> RuleCategory;

    fn default_severity(&self) -> Severity;

    /// Human-readable description
    fn description(&self) -> &str;

    /// File kinds this rule inspects
    fn applies_to(&self, kind: FileKind) -> bool;

    /// Evaluate the rule against one parsed file
    fn check(&self, context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding>;
}

/// Registry of all available rules
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: vec![] }
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) -> LintResult<()> {
        if self.get_by_id(rule.id()).is_some() {
            return Err(LintError::Config(format!(
                "rule '{}' registered twice",
                rule.id()
            )));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn get_all(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn get_by_category(&self, category: RuleCategory) -> Vec<&Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|r| r.category() == category)
            .collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get_by_id(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.id())
    }

    /// Create a registry with all built-in rules
    pub fn with_all_rules() -> Self {
        crate::lint::rules::create_registry()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
