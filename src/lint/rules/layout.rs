//! Project layout rules. These look only at the relative path.

use crate::lint::rule::{Rule, RuleContext};
use crate::lint::types::*;
use crate::parse::ParsedFile;
use crate::source::FileKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path};

static KEBAB_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("Invalid regex"));

fn ancestor_dirs(relative: &Path) -> impl Iterator<Item = String> + '_ {
    let parent = relative.parent().unwrap_or(Path::new(""));
    parent.components().filter_map(|component| match component {
        Component::Normal(part) => Some(part.to_string_lossy().to_ascii_lowercase()),
        _ => None,
    })
}

/// `camelCase_name` -> `camel-case-name`
fn kebab_case(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len() + 4);
    let mut prev_lower = false;
    for c in stem.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c.is_ascii_alphanumeric() || c == '.' {
            out.push(c);
            prev_lower = c.is_ascii_alphanumeric();
        } else if !out.ends_with('-') {
            out.push('-');
            prev_lower = false;
        }
    }
    out.trim_matches('-').to_string()
}

pub struct FileLayout;

impl Rule for FileLayout {
    fn id(&self) -> &str {
        "file-layout"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Layout
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &str {
        "Stylesheets live under css/, scripts under js/"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        matches!(kind, FileKind::Css | FileKind::Js)
    }

    fn check(&self, context: &RuleContext<'_>, _parsed: &ParsedFile) -> Vec<Finding> {
        let layout = &context.settings.layout;
        let (expected, what) = match context.source.kind {
            FileKind::Css => (&layout.css_dirs, "stylesheet"),
            FileKind::Js => (&layout.js_dirs, "script"),
            _ => return vec![],
        };

        let placed = ancestor_dirs(&context.source.relative_path)
            .any(|dir| expected.iter().any(|want| want.eq_ignore_ascii_case(&dir)));
        if placed || expected.is_empty() {
            return vec![];
        }

        let file_name = context
            .source
            .relative_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        vec![
            Finding::new(format!(
                "{what} '{}' is outside {}",
                context.source.display_path(),
                expected
                    .iter()
                    .map(|dir| format!("{dir}/"))
                    .collect::<Vec<_>>()
                    .join(" or ")
            ))
            .with_suggestion(format!("Move it to {}/{file_name}", expected[0])),
        ]
    }
}

pub struct FileNaming;

impl Rule for FileNaming {
    fn id(&self) -> &str {
        "file-naming"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Layout
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn description(&self) -> &str {
        "File names are lowercase kebab-case"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind != FileKind::Other
    }

    fn check(&self, context: &RuleContext<'_>, _parsed: &ParsedFile) -> Vec<Finding> {
        let path = &context.source.relative_path;
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            return vec![];
        };
        if stem.split('.').all(|segment| KEBAB_SEGMENT.is_match(segment)) {
            return vec![];
        }

        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let finding = Finding::new(format!("file name '{stem}{extension}' is not kebab-case"));
        let guess = kebab_case(&stem);
        if guess.split('.').all(|segment| KEBAB_SEGMENT.is_match(segment)) {
            vec![finding.with_suggestion(format!("Rename to {guess}{extension}"))]
        } else {
            vec![finding]
        }
    }
}
