//! Stylesheet rules.

use crate::lint::rule::{Rule, RuleContext};
use crate::lint::types::*;
use crate::parse::ParsedFile;
use crate::source::FileKind;

pub struct NoIdSelectors;

impl Rule for NoIdSelectors {
    fn id(&self) -> &str {
        "no-id-selectors"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Styles
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &str {
        "Style with classes, not ids"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Css
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let ParsedFile::Css(sheet) = parsed else {
            return vec![];
        };
        sheet
            .style_rules()
            .into_iter()
            .flat_map(|rule| rule.selectors.iter())
            .flat_map(|selector| {
                selector.ids.iter().map(move |(id, span)| {
                    Finding::new(format!("id selector '#{id}' in '{}'", selector.text))
                        .at(*span)
                        .with_suggestion(format!("Give the element a class and select .{id} instead"))
                })
            })
            .collect()
    }
}

pub struct NoImportant;

impl Rule for NoImportant {
    fn id(&self) -> &str {
        "no-important"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Styles
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &str {
        "Avoid !important; fix specificity instead"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Css
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let ParsedFile::Css(sheet) = parsed else {
            return vec![];
        };
        sheet
            .declarations()
            .into_iter()
            .filter(|decl| decl.important)
            .map(|decl| {
                Finding::new(format!("!important on '{}'", decl.property))
                    .at(decl.span)
                    .with_suggestion("Lower the specificity of the competing rule instead")
            })
            .collect()
    }
}
