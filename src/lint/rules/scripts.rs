//! Script rules, evaluated over the significant token stream.

use crate::lint::rule::{Rule, RuleContext};
use crate::lint::types::*;
use crate::parse::ParsedFile;
use crate::parse::js::JsToken;
use crate::source::FileKind;

fn tokens(parsed: &ParsedFile) -> &[JsToken] {
    match parsed {
        ParsedFile::Js(tokens) => tokens,
        _ => &[],
    }
}

/// Member access (`obj.var`) or property key (`{ var: 1 }`) rather than a declaration.
fn used_as_property_name(tokens: &[JsToken], index: usize) -> bool {
    let after_dot = index > 0 && (tokens[index - 1].is_punct(".") || tokens[index - 1].is_punct("?."));
    let before_colon = tokens.get(index + 1).is_some_and(|next| next.is_punct(":"));
    after_dot || before_colon
}

pub struct NoVar;

impl Rule for NoVar {
    fn id(&self) -> &str {
        "no-var"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Scripts
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &str {
        "Declare variables with let or const"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Js
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let tokens = tokens(parsed);
        tokens
            .iter()
            .enumerate()
            .filter(|(i, token)| token.is_keyword("var") && !used_as_property_name(tokens, *i))
            .map(|(_, token)| {
                Finding::new("'var' declaration")
                    .at(token.span)
                    .with_suggestion("Use const, or let if the binding is reassigned")
            })
            .collect()
    }
}

pub struct Eqeqeq;

impl Rule for Eqeqeq {
    fn id(&self) -> &str {
        "eqeqeq"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Scripts
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &str {
        "Compare with === and !=="
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Js
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        tokens(parsed)
            .iter()
            .filter_map(|token| {
                let strict = if token.is_punct("==") {
                    "==="
                } else if token.is_punct("!=") {
                    "!=="
                } else {
                    return None;
                };
                Some(
                    Finding::new(format!("loose equality '{}'", token.text))
                        .at(token.span)
                        .with_suggestion(format!("Use '{strict}'")),
                )
            })
            .collect()
    }
}

pub struct NoDocumentWrite;

impl Rule for NoDocumentWrite {
    fn id(&self) -> &str {
        "no-document-write"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Scripts
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &str {
        "Never call document.write or document.writeln"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Js
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        tokens(parsed)
            .windows(3)
            .filter(|w| {
                w[0].is_ident("document")
                    && w[1].is_punct(".")
                    && (w[2].is_ident("write") || w[2].is_ident("writeln"))
            })
            .map(|w| {
                Finding::new(format!("call to document.{}", w[2].text))
                    .at(w[0].span)
                    .with_suggestion("Build nodes with createElement or set textContent instead")
            })
            .collect()
    }
}
