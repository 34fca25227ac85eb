//! Markup rules: semantic elements, inline code, accessibility basics.

use crate::lint::rule::{Rule, RuleContext};
use crate::lint::types::*;
use crate::parse::ParsedFile;
use crate::parse::html::{Document, Element};
use crate::parse::{Position, Span};
use crate::source::FileKind;

/// Class tokens that name a landmark, and the element that should carry it.
const LANDMARK_CLASSES: &[(&str, &str)] = &[
    ("nav", "nav"),
    ("navbar", "nav"),
    ("navigation", "nav"),
    ("menu", "nav"),
    ("header", "header"),
    ("footer", "footer"),
    ("main", "main"),
    ("article", "article"),
    ("post", "article"),
    ("section", "section"),
    ("sidebar", "aside"),
    ("aside", "aside"),
];

const DEPRECATED_ELEMENTS: &[&str] = &[
    "font", "center", "marquee", "blink", "big", "strike", "tt", "frame", "frameset", "acronym",
];

/// Script types that carry data rather than code.
const DATA_SCRIPT_TYPES: &[&str] = &["application/ld+json", "importmap", "application/json"];

const URL_ATTRIBUTES: &[&str] = &["href", "src", "action", "formaction"];

fn document(parsed: &ParsedFile) -> Option<&Document> {
    match parsed {
        ParsedFile::Html(doc) => Some(doc),
        _ => None,
    }
}

/// Maps a class token to a landmark element. BEM elements (`header__inner`)
/// describe a part of a block and never count; modifiers are stripped.
fn landmark_for_class(class: &str) -> Option<&'static str> {
    if class.contains("__") {
        return None;
    }
    let block = class.split("--").next().unwrap_or(class).to_ascii_lowercase();
    LANDMARK_CLASSES
        .iter()
        .find(|(name, _)| *name == block)
        .map(|(_, element)| *element)
}

fn wraps_only_links(element: &Element) -> bool {
    let children: Vec<&Element> = element.element_children().collect();
    children.len() >= 2
        && children.iter().all(|child| child.name == "a")
        && !element.has_non_whitespace_text_child()
}

pub struct SemanticTags;

impl Rule for SemanticTags {
    fn id(&self) -> &str {
        "semantic-tags"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Markup
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &str {
        "Use semantic elements (nav, header, main, ...) instead of generic containers"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Html
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let Some(doc) = document(parsed) else {
            return vec![];
        };
        let mut findings = vec![];

        for element in doc.elements() {
            if element.name != "div" && element.name != "span" {
                continue;
            }

            let by_class = element
                .class_list()
                .find_map(|class| landmark_for_class(class).map(|landmark| (class, landmark)));

            if let Some((class, landmark)) = by_class {
                findings.push(
                    Finding::new(format!(
                        "<{} class=\"{}\"> should be a <{}> element",
                        element.name, class, landmark
                    ))
                    .at(element.span)
                    .with_suggestion(format!("Replace the <{}> with <{}>", element.name, landmark)),
                );
            } else if element.name == "div" && wraps_only_links(element) {
                findings.push(
                    Finding::new("<div> containing only links should be a <nav> element")
                        .at(element.span)
                        .with_suggestion("Replace the <div> with <nav>"),
                );
            }
        }

        findings
    }
}

pub struct NoInlineStyle;

impl Rule for NoInlineStyle {
    fn id(&self) -> &str {
        "no-inline-style"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Markup
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &str {
        "Keep styles in external stylesheets: no style attributes or <style> blocks"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Html
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let Some(doc) = document(parsed) else {
            return vec![];
        };
        let mut findings = vec![];

        for element in doc.elements() {
            if element.name == "style" {
                findings.push(
                    Finding::new("<style> block in markup")
                        .at(element.span)
                        .with_suggestion("Move the rules into a stylesheet under css/"),
                );
            }
            if let Some(attr) = element.attr("style") {
                findings.push(
                    Finding::new(format!("inline style attribute on <{}>", element.name))
                        .at(attr.span)
                        .with_suggestion("Add a class and style it from the stylesheet"),
                );
            }
        }

        findings
    }
}

pub struct NoInlineScript;

impl Rule for NoInlineScript {
    fn id(&self) -> &str {
        "no-inline-script"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Markup
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &str {
        "Keep behavior in external scripts: no inline <script>, on* handlers or javascript: URLs"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Html
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let Some(doc) = document(parsed) else {
            return vec![];
        };
        let mut findings = vec![];

        for element in doc.elements() {
            if element.name == "script" && !element.has_attr("src") {
                let is_data = element
                    .attr_value("type")
                    .map(|t| DATA_SCRIPT_TYPES.contains(&t.trim().to_ascii_lowercase().as_str()))
                    .unwrap_or(false);
                if !is_data && !element.text_content().trim().is_empty() {
                    findings.push(
                        Finding::new("inline <script> block")
                            .at(element.span)
                            .with_suggestion("Move the code into a file under js/ and load it with src"),
                    );
                }
            }

            for attr in &element.attributes {
                if attr.name.len() > 2 && attr.name.starts_with("on") {
                    findings.push(
                        Finding::new(format!(
                            "inline event handler '{}' on <{}>",
                            attr.name, element.name
                        ))
                        .at(attr.span)
                        .with_suggestion("Attach the listener with addEventListener from a script file"),
                    );
                } else if URL_ATTRIBUTES.contains(&attr.name.as_str())
                    && attr
                        .value
                        .trim_start()
                        .to_ascii_lowercase()
                        .starts_with("javascript:")
                {
                    findings.push(
                        Finding::new(format!("javascript: URL in '{}' attribute", attr.name))
                            .at(attr.span)
                            .with_suggestion("Use a <button> with a listener attached from a script file"),
                    );
                }
            }
        }

        findings
    }
}

pub struct ImgAlt;

impl Rule for ImgAlt {
    fn id(&self) -> &str {
        "img-alt"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Markup
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &str {
        "Every <img> needs an alt attribute (empty for decorative images)"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Html
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let Some(doc) = document(parsed) else {
            return vec![];
        };
        doc.elements_named("img")
            .filter(|img| !img.has_attr("alt"))
            .map(|img| {
                let what = img
                    .attr_value("src")
                    .map(|src| format!("<img src=\"{src}\"> has no alt attribute"))
                    .unwrap_or_else(|| "<img> has no alt attribute".to_string());
                Finding::new(what)
                    .at(img.span)
                    .with_suggestion("Describe the image in alt, or use alt=\"\" if it is decorative")
            })
            .collect()
    }
}

pub struct HtmlLang;

impl Rule for HtmlLang {
    fn id(&self) -> &str {
        "html-lang"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Markup
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &str {
        "The <html> element declares the page language"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Html
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let Some(root) = document(parsed).and_then(Document::root_element) else {
            return vec![];
        };
        let has_lang = root
            .attr_value("lang")
            .is_some_and(|lang| !lang.trim().is_empty());
        if has_lang {
            return vec![];
        }
        vec![
            Finding::new("<html> element has no lang attribute")
                .at(root.span)
                .with_suggestion("Add lang=\"en\" (or the page's language) to <html>"),
        ]
    }
}

pub struct Doctype;

impl Rule for Doctype {
    fn id(&self) -> &str {
        "doctype"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Markup
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &str {
        "Documents start with <!DOCTYPE html>"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Html
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let Some(doc) = document(parsed) else {
            return vec![];
        };
        match (&doc.doctype, doc.doctype_span) {
            (None, _) => vec![
                Finding::new("missing <!DOCTYPE html>")
                    .at(Span::point(Position::START))
                    .with_suggestion("Add <!DOCTYPE html> as the first line"),
            ],
            (Some(value), span) => {
                let is_html5 = value.eq_ignore_ascii_case("html");
                if is_html5 {
                    return vec![];
                }
                let mut finding = Finding::new(format!("legacy doctype '{value}'"))
                    .with_suggestion("Use the HTML5 doctype: <!DOCTYPE html>");
                if let Some(span) = span {
                    finding = finding.at(span);
                }
                vec![finding]
            }
        }
    }
}

pub struct NoDeprecatedElements;

impl Rule for NoDeprecatedElements {
    fn id(&self) -> &str {
        "no-deprecated-elements"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Markup
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &str {
        "Presentational and obsolete elements (font, center, marquee, ...) are not used"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::Html
    }

    fn check(&self, _context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let Some(doc) = document(parsed) else {
            return vec![];
        };
        doc.elements()
            .into_iter()
            .filter(|el| DEPRECATED_ELEMENTS.contains(&el.name.as_str()))
            .map(|el| {
                Finding::new(format!("<{}> is obsolete", el.name))
                    .at(el.span)
                    .with_suggestion("Use semantic markup and CSS instead")
            })
            .collect()
    }
}
