//! BEM class naming, checked in markup and in stylesheets.

use crate::lint::rule::{Rule, RuleContext};
use crate::lint::types::*;
use crate::parse::ParsedFile;
use crate::parse::Span;
use crate::source::FileKind;
use once_cell::sync::Lazy;
use regex::Regex;

/// `block`, `block__element`, `block--modifier` or `block__element--modifier`,
/// each part lowercase kebab-case.
static BEM_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*(?:__[a-z0-9]+(?:-[a-z0-9]+)*)?(?:--[a-z0-9]+(?:-[a-z0-9]+)*)?$",
    )
    .expect("Invalid regex")
});

/// True when `name` follows the BEM grammar or starts with an exempt prefix.
pub fn is_bem_name(name: &str, allowed_prefixes: &[String]) -> bool {
    if allowed_prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
    {
        return true;
    }
    BEM_NAME.is_match(name)
}

/// Best-effort BEM spelling of a class name: camelCase split into words,
/// single underscores promoted to element separators.
pub fn suggest_bem_name(name: &str) -> Option<String> {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
            prev_lower = true;
        } else if c == '_' || c == '-' {
            out.push(c);
            prev_lower = false;
        } else {
            out.push('-');
            prev_lower = false;
        }
    }

    let mut guess = String::with_capacity(out.len());
    let mut rest = out.as_str();
    while let Some(c) = rest.chars().next() {
        if rest.starts_with("__") || rest.starts_with("--") {
            guess.push_str(&rest[..2]);
            rest = rest[2..].trim_start_matches(c);
        } else if c == '_' {
            guess.push_str("__");
            rest = rest[1..].trim_start_matches('_');
        } else {
            guess.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    let guess = guess.trim_matches(|c| c == '-' || c == '_').to_string();

    (guess != name && BEM_NAME.is_match(&guess)).then_some(guess)
}

fn finding(class: &str, span: Span) -> Finding {
    let finding = Finding::new(format!("class '{class}' does not follow BEM naming")).at(span);
    match suggest_bem_name(class) {
        Some(guess) => finding.with_suggestion(format!("Rename to '{guess}'")),
        None => finding.with_suggestion("Use block__element--modifier in lowercase kebab-case"),
    }
}

pub struct BemClassNames;

impl Rule for BemClassNames {
    fn id(&self) -> &str {
        "bem-class-names"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Styles
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &str {
        "Class names follow BEM: block__element--modifier in lowercase kebab-case"
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        matches!(kind, FileKind::Html | FileKind::Css)
    }

    fn check(&self, context: &RuleContext<'_>, parsed: &ParsedFile) -> Vec<Finding> {
        let prefixes = &context.settings.bem.allowed_prefixes;
        match parsed {
            ParsedFile::Html(doc) => doc
                .elements()
                .into_iter()
                .filter_map(|el| el.attr("class"))
                .flat_map(|attr| {
                    attr.value
                        .split_whitespace()
                        .filter(|class| !is_bem_name(class, prefixes))
                        .map(|class| finding(class, attr.span))
                        .collect::<Vec<_>>()
                })
                .collect(),
            ParsedFile::Css(sheet) => sheet
                .style_rules()
                .into_iter()
                .flat_map(|rule| rule.selectors.iter())
                .flat_map(|selector| selector.classes.iter())
                .filter(|(class, _)| !is_bem_name(class, prefixes))
                .map(|(class, span)| finding(class, *span))
                .collect(),
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::rule::RuleSettings;
    use crate::source::SourceFile;
    use proptest::prelude::*;

    fn defaults() -> Vec<String> {
        RuleSettings::default().bem.allowed_prefixes
    }

    fn run(path: &str, contents: &str) -> Vec<Finding> {
        let source = SourceFile::from_string(path, contents);
        let settings = RuleSettings::default();
        let context = RuleContext {
            source: &source,
            settings: &settings,
        };
        BemClassNames.check(&context, &ParsedFile::parse(&source))
    }

    #[test]
    fn accepts_bem_names() {
        for name in [
            "card",
            "site-header",
            "card__title",
            "card--featured",
            "card__title--large",
            "main-nav__item-link--is-active",
            "grid2",
        ] {
            assert!(is_bem_name(name, &defaults()), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_non_bem_names() {
        for name in [
            "Card",
            "cardTitle",
            "card_title",
            "card___title",
            "card__title__text",
            "card--",
            "-card",
            "2col",
            "card----big",
        ] {
            assert!(!is_bem_name(name, &defaults()), "{name} should be invalid");
        }
    }

    #[test]
    fn exempt_prefixes() {
        assert!(is_bem_name("js-toggleMenu", &defaults()));
        assert!(is_bem_name("is-Open", &defaults()));
        assert!(!is_bem_name("js-toggleMenu", &[]));
    }

    #[test]
    fn suggestions() {
        assert_eq!(suggest_bem_name("cardTitle").as_deref(), Some("card-title"));
        assert_eq!(suggest_bem_name("card_title").as_deref(), Some("card__title"));
        assert_eq!(suggest_bem_name("Card").as_deref(), Some("card"));
        assert_eq!(suggest_bem_name("card"), None);
    }

    #[test]
    fn checks_html_class_attributes() {
        let findings = run(
            "index.html",
            "<div class=\"card cardTitle js-hook\"></div>\n<p class=\"Lead\"></p>",
        );
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].message, "class 'cardTitle' does not follow BEM naming");
        assert_eq!(findings[1].span.unwrap().start.line, 2);
    }

    #[test]
    fn checks_css_selectors_including_nested_and_media() {
        let css = ".card { color: red; .cardTitle { margin: 0; } }\n@media (min-width: 40em) {\n  .Grid { display: grid; }\n}\n";
        let findings = run("css/site.css", css);
        let names: Vec<_> = findings.iter().map(|f| f.message.clone()).collect();
        assert_eq!(
            names,
            vec![
                "class 'cardTitle' does not follow BEM naming",
                "class 'Grid' does not follow BEM naming",
            ]
        );
    }

    proptest! {
        // any class that fails the grammar is reported wherever it appears
        #[test]
        fn invalid_class_reported_in_html_and_css(word in "[a-z]{1,6}", upper in "[A-Z]{1,3}") {
            let class = format!("{word}{upper}");
            prop_assume!(!is_bem_name(&class, &defaults()));

            let html = run("index.html", &format!("<div class=\"{class}\"></div>"));
            prop_assert_eq!(html.len(), 1);

            let css = run("css/site.css", &format!(".{class} {{ color: red; }}"));
            prop_assert_eq!(css.len(), 1);

            let nested = run("css/site.css", &format!(".card {{ .{class} {{ color: red; }} }}"));
            prop_assert_eq!(nested.len(), 1);
        }

        #[test]
        fn valid_bem_names_are_never_reported(
            class in "[a-z][a-z0-9]{0,4}(-[a-z0-9]{1,4}){0,2}(__[a-z0-9]{1,4}(-[a-z0-9]{1,4}){0,1})?(--[a-z0-9]{1,4}(-[a-z0-9]{1,4}){0,1})?"
        ) {
            let html = run("index.html", &format!("<p class=\"{class}\"></p>"));
            prop_assert!(html.is_empty());

            let css = run("css/site.css", &format!(".{class} {{}}"));
            prop_assert!(css.is_empty());
        }

        #[test]
        fn suggestions_always_follow_bem(name in "[A-Za-z][A-Za-z0-9_-]{0,12}") {
            if let Some(guess) = suggest_bem_name(&name) {
                prop_assert!(is_bem_name(&guess, &[]));
                prop_assert_ne!(guess, name);
            }
        }

        #[test]
        fn camel_case_always_gets_a_suggestion(head in "[a-z]{1,5}", tail in "[A-Z][a-z]{1,5}") {
            let name = format!("{head}{tail}");
            let guess = suggest_bem_name(&name);
            prop_assert!(guess.is_some());
            prop_assert_eq!(guess.unwrap_or_default(), format!("{head}-{}", tail.to_ascii_lowercase()));
        }
    }
}
