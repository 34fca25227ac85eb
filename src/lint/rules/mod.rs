//! Built-in rules

pub mod layout;
pub mod markup;
pub mod naming;
pub mod scripts;
pub mod styles;

use crate::lint::rule::{Rule, RuleRegistry};
use std::sync::Arc;

/// Every built-in rule, in report order.
pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        // Markup
        Arc::new(markup::SemanticTags),
        Arc::new(markup::NoInlineStyle),
        Arc::new(markup::NoInlineScript),
        Arc::new(markup::ImgAlt),
        Arc::new(markup::HtmlLang),
        Arc::new(markup::Doctype),
        Arc::new(markup::NoDeprecatedElements),
        // Styles
        Arc::new(naming::BemClassNames),
        Arc::new(styles::NoIdSelectors),
        Arc::new(styles::NoImportant),
        // Scripts
        Arc::new(scripts::NoVar),
        Arc::new(scripts::Eqeqeq),
        Arc::new(scripts::NoDocumentWrite),
        // Layout
        Arc::new(layout::FileLayout),
        Arc::new(layout::FileNaming),
    ]
}

/// Create a registry with all built-in rules
pub fn create_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    for rule in builtin_rules() {
        // ids are unique across the built-in set; see the test below
        if let Err(err) = registry.register(rule) {
            tracing::error!(error = %err, "failed to register built-in rule");
        }
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::types::RuleCategory;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn registry_has_every_builtin_rule() {
        let registry = create_registry();
        assert_eq!(registry.get_all().len(), builtin_rules().len());
        assert_eq!(registry.get_all().len(), 15);
    }

    #[test]
    fn ids_are_unique_and_kebab_case() {
        let registry = create_registry();
        let ids: HashSet<_> = registry.ids().collect();
        assert_eq!(ids.len(), registry.get_all().len());
        for id in ids {
            assert!(
                id.chars().all(|c| c.is_ascii_lowercase() || c == '-'),
                "{id} is not kebab-case"
            );
        }
    }

    #[test]
    fn every_category_has_rules() {
        let registry = create_registry();
        for category in RuleCategory::iter() {
            assert!(
                !registry.get_by_category(category).is_empty(),
                "no rules for {category}"
            );
        }
    }
}
