//! CSS front end: tokenizer and stylesheet parser.

pub mod stylesheet;
pub mod token;

pub use stylesheet::{AtRule, AtRuleBlock, CssItem, Declaration, Selector, StyleRule, Stylesheet};
pub use token::{CssToken, CssTokenKind, CssTokenizer};
