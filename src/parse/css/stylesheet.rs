//! Stylesheet parser.
//!
//! Turns the token stream into style rules, at-rules and declarations. Only the
//! structure the lint rules need is recovered: selectors with their class and id
//! components, declarations with their `!important` flag, and nesting through
//! conditional at-rules and CSS nesting blocks.

use super::token::{CssToken, CssTokenKind, CssTokenizer};
use crate::parse::span::Span;

/// Deepest block nesting the parser descends into; deeper blocks are skipped.
pub const MAX_NESTING: usize = 256;

/// At-rules whose block holds declarations rather than rules.
const DECLARATION_AT_RULES: &[&str] = &["font-face", "page", "counter-style", "property", "viewport"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    pub items: Vec<CssItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CssItem {
    Rule(StyleRule),
    AtRule(AtRule),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
    /// Rules nested with CSS nesting syntax.
    pub nested: Vec<CssItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub text: String,
    pub classes: Vec<(String, Span)>,
    pub ids: Vec<(String, Span)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtRuleBlock {
    None,
    Rules(Vec<CssItem>),
    Declarations(Vec<Declaration>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub prelude: String,
    pub block: AtRuleBlock,
    pub span: Span,
}

impl Stylesheet {
    pub fn parse(css: &str) -> Self {
        let tokens: Vec<CssToken> = CssTokenizer::new(css).collect();
        let mut parser = Parser {
            tokens,
            pos: 0,
            nesting: 0,
        };
        Self {
            items: parser.parse_items(true),
        }
    }

    /// Every style rule, including those inside at-rules and nesting blocks.
    pub fn style_rules(&self) -> Vec<&StyleRule> {
        let mut out = Vec::new();
        collect_rules(&self.items, &mut out);
        out
    }

    /// Every declaration, including those in `@font-face`-style blocks.
    pub fn declarations(&self) -> Vec<&Declaration> {
        let mut out = Vec::new();
        collect_declarations(&self.items, &mut out);
        out
    }
}

fn collect_rules<'a>(items: &'a [CssItem], out: &mut Vec<&'a StyleRule>) {
    let mut stack = vec![items.iter()];
    while let Some(iter) = stack.last_mut() {
        let Some(item) = iter.next() else {
            stack.pop();
            continue;
        };
        match item {
            CssItem::Rule(rule) => {
                out.push(rule);
                stack.push(rule.nested.iter());
            }
            CssItem::AtRule(AtRule {
                block: AtRuleBlock::Rules(items),
                ..
            }) => stack.push(items.iter()),
            CssItem::AtRule(_) => {}
        }
    }
}

fn collect_declarations<'a>(items: &'a [CssItem], out: &mut Vec<&'a Declaration>) {
    let mut stack = vec![items.iter()];
    while let Some(iter) = stack.last_mut() {
        let Some(item) = iter.next() else {
            stack.pop();
            continue;
        };
        match item {
            CssItem::Rule(rule) => {
                out.extend(rule.declarations.iter());
                stack.push(rule.nested.iter());
            }
            CssItem::AtRule(at) => match &at.block {
                AtRuleBlock::Rules(items) => stack.push(items.iter()),
                AtRuleBlock::Declarations(decls) => out.extend(decls.iter()),
                AtRuleBlock::None => {}
            },
        }
    }
}

struct Parser {
    tokens: Vec<CssToken>,
    pos: usize,
    /// Blocks currently open around the cursor.
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> Option<&CssToken> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&CssTokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn bump(&mut self) -> Option<CssToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_kind(), Some(CssTokenKind::Whitespace)) {
            self.pos += 1;
        }
    }

    fn current_start(&self) -> crate::parse::span::Position {
        self.peek().map(|t| t.span.start).unwrap_or_default()
    }

    fn last_end(&self) -> crate::parse::span::Position {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or_default()
    }

    /// Parses rules until end of input or, when nested, until the closing brace.
    fn parse_items(&mut self, top_level: bool) -> Vec<CssItem> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek_kind() {
                None => break,
                Some(CssTokenKind::CloseCurly) => {
                    self.bump();
                    if !top_level {
                        break;
                    }
                }
                // stray semicolon between rules
                Some(CssTokenKind::Semicolon) => {
                    self.bump();
                }
                Some(CssTokenKind::AtKeyword(name)) => {
                    let name = name.to_ascii_lowercase();
                    items.push(CssItem::AtRule(self.parse_at_rule(name)));
                }
                Some(_) => {
                    if let Some(rule) = self.parse_style_rule() {
                        items.push(CssItem::Rule(rule));
                    }
                }
            }
        }
        items
    }

    /// Consumes the rest of a block whose `{` was already consumed.
    fn skip_block(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.bump() {
            match token.kind {
                CssTokenKind::OpenCurly => depth += 1,
                CssTokenKind::CloseCurly if depth == 0 => return,
                CssTokenKind::CloseCurly => depth -= 1,
                _ => {}
            }
        }
    }

    /// Claims one nesting level, or skips the block when the limit is reached.
    fn enter_block(&mut self) -> bool {
        if self.nesting >= MAX_NESTING {
            tracing::trace!(limit = MAX_NESTING, "nesting limit reached, skipping block");
            self.skip_block();
            return false;
        }
        self.nesting += 1;
        true
    }

    fn parse_nested_items(&mut self) -> Vec<CssItem> {
        if !self.enter_block() {
            return Vec::new();
        }
        let items = self.parse_items(false);
        self.nesting -= 1;
        items
    }

    /// Called with the cursor on the at-keyword token.
    fn parse_at_rule(&mut self, name: String) -> AtRule {
        let start = self.current_start();
        self.bump();

        let mut prelude = Vec::new();
        let block = loop {
            match self.peek_kind() {
                None => break AtRuleBlock::None,
                Some(CssTokenKind::Semicolon) => {
                    self.bump();
                    break AtRuleBlock::None;
                }
                Some(CssTokenKind::OpenCurly) => {
                    self.bump();
                    if DECLARATION_AT_RULES.contains(&name.as_str()) {
                        let (declarations, _) = self.parse_declaration_block();
                        break AtRuleBlock::Declarations(declarations);
                    }
                    break AtRuleBlock::Rules(self.parse_nested_items());
                }
                Some(_) => {
                    if let Some(token) = self.bump() {
                        prelude.push(token);
                    }
                }
            }
        };

        AtRule {
            name,
            prelude: join_tokens(&prelude),
            block,
            span: Span::new(start, self.last_end()),
        }
    }

    fn parse_style_rule(&mut self) -> Option<StyleRule> {
        let start = self.peek()?.span.start;
        let mut prelude = Vec::new();
        loop {
            match self.peek_kind() {
                // prelude ran off the end of input: not a rule
                None => return None,
                Some(CssTokenKind::OpenCurly) => {
                    self.bump();
                    break;
                }
                Some(CssTokenKind::CloseCurly) => return None,
                Some(_) => {
                    if let Some(token) = self.bump() {
                        prelude.push(token);
                    }
                }
            }
        }

        let selectors = parse_selectors(&prelude);
        let (declarations, nested) = self.parse_declaration_block();
        Some(StyleRule {
            selectors,
            declarations,
            nested,
            span: Span::new(start, self.last_end()),
        })
    }

    /// Parses declarations up to and including the closing brace. A `{` reached
    /// before a `;` means the pending tokens were a nested rule's selector.
    fn parse_declaration_block(&mut self) -> (Vec<Declaration>, Vec<CssItem>) {
        if !self.enter_block() {
            return (Vec::new(), Vec::new());
        }
        let block = self.parse_block_contents();
        self.nesting -= 1;
        block
    }

    fn parse_block_contents(&mut self) -> (Vec<Declaration>, Vec<CssItem>) {
        let mut declarations = Vec::new();
        let mut nested = Vec::new();
        let mut pending: Vec<CssToken> = Vec::new();
        let mut depth = 0usize;

        while let Some(token) = self.bump() {
            match token.kind {
                CssTokenKind::OpenParen | CssTokenKind::OpenSquare => {
                    depth += 1;
                    pending.push(token);
                }
                CssTokenKind::CloseParen | CssTokenKind::CloseSquare => {
                    depth = depth.saturating_sub(1);
                    pending.push(token);
                }
                CssTokenKind::Semicolon if depth == 0 => {
                    if let Some(decl) = parse_declaration(&pending) {
                        declarations.push(decl);
                    }
                    pending.clear();
                }
                CssTokenKind::OpenCurly if depth == 0 => {
                    let start = pending
                        .iter()
                        .find(|t| t.kind != CssTokenKind::Whitespace)
                        .map(|t| t.span.start)
                        .unwrap_or(token.span.start);
                    let selectors = parse_selectors(&pending);
                    pending.clear();
                    let (inner_decls, inner_nested) = self.parse_declaration_block();
                    nested.push(CssItem::Rule(StyleRule {
                        selectors,
                        declarations: inner_decls,
                        nested: inner_nested,
                        span: Span::new(start, self.last_end()),
                    }));
                }
                CssTokenKind::CloseCurly if depth == 0 => break,
                _ => pending.push(token),
            }
        }

        if let Some(decl) = parse_declaration(&pending) {
            declarations.push(decl);
        }
        (declarations, nested)
    }
}

fn join_tokens(tokens: &[CssToken]) -> String {
    let text: String = tokens.iter().map(|t| t.kind.to_css()).collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_declaration(tokens: &[CssToken]) -> Option<Declaration> {
    let mut iter = tokens
        .iter()
        .skip_while(|t| t.kind == CssTokenKind::Whitespace);
    let first = iter.next()?;
    let CssTokenKind::Ident(property) = &first.kind else {
        return None;
    };

    let rest: Vec<&CssToken> = iter.collect();
    let colon = rest.iter().position(|t| t.kind == CssTokenKind::Colon)?;
    let mut value_tokens: Vec<CssToken> = rest[colon + 1..].iter().map(|t| (*t).clone()).collect();

    let mut important = false;
    let significant: Vec<usize> = value_tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind != CssTokenKind::Whitespace)
        .map(|(i, _)| i)
        .collect();
    if let [.., bang, last] = significant.as_slice() {
        let is_important = matches!(&value_tokens[*last].kind,
            CssTokenKind::Ident(s) if s.eq_ignore_ascii_case("important"))
            && value_tokens[*bang].kind == CssTokenKind::Delim('!');
        if is_important {
            important = true;
            value_tokens.truncate(*bang);
        }
    }

    let end = tokens.last().map(|t| t.span.end).unwrap_or(first.span.end);
    Some(Declaration {
        property: property.to_ascii_lowercase(),
        value: join_tokens(&value_tokens),
        important,
        span: Span::new(first.span.start, end),
    })
}

fn parse_selectors(tokens: &[CssToken]) -> Vec<Selector> {
    let mut selectors = Vec::new();
    let mut depth = 0usize;
    let mut current: Vec<&CssToken> = Vec::new();

    for token in tokens {
        match token.kind {
            CssTokenKind::OpenParen | CssTokenKind::OpenSquare => depth += 1,
            CssTokenKind::CloseParen | CssTokenKind::CloseSquare => {
                depth = depth.saturating_sub(1)
            }
            CssTokenKind::Comma if depth == 0 => {
                selectors.extend(build_selector(&current));
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(token);
    }
    selectors.extend(build_selector(&current));
    selectors
}

fn build_selector(tokens: &[&CssToken]) -> Option<Selector> {
    let owned: Vec<CssToken> = tokens.iter().map(|t| (*t).clone()).collect();
    let text = join_tokens(&owned);
    if text.is_empty() {
        return None;
    }

    let mut classes = Vec::new();
    let mut ids = Vec::new();
    let mut in_attribute = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match &token.kind {
            CssTokenKind::OpenSquare => in_attribute += 1,
            CssTokenKind::CloseSquare => in_attribute = in_attribute.saturating_sub(1),
            CssTokenKind::Delim('.') if in_attribute == 0 => {
                if let Some(CssToken {
                    kind: CssTokenKind::Ident(name),
                    span,
                }) = tokens.get(i + 1).copied()
                {
                    classes.push((name.clone(), Span::new(token.span.start, span.end)));
                }
            }
            CssTokenKind::Hash(name) if in_attribute == 0 => ids.push((name.clone(), token.span)),
            _ => {}
        }
    }

    Some(Selector { text, classes, ids })
}
