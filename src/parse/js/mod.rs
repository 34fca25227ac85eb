//! JavaScript lexer.
//!
//! Produces a flat token stream with positions. There is no parser: the script
//! rules only need to see keywords, operators and member accesses while being
//! sure they are not looking inside a string, template, regex or comment.
//! Template literals (including their `${}` substitutions) are one token.

use crate::parse::span::{Cursor, Span};

/// https://262.ecma-international.org/#sec-keywords-and-reserved-words
const KEYWORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "let", "new", "null", "of", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Keywords after which a `/` starts a regular expression rather than a division.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "await", "case", "delete", "do", "else", "in", "instanceof", "new", "of", "return", "throw",
    "typeof", "void", "yield",
];

/// https://262.ecma-international.org/#sec-punctuators, longest first.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==", "!=",
    "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
    "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-", "*", "/", "%",
    "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsTokenKind {
    Identifier,
    Keyword,
    Punctuator,
    Number,
    String,
    Template,
    Regex,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsToken {
    pub kind: JsTokenKind,
    pub text: String,
    pub span: Span,
}

impl JsToken {
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == JsTokenKind::Punctuator && self.text == punct
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == JsTokenKind::Keyword && self.text == keyword
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == JsTokenKind::Identifier && self.text == name
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '$' || c == '_'
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_alphanumeric() || c == '\u{200c}' || c == '\u{200d}'
}

pub struct JsLexer {
    cursor: Cursor,
    /// Whether a `/` at the current point would begin a regex literal.
    regex_allowed: bool,
}

impl JsLexer {
    pub fn new(js: &str) -> Self {
        Self {
            cursor: Cursor::new(js),
            regex_allowed: true,
        }
    }

    /// Tokenizes the whole input, dropping comments.
    pub fn significant_tokens(js: &str) -> Vec<JsToken> {
        JsLexer::new(js)
            .filter(|t| t.kind != JsTokenKind::Comment)
            .collect()
    }

    fn consume_line_comment(&mut self) -> String {
        self.cursor.take_while(|c| c != '\n')
    }

    fn consume_block_comment(&mut self) -> String {
        let mut text = String::new();
        self.cursor.bump_n(2);
        text.push_str("/*");
        while !self.cursor.is_eof() && !self.cursor.starts_with("*/") {
            if let Some(c) = self.cursor.bump() {
                text.push(c);
            }
        }
        if !self.cursor.is_eof() {
            self.cursor.bump_n(2);
            text.push_str("*/");
        }
        text
    }

    fn consume_string(&mut self, quote: char) -> String {
        let mut text = String::new();
        if let Some(c) = self.cursor.bump() {
            text.push(c);
        }
        while let Some(c) = self.cursor.bump() {
            text.push(c);
            if c == '\\' {
                if let Some(escaped) = self.cursor.bump() {
                    text.push(escaped);
                }
            } else if c == quote || c == '\n' {
                break;
            }
        }
        text
    }

    /// Consumes a template literal, skipping over nested strings, templates and
    /// braces inside `${}` substitutions.
    fn consume_template(&mut self) -> String {
        let mut text = String::new();
        if let Some(c) = self.cursor.bump() {
            text.push(c);
        }
        // each entry is the brace depth of an open `${` substitution
        let mut substitutions: Vec<usize> = Vec::new();

        while let Some(c) = self.cursor.peek() {
            match substitutions.last().copied() {
                None => {
                    self.cursor.bump();
                    text.push(c);
                    match c {
                        '\\' => {
                            if let Some(escaped) = self.cursor.bump() {
                                text.push(escaped);
                            }
                        }
                        '`' => break,
                        '$' if self.cursor.peek() == Some('{') => {
                            self.cursor.bump();
                            text.push('{');
                            substitutions.push(0);
                        }
                        _ => {}
                    }
                }
                Some(depth) => match c {
                    '\'' | '"' => text.push_str(&self.consume_string(c)),
                    '`' => text.push_str(&self.consume_template()),
                    '{' => {
                        if let Some(open) = substitutions.last_mut() {
                            *open += 1;
                        }
                        self.cursor.bump();
                        text.push(c);
                    }
                    '}' => {
                        self.cursor.bump();
                        text.push(c);
                        if depth == 0 {
                            substitutions.pop();
                        } else if let Some(open) = substitutions.last_mut() {
                            *open -= 1;
                        }
                    }
                    _ => {
                        self.cursor.bump();
                        text.push(c);
                    }
                },
            }
        }
        text
    }

    fn consume_regex(&mut self) -> String {
        let mut text = String::new();
        if let Some(c) = self.cursor.bump() {
            text.push(c);
        }
        let mut in_class = false;
        while let Some(c) = self.cursor.peek() {
            if c == '\n' {
                break;
            }
            self.cursor.bump();
            text.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = self.cursor.bump() {
                        text.push(escaped);
                    }
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    text.push_str(&self.cursor.take_while(is_ident_part));
                    break;
                }
                _ => {}
            }
        }
        text
    }

    fn consume_number(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.cursor.peek() {
            let exponent_sign = (c == '+' || c == '-')
                && text.ends_with(['e', 'E'])
                && !text.starts_with("0x")
                && !text.starts_with("0X");
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                text.push(c);
                self.cursor.bump();
            } else {
                break;
            }
        }
        text
    }

    fn consume_punctuator(&mut self) -> String {
        for punct in PUNCTUATORS {
            if self.cursor.starts_with(punct) {
                self.cursor.bump_n(punct.chars().count());
                return (*punct).to_string();
            }
        }
        // unknown char, keep going
        self.cursor.bump().map(String::from).unwrap_or_default()
    }
}

impl Iterator for JsLexer {
    type Item = JsToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.skip_whitespace();
        let c = self.cursor.peek()?;
        let start = self.cursor.position();

        let (kind, text) = if c == '/' && self.cursor.peek_nth(1) == Some('/') {
            (JsTokenKind::Comment, self.consume_line_comment())
        } else if c == '/' && self.cursor.peek_nth(1) == Some('*') {
            (JsTokenKind::Comment, self.consume_block_comment())
        } else if c == '#' && self.cursor.peek_nth(1) == Some('!') && start.line == 1 {
            (JsTokenKind::Comment, self.consume_line_comment())
        } else if c == '"' || c == '\'' {
            (JsTokenKind::String, self.consume_string(c))
        } else if c == '`' {
            (JsTokenKind::Template, self.consume_template())
        } else if c == '/' && self.regex_allowed {
            (JsTokenKind::Regex, self.consume_regex())
        } else if c.is_ascii_digit()
            || (c == '.' && self.cursor.peek_nth(1).is_some_and(|n| n.is_ascii_digit()))
        {
            (JsTokenKind::Number, self.consume_number())
        } else if is_ident_start(c) || (c == '#' && self.cursor.peek_nth(1).is_some_and(is_ident_start))
        {
            let mut text = String::new();
            if c == '#' {
                self.cursor.bump();
                text.push('#');
            }
            text.push_str(&self.cursor.take_while(is_ident_part));
            let kind = if KEYWORDS.contains(&text.as_str()) {
                JsTokenKind::Keyword
            } else {
                JsTokenKind::Identifier
            };
            (kind, text)
        } else {
            (JsTokenKind::Punctuator, self.consume_punctuator())
        };

        match kind {
            JsTokenKind::Comment => {}
            JsTokenKind::Keyword => {
                self.regex_allowed = REGEX_PRECEDING_KEYWORDS.contains(&text.as_str());
            }
            JsTokenKind::Punctuator => {
                self.regex_allowed = !matches!(text.as_str(), ")" | "]" | "}" | "++" | "--");
            }
            _ => self.regex_allowed = false,
        }

        Some(JsToken {
            kind,
            text,
            span: Span::new(start, self.cursor.position()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::span::Position;

    fn kinds_and_text(js: &str) -> Vec<(JsTokenKind, String)> {
        JsLexer::new(js).map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn empty() {
        assert!(kinds_and_text("").is_empty());
    }

    #[test]
    fn declaration() {
        assert_eq!(
            kinds_and_text("const x = 42;"),
            vec![
                (JsTokenKind::Keyword, "const".into()),
                (JsTokenKind::Identifier, "x".into()),
                (JsTokenKind::Punctuator, "=".into()),
                (JsTokenKind::Number, "42".into()),
                (JsTokenKind::Punctuator, ";".into()),
            ]
        );
    }

    #[test]
    fn longest_punctuator_wins() {
        let toks = kinds_and_text("a === b !== c == d");
        let puncts: Vec<_> = toks
            .iter()
            .filter(|(k, _)| *k == JsTokenKind::Punctuator)
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(puncts, vec!["===", "!==", "=="]);
    }

    #[test]
    fn strings_hide_their_contents() {
        let toks = kinds_and_text(r#"let s = "var x == 1", t = 'it\'s';"#);
        assert!(toks.iter().all(|(k, t)| *k != JsTokenKind::Keyword || t != "var"));
        assert!(toks.contains(&(JsTokenKind::String, r#""var x == 1""#.into())));
        assert!(toks.contains(&(JsTokenKind::String, r"'it\'s'".into())));
    }

    #[test]
    fn template_with_substitution_is_one_token() {
        let toks = kinds_and_text("`a ${ {b: `c`}.b == 1 } d` + 1");
        assert_eq!(toks[0].0, JsTokenKind::Template);
        assert_eq!(toks[0].1, "`a ${ {b: `c`}.b == 1 } d`");
        assert_eq!(toks[1], (JsTokenKind::Punctuator, "+".into()));
    }

    #[test]
    fn regex_vs_division() {
        let toks = kinds_and_text("x = a / b / c; y = /==/g.test(s);");
        let regexes: Vec<_> = toks
            .iter()
            .filter(|(k, _)| *k == JsTokenKind::Regex)
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(regexes, vec!["/==/g"]);
    }

    #[test]
    fn regex_with_slash_in_class() {
        let toks = kinds_and_text("return /[/]+/.source");
        assert_eq!(toks[1], (JsTokenKind::Regex, "/[/]+/".into()));
    }

    #[test]
    fn comments_are_tokens_but_filtered_from_significant() {
        let src = "// var a\n/* == */ let b;";
        assert_eq!(JsLexer::new(src).count(), 5);
        let significant = JsLexer::significant_tokens(src);
        assert_eq!(significant.len(), 3);
        assert!(significant[0].is_keyword("let"));
    }

    #[test]
    fn numbers_with_exponents_and_hex() {
        let toks = kinds_and_text("1e+5 0xFF .5 10n");
        let numbers: Vec<_> = toks.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(numbers, vec!["1e+5", "0xFF", ".5", "10n"]);
    }

    #[test]
    fn positions_are_tracked() {
        let toks: Vec<_> = JsLexer::new("a\n  document.write(x)").collect();
        assert_eq!(toks[1].span.start, Position::new(2, 3));
        assert!(toks[1].is_ident("document"));
    }
}
