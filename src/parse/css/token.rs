//! CSS tokenizer.
//!
//! Splits a stylesheet into tokens following the shape of CSS Syntax Level 3
//! (https://www.w3.org/TR/css-syntax-3/#tokenization), simplified where the
//! linter does not care: numbers keep their source text, `url(...)` is a
//! function token followed by its arguments, and comments are dropped.

use crate::parse::span::{Cursor, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum CssTokenKind {
    /// https://www.w3.org/TR/css-syntax-3/#typedef-ident-token
    Ident(String),
    /// https://www.w3.org/TR/css-syntax-3/#typedef-at-keyword-token
    AtKeyword(String),
    /// https://www.w3.org/TR/css-syntax-3/#typedef-hash-token
    Hash(String),
    /// https://www.w3.org/TR/css-syntax-3/#typedef-string-token
    String(String),
    /// Number, percentage or dimension, kept verbatim (`12px`, `.5`, `50%`).
    Number(String),
    /// https://www.w3.org/TR/css-syntax-3/#typedef-delim-token
    Delim(char),
    Whitespace,
    Colon,
    Semicolon,
    Comma,
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    OpenCurly,
    CloseCurly,
}

impl CssTokenKind {
    /// Source-like text used when reassembling selectors and values.
    pub fn to_css(&self) -> String {
        match self {
            CssTokenKind::Ident(s) | CssTokenKind::Number(s) => s.clone(),
            CssTokenKind::AtKeyword(s) => format!("@{s}"),
            CssTokenKind::Hash(s) => format!("#{s}"),
            CssTokenKind::String(s) => format!("\"{s}\""),
            CssTokenKind::Delim(c) => c.to_string(),
            CssTokenKind::Whitespace => " ".to_string(),
            CssTokenKind::Colon => ":".to_string(),
            CssTokenKind::Semicolon => ";".to_string(),
            CssTokenKind::Comma => ",".to_string(),
            CssTokenKind::OpenParen => "(".to_string(),
            CssTokenKind::CloseParen => ")".to_string(),
            CssTokenKind::OpenSquare => "[".to_string(),
            CssTokenKind::CloseSquare => "]".to_string(),
            CssTokenKind::OpenCurly => "{".to_string(),
            CssTokenKind::CloseCurly => "}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CssToken {
    pub kind: CssTokenKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CssTokenizer {
    cursor: Cursor,
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}

impl CssTokenizer {
    pub fn new(css: &str) -> Self {
        Self {
            cursor: Cursor::new(css),
        }
    }

    /// https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier
    fn starts_ident(&self) -> bool {
        match self.cursor.peek() {
            Some('-') => match self.cursor.peek_nth(1) {
                Some('-') => true,
                Some('\\') => true,
                Some(c) => is_name_start(c),
                None => false,
            },
            Some('\\') => self.cursor.peek_nth(1).is_some_and(|c| c != '\n'),
            Some(c) => is_name_start(c),
            None => false,
        }
    }

    fn starts_number(&self) -> bool {
        match self.cursor.peek() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    /// https://www.w3.org/TR/css-syntax-3/#consume-name
    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.cursor.peek() {
            if c == '\\' {
                self.cursor.bump();
                if let Some(escaped) = self.cursor.bump() {
                    name.push(escaped);
                }
            } else if is_name_char(c) {
                name.push(c);
                self.cursor.bump();
            } else {
                break;
            }
        }
        name
    }

    /// https://www.w3.org/TR/css-syntax-3/#consume-a-string-token
    fn consume_string(&mut self, quote: char) -> String {
        self.cursor.bump();
        let mut s = String::new();
        while let Some(c) = self.cursor.bump() {
            match c {
                c if c == quote => break,
                '\\' => {
                    if let Some(escaped) = self.cursor.bump() {
                        s.push(escaped);
                    }
                }
                // unterminated string ends at the line break
                '\n' => break,
                c => s.push(c),
            }
        }
        s
    }

    /// https://www.w3.org/TR/css-syntax-3/#consume-a-numeric-token
    fn consume_number(&mut self) -> String {
        let mut text = self
            .cursor
            .take_while(|c| c.is_ascii_digit() || c == '.');
        if self.cursor.peek() == Some('%') {
            self.cursor.bump();
            text.push('%');
        } else if self.starts_ident() {
            text.push_str(&self.consume_name());
        }
        text
    }

    fn skip_comment(&mut self) {
        self.cursor.bump_n(2);
        while !self.cursor.is_eof() && !self.cursor.starts_with("*/") {
            self.cursor.bump();
        }
        self.cursor.bump_n(2);
    }
}

impl Iterator for CssTokenizer {
    type Item = CssToken;

    /// https://www.w3.org/TR/css-syntax-3/#consume-token
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let c = self.cursor.peek()?;
            let start = self.cursor.position();

            if c == '/' && self.cursor.peek_nth(1) == Some('*') {
                self.skip_comment();
                continue;
            }

            let kind = if c.is_whitespace() {
                self.cursor.skip_whitespace();
                CssTokenKind::Whitespace
            } else if c == '"' || c == '\'' {
                CssTokenKind::String(self.consume_string(c))
            } else if self.starts_number() {
                CssTokenKind::Number(self.consume_number())
            } else if self.starts_ident() {
                CssTokenKind::Ident(self.consume_name())
            } else {
                self.cursor.bump();
                match c {
                    '#' if self.cursor.peek().is_some_and(|n| is_name_char(n) || n == '\\') => {
                        CssTokenKind::Hash(self.consume_name())
                    }
                    '@' if self.starts_ident() => CssTokenKind::AtKeyword(self.consume_name()),
                    ':' => CssTokenKind::Colon,
                    ';' => CssTokenKind::Semicolon,
                    ',' => CssTokenKind::Comma,
                    '(' => CssTokenKind::OpenParen,
                    ')' => CssTokenKind::CloseParen,
                    '[' => CssTokenKind::OpenSquare,
                    ']' => CssTokenKind::CloseSquare,
                    '{' => CssTokenKind::OpenCurly,
                    '}' => CssTokenKind::CloseCurly,
                    other => CssTokenKind::Delim(other),
                }
            };

            return Some(CssToken {
                kind,
                span: Span::new(start, self.cursor.position()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(css: &str) -> Vec<CssTokenKind> {
        CssTokenizer::new(css)
            .map(|t| t.kind)
            .filter(|k| *k != CssTokenKind::Whitespace)
            .collect()
    }

    #[test]
    fn empty() {
        assert!(kinds("").is_empty());
    }

    #[test]
    fn simple_rule() {
        assert_eq!(
            kinds(".card { color: #fff; }"),
            vec![
                CssTokenKind::Delim('.'),
                CssTokenKind::Ident("card".into()),
                CssTokenKind::OpenCurly,
                CssTokenKind::Ident("color".into()),
                CssTokenKind::Colon,
                CssTokenKind::Hash("fff".into()),
                CssTokenKind::Semicolon,
                CssTokenKind::CloseCurly,
            ]
        );
    }

    #[test]
    fn bem_names_are_single_idents() {
        assert_eq!(
            kinds(".menu__item--active"),
            vec![
                CssTokenKind::Delim('.'),
                CssTokenKind::Ident("menu__item--active".into()),
            ]
        );
    }

    #[test]
    fn numbers_keep_units() {
        assert_eq!(
            kinds("12px .5em 50%"),
            vec![
                CssTokenKind::Number("12px".into()),
                CssTokenKind::Number(".5em".into()),
                CssTokenKind::Number("50%".into()),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("/* .fake { } */a"),
            vec![CssTokenKind::Ident("a".into())]
        );
    }

    #[test]
    fn strings_and_at_keywords() {
        assert_eq!(
            kinds("@import 'base.css';"),
            vec![
                CssTokenKind::AtKeyword("import".into()),
                CssTokenKind::String("base.css".into()),
                CssTokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn important_is_delim_then_ident() {
        assert_eq!(
            kinds("!important"),
            vec![
                CssTokenKind::Delim('!'),
                CssTokenKind::Ident("important".into()),
            ]
        );
    }

    #[test]
    fn custom_properties_are_idents() {
        assert_eq!(
            kinds("--main-color"),
            vec![CssTokenKind::Ident("--main-color".into())]
        );
    }
}
