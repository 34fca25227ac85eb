//! Source positions shared by the HTML, CSS and JavaScript front ends.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based line/column position. Columns count `char`s, not bytes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open range between two positions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    JsonSchema,
)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }
}

/// Char cursor that tracks line and column while advancing.
///
/// All three tokenizers read their input through this type so positions are
/// computed the same way everywhere.
#[derive(Debug, Clone)]
pub struct Cursor {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        Self {
            input: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.input.get(self.pos + n).copied()
    }

    /// Returns true when the upcoming chars equal `expected`, ASCII case-insensitively.
    pub fn starts_with_ignore_case(&self, expected: &str) -> bool {
        let mut offset = 0;
        for e in expected.chars() {
            match self.input.get(self.pos + offset) {
                Some(c) if c.eq_ignore_ascii_case(&e) => offset += 1,
                _ => return false,
            }
        }
        true
    }

    pub fn starts_with(&self, expected: &str) -> bool {
        let mut offset = 0;
        for e in expected.chars() {
            match self.input.get(self.pos + offset) {
                Some(c) if *c == e => offset += 1,
                _ => return false,
            }
        }
        true
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.input.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.bump().is_none() {
                break;
            }
        }
    }

    /// Consumes chars while `pred` holds and returns them.
    pub fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tracks_lines_and_columns() {
        let mut cursor = Cursor::new("ab\ncd");
        assert_eq!(cursor.position(), Position::new(1, 1));
        cursor.bump_n(2);
        assert_eq!(cursor.position(), Position::new(1, 3));
        cursor.bump();
        assert_eq!(cursor.position(), Position::new(2, 1));
        cursor.bump();
        assert_eq!(cursor.position(), Position::new(2, 2));
    }

    #[test]
    fn case_insensitive_lookahead() {
        let cursor = Cursor::new("<!DocType html>");
        assert!(cursor.starts_with_ignore_case("<!doctype"));
        assert!(!cursor.starts_with("<!doctype"));
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        let mut cursor = Cursor::new("é=1");
        cursor.bump();
        assert_eq!(cursor.position(), Position::new(1, 2));
    }
}
