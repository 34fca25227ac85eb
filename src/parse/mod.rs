//! Front ends for the three languages the linter understands.

pub mod css;
pub mod html;
pub mod js;
pub mod span;

pub use span::{Position, Span};

use crate::source::{FileKind, SourceFile};

/// A source file parsed according to its kind. Built once per file and shared
/// read-only by every rule.
#[derive(Debug, Clone)]
pub enum ParsedFile {
    Html(html::Document),
    Css(css::Stylesheet),
    Js(Vec<js::JsToken>),
    Other,
}

impl ParsedFile {
    pub fn parse(source: &SourceFile) -> Self {
        match source.kind {
            FileKind::Html => ParsedFile::Html(html::Document::parse(&source.contents)),
            FileKind::Css => ParsedFile::Css(css::Stylesheet::parse(&source.contents)),
            FileKind::Js => ParsedFile::Js(js::JsLexer::significant_tokens(&source.contents)),
            FileKind::Other => ParsedFile::Other,
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            ParsedFile::Html(_) => FileKind::Html,
            ParsedFile::Css(_) => FileKind::Css,
            ParsedFile::Js(_) => FileKind::Js,
            ParsedFile::Other => FileKind::Other,
        }
    }
}
