//! HTML tokenizer.
//!
//! A forgiving state machine loosely following the WHATWG tokenization states.
//! It yields start tags, end tags, runs of text, comments and doctypes, each with
//! a source span. Content of raw-text elements (`script`, `style`, `textarea`,
//! `title`) is yielded as a single text token without interpreting markup inside.
//!
//! ```text
//! input:  <div class="a">hi</div>
//! output: StartTag { name: "div", attributes: [class="a"], .. }
//!         Text { text: "hi", .. }
//!         EndTag { name: "div", .. }
//! ```
//!
//! Character references are not decoded; the linter only needs names and raw values.

use crate::parse::span::{Cursor, Position, Span};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub span: Span,
}

impl Attribute {
    fn starting_at(at: Position) -> Self {
        Self {
            name: String::new(),
            value: String::new(),
            span: Span::point(at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
        span: Span,
    },
    EndTag {
        name: String,
        span: Span,
    },
    Text {
        text: String,
        span: Span,
    },
    Comment {
        text: String,
        span: Span,
    },
    Doctype {
        value: String,
        span: Span,
    },
}

/// States used while reading the inside of a start tag.
///
/// https://html.spec.whatwg.org/multipage/parsing.html#tokenization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    TagName,
    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted,
    AttributeValueUnquoted,
    AfterAttributeValueQuoted,
    SelfClosingStartTag,
}

#[derive(Debug, Clone)]
pub struct HtmlTokenizer {
    cursor: Cursor,
    /// Set after a raw-text start tag; holds the name whose end tag closes it.
    raw_text_end: Option<String>,
}

impl HtmlTokenizer {
    pub fn new(html: &str) -> Self {
        Self {
            cursor: Cursor::new(html),
            raw_text_end: None,
        }
    }

    /// A `<` starts markup only when followed by a tag-ish char.
    fn at_markup_start(&self) -> bool {
        if self.cursor.peek() != Some('<') {
            return false;
        }
        matches!(
            self.cursor.peek_nth(1),
            Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?'
        )
    }

    fn consume_text(&mut self) -> Option<HtmlToken> {
        let start = self.cursor.position();
        let mut text = String::new();
        while !self.cursor.is_eof() && !self.at_markup_start() {
            if let Some(c) = self.cursor.bump() {
                text.push(c);
            }
        }
        if text.is_empty() {
            return None;
        }
        Some(HtmlToken::Text {
            text,
            span: Span::new(start, self.cursor.position()),
        })
    }

    fn consume_raw_text(&mut self, end_name: &str) -> Option<HtmlToken> {
        let start = self.cursor.position();
        let closing = format!("</{end_name}");
        let mut text = String::new();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with_ignore_case(&closing) {
                let after = self.cursor.peek_nth(closing.chars().count());
                if matches!(after, None | Some('>') | Some('/'))
                    || after.is_some_and(char::is_whitespace)
                {
                    break;
                }
            }
            if let Some(c) = self.cursor.bump() {
                text.push(c);
            }
        }
        if text.is_empty() {
            return None;
        }
        Some(HtmlToken::Text {
            text,
            span: Span::new(start, self.cursor.position()),
        })
    }

    fn consume_comment(&mut self) -> HtmlToken {
        let start = self.cursor.position();
        self.cursor.bump_n(4); // <!--
        let mut text = String::new();
        while !self.cursor.is_eof() && !self.cursor.starts_with("-->") {
            if let Some(c) = self.cursor.bump() {
                text.push(c);
            }
        }
        self.cursor.bump_n(3);
        HtmlToken::Comment {
            text,
            span: Span::new(start, self.cursor.position()),
        }
    }

    /// `<!doctype ...>` yields a doctype; any other `<!...>` or `<?...>` is a bogus comment.
    fn consume_declaration(&mut self) -> HtmlToken {
        let start = self.cursor.position();
        let is_doctype = self.cursor.starts_with_ignore_case("<!doctype");
        self.cursor.bump_n(if is_doctype { 9 } else { 2 });
        let body = self.cursor.take_while(|c| c != '>');
        self.cursor.bump();
        let span = Span::new(start, self.cursor.position());
        if is_doctype {
            HtmlToken::Doctype {
                value: body.trim().to_string(),
                span,
            }
        } else {
            HtmlToken::Comment { text: body, span }
        }
    }

    fn consume_end_tag(&mut self) -> HtmlToken {
        let start = self.cursor.position();
        self.cursor.bump_n(2); // </
        let name = self
            .cursor
            .take_while(|c| !c.is_whitespace() && c != '>' && c != '/')
            .to_ascii_lowercase();
        self.cursor.take_while(|c| c != '>');
        self.cursor.bump();
        HtmlToken::EndTag {
            name,
            span: Span::new(start, self.cursor.position()),
        }
    }

    fn consume_start_tag(&mut self) -> HtmlToken {
        let start = self.cursor.position();
        self.cursor.bump(); // <

        let mut name = String::new();
        let mut attributes: Vec<Attribute> = Vec::new();
        let mut self_closing = false;
        let mut state = State::TagName;

        while let Some(c) = self.cursor.peek() {
            match state {
                State::TagName => {
                    if c.is_whitespace() {
                        state = State::BeforeAttributeName;
                    } else if c == '/' {
                        state = State::SelfClosingStartTag;
                    } else if c == '>' {
                        self.cursor.bump();
                        break;
                    } else {
                        name.push(c.to_ascii_lowercase());
                    }
                    self.cursor.bump();
                }
                State::BeforeAttributeName => {
                    if c.is_whitespace() {
                        self.cursor.bump();
                    } else if c == '/' {
                        self.cursor.bump();
                        state = State::SelfClosingStartTag;
                    } else if c == '>' {
                        self.cursor.bump();
                        break;
                    } else {
                        attributes.push(Attribute::starting_at(self.cursor.position()));
                        state = State::AttributeName;
                    }
                }
                State::AttributeName => {
                    if c.is_whitespace() || c == '/' || c == '>' {
                        state = State::AfterAttributeName;
                        continue;
                    }
                    self.cursor.bump();
                    if c == '=' {
                        state = State::BeforeAttributeValue;
                    } else if let Some(attr) = attributes.last_mut() {
                        attr.name.push(c.to_ascii_lowercase());
                    }
                }
                State::AfterAttributeName => {
                    if c.is_whitespace() {
                        self.cursor.bump();
                    } else if c == '=' {
                        self.cursor.bump();
                        state = State::BeforeAttributeValue;
                    } else {
                        self.close_attribute(&mut attributes);
                        state = State::BeforeAttributeName;
                    }
                }
                State::BeforeAttributeValue => {
                    if c.is_whitespace() {
                        self.cursor.bump();
                    } else if c == '"' {
                        self.cursor.bump();
                        state = State::AttributeValueDoubleQuoted;
                    } else if c == '\'' {
                        self.cursor.bump();
                        state = State::AttributeValueSingleQuoted;
                    } else if c == '>' {
                        self.close_attribute(&mut attributes);
                        self.cursor.bump();
                        break;
                    } else {
                        state = State::AttributeValueUnquoted;
                    }
                }
                State::AttributeValueDoubleQuoted | State::AttributeValueSingleQuoted => {
                    let quote = if state == State::AttributeValueDoubleQuoted {
                        '"'
                    } else {
                        '\''
                    };
                    self.cursor.bump();
                    if c == quote {
                        self.close_attribute(&mut attributes);
                        state = State::AfterAttributeValueQuoted;
                    } else if let Some(attr) = attributes.last_mut() {
                        attr.value.push(c);
                    }
                }
                State::AttributeValueUnquoted => {
                    if c.is_whitespace() {
                        self.close_attribute(&mut attributes);
                        self.cursor.bump();
                        state = State::BeforeAttributeName;
                    } else if c == '>' {
                        self.close_attribute(&mut attributes);
                        self.cursor.bump();
                        break;
                    } else {
                        self.cursor.bump();
                        if let Some(attr) = attributes.last_mut() {
                            attr.value.push(c);
                        }
                    }
                }
                State::AfterAttributeValueQuoted => {
                    if c.is_whitespace() {
                        self.cursor.bump();
                        state = State::BeforeAttributeName;
                    } else if c == '/' {
                        self.cursor.bump();
                        state = State::SelfClosingStartTag;
                    } else if c == '>' {
                        self.cursor.bump();
                        break;
                    } else {
                        // missing whitespace between attributes
                        state = State::BeforeAttributeName;
                    }
                }
                State::SelfClosingStartTag => {
                    if c == '>' {
                        self_closing = true;
                        self.cursor.bump();
                        break;
                    }
                    state = State::BeforeAttributeName;
                }
            }
        }

        if matches!(state, State::AttributeName | State::AttributeValueUnquoted) {
            self.close_attribute(&mut attributes);
        }
        attributes.retain(|attr| !attr.name.is_empty());

        if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.raw_text_end = Some(name.clone());
        }

        HtmlToken::StartTag {
            name,
            attributes,
            self_closing,
            span: Span::new(start, self.cursor.position()),
        }
    }

    fn close_attribute(&self, attributes: &mut [Attribute]) {
        if let Some(attr) = attributes.last_mut() {
            attr.span.end = self.cursor.position();
        }
    }
}

impl Iterator for HtmlTokenizer {
    type Item = HtmlToken;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(end_name) = self.raw_text_end.take() {
            if let Some(text) = self.consume_raw_text(&end_name) {
                return Some(text);
            }
        }

        if self.cursor.is_eof() {
            return None;
        }

        if !self.at_markup_start() {
            return self.consume_text();
        }

        let token = match self.cursor.peek_nth(1) {
            Some('!') if self.cursor.starts_with("<!--") => self.consume_comment(),
            Some('!') | Some('?') => self.consume_declaration(),
            Some('/') => {
                if self.cursor.peek_nth(2).is_some_and(|c| c.is_ascii_alphabetic()) {
                    self.consume_end_tag()
                } else {
                    self.consume_declaration()
                }
            }
            _ => self.consume_start_tag(),
        };
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(html: &str) -> Vec<HtmlToken> {
        HtmlTokenizer::new(html).collect()
    }

    fn start_tag(token: &HtmlToken) -> (&str, &[Attribute], bool) {
        match token {
            HtmlToken::StartTag {
                name,
                attributes,
                self_closing,
                ..
            } => (name.as_str(), attributes.as_slice(), *self_closing),
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(tokens("").is_empty());
    }

    #[test]
    fn start_text_end() {
        let toks = tokens("<p>hi</p>");
        assert_eq!(toks.len(), 3);
        assert_eq!(start_tag(&toks[0]).0, "p");
        assert!(matches!(&toks[1], HtmlToken::Text { text, .. } if text == "hi"));
        assert!(matches!(&toks[2], HtmlToken::EndTag { name, .. } if name == "p"));
    }

    #[test]
    fn attributes_in_all_quoting_styles() {
        let toks = tokens(r#"<a href="/x" title='t' data-n=3 hidden>"#);
        let (name, attrs, _) = start_tag(&toks[0]);
        assert_eq!(name, "a");
        let pairs: Vec<_> = attrs
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("href", "/x"), ("title", "t"), ("data-n", "3"), ("hidden", "")]
        );
    }

    #[test]
    fn uppercase_names_are_lowercased() {
        let toks = tokens(r#"<DIV CLASS="Box"></DIV>"#);
        let (name, attrs, _) = start_tag(&toks[0]);
        assert_eq!(name, "div");
        assert_eq!(attrs[0].name, "class");
        assert_eq!(attrs[0].value, "Box");
        assert!(matches!(&toks[1], HtmlToken::EndTag { name, .. } if name == "div"));
    }

    #[test]
    fn self_closing_tag() {
        let toks = tokens("<br/>");
        assert_eq!(start_tag(&toks[0]), ("br", &[][..], true));
    }

    #[test]
    fn script_body_is_raw_text() {
        let toks = tokens("<script>if (a < b) { x = '</div>'; }</script>");
        assert_eq!(toks.len(), 3);
        assert!(
            matches!(&toks[1], HtmlToken::Text { text, .. } if text == "if (a < b) { x = '</div>'; }")
        );
        assert!(matches!(&toks[2], HtmlToken::EndTag { name, .. } if name == "script"));
    }

    #[test]
    fn comments_and_doctype() {
        let toks = tokens("<!DOCTYPE html><!-- note --><p>");
        assert!(matches!(&toks[0], HtmlToken::Doctype { value, .. } if value == "html"));
        assert!(matches!(&toks[1], HtmlToken::Comment { text, .. } if text == " note "));
    }

    #[test]
    fn lone_less_than_is_text() {
        let toks = tokens("a < b");
        assert_eq!(toks.len(), 1);
        assert!(matches!(&toks[0], HtmlToken::Text { text, .. } if text == "a < b"));
    }

    #[test]
    fn spans_point_at_tags() {
        let toks = tokens("<p>\n  <img alt=\"\">");
        match &toks[2] {
            HtmlToken::StartTag { span, attributes, .. } => {
                assert_eq!(span.start, Position::new(2, 3));
                assert_eq!(attributes[0].span.start, Position::new(2, 8));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unterminated_tag_does_not_panic() {
        let toks = tokens("<div class=\"open");
        assert_eq!(start_tag(&toks[0]).0, "div");
    }
}
