//! HTML tree construction.
//!
//! Builds an owned [`Document`] from the token stream using a stack of open
//! elements. Void elements never take children, a handful of implied end tags
//! are honored (`li`, `p`, table cells, ...) and stray end tags are dropped.
//! Nesting is capped at [`MAX_OPEN_ELEMENTS`]; deeper start tags are attached to
//! the innermost open element as leaves.

use super::token::{Attribute, HtmlToken, HtmlTokenizer};
use crate::parse::span::Span;

/// Deepest element nesting the builder keeps.
pub const MAX_OPEN_ELEMENTS: usize = 512;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose start tag implicitly closes an open `p`.
const CLOSES_P: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    pub self_closing: bool,
    /// Span of the start tag.
    pub span: Span,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attr_value("class")
            .unwrap_or_default()
            .split_whitespace()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn has_non_whitespace_text_child(&self) -> bool {
        self.children
            .iter()
            .any(|node| matches!(node, Node::Text(t) if !t.text.trim().is_empty()))
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

impl Drop for Element {
    // unlinks descendants one level at a time so teardown never recurses
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Element(mut el) = node {
                pending.append(&mut el.children);
            }
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    let mut stack = vec![nodes.iter()];
    while let Some(iter) = stack.last_mut() {
        let Some(node) = iter.next() else {
            stack.pop();
            continue;
        };
        match node {
            Node::Text(t) => out.push_str(&t.text),
            Node::Element(el) => stack.push(el.children.iter()),
            Node::Comment(_) => {}
        }
    }
}

fn collect_elements<'a>(nodes: &'a [Node], out: &mut Vec<&'a Element>) {
    let mut stack = vec![nodes.iter()];
    while let Some(iter) = stack.last_mut() {
        let Some(node) = iter.next() else {
            stack.pop();
            continue;
        };
        if let Node::Element(el) = node {
            out.push(el);
            stack.push(el.children.iter());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Doctype text after the `<!doctype` keyword, when one precedes the first element.
    pub doctype: Option<String>,
    pub doctype_span: Option<Span>,
    pub children: Vec<Node>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        TreeBuilder::default().build(HtmlTokenizer::new(html))
    }

    /// Every element in document order (depth-first, pre-order).
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(&self.children, &mut out);
        out
    }

    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().into_iter().filter(move |el| el.name == name)
    }

    /// The top-level `html` element, if the document has one.
    pub fn root_element(&self) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(el) if el.name == "html" => Some(el),
            _ => None,
        })
    }
}

#[derive(Debug, Default)]
struct TreeBuilder {
    document: Document,
    open: Vec<Element>,
    seen_element: bool,
}

impl TreeBuilder {
    fn build(mut self, tokens: HtmlTokenizer) -> Document {
        for token in tokens {
            match token {
                HtmlToken::Doctype { value, span } => {
                    if !self.seen_element && self.document.doctype.is_none() {
                        self.document.doctype = Some(value);
                        self.document.doctype_span = Some(span);
                    }
                }
                HtmlToken::StartTag {
                    name,
                    attributes,
                    self_closing,
                    span,
                } => self.start_element(name, attributes, self_closing, span),
                HtmlToken::EndTag { name, .. } => self.end_element(&name),
                HtmlToken::Text { text, span } => self.append(Node::Text(Text { text, span })),
                HtmlToken::Comment { text, span } => {
                    self.append(Node::Comment(Comment { text, span }))
                }
            }
        }

        while !self.open.is_empty() {
            self.pop();
        }
        self.document
    }

    fn start_element(
        &mut self,
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
        span: Span,
    ) {
        self.seen_element = true;
        self.close_implied(&name);

        let element = Element {
            name,
            attributes,
            children: Vec::new(),
            self_closing,
            span,
        };

        if self_closing || element.is_void() {
            self.append(Node::Element(element));
        } else if self.open.len() >= MAX_OPEN_ELEMENTS {
            tracing::trace!(tag = %element.name, "nesting limit reached, flattening element");
            self.append(Node::Element(element));
        } else {
            self.open.push(element);
        }
    }

    fn close_implied(&mut self, opening: &str) {
        let Some(current) = self.open.last().map(|el| el.name.as_str()) else {
            return;
        };
        let implied = match opening {
            "li" => current == "li",
            "dt" | "dd" => matches!(current, "dt" | "dd"),
            "option" => current == "option",
            "tr" => matches!(current, "tr" | "td" | "th"),
            "td" | "th" => matches!(current, "td" | "th"),
            _ => current == "p" && CLOSES_P.contains(&opening),
        };
        if implied {
            self.pop();
            // a new row also closes the row that held the open cell
            if opening == "tr" && self.open.last().is_some_and(|el| el.name == "tr") {
                self.pop();
            }
        }
    }

    fn end_element(&mut self, name: &str) {
        let Some(index) = self.open.iter().rposition(|el| el.name == name) else {
            tracing::trace!(tag = name, "dropping stray end tag");
            return;
        };
        while self.open.len() > index {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if let Some(element) = self.open.pop() {
            self.append(Node::Element(element));
        }
    }

    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.document.children.push(node),
        }
    }
}
