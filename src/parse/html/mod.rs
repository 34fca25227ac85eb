//! HTML front end: tokenizer and tree builder.

pub mod token;
pub mod tree;

pub use token::{Attribute, HtmlToken, HtmlTokenizer};
pub use tree::{Comment, Document, Element, Node, Text};
