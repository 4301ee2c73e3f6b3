//! lean HTML
//!
//! HTML5 parser built on html5ever, converting into the `lean-dom` arena,
//! and a canonical serializer back to text.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::{HtmlSerializer, RAW_TEXT_ELEMENTS};

use lean_dom::HtmlDocument;

/// Parse an HTML string (document or fragment) leniently
pub fn parse(html: &str) -> Result<HtmlDocument, ParseError> {
    HtmlParser::new().parse(html)
}

/// Serialize a document back to HTML text
pub fn serialize(document: &HtmlDocument) -> String {
    HtmlSerializer::new().serialize(document)
}

/// Parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("input is not valid UTF-8 (first invalid byte at offset {offset})")]
    Encoding { offset: usize },

    #[error("{} HTML parse error(s), first: {}", .errors.len(), .errors.first().map_or("", String::as_str))]
    Malformed { errors: Vec<String> },
}
