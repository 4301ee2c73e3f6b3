//! lean CSS
//!
//! Stylesheets as an ordered, editable list of rules. Parsing is validated
//! by lightningcss and split with the cssparser tokenizer; rules nobody
//! edits are written back exactly as they were read.

mod parser;
mod stylesheet;
mod target;
mod values;

pub use parser::CssParser;
pub use stylesheet::{CssItem, Declaration, Rule, Stylesheet};
pub use target::{RuleTarget, split_selector_list};
pub use values::{BOX_SIDES, shorten_box_family, zero_redundant_units};

/// Parse a CSS stylesheet
pub fn parse(css: &str) -> Result<Stylesheet, CssError> {
    CssParser::new().parse(css)
}

/// Serialize a stylesheet back to text
pub fn serialize(sheet: &Stylesheet) -> String {
    sheet.to_css()
}

/// CSS errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse { line: u32, column: u32, message: String },

    #[error("Invalid rule target {target:?}: {message}")]
    InvalidTarget { target: String, message: String },
}

impl CssError {
    pub(crate) fn parse_at(location: cssparser::SourceLocation, message: impl Into<String>) -> Self {
        CssError::Parse {
            line: location.line + 1,
            column: location.column,
            message: message.into(),
        }
    }

    pub(crate) fn target(target: &str, message: impl Into<String>) -> Self {
        CssError::InvalidTarget {
            target: target.to_string(),
            message: message.into(),
        }
    }
}
