//! lean DOM - Editable Document Object Model
//!
//! Arena-based HTML tree with the structural edits the optimizer needs
//! (detach, unwrap, replace) and a CSS selector engine to address nodes.

mod node;
mod tree;
mod document;
mod selector;

pub use node::{Node, NodeData, ElementData, Attribute, VOID_ELEMENTS, is_void_element};
pub use tree::{DomTree, Children, Descendants, is_valid_tag_name};
pub use document::HtmlDocument;
pub use selector::{
    SelectorList, ComplexSelector, CompoundSelector, Combinator, SelectorComponent,
    AttributeSelector, AttributeMatcher, PseudoClass, NthExpression,
};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Invalid/none node ID
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0:?} not found")]
    NotFound(NodeId),
    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(String),
    /// Node is not a child of the given parent
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    /// Operation requires a different node type
    #[error("invalid node type: expected {expected}")]
    InvalidNodeType { expected: &'static str },
    /// Tag or attribute name that cannot be serialized
    #[error("invalid name: {0:?}")]
    InvalidName(String),
}

/// Malformed selector expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selector {selector:?} at offset {position}: {message}")]
pub struct SelectorError {
    pub selector: String,
    pub position: usize,
    pub message: String,
}

impl SelectorError {
    pub fn new(selector: &str, position: usize, message: impl Into<String>) -> Self {
        Self {
            selector: selector.to_string(),
            position,
            message: message.into(),
        }
    }
}
