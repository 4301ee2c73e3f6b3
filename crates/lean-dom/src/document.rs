//! Document - High-level document API

use crate::{DomTree, NodeId, SelectorError, SelectorList};

/// HTML document or fragment
#[derive(Debug, Clone, Default)]
pub struct HtmlDocument {
    /// The DOM tree
    pub tree: DomTree,
    /// Parsed from a fragment (no html/head/body scaffolding)
    fragment: bool,
}

impl HtmlDocument {
    /// Wrap a tree built by a parser
    pub fn from_tree(tree: DomTree, fragment: bool) -> Self {
        Self { tree, fragment }
    }

    /// Create an empty fragment document
    pub fn empty_fragment() -> Self {
        Self::from_tree(DomTree::new(), true)
    }

    /// Whether this document came from a fragment
    pub fn is_fragment(&self) -> bool {
        self.fragment
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Get <html> element, if the document has one
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree.element_children(self.tree.root())
            .find(|&id| self.tree.tag_name(id) == Some("html"))
    }

    /// Get <body> element, if the document has one
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.tree.element_children(html)
            .find(|&id| self.tree.tag_name(id) == Some("body"))
    }

    /// Query all elements matching a selector expression, in document order.
    ///
    /// A malformed expression is an error; an expression that matches
    /// nothing is an empty result.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.select_parsed(&list))
    }

    /// Query with an already parsed selector list
    pub fn select_parsed(&self, list: &SelectorList) -> Vec<NodeId> {
        self.tree.descendants(self.tree.root())
            .filter(|(_, node)| node.is_element())
            .map(|(id, _)| id)
            .filter(|&id| list.matches(&self.tree, id))
            .collect()
    }

    /// Query the first element matching a selector expression
    pub fn select_one(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.select(selector)?.into_iter().next())
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.tree.root())
            .find(|(_, node)| node.as_element().and_then(|e| e.id()) == Some(id))
            .map(|(node_id, _)| node_id)
    }

    /// Live element IDs in document order
    pub fn elements(&self) -> Vec<NodeId> {
        self.tree.descendants(self.tree.root())
            .filter(|(_, node)| node.is_element())
            .map(|(id, _)| id)
            .collect()
    }
}
