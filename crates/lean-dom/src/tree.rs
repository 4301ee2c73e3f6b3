//! DOM Tree (arena-based allocation)
//!
//! Removed nodes stay in the arena but are unreachable from the root;
//! every traversal starts from a live node, so detached subtrees are
//! invisible to selectors, statistics and serialization.

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId};

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena holds nothing but the document node
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached element from prepared data
    pub fn create_element_with(&mut self, data: ElementData) -> NodeId {
        let mut node = Node::element(&data.tag);
        node.data = NodeData::Element(data);
        self.push(node)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.push(Node::doctype(name, public_id, system_id))
    }

    /// Create a detached processing instruction
    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        self.push(Node::processing_instruction(target, data))
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Element data for a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data for a node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Tag name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Iterate over the children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let first = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next: first }
    }

    /// Snapshot of child IDs (safe to hold across mutation)
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// Element children only
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
    }

    /// Pre-order traversal of all descendants of `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let first = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Descendants { tree: self, scope: id, next: first }
    }

    /// Ancestors from the parent up to the document node
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is reachable from the document node
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|a| a == self.root())
    }

    /// Number of element ancestors
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).filter(|&a| self.element(a).is_some()).count()
    }

    /// Whether the node has at least one element child
    pub fn has_element_children(&self, id: NodeId) -> bool {
        self.element_children(id).next().is_some()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for (_, node) in self.descendants(id) {
            if let Some(t) = node.as_text() {
                text.push_str(t);
            }
        }
        text
    }

    /// Whether any descendant text node carries non-whitespace characters
    pub fn has_visible_text(&self, id: NodeId) -> bool {
        self.descendants(id)
            .filter_map(|(_, node)| node.as_text())
            .any(|t| !t.trim().is_empty())
    }

    fn check_container(&self, parent: NodeId) -> DomResult<()> {
        match self.node(parent)?.data {
            NodeData::Element(_) | NodeData::Document => Ok(()),
            _ => Err(DomError::InvalidNodeType { expected: "element or document" }),
        }
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.check_container(parent)?;
        self.node(child)?;
        if child == self.root() {
            return Err(DomError::HierarchyRequest("the document node cannot be moved".into()));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(format!(
                "{child:?} is an ancestor of {parent:?}"
            )));
        }
        Ok(())
    }

    /// Append a child node, detaching it from its current parent first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.check_insertable(parent, child)?;
        self.detach(child)?;

        let last = self.node(parent)?.last_child;
        {
            let node = self.node_mut(child)?;
            node.parent = parent;
            node.prev_sibling = last;
        }
        if last.is_valid() {
            self.node_mut(last)?.next_sibling = child;
        } else {
            self.node_mut(parent)?.first_child = child;
        }
        self.node_mut(parent)?.last_child = child;
        Ok(())
    }

    /// Insert `new_child` directly before `reference`
    pub fn insert_before(&mut self, parent: NodeId, new_child: NodeId, reference: NodeId) -> DomResult<()> {
        if self.node(reference)?.parent != parent {
            return Err(DomError::NotAChild { parent, child: reference });
        }
        if new_child == reference {
            return Ok(());
        }
        self.check_insertable(parent, new_child)?;
        self.detach(new_child)?;

        let prev = self.node(reference)?.prev_sibling;
        {
            let node = self.node_mut(new_child)?;
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        self.node_mut(reference)?.prev_sibling = new_child;
        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = new_child;
        } else {
            self.node_mut(parent)?.first_child = new_child;
        }
        Ok(())
    }

    /// Detach a node (and its subtree) from its parent
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node(id)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = next;
        } else {
            self.node_mut(parent)?.first_child = next;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = prev;
        } else {
            self.node_mut(parent)?.last_child = prev;
        }

        let node = self.node_mut(id)?;
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Replace a node by its children, in place. Returns the former parent.
    pub fn unwrap(&mut self, id: NodeId) -> DomResult<NodeId> {
        let parent = self.parent(id)
            .ok_or_else(|| DomError::HierarchyRequest(format!("{id:?} has no parent")))?;
        for child in self.child_ids(id) {
            self.insert_before(parent, child, id)?;
        }
        self.detach(id)?;
        Ok(parent)
    }

    /// Replace an element by a new element with another tag, keeping its
    /// attributes and children. Returns the new node.
    pub fn replace_with_element(&mut self, id: NodeId, tag: &str) -> DomResult<NodeId> {
        if !is_valid_tag_name(tag) {
            return Err(DomError::InvalidName(tag.to_string()));
        }
        let attrs = self.element(id)
            .ok_or(DomError::InvalidNodeType { expected: "element" })?
            .attrs
            .clone();
        let parent = self.parent(id)
            .ok_or_else(|| DomError::HierarchyRequest(format!("{id:?} has no parent")))?;

        let mut data = ElementData::new(tag);
        data.attrs = attrs;
        let replacement = self.create_element_with(data);
        for child in self.child_ids(id) {
            self.append_child(replacement, child)?;
        }
        self.insert_before(parent, replacement, id)?;
        self.detach(id)?;
        Ok(replacement)
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// HTML tag names the serializer can emit unchanged
pub fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a DomTree,
    scope: NodeId,
    next: NodeId,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            // Climb until a node with a next sibling, without leaving scope
            let mut current = id;
            loop {
                if current == self.scope {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(current) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                if !n.parent.is_valid() || n.parent == self.scope {
                    break NodeId::NONE;
                }
                current = n.parent;
            }
        };
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(div, b).unwrap();
        (tree, div, a, b)
    }

    #[test]
    fn test_append_and_children() {
        let (tree, div, a, b) = sample();
        assert_eq!(tree.child_ids(div), vec![a, b]);
        assert_eq!(tree.parent(a), Some(div));
        assert_eq!(tree.depth(b), 1);
    }

    #[test]
    fn test_detach_relinks_siblings() {
        let (mut tree, div, a, b) = sample();
        tree.detach(a).unwrap();
        assert_eq!(tree.child_ids(div), vec![b]);
        assert_eq!(tree.parent(a), None);
        assert!(!tree.is_attached(a));
        assert_eq!(tree.get(b).unwrap().prev_sibling, NodeId::NONE);
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut tree, div, a, _) = sample();
        let err = tree.append_child(a, div).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest(_)));
    }

    #[test]
    fn test_unwrap_preserves_order() {
        let (mut tree, div, a, b) = sample();
        let parent = tree.unwrap(div).unwrap();
        assert_eq!(parent, tree.root());
        assert_eq!(tree.child_ids(tree.root()), vec![a, b]);
    }

    #[test]
    fn test_replace_keeps_attrs_and_children() {
        let (mut tree, div, a, b) = sample();
        tree.element_mut(div).unwrap().set_attr("class", "box");
        let section = tree.replace_with_element(div, "section").unwrap();
        assert_eq!(tree.tag_name(section), Some("section"));
        assert_eq!(tree.element(section).unwrap().get_attr("class"), Some("box"));
        assert_eq!(tree.child_ids(section), vec![a, b]);
        assert!(!tree.is_attached(div));
    }

    #[test]
    fn test_replace_rejects_bad_name() {
        let (mut tree, div, _, _) = sample();
        assert!(matches!(
            tree.replace_with_element(div, "<script>"),
            Err(DomError::InvalidName(_))
        ));
    }

    #[test]
    fn test_descendants_preorder() {
        let (mut tree, div, a, b) = sample();
        let text = tree.create_text("hi");
        tree.append_child(a, text).unwrap();
        let order: Vec<_> = tree.descendants(tree.root()).map(|(id, _)| id).collect();
        assert_eq!(order, vec![div, a, text, b]);

        let scoped: Vec<_> = tree.descendants(a).map(|(id, _)| id).collect();
        assert_eq!(scoped, vec![text]);
    }
}
