//! Edge case tests for lean-dom
//!
//! Malformed selectors, degenerate trees and invalid edits.

use lean_dom::{DomError, DomTree, HtmlDocument, SelectorList};

// ============================================================================
// SELECTORS
// ============================================================================

#[test]
fn test_empty_document_selects_nothing() {
    let doc = HtmlDocument::empty_fragment();
    assert!(doc.is_fragment());
    assert!(doc.select("*").unwrap().is_empty());
    assert!(doc.body().is_none());
}

#[test]
fn test_malformed_selector_reports_position() {
    let err = SelectorList::parse("div > > p").unwrap_err();
    assert_eq!(err.selector, "div > > p");
    assert_eq!(err.position, 6);
}

#[test]
fn test_pseudo_element_rejected() {
    assert!(SelectorList::parse("p::first-line").is_err());
}

#[test]
fn test_dynamic_pseudo_class_rejected() {
    assert!(SelectorList::parse("a:hover").is_err());
    assert!(SelectorList::parse("input:checked").is_err());
}

#[test]
fn test_whitespace_around_list() {
    let list = SelectorList::parse("  a ,\n b  ").unwrap();
    assert_eq!(list.selectors.len(), 2);
}

#[test]
fn test_case_insensitive_type_selector() {
    let mut tree = DomTree::new();
    let div = tree.create_element("DIV");
    tree.append_child(tree.root(), div).unwrap();
    let doc = HtmlDocument::from_tree(tree, true);
    assert_eq!(doc.select("Div").unwrap(), vec![div]);
}

#[test]
fn test_deep_descendant_match() {
    let mut tree = DomTree::new();
    let mut parent = tree.root();
    for _ in 0..200 {
        let div = tree.create_element("div");
        tree.append_child(parent, div).unwrap();
        parent = div;
    }
    let leaf = tree.create_element("span");
    tree.append_child(parent, leaf).unwrap();
    let doc = HtmlDocument::from_tree(tree, true);
    assert_eq!(doc.select("div span").unwrap(), vec![leaf]);
    assert_eq!(doc.tree.depth(leaf), 200);
}

// ============================================================================
// TREE EDITS
// ============================================================================

#[test]
fn test_cannot_append_into_text() {
    let mut tree = DomTree::new();
    let text = tree.create_text("x");
    let div = tree.create_element("div");
    assert!(matches!(
        tree.append_child(text, div),
        Err(DomError::InvalidNodeType { .. })
    ));
}

#[test]
fn test_cannot_move_document_node() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    tree.append_child(tree.root(), div).unwrap();
    assert!(matches!(
        tree.append_child(div, tree.root()),
        Err(DomError::HierarchyRequest(_))
    ));
}

#[test]
fn test_unwrap_detached_node_fails() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    assert!(tree.unwrap(div).is_err());
}

#[test]
fn test_detach_twice_is_noop() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    tree.append_child(tree.root(), div).unwrap();
    tree.detach(div).unwrap();
    tree.detach(div).unwrap();
    assert!(tree.child_ids(tree.root()).is_empty());
}

#[test]
fn test_unwrap_empty_element() {
    let mut tree = DomTree::new();
    let a = tree.create_element("a");
    let b = tree.create_element("b");
    let c = tree.create_element("c");
    for id in [a, b, c] {
        tree.append_child(tree.root(), id).unwrap();
    }
    tree.unwrap(b).unwrap();
    assert_eq!(tree.child_ids(tree.root()), vec![a, c]);
}
