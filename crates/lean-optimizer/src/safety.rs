//! Safety predicates
//!
//! Every removal decision goes through these checks. They only read the
//! tree, so HTML mutations and the pruner share one notion of "safe".

use lean_dom::{DomTree, NodeData, NodeId, is_void_element};

/// Elements that are never removed, unwrapped or replaced
pub const STRUCTURAL_ROOTS: &[&str] = &["html", "head", "body", "script", "style", "title", "template"];

/// Attributes whose removal changes behavior, styling or accessibility
const CRITICAL_ATTRIBUTES: &[&str] = &[
    "id", "class", "style", "name", "href", "src", "action", "method", "value", "type",
    "placeholder", "alt", "title", "role", "for", "rel", "target", "media", "charset", "lang",
    "disabled", "readonly", "required", "checked", "selected", "multiple", "pattern", "min",
    "max", "step", "novalidate", "autocomplete", "autofocus", "contenteditable",
];

/// Attributes that keep an otherwise empty element alive
const KEEP_ALIVE_ATTRIBUTES: &[&str] = &["id", "class", "style", "name", "role", "value"];

/// Attributes scripts and stylesheets hook into
const HOOK_ATTRIBUTES: &[&str] = &["id", "class"];

fn has_prefix_ignore_case(name: &str, prefix: &str) -> bool {
    name.get(..prefix.len()).is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// `data-*`, `on*` and `aria-*`
fn is_prefixed_hook(name: &str) -> bool {
    has_prefix_ignore_case(name, "data-")
        || has_prefix_ignore_case(name, "on")
        || has_prefix_ignore_case(name, "aria-")
}

/// Tag is a structural root
pub fn is_structural_root(tag: &str) -> bool {
    STRUCTURAL_ROOTS.iter().any(|root| tag.eq_ignore_ascii_case(root))
}

/// Tag is never pruned: structural roots and void elements
pub fn is_protected_tag(tag: &str) -> bool {
    is_structural_root(tag) || is_void_element(tag)
}

/// Attribute that a `remove_attribute` directive only removes when forced
pub fn is_critical_attribute(name: &str) -> bool {
    CRITICAL_ATTRIBUTES.iter().any(|a| name.eq_ignore_ascii_case(a)) || is_prefixed_hook(name)
}

/// Attribute that protects its element from every non-forced directive
pub fn is_hook_attribute(name: &str) -> bool {
    HOOK_ATTRIBUTES.iter().any(|a| name.eq_ignore_ascii_case(a)) || is_prefixed_hook(name)
}

/// Element carries `id`, `class`, `data-*`, `on*` or `aria-*`
pub fn carries_hook_attribute(tree: &DomTree, node: NodeId) -> bool {
    tree.element(node)
        .is_some_and(|el| el.attrs.iter().any(|attr| is_hook_attribute(&attr.name)))
}

/// No element children and no visible text
pub fn is_structurally_empty(tree: &DomTree, node: NodeId) -> bool {
    !tree.has_element_children(node) && !tree.has_visible_text(node)
}

/// An empty element nothing refers to.
///
/// False for void elements and structural roots, for elements with element
/// children or visible text, and for elements carrying `id`, `class`,
/// `style`, `name`, `role`, `value`, `data-*`, `on*` or `aria-*`.
pub fn is_safe_to_remove_if_empty(tree: &DomTree, node: NodeId) -> bool {
    let Some(el) = tree.element(node) else {
        return false;
    };
    if is_protected_tag(&el.tag) || !is_structurally_empty(tree, node) {
        return false;
    }
    !el.attrs.iter().any(|attr| {
        KEEP_ALIVE_ATTRIBUTES.iter().any(|a| attr.name.eq_ignore_ascii_case(a)) || is_prefixed_hook(&attr.name)
    })
}

/// Removal rule for tags an advisor asserted to be redundant: structurally
/// empty, not protected, no hook attribute.
pub fn is_removable_redundant(tree: &DomTree, node: NodeId) -> bool {
    let Some(el) = tree.element(node) else {
        return false;
    };
    !is_protected_tag(&el.tag) && is_structurally_empty(tree, node) && !carries_hook_attribute(tree, node)
}

/// Element may be spliced out of the tree
pub fn can_unwrap(tree: &DomTree, node: NodeId, force: bool) -> bool {
    let Some(el) = tree.element(node) else {
        return false;
    };
    if is_structural_root(&el.tag) || tree.parent(node).is_none() {
        return false;
    }
    force || !(el.is_void() || carries_hook_attribute(tree, node))
}

/// Comment node
pub fn is_comment(tree: &DomTree, node: NodeId) -> bool {
    tree.get(node).is_some_and(|n| matches!(n.data, NodeData::Comment(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(tag: &str, attrs: &[(&str, &str)]) -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let root = tree.root();
        let node = tree.create_element(tag);
        for (name, value) in attrs {
            tree.element_mut(node).unwrap().set_attr(name, *value);
        }
        tree.append_child(root, node).unwrap();
        (tree, node)
    }

    #[test]
    fn test_critical_attributes() {
        for name in ["id", "CLASS", "href", "data-x", "onclick", "aria-label", "contenteditable"] {
            assert!(is_critical_attribute(name), "{name}");
        }
        for name in ["width", "border", "bgcolor", "align"] {
            assert!(!is_critical_attribute(name), "{name}");
        }
    }

    #[test]
    fn test_safe_to_remove_plain_empty() {
        let (tree, node) = tree_with("span", &[]);
        assert!(is_safe_to_remove_if_empty(&tree, node));
    }

    #[test]
    fn test_keep_alive_attributes_block_removal() {
        for attr in ["id", "class", "style", "name", "role", "value", "data-k", "onload", "aria-hidden"] {
            let (tree, node) = tree_with("div", &[(attr, "x")]);
            assert!(!is_safe_to_remove_if_empty(&tree, node), "{attr}");
        }
        let (tree, node) = tree_with("div", &[("title", "x")]);
        assert!(is_safe_to_remove_if_empty(&tree, node));
    }

    #[test]
    fn test_protected_tags() {
        for tag in ["img", "br", "input", "meta", "link", "hr", "body", "script", "template"] {
            let (tree, node) = tree_with(tag, &[]);
            assert!(!is_safe_to_remove_if_empty(&tree, node), "{tag}");
            assert!(!is_removable_redundant(&tree, node), "{tag}");
        }
    }

    #[test]
    fn test_content_blocks_removal() {
        let (mut tree, node) = tree_with("p", &[]);
        let ws = tree.create_text("  \n");
        tree.append_child(node, ws).unwrap();
        assert!(is_safe_to_remove_if_empty(&tree, node));

        let text = tree.create_text("hi");
        tree.append_child(node, text).unwrap();
        assert!(!is_safe_to_remove_if_empty(&tree, node));
    }

    #[test]
    fn test_redundant_ignores_style_but_not_hooks() {
        let (tree, node) = tree_with("font", &[("style", "color:red")]);
        assert!(!is_safe_to_remove_if_empty(&tree, node));
        assert!(is_removable_redundant(&tree, node));

        let (tree, node) = tree_with("font", &[("class", "x")]);
        assert!(!is_removable_redundant(&tree, node));
    }

    #[test]
    fn test_can_unwrap() {
        let (tree, node) = tree_with("span", &[]);
        assert!(can_unwrap(&tree, node, false));
        let (tree, node) = tree_with("span", &[("data-x", "1")]);
        assert!(!can_unwrap(&tree, node, false));
        assert!(can_unwrap(&tree, node, true));
        let (tree, node) = tree_with("body", &[]);
        assert!(!can_unwrap(&tree, node, true));
    }
}
