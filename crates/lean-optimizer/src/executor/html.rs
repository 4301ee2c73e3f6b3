//! HTML mutations

use lean_dom::{DomTree, HtmlDocument, NodeData, NodeId, is_valid_tag_name, is_void_element};

use super::{MutationError, OptimizationTarget};
use crate::pruner::prune_empty_nodes;
use crate::safety::{
    can_unwrap, is_comment, is_protected_tag, is_removable_redundant, is_safe_to_remove_if_empty,
    is_structural_root, is_critical_attribute,
};
use crate::{Directive, DirectiveKind, DocumentKind, DocumentStats};

impl OptimizationTarget for HtmlDocument {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Html
    }

    fn resolve(&self, directive: &Directive) -> Result<usize, MutationError> {
        if directive.kind.is_document_wide() && directive.targets_everything() {
            return Ok(1);
        }
        Ok(select(self, directive)?.len())
    }

    fn apply(&mut self, directive: &Directive) -> Result<usize, MutationError> {
        match &directive.kind {
            DirectiveKind::RemoveNode { redundant } => {
                let matched = select(self, directive)?;
                Ok(remove_nodes(&mut self.tree, &matched, *redundant))
            }
            DirectiveKind::RemoveAttribute { attribute, force } => {
                if is_critical_attribute(attribute) && !force {
                    return Err(MutationError::NotApplicable(format!(
                        "attribute {attribute:?} is critical and needs force"
                    )));
                }
                let matched = select(self, directive)?;
                Ok(remove_attribute(&mut self.tree, &matched, attribute))
            }
            DirectiveKind::UnwrapNode { force } => {
                let matched = select(self, directive)?;
                unwrap_nodes(&mut self.tree, &matched, *force)
            }
            DirectiveKind::ReplaceTag { new_tag } => {
                let new_tag = checked_tag(new_tag)?;
                let matched = select(self, directive)?;
                replace_tags(&mut self.tree, &matched, &new_tag)
            }
            DirectiveKind::RemoveComments => {
                let scopes = if directive.targets_everything() {
                    vec![self.tree.root()]
                } else {
                    select(self, directive)?
                };
                remove_comments(&mut self.tree, &scopes)
            }
            other => Err(MutationError::NotApplicable(format!("{} does not apply to HTML", other.name()))),
        }
    }

    fn prune(&mut self, max_iterations: usize) -> usize {
        prune_empty_nodes(&mut self.tree, max_iterations)
    }

    fn stats(&self) -> DocumentStats {
        let tree = &self.tree;
        let mut stats = DocumentStats {
            byte_size: lean_html::serialize(self).len(),
            ..Default::default()
        };

        for (id, node) in tree.descendants(tree.root()) {
            match &node.data {
                NodeData::Element(el) => {
                    stats.node_count += 1;
                    stats.attribute_count += el.attrs.len();
                    stats.max_depth = stats.max_depth.max(tree.depth(id) + 1);
                    if !el.is_void() && !tree.has_element_children(id) && !tree.has_visible_text(id) {
                        stats.empty_count += 1;
                    }
                }
                NodeData::Comment(_) => stats.comment_count += 1,
                _ => {}
            }
        }
        stats
    }

    fn serialize(&self) -> String {
        lean_html::serialize(self)
    }
}

/// Resolve the directive's selector; an empty target is an error
fn select(document: &HtmlDocument, directive: &Directive) -> Result<Vec<NodeId>, MutationError> {
    if directive.target.trim().is_empty() {
        return Err(MutationError::MissingTarget(directive.kind.name()));
    }
    Ok(document.select(&directive.target)?)
}

fn checked_tag(tag: &str) -> Result<String, MutationError> {
    let tag = tag.trim().to_ascii_lowercase();
    if !is_valid_tag_name(&tag) {
        return Err(MutationError::InvalidTag { tag, reason: "not a valid element name" });
    }
    if is_void_element(&tag) {
        return Err(MutationError::InvalidTag { tag, reason: "void elements cannot take children" });
    }
    if is_structural_root(&tag) {
        return Err(MutationError::InvalidTag { tag, reason: "structural elements are never introduced" });
    }
    Ok(tag)
}

fn remove_nodes(tree: &mut DomTree, matched: &[NodeId], redundant: bool) -> usize {
    let mut removed = 0;
    for &id in matched {
        if !tree.is_attached(id) {
            continue;
        }
        let removable = is_safe_to_remove_if_empty(tree, id) || (redundant && is_removable_redundant(tree, id));
        if removable && tree.detach(id).is_ok() {
            removed += 1;
        }
    }
    removed
}

fn remove_attribute(tree: &mut DomTree, matched: &[NodeId], attribute: &str) -> usize {
    let mut removed = 0;
    for &id in matched {
        if let Some(el) = tree.element_mut(id) {
            if el.remove_attr(attribute).is_some() {
                removed += 1;
            }
        }
    }
    removed
}

fn unwrap_nodes(tree: &mut DomTree, matched: &[NodeId], force: bool) -> Result<usize, MutationError> {
    let mut unwrapped = 0;
    for &id in matched {
        if !tree.is_attached(id) || !can_unwrap(tree, id, force) {
            continue;
        }
        let parent = tree.unwrap(id)?;
        unwrapped += 1;

        // One hop: the former parent may be empty now
        if is_safe_to_remove_if_empty(tree, parent) {
            tree.detach(parent)?;
        }
    }
    Ok(unwrapped)
}

fn replace_tags(tree: &mut DomTree, matched: &[NodeId], new_tag: &str) -> Result<usize, MutationError> {
    let mut replaced = 0;
    for &id in matched {
        let Some(tag) = tree.tag_name(id) else {
            continue;
        };
        if tag == new_tag || is_protected_tag(tag) || !tree.is_attached(id) {
            continue;
        }
        let replacement = tree.replace_with_element(id, new_tag)?;
        replaced += 1;
        if is_safe_to_remove_if_empty(tree, replacement) {
            tree.detach(replacement)?;
        }
    }
    Ok(replaced)
}

fn remove_comments(tree: &mut DomTree, scopes: &[NodeId]) -> Result<usize, MutationError> {
    let mut comments: Vec<NodeId> = scopes
        .iter()
        .flat_map(|&scope| tree.descendants(scope).map(|(id, _)| id))
        .filter(|&id| is_comment(tree, id))
        .collect();
    comments.sort_unstable();
    comments.dedup();

    for &id in &comments {
        tree.detach(id)?;
    }
    Ok(comments.len())
}
