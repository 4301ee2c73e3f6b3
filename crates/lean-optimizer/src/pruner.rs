//! Conservative Pruner
//!
//! Removes empty elements nothing refers to, and style rules without
//! declarations. Removing an element can leave its parent empty, so each
//! removal climbs the ancestors until one is still needed.

use lean_css::Stylesheet;
use lean_dom::{DomTree, NodeId};

use crate::safety::is_safe_to_remove_if_empty;

/// Prune empty elements; returns the number removed.
///
/// Each pass scans every attached element. Passes stop when one removes
/// nothing, or after `max_iterations`.
pub fn prune_empty_nodes(tree: &mut DomTree, max_iterations: usize) -> usize {
    let mut removed = 0;

    for pass in 0..max_iterations {
        let candidates: Vec<NodeId> = tree
            .descendants(tree.root())
            .map(|(id, _)| id)
            .filter(|&id| is_safe_to_remove_if_empty(tree, id))
            .collect();

        let mut pass_removed = 0;
        for id in candidates {
            // An earlier removal may have changed this one
            if !tree.is_attached(id) || !is_safe_to_remove_if_empty(tree, id) {
                continue;
            }
            pass_removed += remove_and_climb(tree, id);
        }

        tracing::trace!("Prune pass {}: removed {}", pass + 1, pass_removed);
        if pass_removed == 0 {
            break;
        }
        removed += pass_removed;
    }

    if removed > 0 {
        tracing::debug!("Pruned {} empty elements", removed);
    }
    removed
}

/// Detach a node, then each ancestor that became safe to remove
fn remove_and_climb(tree: &mut DomTree, id: NodeId) -> usize {
    let mut parent = tree.parent(id);
    if tree.detach(id).is_err() {
        return 0;
    }
    let mut removed = 1;

    // Structural roots and the document node are never safe, so the climb stops there
    while let Some(ancestor) = parent {
        if !is_safe_to_remove_if_empty(tree, ancestor) {
            break;
        }
        parent = tree.parent(ancestor);
        if tree.detach(ancestor).is_err() {
            break;
        }
        removed += 1;
    }
    removed
}

/// Remove style rules without declarations; returns the number removed
pub fn prune_empty_rules(sheet: &mut Stylesheet) -> usize {
    let empty: Vec<usize> = sheet
        .rules()
        .filter(|(_, rule)| rule.declarations().is_empty())
        .map(|(index, _)| index)
        .collect();
    let removed = sheet.remove_items(&empty);
    if removed > 0 {
        tracing::debug!("Pruned {} empty rules", removed);
    }
    removed
}
