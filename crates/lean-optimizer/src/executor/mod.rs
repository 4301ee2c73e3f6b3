//! Mutation Executor
//!
//! Applies one directive at a time against the current state of a document.
//! Each application is atomic: the document is snapshotted first and
//! restored when the mutation fails part way.

mod css;
mod html;

use lean_css::CssError;
use lean_dom::{DomError, SelectorError};

use crate::{ChangeRecord, Directive, DocumentKind, DocumentStats};

/// Mutation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    #[error("Target error: {0}")]
    Target(#[from] CssError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    /// The directive leaves the document as it is; becomes a skipped record
    #[error("{0}")]
    NotApplicable(String),

    #[error("{0} needs a target")]
    MissingTarget(&'static str),

    #[error("Invalid tag {tag:?}: {reason}")]
    InvalidTag { tag: String, reason: &'static str },
}

/// A document the optimizer can work on.
///
/// `Clone` is the snapshot used to roll back a failed mutation.
pub trait OptimizationTarget: Clone {
    /// Document kind, for directive applicability
    fn kind(&self) -> DocumentKind;

    /// Number of nodes or rules the directive's target addresses
    fn resolve(&self, directive: &Directive) -> Result<usize, MutationError>;

    /// Apply the directive; returns how many things changed
    fn apply(&mut self, directive: &Directive) -> Result<usize, MutationError>;

    /// Remove empty nodes or rules; returns how many were removed
    fn prune(&mut self, max_iterations: usize) -> usize;

    /// Current statistics
    fn stats(&self) -> DocumentStats;

    /// Serialize to text
    fn serialize(&self) -> String;
}

/// Apply one directive, producing its change record
pub fn apply<T: OptimizationTarget>(document: &mut T, directive: &Directive) -> ChangeRecord {
    let snapshot = document.clone();

    match document.apply(directive) {
        Ok(0) => {
            tracing::debug!("{}: no change", directive.label());
            ChangeRecord::skipped(directive.clone(), "no change")
        }
        Ok(count) => {
            tracing::debug!("{}: changed {}", directive.label(), count);
            ChangeRecord::applied(directive.clone(), count)
        }
        Err(MutationError::NotApplicable(reason)) => {
            *document = snapshot;
            tracing::debug!("{}: {}", directive.label(), reason);
            ChangeRecord::skipped(directive.clone(), reason)
        }
        Err(e) => {
            *document = snapshot;
            tracing::warn!("{} failed: {}", directive.label(), e);
            ChangeRecord::failed(directive.clone(), e.to_string())
        }
    }
}
