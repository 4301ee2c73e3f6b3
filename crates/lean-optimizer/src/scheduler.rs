//! Directive Queue & Scheduler
//!
//! Filters incoming directives against the document and the configuration,
//! then orders the survivors by priority and sequence.

use crate::executor::OptimizationTarget;
use crate::{ChangeRecord, Directive, OptimizerConfig};

/// Directives to run, in order, and the records of those dropped
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub queue: Vec<Directive>,
    pub skipped: Vec<ChangeRecord>,
}

/// Validate and order directives for a document
pub fn schedule<T: OptimizationTarget>(document: &T, directives: &[Directive], config: &OptimizerConfig) -> Schedule {
    let mut plan = Schedule::default();

    for (index, directive) in directives.iter().enumerate() {
        let mut directive = directive.clone();
        directive.sequence.get_or_insert(index);

        if !directive.kind.applies_to(document.kind()) {
            tracing::debug!("Skipping {}: not a {:?} directive", directive.label(), document.kind());
            let reason = format!("{} does not apply to {:?} documents", directive.kind.name(), document.kind());
            plan.skipped.push(ChangeRecord::skipped(directive, reason));
            continue;
        }
        if directive.confidence < config.min_confidence {
            tracing::warn!("Skipping {}: {:?} confidence", directive.label(), directive.confidence);
            plan.skipped.push(ChangeRecord::skipped(directive, "confidence below threshold"));
            continue;
        }
        if directive.requires_testing && !config.allow_requires_testing {
            tracing::warn!("Skipping {}: requires testing", directive.label());
            plan.skipped.push(ChangeRecord::skipped(directive, "requires testing"));
            continue;
        }

        match document.resolve(&directive) {
            Ok(0) => {
                tracing::debug!("Skipping {}: target matches nothing", directive.label());
                plan.skipped.push(ChangeRecord::skipped(directive, "target matches nothing"));
            }
            Ok(_) => plan.queue.push(directive),
            Err(e) => {
                tracing::warn!("{} failed: {}", directive.label(), e);
                plan.skipped.push(ChangeRecord::failed(directive, e.to_string()));
            }
        }
    }

    // Stable: equal keys keep their incoming order
    plan.queue.sort_by_key(|d| (d.priority, d.sequence));

    tracing::debug!("Scheduled {} directives, dropped {}", plan.queue.len(), plan.skipped.len());
    plan
}
