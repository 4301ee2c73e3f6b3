//! Change records and the optimization report

use serde::Serialize;

use crate::Directive;

/// Outcome of one directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Applied,
    Skipped,
    Failed,
}

/// What happened to one directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub directive: Directive,
    pub status: ChangeStatus,
    pub reason: String,
    /// Nodes, attributes, rules or values changed
    pub count: usize,
}

impl ChangeRecord {
    pub fn applied(directive: Directive, count: usize) -> Self {
        Self {
            directive,
            status: ChangeStatus::Applied,
            reason: format!("changed {count}"),
            count,
        }
    }

    pub fn skipped(directive: Directive, reason: impl Into<String>) -> Self {
        Self { directive, status: ChangeStatus::Skipped, reason: reason.into(), count: 0 }
    }

    pub fn failed(directive: Directive, reason: impl Into<String>) -> Self {
        Self { directive, status: ChangeStatus::Failed, reason: reason.into(), count: 0 }
    }
}

/// Size and shape of a document.
///
/// For stylesheets, rules count as nodes and declarations as attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DocumentStats {
    pub node_count: usize,
    pub attribute_count: usize,
    pub max_depth: usize,
    pub selector_count: usize,
    pub duplicate_block_count: usize,
    pub byte_size: usize,
    pub comment_count: usize,
    /// Empty elements (HTML) or empty rules (CSS)
    pub empty_count: usize,
}

/// `after - before` for every statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsDelta {
    pub node_count: i64,
    pub attribute_count: i64,
    pub max_depth: i64,
    pub selector_count: i64,
    pub duplicate_block_count: i64,
    pub byte_size: i64,
    pub comment_count: i64,
    pub empty_count: i64,
}

fn diff(before: usize, after: usize) -> i64 {
    after as i64 - before as i64
}

impl StatsDelta {
    pub fn between(before: &DocumentStats, after: &DocumentStats) -> Self {
        Self {
            node_count: diff(before.node_count, after.node_count),
            attribute_count: diff(before.attribute_count, after.attribute_count),
            max_depth: diff(before.max_depth, after.max_depth),
            selector_count: diff(before.selector_count, after.selector_count),
            duplicate_block_count: diff(before.duplicate_block_count, after.duplicate_block_count),
            byte_size: diff(before.byte_size, after.byte_size),
            comment_count: diff(before.comment_count, after.comment_count),
            empty_count: diff(before.empty_count, after.empty_count),
        }
    }
}

/// Optimization report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub before: DocumentStats,
    pub after: DocumentStats,
    pub delta: StatsDelta,
    /// Share of bytes saved, in percent, two decimals
    pub size_reduction_percent: f64,
    pub records: Vec<ChangeRecord>,
    /// Nodes or rules removed by the pruner
    pub pruned: usize,
}

impl Report {
    pub fn applied(&self) -> usize {
        self.count(ChangeStatus::Applied)
    }

    pub fn skipped(&self) -> usize {
        self.count(ChangeStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(ChangeStatus::Failed)
    }

    fn count(&self, status: ChangeStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// Pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Assemble a report from statistics and records
pub fn build_report(before: DocumentStats, after: DocumentStats, records: Vec<ChangeRecord>, pruned: usize) -> Report {
    let size_reduction_percent = if before.byte_size == 0 {
        0.0
    } else {
        let saved = before.byte_size as f64 - after.byte_size as f64;
        (saved / before.byte_size as f64 * 10_000.0).round() / 100.0
    };

    Report {
        delta: StatsDelta::between(&before, &after),
        before,
        after,
        size_reduction_percent,
        records,
        pruned,
    }
}
