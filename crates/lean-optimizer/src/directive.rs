//! Directives
//!
//! A directive is one structural edit proposed by an external advisor. It
//! arrives as JSON, is filtered and ordered by the scheduler and consumed
//! exactly once by the executor.

use serde::{Deserialize, Serialize};

/// Scheduling priority. Orders `high < medium < low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

/// Advisor confidence. Orders `low < medium < high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

/// Kind of document a directive can run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Html,
    Css,
}

/// What a directive does, with its kind-specific payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectiveKind {
    /// Remove matched elements that are safe to remove
    RemoveNode {
        /// The advisor asserts the tag is redundant; only hook attributes block removal
        #[serde(default)]
        redundant: bool,
    },
    /// Delete one attribute from matched elements
    RemoveAttribute {
        attribute: String,
        /// Allow deleting critical attributes
        #[serde(default)]
        force: bool,
    },
    /// Replace matched elements by their children
    UnwrapNode {
        /// Also unwrap void elements and elements carrying hook attributes
        #[serde(default)]
        force: bool,
    },
    /// Rename matched elements
    ReplaceTag { new_tag: String },
    /// Merge rules with identical declaration blocks into one rule
    MergeDuplicateRules,
    /// Fold box longhands into their shorthand
    ShortenProperties {
        #[serde(default = "default_shorthand_families")]
        properties: Vec<String>,
    },
    /// Drop units from zero lengths and percentages
    RemoveRedundantValues,
    /// Remove comments
    RemoveComments,
    /// Delete matched style rules
    RemoveRule,
}

fn default_shorthand_families() -> Vec<String> {
    vec!["margin".to_string(), "padding".to_string()]
}

impl DirectiveKind {
    /// Wire name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            DirectiveKind::RemoveNode { .. } => "remove_node",
            DirectiveKind::RemoveAttribute { .. } => "remove_attribute",
            DirectiveKind::UnwrapNode { .. } => "unwrap_node",
            DirectiveKind::ReplaceTag { .. } => "replace_tag",
            DirectiveKind::MergeDuplicateRules => "merge_duplicate_rules",
            DirectiveKind::ShortenProperties { .. } => "shorten_properties",
            DirectiveKind::RemoveRedundantValues => "remove_redundant_values",
            DirectiveKind::RemoveComments => "remove_comments",
            DirectiveKind::RemoveRule => "remove_rule",
        }
    }

    /// Whether the kind makes sense for a document kind
    pub fn applies_to(&self, kind: DocumentKind) -> bool {
        match self {
            DirectiveKind::RemoveNode { .. }
            | DirectiveKind::RemoveAttribute { .. }
            | DirectiveKind::UnwrapNode { .. }
            | DirectiveKind::ReplaceTag { .. } => kind == DocumentKind::Html,
            DirectiveKind::MergeDuplicateRules
            | DirectiveKind::ShortenProperties { .. }
            | DirectiveKind::RemoveRedundantValues
            | DirectiveKind::RemoveRule => kind == DocumentKind::Css,
            DirectiveKind::RemoveComments => true,
        }
    }

    /// Kinds where an empty target means the whole document
    pub fn is_document_wide(&self) -> bool {
        matches!(
            self,
            DirectiveKind::RemoveComments
                | DirectiveKind::RemoveRedundantValues
                | DirectiveKind::ShortenProperties { .. }
        )
    }
}

/// One proposed edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    #[serde(flatten)]
    pub kind: DirectiveKind,
    /// Selector expression (HTML) or selector list (CSS)
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub confidence: Confidence,
    /// Position in the incoming list, filled in when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<usize>,
    #[serde(default)]
    pub requires_testing: bool,
    #[serde(default)]
    pub reason: String,
}

impl Directive {
    /// Create a directive with default priority and confidence
    pub fn new(kind: DirectiveKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            priority: Priority::default(),
            confidence: Confidence::default(),
            sequence: None,
            requires_testing: false,
            reason: String::new(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_sequence(mut self, sequence: usize) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn with_requires_testing(mut self, requires_testing: bool) -> Self {
        self.requires_testing = requires_testing;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Whether the target addresses the whole document
    pub fn targets_everything(&self) -> bool {
        let target = self.target.trim();
        target.is_empty() || target == "*"
    }

    /// Short label for logs
    pub fn label(&self) -> String {
        if self.target.is_empty() {
            self.kind.name().to_string()
        } else {
            format!("{} {:?}", self.kind.name(), self.target)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DirectiveList {
    Bare(Vec<Directive>),
    Wrapped { directives: Vec<Directive> },
}

/// Parse a directive list: either a bare array or `{"directives": [...]}`.
///
/// Directives without a `sequence` get their position in the list.
pub fn parse_directives(json: &str) -> Result<Vec<Directive>, serde_json::Error> {
    let list: DirectiveList = serde_json::from_str(json)?;
    let mut directives = match list {
        DirectiveList::Bare(directives) | DirectiveList::Wrapped { directives } => directives,
    };
    for (index, directive) in directives.iter_mut().enumerate() {
        directive.sequence.get_or_insert(index);
    }
    tracing::debug!("Parsed {} directives", directives.len());
    Ok(directives)
}

/// Directives used when no advisor is available
pub fn default_directives() -> Vec<Directive> {
    vec![
        Directive::new(DirectiveKind::RemoveComments, "")
            .with_confidence(Confidence::High)
            .with_sequence(0)
            .with_reason("comments are not rendered"),
    ]
}
