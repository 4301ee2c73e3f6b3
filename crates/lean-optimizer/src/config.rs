//! Optimizer Configuration

use serde::Deserialize;

use crate::Confidence;

/// Optimizer configuration options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Upper bound on pruner passes
    pub max_prune_iterations: usize,

    /// Prune empty nodes / rules after the directives ran
    pub prune: bool,

    /// Directives below this confidence are skipped
    pub min_confidence: Confidence,

    /// Apply directives flagged `requires_testing`
    pub allow_requires_testing: bool,

    /// Treat html5ever parse errors as fatal
    pub strict_html: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_prune_iterations: 10,
            prune: true,
            min_confidence: Confidence::Medium,
            allow_requires_testing: false,
            strict_html: false,
        }
    }
}

impl OptimizerConfig {
    /// Load from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config = OptimizerConfig::from_json(r#"{"min_confidence": "low", "prune": false}"#).unwrap();
        assert_eq!(config.min_confidence, Confidence::Low);
        assert!(!config.prune);
        assert_eq!(config.max_prune_iterations, 10);
        assert!(!config.strict_html);
    }
}
