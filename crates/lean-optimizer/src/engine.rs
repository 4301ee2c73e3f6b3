//! Optimizer - Main entry point

use lean_html::HtmlParser;

use crate::executor::{self, OptimizationTarget};
use crate::report::{Report, build_report};
use crate::scheduler::schedule;
use crate::{Directive, OptimizerConfig};

/// Optimized text and what happened to it
#[derive(Debug, Clone)]
pub struct Optimized {
    pub output: String,
    pub report: Report,
}

/// The directive-driven optimizer
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    /// Create an optimizer with the given configuration
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Get optimizer configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Parse, optimize and serialize an HTML document or fragment
    pub fn optimize_html(&self, html: &str, directives: &[Directive]) -> Result<Optimized, OptimizeError> {
        let parser = if self.config.strict_html { HtmlParser::strict() } else { HtmlParser::new() };
        let mut document = parser.parse(html)?;
        let report = self.optimize(&mut document, directives);
        Ok(Optimized { output: document.serialize(), report })
    }

    /// Parse, optimize and serialize a stylesheet
    pub fn optimize_css(&self, css: &str, directives: &[Directive]) -> Result<Optimized, OptimizeError> {
        let mut sheet = lean_css::parse(css)?;
        let report = self.optimize(&mut sheet, directives);
        Ok(Optimized { output: sheet.serialize(), report })
    }

    /// Optimize a parsed document in place
    pub fn optimize<T: OptimizationTarget>(&self, document: &mut T, directives: &[Directive]) -> Report {
        let before = document.stats();
        let plan = schedule(document, directives, &self.config);

        let mut records = plan.skipped;
        for directive in &plan.queue {
            records.push(executor::apply(document, directive));
        }

        let pruned = if self.config.prune {
            document.prune(self.config.max_prune_iterations)
        } else {
            0
        };

        let report = build_report(before, document.stats(), records, pruned);
        tracing::info!(
            "Optimized {:?} document: {} applied, {} skipped, {} failed, {} pruned, {} -> {} bytes",
            document.kind(),
            report.applied(),
            report.skipped(),
            report.failed(),
            report.pruned,
            report.before.byte_size,
            report.after.byte_size
        );
        report
    }
}

/// Optimizer error
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("HTML parse error: {0}")]
    Html(#[from] lean_html::ParseError),

    #[error("CSS parse error: {0}")]
    Css(#[from] lean_css::CssError),
}
