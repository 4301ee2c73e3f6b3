//! lean Optimizer
//!
//! Directive-driven structural optimization of HTML and CSS. An external
//! advisor proposes edits; the optimizer filters and orders them, applies
//! each one atomically under fixed safety rules, prunes what became empty
//! and reports every outcome.
//!
//! # Example
//! ```rust,ignore
//! use lean_optimizer::{Optimizer, OptimizerConfig, parse_directives};
//!
//! let directives = parse_directives(r#"[{"kind": "remove_comments"}]"#)?;
//! let optimized = Optimizer::new(OptimizerConfig::default())
//!     .optimize_html("<!-- x --><div><span></span></div><p>hi</p>", &directives)?;
//! assert_eq!(optimized.output, "<p>hi</p>");
//! println!("{}", optimized.report.to_json()?);
//! ```

mod config;
mod directive;
mod engine;
mod report;
pub mod executor;
pub mod pruner;
pub mod safety;
pub mod scheduler;

pub use config::OptimizerConfig;
pub use directive::{
    Confidence, Directive, DirectiveKind, DocumentKind, Priority, default_directives, parse_directives,
};
pub use engine::{OptimizeError, Optimized, Optimizer};
pub use executor::{MutationError, OptimizationTarget};
pub use report::{ChangeRecord, ChangeStatus, DocumentStats, Report, StatsDelta, build_report};
pub use scheduler::{Schedule, schedule};

// Re-export document crates for callers working on parsed documents
pub use lean_css as css;
pub use lean_dom as dom;
pub use lean_html as html;

/// Optimizer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
