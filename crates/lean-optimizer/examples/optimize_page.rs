//! Example: optimize a small page and its stylesheet
//!
//! Run with `RUST_LOG=debug` to see each directive's outcome.

use lean_optimizer::{Optimizer, OptimizerConfig, default_directives, parse_directives};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Demo</title><!-- generated --></head>
<body>
<div class="hero"><div><span></span></div></div>
<center><font color="red">Welcome</font></center>
<img src="hero.png" border="0">
</body>
</html>
"#;

const STYLES: &str = "/* theme */
.btn { color: #fff; background: #06c }
.link { color: #fff; background: #06c }
.card { margin-top: 0px; margin-right: 8px; margin-bottom: 0px; margin-left: 8px }
";

const ADVICE: &str = r#"{"directives": [
    {"kind": "unwrap_node", "target": "font", "priority": "high", "confidence": "high",
     "reason": "presentational wrapper"},
    {"kind": "replace_tag", "target": "center", "new_tag": "div", "priority": "medium"},
    {"kind": "remove_attribute", "target": "img", "attribute": "border", "confidence": "high"},
    {"kind": "merge_duplicate_rules", "target": ".btn, .link", "priority": "high"},
    {"kind": "shorten_properties", "target": ".card"},
    {"kind": "remove_redundant_values"}
]}"#;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let optimizer = Optimizer::new(OptimizerConfig::default());
    let mut directives = parse_directives(ADVICE)?;
    directives.extend(default_directives());

    let html = optimizer.optimize_html(PAGE, &directives)?;
    println!("{}", html.output);
    println!("{}", html.report.to_json()?);

    let css = optimizer.optimize_css(STYLES, &directives)?;
    println!("{}", css.output);
    println!(
        "CSS: {} applied, {} skipped, {:.2}% smaller",
        css.report.applied(),
        css.report.skipped(),
        css.report.size_reduction_percent
    );

    Ok(())
}
