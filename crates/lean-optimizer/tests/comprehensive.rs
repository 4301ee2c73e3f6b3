//! Comprehensive tests for lean-optimizer
//!
//! End-to-end runs through `Optimizer` with JSON directive lists.

use lean_optimizer::{
    ChangeStatus, Directive, DirectiveKind, Optimizer, OptimizerConfig, Priority, parse_directives,
};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Shop</title>
<!-- build 1234 -->
</head>
<body>
<div class="wrapper"><div><span></span></div></div>
<center><font size="2">Sale</font></center>
<a href="/cart" title="Cart" data-track="cart">Cart</a>
<img src="logo.png">
<br>
<section><p></p></section>
</body>
</html>
"#;

const PAGE_DIRECTIVES: &str = r#"{"directives": [
    {"kind": "remove_comments", "priority": "high", "reason": "build noise"},
    {"kind": "unwrap_node", "target": "font", "priority": "medium", "confidence": "high"},
    {"kind": "replace_tag", "target": "center", "new_tag": "div"},
    {"kind": "remove_attribute", "target": "a", "attribute": "data-track", "confidence": "high"},
    {"kind": "remove_attribute", "target": "a", "attribute": "title", "force": true, "confidence": "high"}
]}"#;

fn optimizer() -> Optimizer {
    Optimizer::new(OptimizerConfig::default())
}

#[test]
fn test_html_page() {
    let directives = parse_directives(PAGE_DIRECTIVES).unwrap();
    let optimized = optimizer().optimize_html(PAGE, &directives).unwrap();
    let out = &optimized.output;

    assert!(!out.contains("build 1234"));
    assert!(out.contains("<div>Sale</div>"));
    assert!(!out.contains("<font"));
    assert!(!out.contains("title=\"Cart\""));
    // Critical attribute without force stays
    assert!(out.contains("data-track=\"cart\""));
    assert!(out.contains("<img src=\"logo.png\">"));
    assert!(out.contains("<br>"));
    // Hooked wrapper survives, its empty subtree does not
    assert!(out.contains("<div class=\"wrapper\"></div>"));
    assert!(!out.contains("<section>"));
    assert!(out.contains("<title>Shop</title>"));

    let report = &optimized.report;
    assert_eq!(report.records.len(), 5);
    assert_eq!(report.applied(), 4);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 0);
    assert!(report.pruned >= 4);
    assert!(report.after.byte_size < report.before.byte_size);
    assert!(report.size_reduction_percent > 0.0);
    assert_eq!(report.before.comment_count, 1);
    assert_eq!(report.after.comment_count, 0);
}

#[test]
fn test_html_idempotence() {
    let directives = parse_directives(PAGE_DIRECTIVES).unwrap();
    let first = optimizer().optimize_html(PAGE, &directives).unwrap();
    let second = optimizer().optimize_html(&first.output, &directives).unwrap();
    assert_eq!(second.output, first.output);
    assert_eq!(second.report.applied(), 0);
    assert_eq!(second.report.pruned, 0);
}

#[test]
fn test_empty_tree_pruned() {
    let optimized = optimizer().optimize_html("<div><span></span></div>", &[]).unwrap();
    assert_eq!(optimized.output, "");
}

#[test]
fn test_hooked_parent_kept() {
    let optimized = optimizer().optimize_html("<div id=\"x\"><span></span></div>", &[]).unwrap();
    assert_eq!(optimized.output, "<div id=\"x\"></div>");
}

#[test]
fn test_void_elements_never_pruned() {
    let html = "<div><img></div><div><br></div><div><input></div><div><meta></div><div><link></div><div><hr></div>";
    let optimized = optimizer().optimize_html(html, &[]).unwrap();
    assert_eq!(optimized.output, html);
    assert_eq!(optimized.report.pruned, 0);
}

#[test]
fn test_css_merge() {
    let directives = parse_directives(r#"[{"kind": "merge_duplicate_rules", "target": ".a, .b"}]"#).unwrap();
    let optimized = optimizer().optimize_css(".a{color:red}\n.b{color:red}", &directives).unwrap();
    assert_eq!(optimized.output, ".a, .b{color:red}");
    assert_eq!(optimized.report.applied(), 1);
    assert_eq!(optimized.report.before.duplicate_block_count, 1);
    assert_eq!(optimized.report.after.duplicate_block_count, 0);
    assert_eq!(optimized.report.delta.node_count, -1);
}

#[test]
fn test_css_shorten_with_redundant_values() {
    let directives = parse_directives(r#"[
        {"kind": "remove_redundant_values", "target": ".x"},
        {"kind": "shorten_properties", "target": ".x", "priority": "high"}
    ]"#).unwrap();
    let css = ".x{margin-top:0px;margin-right:0px;margin-bottom:0px;margin-left:0px}";
    let optimized = optimizer().optimize_css(css, &directives).unwrap();
    assert_eq!(optimized.output, ".x{margin:0 0 0 0}");
    assert_eq!(optimized.report.applied(), 2);
}

#[test]
fn test_css_idempotence() {
    let json = r#"[
        {"kind": "remove_comments"},
        {"kind": "merge_duplicate_rules", "target": ".btn, .link"},
        {"kind": "remove_rule", "target": ".legacy"},
        {"kind": "shorten_properties"},
        {"kind": "remove_redundant_values"}
    ]"#;
    let css = "/* theme */\n.btn{color:red}\n.legacy{float:left}\n.link{color:red}\n.box{padding-top:0px;padding-right:1px;padding-bottom:0px;padding-left:1px}\n@media print{.box{display:none}}\n";
    let directives = parse_directives(json).unwrap();

    let first = optimizer().optimize_css(css, &directives).unwrap();
    assert_eq!(first.report.applied(), 5);
    assert!(first.output.contains(".box{padding:0 1px 0 1px}"));
    assert!(first.output.contains("@media print{.box{display:none}}"));
    assert!(first.output.ends_with(".btn, .link{color:red}"));

    let second = optimizer().optimize_css(&first.output, &directives).unwrap();
    assert_eq!(second.output, first.output);
    assert_eq!(second.report.applied(), 0);
}

#[test]
fn test_ordering_is_priority_then_sequence() {
    // The last-scheduled directive sees the work of the earlier ones
    let directives = vec![
        Directive::new(DirectiveKind::ReplaceTag { new_tag: "em".into() }, "i").with_priority(Priority::Low),
        Directive::new(DirectiveKind::ReplaceTag { new_tag: "i".into() }, "b").with_priority(Priority::High),
        Directive::new(DirectiveKind::ReplaceTag { new_tag: "b".into() }, "u").with_priority(Priority::Medium),
    ];
    let optimized = optimizer().optimize_html("<p><b>x</b><u>y</u><i>z</i></p>", &directives).unwrap();
    assert_eq!(optimized.output, "<p><em>x</em><b>y</b><em>z</em></p>");

    let sequences: Vec<_> = optimized.report.records.iter().filter_map(|r| r.directive.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 0]);
    assert!(optimized.report.records.iter().all(|r| r.status == ChangeStatus::Applied));
}

#[test]
fn test_report_json() {
    let optimized = optimizer()
        .optimize_css(".a{}\n.b{color:red}", &[])
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&optimized.report.to_json().unwrap()).unwrap();
    assert_eq!(json["pruned"], 1);
    assert_eq!(json["before"]["empty_count"], 1);
    assert_eq!(json["after"]["empty_count"], 0);
    assert!(json["records"].as_array().unwrap().is_empty());
}
