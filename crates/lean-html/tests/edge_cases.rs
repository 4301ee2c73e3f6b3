//! Edge case tests for lean-html
//!
//! Empty input, odd markup and parser modes.

use lean_html::{parse, serialize, HtmlParser, ParseError};

// ============================================================================
// EMPTY AND MINIMAL INPUT
// ============================================================================

#[test]
fn test_parse_empty() {
    let doc = parse("").unwrap();
    assert!(doc.is_fragment());
    assert!(doc.tree().child_ids(doc.tree().root()).is_empty());
    assert_eq!(serialize(&doc), "");
}

#[test]
fn test_parse_only_whitespace() {
    let doc = parse("   \n\t").unwrap();
    assert_eq!(serialize(&doc), "   \n\t");
}

#[test]
fn test_parse_text_only() {
    let doc = parse("Hello World").unwrap();
    assert_eq!(serialize(&doc), "Hello World");
}

#[test]
fn test_parse_only_doctype() {
    let doc = parse("<!DOCTYPE html>").unwrap();
    assert!(!doc.is_fragment());
    assert!(doc.body().is_some());
}

#[test]
fn test_body_attributes_survive_without_doctype() {
    let html = "<head><title>t</title></head><body onload=\"init()\" class=\"app\"><p>x</p></body>";
    let doc = parse(html).unwrap();
    assert!(!doc.is_fragment());
    assert_eq!(doc.select("body > p").unwrap().len(), 1);
    assert_eq!(serialize(&doc), html);

    let html = "<body data-page=\"home\"><p>x</p></body>";
    assert_eq!(serialize(&parse(html).unwrap()), html);
}

#[test]
fn test_header_tag_is_not_a_head_tag() {
    let doc = parse("<header><p>x</p></header>").unwrap();
    assert!(doc.is_fragment());
    assert_eq!(serialize(&doc), "<header><p>x</p></header>");
}

// ============================================================================
// MALFORMED HTML
// ============================================================================

#[test]
fn test_parse_mismatched_tags() {
    let doc = parse("<div><p></div></p>").unwrap();
    assert_eq!(doc.select("div > p").unwrap().len(), 1);
}

#[test]
fn test_parse_extra_closing_tags() {
    assert_eq!(serialize(&parse("<div></div></div></div>").unwrap()), "<div></div>");
}

#[test]
fn test_strict_mode_error() {
    let err = HtmlParser::strict().parse("<div></span>").unwrap_err();
    assert!(matches!(err, ParseError::Malformed { ref errors } if !errors.is_empty()));
    assert!(err.to_string().contains("parse error"));
}

#[test]
fn test_strict_mode_accepts_clean_fragment() {
    assert!(HtmlParser::strict().parse("<p>fine</p>").is_ok());
}

#[test]
fn test_null_bytes() {
    assert!(parse("Hello\0World").is_ok());
}

// ============================================================================
// SPECIAL CONTENT
// ============================================================================

#[test]
fn test_comment_with_dashes() {
    let out = serialize(&parse("<!-- a - b --><i></i>").unwrap());
    assert_eq!(out, "<!-- a - b --><i></i>");
}

#[test]
fn test_non_breaking_space_escaped() {
    let out = serialize(&parse("<p>a&nbsp;b</p>").unwrap());
    assert_eq!(out, "<p>a&nbsp;b</p>");
}

#[test]
fn test_uppercase_tags_lowered() {
    let out = serialize(&parse("<DIV CLASS=\"x\"></DIV>").unwrap());
    assert_eq!(out, "<div class=\"x\"></div>");
}

#[test]
fn test_template_roundtrip() {
    let html = "<template><tr><td>x</td></tr></template>";
    assert_eq!(serialize(&parse(html).unwrap()), html);
}
