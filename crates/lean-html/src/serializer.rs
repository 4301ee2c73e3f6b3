//! HTML Serialization
//!
//! Canonical output: double-quoted attributes, bare boolean attributes,
//! `<br>` style void tags, raw text for script-like elements. Parsing the
//! output and serializing again yields the same text.

use lean_dom::{DomTree, HtmlDocument, NodeData, NodeId, is_void_element};

/// Raw text elements (no escaping for content)
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript", "plaintext",
];

/// Elements whose leading newline the parser drops
const NEWLINE_SENSITIVE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// HTML serializer
#[derive(Debug, Clone, Default)]
pub struct HtmlSerializer;

impl HtmlSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize a whole document
    pub fn serialize(&self, document: &HtmlDocument) -> String {
        self.serialize_inner(document.tree(), document.tree().root())
    }

    /// Serialize the children of a node
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output);
        output
    }

    /// Serialize a node including itself
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output);
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => self.serialize_children(tree, node_id, output),
            NodeData::Element(elem) => {
                let tag = elem.tag.as_str();

                output.push('<');
                output.push_str(tag);
                for attr in &elem.attrs {
                    output.push(' ');
                    output.push_str(&attr.name);
                    if !attr.value.is_empty() {
                        output.push_str("=\"");
                        escape_attribute(&attr.value, output);
                        output.push('"');
                    }
                }
                output.push('>');

                if is_void_element(tag) {
                    return;
                }

                if RAW_TEXT_ELEMENTS.contains(&tag) {
                    for (_, child) in tree.children(node_id) {
                        if let Some(text) = child.as_text() {
                            output.push_str(text);
                        }
                    }
                } else {
                    if NEWLINE_SENSITIVE_ELEMENTS.contains(&tag) {
                        let first_text = tree.children(node_id).next().and_then(|(_, n)| n.as_text());
                        if first_text.is_some_and(|t| t.starts_with('\n')) {
                            output.push('\n');
                        }
                    }
                    self.serialize_children(tree, node_id, output);
                }

                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
            NodeData::Text(text) => escape_text(text, output),
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype { name, public_id, system_id } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                if !public_id.is_empty() {
                    output.push_str(" PUBLIC \"");
                    output.push_str(public_id);
                    output.push('"');
                    if !system_id.is_empty() {
                        output.push_str(" \"");
                        output.push_str(system_id);
                        output.push('"');
                    }
                } else if !system_id.is_empty() {
                    output.push_str(" SYSTEM \"");
                    output.push_str(system_id);
                    output.push('"');
                }
                output.push('>');
            }
            NodeData::ProcessingInstruction { target, data } => {
                output.push_str("<?");
                output.push_str(target);
                if !data.is_empty() {
                    output.push(' ');
                    output.push_str(data);
                }
                output.push('>');
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent_id: NodeId, output: &mut String) {
        for (child_id, _) in tree.children(parent_id) {
            self.serialize_node(tree, child_id, output);
        }
    }
}

/// Escape text content for HTML
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        let mut output = String::new();
        escape_text("Hello <world> & \"friends\"", &mut output);
        assert_eq!(output, "Hello &lt;world&gt; &amp; \"friends\"");
    }

    #[test]
    fn test_escape_attribute() {
        let mut output = String::new();
        escape_attribute("a <b> & \"c\"", &mut output);
        assert_eq!(output, "a <b> &amp; &quot;c&quot;");
    }

    #[test]
    fn test_void_and_boolean_attributes() {
        let mut tree = DomTree::new();
        let input = tree.create_element("input");
        tree.element_mut(input).unwrap().set_attr("disabled", "");
        tree.element_mut(input).unwrap().set_attr("type", "text");
        tree.append_child(tree.root(), input).unwrap();
        let out = HtmlSerializer::new().serialize_inner(&tree, tree.root());
        assert_eq!(out, r#"<input disabled type="text">"#);
    }

    #[test]
    fn test_raw_text_not_escaped() {
        let mut tree = DomTree::new();
        let script = tree.create_element("script");
        let code = tree.create_text("if (a < b && c) {}");
        tree.append_child(tree.root(), script).unwrap();
        tree.append_child(script, code).unwrap();
        assert_eq!(
            HtmlSerializer::new().serialize_outer(&tree, script),
            "<script>if (a < b && c) {}</script>"
        );
    }

    #[test]
    fn test_pre_leading_newline_doubled() {
        let mut tree = DomTree::new();
        let pre = tree.create_element("pre");
        let text = tree.create_text("\ncode");
        tree.append_child(tree.root(), pre).unwrap();
        tree.append_child(pre, text).unwrap();
        assert_eq!(HtmlSerializer::new().serialize_outer(&tree, pre), "<pre>\n\ncode</pre>");
    }
}
