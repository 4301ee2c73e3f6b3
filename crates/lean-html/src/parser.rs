//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it into the `lean-dom` arena.
//! Input that looks like a whole document (a doctype, or an `html`, `head`
//! or `body` start tag) goes through the document parser; everything else is
//! parsed as a `<body>` fragment so no scaffolding is invented for snippets.
//! Without a doctype, scaffolding html5ever invented is dropped again so
//! only what the source wrote comes back out.

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{local_name, namespace_url, ns, parse_document, parse_fragment, ParseOpts, QualName};
use lean_dom::{Attribute, DomTree, ElementData, HtmlDocument, NodeId};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::ParseError;

/// HTML5 parser
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    /// Fail on any parse error html5ever reports instead of recovering
    pub strict: bool,
}

impl HtmlParser {
    /// Create a new lenient HTML parser
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Create a parser that rejects malformed markup
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Parse HTML text into a document
    pub fn parse(&self, html: &str) -> Result<HtmlDocument, ParseError> {
        let fragment = !looks_like_document(html);
        tracing::debug!("Parsing HTML {} ({} bytes)", if fragment { "fragment" } else { "document" }, html.len());

        let doctype = starts_with_doctype(html);
        let dom = if fragment {
            let context = QualName::new(None, ns!(html), local_name!("body"));
            parse_fragment(RcDom::default(), Default::default(), context, Vec::new()).one(html)
        } else {
            // A missing doctype is not a parse error here
            let opts = ParseOpts {
                tree_builder: TreeBuilderOpts { iframe_srcdoc: !doctype, ..Default::default() },
                ..Default::default()
            };
            parse_document(RcDom::default(), opts).one(html)
        };

        if !dom.errors.is_empty() {
            tracing::debug!("html5ever reported {} parse errors", dom.errors.len());
            if self.strict {
                return Err(ParseError::Malformed {
                    errors: dom.errors.iter().map(|e| e.to_string()).collect(),
                });
            }
        }

        let invented = if fragment || doctype { Vec::new() } else { invented_scaffolding(html) };

        let mut tree = DomTree::new();
        if fragment {
            // Fragment nodes hang off a synthetic <html> element
            let html_root = dom.document.children.borrow()
                .iter()
                .find(|child| matches!(child.data, RcNodeData::Element { .. }))
                .cloned();
            if let Some(html_root) = html_root {
                convert_children(&html_root, &mut tree, NodeId::ROOT, &invented);
            }
        } else {
            convert_children(&dom.document, &mut tree, NodeId::ROOT, &invented);
        }

        tracing::debug!("Parsed {} nodes", tree.len());
        Ok(HtmlDocument::from_tree(tree, fragment))
    }

    /// Parse raw bytes, rejecting invalid UTF-8 at the boundary
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<HtmlDocument, ParseError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ParseError::Encoding { offset: e.valid_up_to() })?;
        self.parse(text)
    }
}

const SCAFFOLDING: [&str; 3] = ["html", "head", "body"];

fn starts_with_doctype(html: &str) -> bool {
    let trimmed = html.trim_start().trim_start_matches('\u{feff}');
    trimmed.get(..9).is_some_and(|p| p.eq_ignore_ascii_case("<!doctype"))
}

/// Whole documents start with a doctype or carry an `html`, `head` or `body` start tag
fn looks_like_document(html: &str) -> bool {
    if starts_with_doctype(html) {
        return true;
    }
    let lower = html.to_ascii_lowercase();
    SCAFFOLDING.iter().any(|tag| has_start_tag(&lower, tag))
}

/// `<head` must not match `<header`
fn has_start_tag(lower: &str, tag: &str) -> bool {
    let open = format!("<{tag}");
    lower.match_indices(&open).any(|(at, _)| {
        match lower.as_bytes().get(at + open.len()) {
            None => true,
            Some(b) => b.is_ascii_whitespace() || *b == b'>' || *b == b'/',
        }
    })
}

/// Scaffolding tags the source never wrote
fn invented_scaffolding(html: &str) -> Vec<&'static str> {
    let lower = html.to_ascii_lowercase();
    SCAFFOLDING.into_iter().filter(|tag| !has_start_tag(&lower, tag)).collect()
}

fn convert_children(handle: &Handle, tree: &mut DomTree, parent: NodeId, invented: &[&str]) {
    for child in handle.children.borrow().iter() {
        convert_node(child, tree, parent, invented);
    }
}

/// Convert an RcDom node to our DOM format
fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId, invented: &[&str]) {
    let id = match &handle.data {
        RcNodeData::Document => {
            convert_children(handle, tree, parent, invented);
            return;
        }
        RcNodeData::Doctype { name, public_id, system_id } => {
            tree.create_doctype(name, public_id, system_id)
        }
        RcNodeData::Text { contents } => tree.create_text(&contents.borrow()),
        RcNodeData::Comment { contents } => tree.create_comment(contents),
        RcNodeData::ProcessingInstruction { target, contents } => {
            tree.create_processing_instruction(target, contents)
        }
        RcNodeData::Element { name, attrs, template_contents, .. } => {
            // Invented wrappers never carry attributes; their children move up
            if invented.contains(&&*name.local) && attrs.borrow().is_empty() {
                convert_children(handle, tree, parent, invented);
                return;
            }
            let mut elem = ElementData::new(&name.local);
            for attr in attrs.borrow().iter() {
                let attr_name = match &attr.name.prefix {
                    Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                    None => attr.name.local.to_string(),
                };
                elem.attrs.push(Attribute { name: attr_name, value: attr.value.to_string() });
            }
            let id = tree.create_element_with(elem);
            attach(tree, parent, id);

            // Template contents become the template's children
            if let Some(contents) = template_contents.borrow().as_ref() {
                convert_children(contents, tree, id, invented);
            }
            convert_children(handle, tree, id, invented);
            return;
        }
    };
    attach(tree, parent, id);
}

fn attach(tree: &mut DomTree, parent: NodeId, child: NodeId) {
    // Freshly created nodes under a container parent cannot fail to attach
    if let Err(e) = tree.append_child(parent, child) {
        tracing::warn!("Dropping node {:?} during conversion: {}", child, e);
    }
}
