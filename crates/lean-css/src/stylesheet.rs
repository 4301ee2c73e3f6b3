//! Stylesheet model
//!
//! A flat list of items in source order. Style rules are editable; at-rules
//! (and rules with nested blocks) are opaque text; whitespace and comments
//! between rules are kept as trivia so untouched regions serialize verbatim.

use std::collections::HashSet;

use crate::target::split_selector_list;

/// Parsed stylesheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub items: Vec<CssItem>,
}

/// Top-level stylesheet item
#[derive(Debug, Clone, PartialEq)]
pub enum CssItem {
    /// Style rule
    Rule(Rule),
    /// At-rule or nested rule, kept as source text
    Verbatim(String),
    /// Comment including its `/*` `*/` markers
    Comment(String),
    /// Whitespace between items
    Whitespace(String),
}

/// CSS style rule
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    selector: String,
    declarations: Vec<Declaration>,
    /// Original text; dropped as soon as the rule is edited
    source: Option<String>,
}

/// CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    /// Value text, `!important` included
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self { property: property.into(), value: value.into() }
    }

    /// Whether the value ends with `!important`
    pub fn important(&self) -> bool {
        split_important(&self.value).1
    }

    /// Value without the `!important` suffix
    pub fn plain_value(&self) -> &str {
        split_important(&self.value).0
    }

    /// Lower-cased property and whitespace-collapsed value
    pub fn normalized(&self) -> (String, String) {
        let value = self.value.split_whitespace().collect::<Vec<_>>().join(" ");
        (self.property.to_ascii_lowercase(), value)
    }
}

/// `-webkit-margin-start` and `margin-top` both belong to `margin`
fn property_family(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let unprefixed = match property.strip_prefix('-') {
        Some(rest) => rest.split_once('-').map_or(rest, |(_, name)| name),
        None => property,
    };
    unprefixed.split('-').next().unwrap_or(unprefixed).to_string()
}

fn split_important(value: &str) -> (&str, bool) {
    let trimmed = value.trim_end();
    if let Some(bang) = trimmed.rfind('!') {
        if trimmed[bang + 1..].trim_start().eq_ignore_ascii_case("important") {
            return (trimmed[..bang].trim_end(), true);
        }
    }
    (trimmed, false)
}

impl Rule {
    /// Create a new rule (rendered canonically)
    pub fn new(selector: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self { selector: selector.into(), declarations, source: None }
    }

    pub(crate) fn parsed(selector: String, declarations: Vec<Declaration>, source: String) -> Self {
        Self { selector, declarations, source: Some(source) }
    }

    /// Selector list text as written
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Declarations in order
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Mutable declarations; marks the rule for re-rendering
    pub fn declarations_mut(&mut self) -> &mut Vec<Declaration> {
        self.source = None;
        &mut self.declarations
    }

    /// Whether the rule still carries its source text
    pub fn is_pristine(&self) -> bool {
        self.source.is_some()
    }

    /// Number of selectors in the list
    pub fn selector_count(&self) -> usize {
        split_selector_list(&self.selector).map_or(1, |parts| parts.len())
    }

    /// Normalized declaration block, grouped by property family.
    ///
    /// Families compare in any order. Declarations inside one family keep
    /// their source order, since a later `color` or `margin-top` overrides an
    /// earlier `color` or `margin` and fallback pairs depend on that order.
    pub fn normalized_block(&self) -> Vec<(String, Vec<(String, String)>)> {
        let mut block: Vec<(String, Vec<(String, String)>)> = Vec::new();
        for decl in &self.declarations {
            let normalized = decl.normalized();
            let family = property_family(&normalized.0);
            match block.iter_mut().find(|(f, _)| *f == family) {
                Some((_, members)) => members.push(normalized),
                None => block.push((family, vec![normalized])),
            }
        }
        block.sort();
        block
    }

    /// Write CSS text
    pub fn write_css(&self, output: &mut String) {
        if let Some(source) = &self.source {
            output.push_str(source);
            return;
        }
        output.push_str(self.selector.trim());
        output.push('{');
        for (i, decl) in self.declarations.iter().enumerate() {
            if i > 0 {
                output.push(';');
            }
            output.push_str(&decl.property);
            output.push(':');
            output.push_str(decl.value.trim());
        }
        output.push('}');
    }
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Style rules with their item index
    pub fn rules(&self) -> impl Iterator<Item = (usize, &Rule)> {
        self.items.iter().enumerate().filter_map(|(i, item)| match item {
            CssItem::Rule(rule) => Some((i, rule)),
            _ => None,
        })
    }

    /// Style rule at an item index
    pub fn rule(&self, index: usize) -> Option<&Rule> {
        match self.items.get(index) {
            Some(CssItem::Rule(rule)) => Some(rule),
            _ => None,
        }
    }

    /// Mutable style rule at an item index
    pub fn rule_mut(&mut self, index: usize) -> Option<&mut Rule> {
        match self.items.get_mut(index) {
            Some(CssItem::Rule(rule)) => Some(rule),
            _ => None,
        }
    }

    /// Remove the item at `index` together with the whitespace after it
    pub fn remove_item(&mut self, index: usize) -> Option<CssItem> {
        if index >= self.items.len() {
            return None;
        }
        if matches!(self.items.get(index + 1), Some(CssItem::Whitespace(_))) {
            self.items.remove(index + 1);
        }
        Some(self.items.remove(index))
    }

    /// Remove several items; indices may come in any order
    pub fn remove_items(&mut self, indices: &[usize]) -> usize {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.iter().rev().filter(|&&i| self.remove_item(i).is_some()).count()
    }

    /// Append a rule on its own line
    pub fn push_rule(&mut self, rule: Rule) {
        let needs_break = self.items.last().is_some_and(|last| !matches!(last, CssItem::Whitespace(_)));
        if needs_break {
            self.items.push(CssItem::Whitespace("\n".to_string()));
        }
        self.items.push(CssItem::Rule(rule));
    }

    /// Serialize to CSS text
    pub fn to_css(&self) -> String {
        let mut output = String::new();
        for item in &self.items {
            match item {
                CssItem::Rule(rule) => rule.write_css(&mut output),
                CssItem::Verbatim(text) | CssItem::Comment(text) | CssItem::Whitespace(text) => {
                    output.push_str(text)
                }
            }
        }
        output
    }

    /// Number of style rules
    pub fn rule_count(&self) -> usize {
        self.rules().count()
    }

    /// Number of declarations across style rules
    pub fn declaration_count(&self) -> usize {
        self.rules().map(|(_, r)| r.declarations().len()).sum()
    }

    /// Number of selectors across style rules
    pub fn selector_count(&self) -> usize {
        self.rules().map(|(_, r)| r.selector_count()).sum()
    }

    /// Rules whose normalized block repeats an earlier rule's block
    pub fn duplicate_block_count(&self) -> usize {
        let mut seen = HashSet::new();
        self.rules()
            .filter(|(_, r)| !r.declarations().is_empty())
            .filter(|(_, r)| !seen.insert(r.normalized_block()))
            .count()
    }

    /// Number of top-level comments
    pub fn comment_count(&self) -> usize {
        self.items.iter().filter(|i| matches!(i, CssItem::Comment(_))).count()
    }

    /// Number of style rules without declarations
    pub fn empty_rule_count(&self) -> usize {
        self.rules().filter(|(_, r)| r.declarations().is_empty()).count()
    }
}
