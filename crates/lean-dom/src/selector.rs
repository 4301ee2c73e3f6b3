//! CSS Selector Engine
//!
//! Parses selector lists and matches them against `DomTree` elements.
//!
//! Supported: type, universal, `#id`, `.class`, attribute selectors
//! (`[a]`, `=`, `~=`, `|=`, `^=`, `$=`, `*=`, with the `i`/`s` flags), the
//! four combinators, and the tree-structural pseudo-classes plus `:not()`.
//! Dynamic pseudo-classes (`:hover`, ...) and pseudo-elements never match a
//! static document, so they are reported as errors instead of silently
//! matching nothing.

use crate::{DomTree, NodeId, SelectorError};

/// Comma-separated list of complex selectors
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators
///
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

/// Selector combinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Sequence of simple selectors that all apply to one element
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

/// A component of a selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Tree-structural pseudo-class
    PseudoClass(PseudoClass),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(val)) = (&self.matcher, value) else {
            // [attr] only checks existence
            return self.matcher.is_none() && value.is_some();
        };

        let fold = |s: &str| if self.case_insensitive { s.to_lowercase() } else { s.to_string() };
        let val = fold(val);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                !expected.is_empty() && val.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{expected}-"))
            }
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&fold(expected)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&fold(expected)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&fold(expected)),
        }
    }
}

/// Pseudo-classes that can be decided on a static tree
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),
    Not(Vec<ComplexSelector>),
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, PartialEq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    /// Create "odd" expression (2n+1)
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// Create "even" expression (2n)
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    /// Create a simple index (0n+b)
    pub fn index(n: i32) -> Self {
        Self { a: 0, b: n }
    }

    /// Create An+B expression
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse from string like "2n+1", "odd", "even", "3"
    pub fn parse(s: &str) -> Option<Self> {
        let s: String = s.trim().to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();

        match s.as_str() {
            "odd" => return Some(Self::odd()),
            "even" => return Some(Self::even()),
            _ => {}
        }

        if let Ok(n) = s.parse::<i32>() {
            return Some(Self::index(n));
        }

        let n_pos = s.find('n')?;
        let a = match &s[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            a_str => a_str.parse().ok()?,
        };
        let b = match &s[n_pos + 1..] {
            "" => 0,
            rest if rest.starts_with('+') || rest.starts_with('-') => rest.parse().ok()?,
            _ => return None,
        };
        Some(Self::new(a, b))
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }

        let diff = n - self.b;
        diff % self.a == 0 && diff / self.a >= 0
    }
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = SelectorParser { src: input, pos: 0 };
        let selectors = parser.parse_list(false).inspect_err(|e| {
            tracing::debug!("Rejected selector: {}", e);
        })?;
        Ok(Self { selectors })
    }

    /// Check whether an element matches any selector in the list
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, element))
    }
}

impl ComplexSelector {
    /// Check whether an element matches this selector
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        !self.compounds.is_empty() && self.match_at(tree, element, self.compounds.len() - 1)
    }

    fn match_at(&self, tree: &DomTree, element: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, element) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => parent_element(tree, element)
                .is_some_and(|parent| self.match_at(tree, parent, index - 1)),
            Combinator::Descendant => {
                let mut current = parent_element(tree, element);
                while let Some(ancestor) = current {
                    if self.match_at(tree, ancestor, index - 1) {
                        return true;
                    }
                    current = parent_element(tree, ancestor);
                }
                false
            }
            Combinator::NextSibling => previous_element_sibling(tree, element)
                .is_some_and(|sibling| self.match_at(tree, sibling, index - 1)),
            Combinator::SubsequentSibling => {
                let mut current = previous_element_sibling(tree, element);
                while let Some(sibling) = current {
                    if self.match_at(tree, sibling, index - 1) {
                        return true;
                    }
                    current = previous_element_sibling(tree, sibling);
                }
                false
            }
        }
    }
}

impl CompoundSelector {
    /// Check whether an element satisfies every component
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        tree.element(element).is_some()
            && self.components.iter().all(|c| match_component(c, tree, element))
    }
}

fn parent_element(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    tree.parent(id).filter(|&p| tree.element(p).is_some())
}

fn previous_element_sibling(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    let mut current = tree.get(id)?.prev_sibling;
    while current.is_valid() {
        let node = tree.get(current)?;
        if node.is_element() {
            return Some(current);
        }
        current = node.prev_sibling;
    }
    None
}

/// 1-based position among element siblings, and the sibling count
fn sibling_position(tree: &DomTree, id: NodeId, same_type: bool) -> (usize, usize) {
    let Some(parent) = tree.parent(id) else {
        return (1, 1);
    };
    let tag = tree.tag_name(id);
    let mut index = 0;
    let mut count = 0;
    for sibling in tree.element_children(parent) {
        if same_type && tree.tag_name(sibling) != tag {
            continue;
        }
        count += 1;
        if sibling == id {
            index = count;
        }
    }
    (index, count)
}

/// Match a selector component against an element
fn match_component(component: &SelectorComponent, tree: &DomTree, id: NodeId) -> bool {
    let Some(element) = tree.element(id) else {
        return false;
    };

    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => element.tag.eq_ignore_ascii_case(tag),
        SelectorComponent::Id(expected) => element.id() == Some(expected.as_str()),
        SelectorComponent::Class(class) => element.classes().any(|c| c == class),
        SelectorComponent::Attribute(attr) => attr.matches(element.get_attr(&attr.name)),
        SelectorComponent::PseudoClass(pseudo) => match_pseudo_class(pseudo, tree, id),
    }
}

/// Match a pseudo-class against an element
fn match_pseudo_class(pseudo: &PseudoClass, tree: &DomTree, id: NodeId) -> bool {
    let position = |same_type| sibling_position(tree, id, same_type);

    match pseudo {
        PseudoClass::Root => tree.parent(id) == Some(tree.root()),
        PseudoClass::Empty => tree.children(id).all(|(_, n)| n.is_comment()),
        PseudoClass::FirstChild => position(false).0 == 1,
        PseudoClass::LastChild => {
            let (index, count) = position(false);
            index == count
        }
        PseudoClass::OnlyChild => position(false).1 == 1,
        PseudoClass::FirstOfType => position(true).0 == 1,
        PseudoClass::LastOfType => {
            let (index, count) = position(true);
            index == count
        }
        PseudoClass::OnlyOfType => position(true).1 == 1,
        PseudoClass::NthChild(expr) => expr.matches(position(false).0 as i32),
        PseudoClass::NthLastChild(expr) => {
            let (index, count) = position(false);
            expr.matches((count - index + 1) as i32)
        }
        PseudoClass::NthOfType(expr) => expr.matches(position(true).0 as i32),
        PseudoClass::NthLastOfType(expr) => {
            let (index, count) = position(true);
            expr.matches((count - index + 1) as i32)
        }
        PseudoClass::Not(selectors) => !selectors.iter().any(|s| s.matches(tree, id)),
    }
}

/// Hand-written recursive descent parser over the selector text
struct SelectorParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
        self.pos > start
    }

    fn error(&self, message: impl Into<String>) -> SelectorError {
        SelectorError::new(self.src, self.pos, message)
    }

    fn parse_list(&mut self, nested: bool) -> Result<Vec<ComplexSelector>, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                None if !nested => break,
                Some(')') if nested => break,
                None => return Err(self.error("unclosed parenthesis")),
                Some(c) => return Err(self.error(format!("unexpected character {c:?}"))),
            }
        }
        Ok(selectors)
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected character {c:?}"))),
            };
            if combinator != Combinator::Descendant {
                self.bump();
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector { compounds, combinators })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();

        if self.eat('*') {
            components.push(SelectorComponent::Universal);
        } else if self.at_ident_start() {
            components.push(SelectorComponent::Type(self.parse_ident()?.to_ascii_lowercase()));
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    components.push(SelectorComponent::Id(self.parse_name()?));
                }
                Some('.') => {
                    self.bump();
                    components.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.bump();
                    components.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                Some(':') => {
                    self.bump();
                    components.push(SelectorComponent::PseudoClass(self.parse_pseudo()?));
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(self.error("expected a selector"));
        }
        Ok(CompoundSelector { components })
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        if self.eat(']') {
            return Ok(AttributeSelector { name, matcher: None, case_insensitive: false });
        }

        let operator = match (self.peek(), self.peek_second()) {
            (Some('='), _) => {
                self.bump();
                '='
            }
            (Some(op @ ('~' | '|' | '^' | '$' | '*')), Some('=')) => {
                self.bump();
                self.bump();
                op
            }
            _ => return Err(self.error("expected attribute operator or ']'")),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.parse_string(quote)?
            }
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.peek() {
            self.bump();
            case_insensitive = flag.eq_ignore_ascii_case(&'i');
            self.skip_whitespace();
        }
        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }

        let matcher = match operator {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector { name, matcher: Some(matcher), case_insensitive })
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass, SelectorError> {
        if self.peek() == Some(':') {
            return Err(self.error("pseudo-elements never match document nodes"));
        }
        let start = self.pos;
        let name = self.parse_ident()?.to_ascii_lowercase();

        if self.eat('(') {
            let pseudo = match name.as_str() {
                "not" => {
                    let inner = self.parse_list(true)?;
                    PseudoClass::Not(inner)
                }
                "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                    let arg_start = self.pos;
                    while self.peek().is_some_and(|c| c != ')') {
                        self.bump();
                    }
                    let expr = NthExpression::parse(&self.src[arg_start..self.pos])
                        .ok_or_else(|| self.error("invalid An+B expression"))?;
                    match name.as_str() {
                        "nth-child" => PseudoClass::NthChild(expr),
                        "nth-last-child" => PseudoClass::NthLastChild(expr),
                        "nth-of-type" => PseudoClass::NthOfType(expr),
                        _ => PseudoClass::NthLastOfType(expr),
                    }
                }
                _ => {
                    return Err(SelectorError::new(self.src, start, format!("unsupported pseudo-class :{name}()")));
                }
            };
            if !self.eat(')') {
                return Err(self.error("expected ')'"));
            }
            return Ok(pseudo);
        }

        match name.as_str() {
            "root" => Ok(PseudoClass::Root),
            "empty" => Ok(PseudoClass::Empty),
            "first-child" => Ok(PseudoClass::FirstChild),
            "last-child" => Ok(PseudoClass::LastChild),
            "only-child" => Ok(PseudoClass::OnlyChild),
            "first-of-type" => Ok(PseudoClass::FirstOfType),
            "last-of-type" => Ok(PseudoClass::LastOfType),
            "only-of-type" => Ok(PseudoClass::OnlyOfType),
            _ => Err(SelectorError::new(self.src, start, format!("unsupported pseudo-class :{name}"))),
        }
    }

    fn at_ident_start(&self) -> bool {
        match self.peek() {
            Some('-') => self.peek_second().is_some_and(|c| c == '-' || is_name_start(c) || c == '\\'),
            Some('\\') => true,
            Some(c) => is_name_start(c),
            None => false,
        }
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        if !self.at_ident_start() {
            return Err(self.error("expected an identifier"));
        }
        self.parse_name()
    }

    /// Name characters, including escapes (`#123` ids are names, not identifiers)
    fn parse_name(&mut self) -> Result<String, SelectorError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                name.push(self.parse_escape()?);
            } else if is_name_char(c) {
                self.bump();
                name.push(c);
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error("expected a name"));
        }
        Ok(name)
    }

    fn parse_escape(&mut self) -> Result<char, SelectorError> {
        let start = self.pos;
        while self.pos - start < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.bump();
        }
        if self.pos > start {
            let code = u32::from_str_radix(&self.src[start..self.pos], 16)
                .map_err(|_| self.error("invalid escape"))?;
            // A single whitespace terminates a hex escape
            if self.peek().is_some_and(|c| c.is_whitespace()) {
                self.bump();
            }
            return Ok(char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{FFFD}'));
        }
        match self.bump() {
            Some('\n') | None => Err(self.error("invalid escape")),
            Some(c) => Ok(c),
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => value.push(self.parse_escape()?),
                Some('\n') | None => return Err(self.error("unterminated string")),
                Some(c) => value.push(c),
            }
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}
