//! Rule targeting
//!
//! Directives address CSS rules by selector text. Both sides are normalized
//! through the cssparser tokenizer (comments dropped, whitespace collapsed,
//! no spaces around combinators and commas) and compared as selector lists.

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::CssError;

/// Parsed rule target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTarget {
    /// `*`: every style rule
    All,
    /// Normalized selector parts
    Selectors(Vec<String>),
}

impl RuleTarget {
    /// Parse a non-empty target expression
    pub fn parse(target: &str) -> Result<Self, CssError> {
        let parts = split_selector_list(target)?;
        if parts.len() == 1 && parts[0] == "*" {
            return Ok(RuleTarget::All);
        }
        Ok(RuleTarget::Selectors(parts))
    }

    /// Whether a rule with this selector text is addressed
    pub fn matches(&self, selector: &str) -> bool {
        let RuleTarget::Selectors(target) = self else {
            return true;
        };
        let Ok(parts) = split_selector_list(selector) else {
            return false;
        };
        parts == *target || (parts.len() == 1 && target.contains(&parts[0]))
    }
}

/// Split selector list text into normalized selectors
pub fn split_selector_list(text: &str) -> Result<Vec<String>, CssError> {
    if text.trim().is_empty() {
        return Err(CssError::target(text, "empty selector"));
    }

    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut parts = vec![String::new()];
    normalize_into(&mut parser, &mut parts, true)
        .map_err(|message| CssError::target(text, message))?;

    if parts.iter().any(|p| p.is_empty()) {
        return Err(CssError::target(text, "empty selector in list"));
    }
    Ok(parts)
}

/// Append normalized tokens to the last part; top-level commas open a new part
fn normalize_into(parser: &mut Parser<'_, '_>, parts: &mut Vec<String>, top_level: bool) -> Result<(), String> {
    let mut pending_space = false;
    let mut after_separator = true;

    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return Ok(()),
        };

        let (open, close) = match token {
            Token::WhiteSpace(_) | Token::Comment(_) => {
                pending_space = true;
                continue;
            }
            Token::Comma if top_level => {
                parts.push(String::new());
                pending_space = false;
                after_separator = true;
                continue;
            }
            Token::Comma | Token::Delim('>' | '+' | '~') => {
                let current = current_part(parts);
                current.push_str(parser.slice_from(start));
                pending_space = false;
                after_separator = true;
                continue;
            }
            Token::Semicolon | Token::CurlyBracketBlock => {
                return Err("declaration syntax in selector".to_string());
            }
            ref t if t.is_parse_error() => return Err(format!("unexpected {t:?}")),
            Token::Function(_) => (parser.slice_from(start).to_string(), ")"),
            Token::ParenthesisBlock => ("(".to_string(), ")"),
            Token::SquareBracketBlock => ("[".to_string(), "]"),
            _ => {
                let text = parser.slice_from(start).to_string();
                push_token(current_part(parts), &text, pending_space && !after_separator);
                pending_space = false;
                after_separator = false;
                continue;
            }
        };

        push_token(current_part(parts), &open, pending_space && !after_separator);
        pending_space = false;
        after_separator = false;

        // Nested content never splits the list
        let mut nested = vec![String::new()];
        parser
            .parse_nested_block(|inner| {
                normalize_into(inner, &mut nested, false).map_err(|m| inner.new_custom_error(m))
            })
            .map_err(|e: ParseError<'_, String>| match e.kind {
                cssparser::ParseErrorKind::Custom(message) => message,
                other => format!("{other:?}"),
            })?;
        let current = current_part(parts);
        current.push_str(&nested.concat());
        current.push_str(close);
    }
}

fn current_part(parts: &mut Vec<String>) -> &mut String {
    if parts.is_empty() {
        parts.push(String::new());
    }
    let last = parts.len() - 1;
    &mut parts[last]
}

fn push_token(part: &mut String, text: &str, space: bool) {
    if space && !part.is_empty() {
        part.push(' ');
    }
    part.push_str(text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(split_selector_list(" .a  >  .b ,\n.c ").unwrap(), vec![".a>.b", ".c"]);
        assert_eq!(split_selector_list("ul  li:not( .x ,.y )").unwrap(), vec!["ul li:not(.x,.y)"]);
        assert_eq!(split_selector_list("a[ href ]/*c*/").unwrap(), vec!["a[href]"]);
        assert_eq!(split_selector_list("a + b ~ c").unwrap(), vec!["a+b~c"]);
    }

    #[test]
    fn test_invalid_targets() {
        for bad in ["", "   ", ".a,", ",.a", ".a{}", ".a;", ".a}", "a[x=\"y\nz\"]"] {
            assert!(split_selector_list(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_rule_matching() {
        let target = RuleTarget::parse(".a, .b").unwrap();
        assert!(target.matches(".a"));
        assert!(target.matches(".b"));
        assert!(target.matches(".a,.b"));
        assert!(!target.matches(".a, .c"));
        assert!(!target.matches(".c"));

        let single = RuleTarget::parse(".a").unwrap();
        assert!(!single.matches(".a, .b"));
    }

    #[test]
    fn test_universal_target() {
        assert_eq!(RuleTarget::parse(" * ").unwrap(), RuleTarget::All);
        assert!(RuleTarget::All.matches("anything"));
    }
}
