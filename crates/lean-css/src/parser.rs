//! CSS Parser
//!
//! lightningcss decides whether the sheet is valid CSS; the cssparser
//! tokenizer then splits it into items, keeping each item's source slice.

use cssparser::{ParseError, Parser, ParserInput, SourceLocation, SourcePosition, Token};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};

use crate::{CssError, CssItem, Declaration, Rule, Stylesheet};

/// CSS Parser
#[derive(Debug, Clone, Default)]
pub struct CssParser;

impl CssParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSS stylesheet
    pub fn parse(&self, css: &str) -> Result<Stylesheet, CssError> {
        tracing::debug!("Parsing stylesheet ({} bytes)", css.len());
        validate(css)?;

        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut sheet = Stylesheet::new();

        loop {
            let start = parser.position();
            let location = parser.current_source_location();
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };

            let item = match token {
                Token::WhiteSpace(ws) => CssItem::Whitespace(ws.to_string()),
                Token::Comment(_) => CssItem::Comment(parser.slice_from(start).to_string()),
                Token::CDO | Token::CDC => CssItem::Verbatim(parser.slice_from(start).to_string()),
                Token::AtKeyword(_) => {
                    skip_at_rule(&mut parser, location)?;
                    CssItem::Verbatim(parser.slice_from(start).to_string())
                }
                ref t if t.is_parse_error() => {
                    return Err(CssError::parse_at(location, format!("unexpected {t:?}")));
                }
                first => parse_style_rule(&mut parser, start, location, first)?,
            };
            sheet.items.push(item);
        }

        tracing::debug!(
            "Parsed {} items ({} style rules)",
            sheet.items.len(),
            sheet.rule_count()
        );
        Ok(sheet)
    }
}

fn validate(css: &str) -> Result<(), CssError> {
    StyleSheet::parse(css, ParserOptions::default())
        .map(|_| ())
        .map_err(|e| {
            let (line, column) = e.loc.as_ref().map_or((0, 0), |loc| (loc.line + 1, loc.column));
            CssError::Parse { line, column, message: e.kind.to_string() }
        })
}

/// Consume an at-rule up to its `;` or the end of its block
fn skip_at_rule(parser: &mut Parser<'_, '_>, location: SourceLocation) -> Result<(), CssError> {
    loop {
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return Ok(()),
        };
        match token {
            Token::Semicolon => return Ok(()),
            Token::CurlyBracketBlock => {
                skip_block(parser);
                return Ok(());
            }
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => skip_block(parser),
            ref t if t.is_parse_error() => {
                return Err(CssError::parse_at(location, format!("unexpected {t:?} in at-rule")));
            }
            _ => {}
        }
    }
}

fn skip_block(parser: &mut Parser<'_, '_>) {
    let result: Result<(), ParseError<'_, ()>> = parser.parse_nested_block(|inner| {
        while inner.next_including_whitespace_and_comments().is_ok() {}
        Ok(())
    });
    if let Err(e) = result {
        tracing::trace!("Unbalanced block: {:?}", e.kind);
    }
}

/// Parse `prelude { declarations }` starting at an already consumed token
fn parse_style_rule<'i>(
    parser: &mut Parser<'i, '_>,
    start: SourcePosition,
    location: SourceLocation,
    first: Token<'i>,
) -> Result<CssItem, CssError> {
    let mut token = first;
    let mut before = start;

    loop {
        match token {
            Token::CurlyBracketBlock => break,
            Token::Semicolon => return Err(CssError::parse_at(location, "expected '{' before ';'")),
            ref t if t.is_parse_error() => {
                return Err(CssError::parse_at(location, format!("unexpected {t:?} in selector")));
            }
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => skip_block(parser),
            _ => {}
        }
        before = parser.position();
        token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return Err(CssError::parse_at(location, "unexpected end of stylesheet, expected '{'")),
        };
    }

    let selector = parser.slice(start..before).trim().to_string();
    if selector.is_empty() {
        return Err(CssError::parse_at(location, "missing selector"));
    }

    let block: Result<Option<Vec<Declaration>>, ParseError<'i, ()>> =
        parser.parse_nested_block(|inner| parse_declarations(inner));
    let source = parser.slice_from(start).to_string();

    match block {
        Ok(Some(declarations)) => Ok(CssItem::Rule(Rule::parsed(selector, declarations, source))),
        // Nested rules are kept whole
        Ok(None) => Ok(CssItem::Verbatim(source)),
        Err(e) => Err(CssError::parse_at(e.location, "malformed declaration")),
    }
}

/// Declarations of a block, or `None` when the block nests rules
fn parse_declarations<'i>(parser: &mut Parser<'i, '_>) -> Result<Option<Vec<Declaration>>, ParseError<'i, ()>> {
    let mut declarations = Vec::new();

    loop {
        let chunk_start = parser.position();
        let mut name: Option<String> = None;
        let mut value_start: Option<SourcePosition> = None;
        let mut meaningful = false;
        let mut nested = false;
        let mut exhausted = false;
        let mut end = chunk_start;

        loop {
            let before = parser.position();
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => {
                    exhausted = true;
                    end = before;
                    break;
                }
            };
            match token {
                Token::Semicolon => {
                    end = before;
                    break;
                }
                Token::WhiteSpace(_) | Token::Comment(_) => continue,
                Token::CurlyBracketBlock => {
                    nested = true;
                    skip_block(parser);
                }
                Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => skip_block(parser),
                Token::Colon if value_start.is_none() => value_start = Some(parser.position()),
                Token::Ident(ref ident) if value_start.is_none() && name.is_none() => {
                    name = Some(ident.to_string());
                }
                _ => {}
            }
            meaningful = true;
        }

        if nested {
            while parser.next_including_whitespace_and_comments().is_ok() {}
            return Ok(None);
        }
        match (name, value_start) {
            (Some(property), Some(value_start)) => {
                let value = parser.slice(value_start..end).trim();
                declarations.push(Declaration::new(property, value));
            }
            _ if !meaningful => {}
            _ => return Err(parser.new_custom_error(())),
        }
        if exhausted {
            return Ok(Some(declarations));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rules_and_trivia() {
        let sheet = CssParser::new().parse("/* head */\n.a { color: red; margin: 0 }\n@media print { .b { x: y } }\n").unwrap();
        let kinds: Vec<_> = sheet.items.iter().map(|i| match i {
            CssItem::Rule(_) => "rule",
            CssItem::Verbatim(_) => "verbatim",
            CssItem::Comment(_) => "comment",
            CssItem::Whitespace(_) => "ws",
        }).collect();
        assert_eq!(kinds, vec!["comment", "ws", "rule", "ws", "verbatim", "ws"]);

        let (_, rule) = sheet.rules().next().unwrap();
        assert_eq!(rule.selector(), ".a");
        assert_eq!(rule.declarations(), &[Declaration::new("color", "red"), Declaration::new("margin", "0")]);
    }

    #[test]
    fn test_untouched_roundtrip_is_exact() {
        let css = "@charset \"utf-8\";\n\n.a , .b{\n  color : red !important ;;\n}\n/*! keep */\n:root{--x: 1px}\na:not(.b)[href]{background:url(x.png)}";
        let sheet = CssParser::new().parse(css).unwrap();
        assert_eq!(sheet.to_css(), css);
    }

    #[test]
    fn test_declaration_values() {
        let sheet = CssParser::new().parse(".a{font-family: \"A; B\", serif; width: calc(1px + 2px) }").unwrap();
        let (_, rule) = sheet.rules().next().unwrap();
        assert_eq!(rule.declarations()[0].value, "\"A; B\", serif");
        assert_eq!(rule.declarations()[1].value, "calc(1px + 2px)");
    }

    #[test]
    fn test_nested_rules_kept_verbatim() {
        let css = ".a { color: red; &:hover { color: blue } }";
        let sheet = CssParser::new().parse(css).unwrap();
        assert_eq!(sheet.rule_count(), 0);
        assert_eq!(sheet.to_css(), css);
    }

    #[test]
    fn test_stray_brace_rejected() {
        assert!(CssParser::new().parse(".a{color:red}}").is_err());
    }
}
