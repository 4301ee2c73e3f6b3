//! Value rewriting
//!
//! Token-level rewrites of declaration values and box shorthand folding.

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::Declaration;

/// Longhand suffixes in shorthand order
pub const BOX_SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Length units whose zero value is unit-independent
const LENGTH_UNITS: &[&str] = &[
    "px", "em", "rem", "ex", "ch", "vw", "vh", "vmin", "vmax", "vi", "vb",
    "svw", "svh", "lvw", "lvh", "dvw", "dvh", "cqw", "cqh", "cqi", "cqb", "cqmin", "cqmax",
    "cm", "mm", "q", "in", "pt", "pc", "lh", "rlh", "cap", "ic",
];

/// Properties where a unitless zero means something else
const UNIT_SENSITIVE_PROPERTIES: &[&str] = &["flex", "flex-basis"];

/// Rewrite top-level zero lengths and percentages to a bare `0`.
///
/// Returns `None` when the value is unchanged or the property is one where
/// the unit matters (`flex`, `flex-basis`, custom properties). Tokens inside
/// functions (`calc()`, `rgb()`, ...) are copied untouched.
pub fn zero_redundant_units(property: &str, value: &str) -> Option<String> {
    let property = property.to_ascii_lowercase();
    if property.starts_with("--") || UNIT_SENSITIVE_PROPERTIES.contains(&property.as_str()) {
        return None;
    }

    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    let mut output = String::with_capacity(value.len());
    let mut changed = false;

    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Dimension { value, ref unit, .. }
                if value == 0.0 && LENGTH_UNITS.iter().any(|u| unit.eq_ignore_ascii_case(u)) =>
            {
                output.push('0');
                changed = true;
            }
            Token::Percentage { unit_value, .. } if unit_value == 0.0 => {
                output.push('0');
                changed = true;
            }
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock | Token::CurlyBracketBlock => {
                skip_block(&mut parser);
                output.push_str(parser.slice_from(start));
            }
            _ => output.push_str(parser.slice_from(start)),
        }
    }

    changed.then_some(output)
}

/// Consume the rest of the block just opened, so positions land after it
fn skip_block(parser: &mut Parser<'_, '_>) {
    let result: Result<(), ParseError<'_, ()>> = parser.parse_nested_block(|inner| {
        while inner.next_including_whitespace_and_comments().is_ok() {}
        Ok(())
    });
    if let Err(e) = result {
        tracing::trace!("Unbalanced block in value: {:?}", e.kind);
    }
}

/// Fold `family-top/-right/-bottom/-left` into `family: t r b l`.
///
/// All four longhands must be present (the last declaration of each wins)
/// and agree on `!important`. The shorthand takes the position of the
/// first longhand. Returns whether the block changed.
pub fn shorten_box_family(declarations: &mut Vec<Declaration>, family: &str) -> bool {
    let longhands: Vec<String> = BOX_SIDES.iter().map(|side| format!("{family}-{side}")).collect();
    let is_longhand = |d: &Declaration| longhands.iter().any(|l| d.property.eq_ignore_ascii_case(l));

    let Some(first) = declarations.iter().position(is_longhand) else {
        return false;
    };

    // The winning declaration for each side
    let mut winners = Vec::with_capacity(4);
    for longhand in &longhands {
        match declarations.iter().rposition(|d| d.property.eq_ignore_ascii_case(longhand)) {
            Some(index) => winners.push(&declarations[index]),
            None => return false,
        }
    }

    let important = winners[0].important();
    if winners.iter().any(|d| d.important() != important) {
        return false;
    }
    // A later shorthand would be reordered ahead of longhands it overrides
    if declarations[first..].iter().any(|d| d.property.eq_ignore_ascii_case(family)) {
        return false;
    }

    let mut value = winners.iter().map(|d| d.plain_value()).collect::<Vec<_>>().join(" ");
    if important {
        value.push_str(" !important");
    }

    let shorthand = Declaration::new(family.to_ascii_lowercase(), value);
    declarations.retain(|d| !is_longhand(d));
    declarations.insert(first.min(declarations.len()), shorthand);
    true
}
