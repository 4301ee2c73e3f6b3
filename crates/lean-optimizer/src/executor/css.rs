//! CSS mutations

use lean_css::{CssItem, Rule, RuleTarget, Stylesheet, shorten_box_family, split_selector_list, zero_redundant_units};

use super::{MutationError, OptimizationTarget};
use crate::pruner::prune_empty_rules;
use crate::{Directive, DirectiveKind, DocumentKind, DocumentStats};

impl OptimizationTarget for Stylesheet {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Css
    }

    fn resolve(&self, directive: &Directive) -> Result<usize, MutationError> {
        if directive.kind == DirectiveKind::RemoveComments {
            return Ok(1);
        }
        Ok(matched_rules(self, directive)?.len())
    }

    fn apply(&mut self, directive: &Directive) -> Result<usize, MutationError> {
        match &directive.kind {
            DirectiveKind::MergeDuplicateRules => {
                let matched = matched_rules(self, directive)?;
                merge_rules(self, &matched)
            }
            DirectiveKind::ShortenProperties { properties } => {
                let matched = matched_rules(self, directive)?;
                Ok(edit_rules(self, &matched, |rule| {
                    let mut declarations = rule.declarations().to_vec();
                    let mut changed = 0;
                    for family in properties {
                        if shorten_box_family(&mut declarations, family) {
                            changed += 1;
                        }
                    }
                    (changed > 0).then_some((declarations, changed))
                }))
            }
            DirectiveKind::RemoveRedundantValues => {
                let matched = matched_rules(self, directive)?;
                Ok(edit_rules(self, &matched, |rule| {
                    let mut declarations = rule.declarations().to_vec();
                    let mut changed = 0;
                    for decl in &mut declarations {
                        if let Some(value) = zero_redundant_units(&decl.property, &decl.value) {
                            decl.value = value;
                            changed += 1;
                        }
                    }
                    (changed > 0).then_some((declarations, changed))
                }))
            }
            DirectiveKind::RemoveComments => Ok(remove_comments(self)),
            DirectiveKind::RemoveRule => {
                let matched = matched_rules(self, directive)?;
                Ok(self.remove_items(&matched))
            }
            other => Err(MutationError::NotApplicable(format!("{} does not apply to CSS", other.name()))),
        }
    }

    fn prune(&mut self, _max_iterations: usize) -> usize {
        prune_empty_rules(self)
    }

    fn stats(&self) -> DocumentStats {
        DocumentStats {
            node_count: self.rule_count(),
            attribute_count: self.declaration_count(),
            max_depth: 0,
            selector_count: self.selector_count(),
            duplicate_block_count: self.duplicate_block_count(),
            byte_size: self.to_css().len(),
            comment_count: self.comment_count(),
            empty_count: self.empty_rule_count(),
        }
    }

    fn serialize(&self) -> String {
        self.to_css()
    }
}

/// Item indices of the style rules a directive addresses
fn matched_rules(sheet: &Stylesheet, directive: &Directive) -> Result<Vec<usize>, MutationError> {
    let target = if directive.target.trim().is_empty() {
        if !directive.kind.is_document_wide() {
            return Err(MutationError::MissingTarget(directive.kind.name()));
        }
        RuleTarget::All
    } else {
        RuleTarget::parse(&directive.target)?
    };

    Ok(sheet
        .rules()
        .filter(|(_, rule)| target.matches(rule.selector()))
        .map(|(index, _)| index)
        .collect())
}

/// Rewrite matched rules; `edit` returns the new block and a change count,
/// or `None` to leave the rule (and its source text) alone
fn edit_rules<F>(sheet: &mut Stylesheet, matched: &[usize], mut edit: F) -> usize
where
    F: FnMut(&Rule) -> Option<(Vec<lean_css::Declaration>, usize)>,
{
    let mut total = 0;
    for &index in matched {
        let Some(rule) = sheet.rule_mut(index) else {
            continue;
        };
        if let Some((declarations, changed)) = edit(rule) {
            *rule.declarations_mut() = declarations;
            total += changed;
        }
    }
    total
}

/// Merge rules with identical blocks into one rule appended at the end.
///
/// Blocks match when every property family carries the same declarations in
/// the same order; see `Rule::normalized_block`.
///
/// All or nothing: the sheet is only touched once every check passed.
fn merge_rules(sheet: &mut Stylesheet, matched: &[usize]) -> Result<usize, MutationError> {
    let rules: Vec<&Rule> = matched.iter().filter_map(|&i| sheet.rule(i)).collect();
    if rules.len() < 2 {
        return Err(MutationError::NotApplicable("fewer than two matching rules".to_string()));
    }

    let block = rules[0].normalized_block();
    if rules.iter().any(|rule| rule.normalized_block() != block) {
        return Err(MutationError::NotApplicable("declaration blocks differ".to_string()));
    }

    let mut selectors: Vec<String> = Vec::new();
    for rule in &rules {
        let parts = split_selector_list(rule.selector())
            .unwrap_or_else(|_| vec![rule.selector().trim().to_string()]);
        for part in parts {
            if !selectors.contains(&part) {
                selectors.push(part);
            }
        }
    }

    let merged = Rule::new(selectors.join(", "), rules[0].declarations().to_vec());
    let count = rules.len();
    sheet.remove_items(matched);
    sheet.push_rule(merged);
    Ok(count)
}

/// Drop top-level comments; `/*! ... */` license comments stay
fn remove_comments(sheet: &mut Stylesheet) -> usize {
    let comments: Vec<usize> = sheet
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches!(item, CssItem::Comment(text) if !text.starts_with("/*!")))
        .map(|(index, _)| index)
        .collect();
    sheet.remove_items(&comments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(css: &str, directive: Directive) -> (String, Result<usize, MutationError>) {
        let mut sheet = lean_css::parse(css).unwrap();
        let result = sheet.apply(&directive);
        (sheet.to_css(), result)
    }

    #[test]
    fn test_merge_identical_blocks() {
        let (out, result) = run(".a{color:red}\n.b{color:red}", Directive::new(DirectiveKind::MergeDuplicateRules, ".a, .b"));
        assert_eq!(result, Ok(2));
        assert_eq!(out, ".a, .b{color:red}");
    }

    #[test]
    fn test_merge_order_insensitive_blocks() {
        let css = ".a { color: red; margin: 0 }\n.b{margin:0;COLOR:red}\n";
        let (out, result) = run(css, Directive::new(DirectiveKind::MergeDuplicateRules, ".a,.b"));
        assert_eq!(result, Ok(2));
        assert_eq!(out, ".a, .b{color:red;margin:0}");
    }

    #[test]
    fn test_merge_differing_blocks_is_not_applicable() {
        let css = ".a{color:red}\n.b{color:blue}";
        let (out, result) = run(css, Directive::new(DirectiveKind::MergeDuplicateRules, ".a, .b"));
        assert!(matches!(result, Err(MutationError::NotApplicable(_))));
        assert_eq!(out, css);
    }

    #[test]
    fn test_merge_repeated_property_order_matters() {
        let css = ".a{color:red;color:blue}\n.b{color:blue;color:red}";
        let (out, result) = run(css, Directive::new(DirectiveKind::MergeDuplicateRules, ".a, .b"));
        assert!(matches!(result, Err(MutationError::NotApplicable(_))));
        assert_eq!(out, css);

        let css = ".a{display:-webkit-box;display:flex;color:red}\n.b{color:red;display:-webkit-box;display:flex}";
        let (out, result) = run(css, Directive::new(DirectiveKind::MergeDuplicateRules, ".a, .b"));
        assert_eq!(result, Ok(2));
        assert_eq!(out, ".a, .b{display:-webkit-box;display:flex;color:red}");
    }

    #[test]
    fn test_merge_single_rule_is_not_applicable() {
        let (_, result) = run(".a, .b{color:red}", Directive::new(DirectiveKind::MergeDuplicateRules, ".a, .b"));
        assert!(matches!(result, Err(MutationError::NotApplicable(_))));
    }

    #[test]
    fn test_shorten_and_zero() {
        let css = ".x{margin-top:0px;margin-right:0px;margin-bottom:0px;margin-left:0px}";
        let kind = DirectiveKind::ShortenProperties { properties: vec!["margin".into(), "padding".into()] };
        let mut sheet = lean_css::parse(css).unwrap();
        assert_eq!(sheet.apply(&Directive::new(kind, ".x")), Ok(1));
        assert_eq!(sheet.apply(&Directive::new(DirectiveKind::RemoveRedundantValues, "")), Ok(1));
        assert_eq!(sheet.to_css(), ".x{margin:0 0 0 0}");
    }

    #[test]
    fn test_untouched_rules_keep_source() {
        let css = ".a { width: 0px }\n.b { width: 1px }\n";
        let (out, result) = run(css, Directive::new(DirectiveKind::RemoveRedundantValues, "*"));
        assert_eq!(result, Ok(1));
        assert_eq!(out, ".a{width:0}\n.b { width: 1px }\n");
    }

    #[test]
    fn test_remove_comments_keeps_license() {
        let (out, result) = run("/*! MIT */\n/* dev note */\n.a{b:c}", Directive::new(DirectiveKind::RemoveComments, ""));
        assert_eq!(result, Ok(1));
        assert_eq!(out, "/*! MIT */\n.a{b:c}");
    }

    #[test]
    fn test_remove_rule() {
        let (out, result) = run(".a{b:c}\n.unused{x:y}\n.c{d:e}", Directive::new(DirectiveKind::RemoveRule, ".unused"));
        assert_eq!(result, Ok(1));
        assert_eq!(out, ".a{b:c}\n.c{d:e}");
    }

    #[test]
    fn test_remove_rule_needs_target() {
        let (_, result) = run(".a{b:c}", Directive::new(DirectiveKind::RemoveRule, ""));
        assert_eq!(result, Err(MutationError::MissingTarget("remove_rule")));
    }

    #[test]
    fn test_html_kind_not_applicable() {
        let (_, result) = run(".a{b:c}", Directive::new(DirectiveKind::UnwrapNode { force: false }, ".a"));
        assert!(matches!(result, Err(MutationError::NotApplicable(_))));
    }

    #[test]
    fn test_stats() {
        let sheet = lean_css::parse("/* c */\n.a, .b{x:1;y:2}\n.c{x:1;y:2}\n.d{}").unwrap();
        let stats = sheet.stats();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.attribute_count, 4);
        assert_eq!(stats.selector_count, 4);
        assert_eq!(stats.duplicate_block_count, 1);
        assert_eq!(stats.comment_count, 1);
        assert_eq!(stats.empty_count, 1);
    }
}
