//! Prompts must fit the configured token budget.

use crate::core::syntax::NodeId;
use crate::core::{Finding, RuleKind};
use crate::prompt::extract::extract_text;
use crate::prompt::scope::is_prompt_scope;
use crate::rules::RuleContext;

/// Fails when the compile-time-known text of a prompt-scope string measures
/// strictly more tokens than `rules.max_tokens`. Counting uses the
/// configured encoding profile, or the character-length estimate when none
/// is available.
pub fn check(ctx: &RuleContext, node: NodeId) -> Option<Finding> {
    if !is_prompt_scope(ctx.tree, node) {
        return None;
    }
    let text = extract_text(ctx.tree, node)?;
    let static_text = text.static_text();
    if static_text.trim().is_empty() {
        return None;
    }

    let count = ctx.tokens.count(&static_text);
    let max = ctx.config.rules.max_tokens;
    if count <= max {
        return None;
    }

    let span = ctx.tree.span(node);
    Some(Finding::new(
        RuleKind::TokenBudget,
        ctx.path.to_path_buf(),
        span.line,
        span.column,
        format!("Prompt is {} tokens, exceeding the limit of {}", count, max),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::Fixture;

    fn budget_findings(fixture: &Fixture) -> Vec<Finding> {
        fixture
            .run()
            .into_iter()
            .filter(|f| f.rule == RuleKind::TokenBudget)
            .collect()
    }

    fn prompt_class_with_string(len: usize) -> String {
        format!(
            "class PromptBuilder\n  BASE = \"{}\"\nend\n",
            "a".repeat(len)
        )
    }

    #[test]
    fn flags_prompt_over_the_budget() {
        // 44 chars -> 11 estimated tokens against a budget of 10.
        let mut fixture = Fixture::parse(&prompt_class_with_string(44));
        fixture.config.rules.max_tokens = 10;
        let findings = budget_findings(&fixture);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("11 tokens"));
        assert!(findings[0].message.contains("limit of 10"));
    }

    #[test]
    fn never_fails_at_exactly_the_threshold() {
        // 40 chars -> exactly 10 estimated tokens.
        let mut fixture = Fixture::parse(&prompt_class_with_string(40));
        fixture.config.rules.max_tokens = 10;
        assert!(budget_findings(&fixture).is_empty());
    }

    #[test]
    fn skips_outside_prompt_scope() {
        let mut fixture =
            Fixture::parse(&format!("class Report\n  BASE = \"{}\"\nend\n", "a".repeat(44)));
        fixture.config.rules.max_tokens = 10;
        assert!(budget_findings(&fixture).is_empty());
    }

    #[test]
    fn counts_only_static_fragments_of_composites() {
        // Static portion is 44 chars; the interpolation adds nothing.
        let source = format!(
            "class PromptBuilder\n  def base(x)\n    \"{}#{{x}}\"\n  end\nend\n",
            "a".repeat(44)
        );
        let mut fixture = Fixture::parse(&source);
        fixture.config.rules.max_tokens = 10;
        let findings = budget_findings(&fixture);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("11 tokens"));
    }
}
