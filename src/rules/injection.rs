//! No runtime interpolation inside `SYSTEM`-tagged prompt heredocs.

use crate::core::syntax::NodeId;
use crate::core::{Finding, RuleKind};
use crate::prompt::extract::{extract_text, opens_heredoc_with_tag};
use crate::prompt::scope::is_prompt_scope;
use crate::rules::RuleContext;

/// Heredoc tag marking a system prompt block.
const SYSTEM_TAG: &str = "SYSTEM";

/// Fails on a composite string in a prompt scope whose opening line carries
/// the `SYSTEM` heredoc tag and which embeds at least one dynamic fragment.
pub fn check(ctx: &RuleContext, node: NodeId) -> Option<Finding> {
    if !is_prompt_scope(ctx.tree, node) {
        return None;
    }
    let span = ctx.tree.span(node);
    if !opens_heredoc_with_tag(ctx.tree.source(), span.start, SYSTEM_TAG) {
        return None;
    }
    let text = extract_text(ctx.tree, node)?;
    if !text.has_dynamic() {
        return None;
    }

    Some(Finding::new(
        RuleKind::SystemInjection,
        ctx.path.to_path_buf(),
        span.line,
        span.column,
        "Do not interpolate runtime values into a SYSTEM prompt; pass them through user messages"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::Fixture;
    use indoc::indoc;

    fn injection_findings(source: &str) -> Vec<Finding> {
        Fixture::parse(source)
            .run()
            .into_iter()
            .filter(|f| f.rule == RuleKind::SystemInjection)
            .collect()
    }

    #[test]
    fn flags_interpolation_in_system_heredoc() {
        let findings = injection_findings(indoc! {r#"
            def generate_system_prompt
              <<~SYSTEM
                You are an assistant for #{company_name}.
              SYSTEM
            end
        "#});
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, RuleKind::SystemInjection);
    }

    #[test]
    fn accepts_static_system_heredoc() {
        let findings = injection_findings(indoc! {r#"
            def generate_system_prompt
              <<~SYSTEM
                You are an assistant.
              SYSTEM
            end
        "#});
        assert!(findings.is_empty());
    }

    #[test]
    fn other_tags_are_not_policed() {
        let findings = injection_findings(indoc! {r#"
            def generate_system_prompt
              <<~PROMPT
                Context: #{context}
              PROMPT
            end
        "#});
        assert!(findings.is_empty());
    }

    #[test]
    fn skips_outside_prompt_scope() {
        let findings = injection_findings(indoc! {r#"
            def build_email
              <<~SYSTEM
                Status for #{hostname}
              SYSTEM
            end
        "#});
        assert!(findings.is_empty());
    }

    #[test]
    fn plain_interpolated_strings_are_not_flagged() {
        let findings = injection_findings(indoc! {r#"
            def generate_system_prompt
              "You are an assistant for #{company_name}."
            end
        "#});
        assert!(findings.is_empty());
    }
}
