//! System prompts should open with a Markdown heading.

use crate::core::syntax::NodeId;
use crate::core::{Finding, RuleKind};
use crate::prompt::extract::extract_text;
use crate::prompt::scope::is_prompt_scope;
use crate::rules::RuleContext;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s+\S").unwrap());

/// Fails on a `system:` pair in a prompt scope whose value text is non-empty
/// but does not start with a Markdown heading line.
pub fn check(ctx: &RuleContext, pair: NodeId) -> Option<Finding> {
    if ctx.tree.name(pair) != Some("system") {
        return None;
    }
    if !is_prompt_scope(ctx.tree, pair) {
        return None;
    }
    let value = ctx.tree.pair_value(pair)?;
    let text = extract_text(ctx.tree, value)?;
    let static_text = text.static_text();
    let first_line = static_text.lines().map(str::trim).find(|l| !l.is_empty())?;
    if HEADING.is_match(first_line) {
        return None;
    }

    let span = ctx.tree.span(pair);
    Some(Finding::new(
        RuleKind::HeadingFormat,
        ctx.path.to_path_buf(),
        span.line,
        span.column,
        "System prompt should start with a Markdown heading (e.g. `# Role`)".to_string(),
    ))
}
