//! Critical `###` sections belong at the start or end of a prompt.
//!
//! Models weight the beginning and end of long instructions most heavily, so
//! a section heading buried in the middle third tends to be ignored.

use crate::core::syntax::NodeId;
use crate::core::{Finding, RuleKind};
use crate::prompt::extract::extract_text;
use crate::prompt::scope::is_prompt_scope;
use crate::rules::RuleContext;
use once_cell::sync::Lazy;
use regex::Regex;

static SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^###\s+\S").unwrap());

/// Minimum number of non-blank lines before the prompt has a meaningful
/// middle to police.
const MIN_LINES: usize = 7;

pub fn check(ctx: &RuleContext, node: NodeId) -> Option<Finding> {
    if !is_prompt_scope(ctx.tree, node) {
        return None;
    }
    let text = extract_text(ctx.tree, node)?;
    let static_text = text.static_text();
    let lines: Vec<&str> = static_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let total = lines.len();
    if total < MIN_LINES {
        return None;
    }
    let third = total.div_ceil(3).max(2);

    for (index, line) in lines.iter().enumerate() {
        if SECTION.is_match(line) && index >= third && index < total - third {
            let span = ctx.tree.span(node);
            return Some(
                Finding::new(
                    RuleKind::SectionPlacement,
                    ctx.path.to_path_buf(),
                    span.line,
                    span.column,
                    format!(
                        "Section `{}` sits in the middle of the prompt; move it into the first or last third",
                        line
                    ),
                )
                .with_context(line.to_string()),
            );
        }
    }
    None
}
