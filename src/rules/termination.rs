//! Chat calls must bound their output.

use crate::core::syntax::NodeId;
use crate::core::{Finding, RuleKind};
use crate::prompt::calls::{keyword_value, match_client_call};
use crate::rules::RuleContext;

const CHAT_METHODS: &[&str] = &["chat"];
const PARAMETERS_KEY: &str = "parameters";
const TERMINATION_KEYS: &[&str] = &["stop", "max_tokens"];

/// Fails on a recognized client `chat` call whose keyword arguments (flat or
/// nested under `parameters:`) contain neither `stop` nor `max_tokens`.
pub fn check(ctx: &RuleContext, node: NodeId) -> Option<Finding> {
    let signature = match_client_call(ctx.tree, node, CHAT_METHODS, &ctx.config.clients)?;

    let bounded = TERMINATION_KEYS.iter().any(|&key| {
        keyword_value(ctx.tree, &signature, key, Some(PARAMETERS_KEY)).is_some()
    });
    if bounded {
        return None;
    }

    let span = ctx.tree.span(node);
    Some(Finding::new(
        RuleKind::MissingTermination,
        ctx.path.to_path_buf(),
        span.line,
        span.column,
        format!(
            "`{}` call sets neither `stop` nor `max_tokens`; the response length is unbounded",
            signature.method
        ),
    ))
}
