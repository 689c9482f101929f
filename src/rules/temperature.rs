//! High temperature on precision-sensitive prompts.

use crate::core::syntax::{NodeId, NodeKind};
use crate::core::{Finding, RuleKind};
use crate::prompt::calls::{keyword_value, match_client_call, CallSignature};
use crate::prompt::extract::{extract_text, numeric_value};
use crate::rules::RuleContext;

const COMPLETION_METHODS: &[&str] = &["chat", "complete", "completion"];
const PARAMETERS_KEY: &str = "parameters";

/// Temperature above this is considered high.
const MAX_DETERMINISTIC_TEMPERATURE: f64 = 0.7;

/// Fails on a recognized completion call whose `temperature` exceeds 0.7
/// while the combined message content reads as a precision task (contains a
/// configured precision keyword, case-insensitively). Applies wherever the
/// call shape matches, prompt scope or not.
pub fn check(ctx: &RuleContext, node: NodeId) -> Option<Finding> {
    let signature = match_client_call(ctx.tree, node, COMPLETION_METHODS, &ctx.config.clients)?;

    let value = keyword_value(ctx.tree, &signature, "temperature", Some(PARAMETERS_KEY))?;
    let temperature = numeric_value(ctx.tree, value)?;
    if temperature <= MAX_DETERMINISTIC_TEMPERATURE {
        return None;
    }

    let content = combined_message_content(ctx, &signature)?;
    let lowered = content.to_lowercase();
    let keyword = ctx
        .config
        .rules
        .precision_keywords
        .iter()
        .find(|k| lowered.contains(k.as_str()))?;

    let span = ctx.tree.span(node);
    Some(Finding::new(
        RuleKind::TemperatureRange,
        ctx.path.to_path_buf(),
        span.line,
        span.column,
        format!(
            "Temperature {:.1} > {} for a precision task (content mentions \"{}\")",
            temperature, MAX_DETERMINISTIC_TEMPERATURE, keyword
        ),
    ))
}

/// Concatenated extractable text of every `content:` field in the call's
/// `messages:` array.
fn combined_message_content(ctx: &RuleContext, signature: &CallSignature) -> Option<String> {
    let messages = keyword_value(ctx.tree, signature, "messages", Some(PARAMETERS_KEY))?;
    if ctx.tree.kind(messages) != NodeKind::ArrayLiteral {
        return None;
    }

    let mut combined = String::new();
    for &message in ctx.tree.children(messages) {
        if ctx.tree.kind(message) != NodeKind::HashLiteral {
            continue;
        }
        for &entry in ctx.tree.children(message) {
            if ctx.tree.kind(entry) != NodeKind::Pair || ctx.tree.name(entry) != Some("content") {
                continue;
            }
            if let Some(value) = ctx.tree.pair_value(entry) {
                if let Some(text) = extract_text(ctx.tree, value) {
                    combined.push_str(&text.static_text());
                    combined.push(' ');
                }
            }
        }
    }

    if combined.trim().is_empty() {
        None
    } else {
        Some(combined)
    }
}
