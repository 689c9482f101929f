//! Lexical classification of prompt-related code regions.

use crate::core::syntax::{NodeId, NodeKind, SyntaxTree};

const PROMPT_MARKER: &str = "prompt";

/// True when any enclosing method, class, or module declares a name
/// containing `"prompt"`, case-insensitively. Methods are tested by their own
/// name, types and namespaces by the last segment of a possibly-qualified
/// name. Pure function of tree structure, O(depth) per call.
pub fn is_prompt_scope(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.ancestors(node).any(|ancestor| match tree.kind(ancestor) {
        NodeKind::MethodDef => name_matches(tree.name(ancestor)),
        NodeKind::ClassDef | NodeKind::ModuleDef => {
            name_matches(tree.name(ancestor).map(last_segment))
        }
        _ => false,
    })
}

fn name_matches(name: Option<&str>) -> bool {
    name.map(|n| n.to_lowercase().contains(PROMPT_MARKER))
        .unwrap_or(false)
}

fn last_segment(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}
