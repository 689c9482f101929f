//! Structural recognition of AI client call sites, without type information.
//!
//! A call matches only when its method name is targeted and its receiver
//! resolves to a known client through one of three increasingly permissive
//! strategies: direct construction, variable tracing within the enclosing
//! definition scopes, or a last-resort naming heuristic. Anything else is no
//! match, so unrelated `chat`-named methods never produce findings.

use crate::config::ClientsConfig;
use crate::core::syntax::{NodeId, NodeKind, SyntaxTree};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// Receiver is itself a `new` call on a configured client type.
    DirectConstruction { class_name: String },
    /// Receiver is a variable assigned a client construction elsewhere in an
    /// enclosing scope.
    TracedVariable { name: String, assignment: NodeId },
    /// Receiver name contains a client-suggestive substring.
    NamingHeuristic { name: String },
}

#[derive(Clone, Debug)]
pub struct CallSignature {
    pub node: NodeId,
    pub method: String,
    pub receiver: Receiver,
    /// Keyword arguments in declaration order. Bare pairs and pairs inside a
    /// braced single-hash argument are equivalent call shapes in Ruby, so
    /// both contribute.
    pub kwargs: Vec<(String, NodeId)>,
}

/// Match a call node against a set of target method names and resolve its
/// receiver to a client.
pub fn match_client_call(
    tree: &SyntaxTree,
    node: NodeId,
    target_methods: &[&str],
    clients: &ClientsConfig,
) -> Option<CallSignature> {
    if tree.kind(node) != NodeKind::Call {
        return None;
    }
    let method = tree.name(node)?.to_string();
    if !target_methods.contains(&method.as_str()) {
        return None;
    }
    let receiver = resolve_receiver(tree, node, clients)?;
    Some(CallSignature {
        node,
        method,
        receiver,
        kwargs: keyword_arguments(tree, node),
    })
}

fn resolve_receiver(tree: &SyntaxTree, call: NodeId, clients: &ClientsConfig) -> Option<Receiver> {
    let receiver = tree.call_receiver(call)?;
    match tree.kind(receiver) {
        NodeKind::Call => {
            constructed_client(tree, receiver, clients).map(|class_name| {
                Receiver::DirectConstruction { class_name }
            })
        }
        NodeKind::Identifier => {
            let name = tree.text(receiver).to_string();
            if let Some(assignment) = trace_client_assignment(tree, call, clients) {
                Some(Receiver::TracedVariable { name, assignment })
            } else if name_suggests_client(&name, clients) {
                Some(Receiver::NamingHeuristic { name })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// `Some(class path)` when the node is a `new` call on a constant whose last
/// segment is a configured client type name.
pub fn constructed_client(
    tree: &SyntaxTree,
    node: NodeId,
    clients: &ClientsConfig,
) -> Option<String> {
    if tree.kind(node) != NodeKind::Call || tree.name(node) != Some("new") {
        return None;
    }
    let receiver = tree.call_receiver(node)?;
    match tree.kind(receiver) {
        NodeKind::Constant | NodeKind::ScopePath => {
            let path = tree.text(receiver);
            let last = path.rsplit("::").next().unwrap_or(path);
            clients
                .classes
                .iter()
                .any(|c| c == last)
                .then(|| path.to_string())
        }
        _ => None,
    }
}

/// Search enclosing definition scopes, innermost first, for the first
/// assignment (declaration order) whose right-hand side constructs a client.
/// Widening outward covers the common case of an instance variable assigned
/// in `initialize` and used from a sibling method.
fn trace_client_assignment(
    tree: &SyntaxTree,
    from: NodeId,
    clients: &ClientsConfig,
) -> Option<NodeId> {
    for scope in enclosing_scopes(tree, from) {
        let found = tree.descendants(scope).find(|&id| {
            tree.kind(id) == NodeKind::Assignment
                && tree
                    .children(id)
                    .get(1)
                    .map(|&rhs| constructed_client(tree, rhs, clients).is_some())
                    .unwrap_or(false)
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

fn enclosing_scopes(tree: &SyntaxTree, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.ancestors(from).skip(1).filter(|&id| {
        matches!(
            tree.kind(id),
            NodeKind::MethodDef | NodeKind::ClassDef | NodeKind::ModuleDef | NodeKind::Program
        )
    })
}

fn name_suggests_client(name: &str, clients: &ClientsConfig) -> bool {
    let lowered = name.to_lowercase();
    clients.name_hints.iter().any(|hint| lowered.contains(hint))
}

fn keyword_arguments(tree: &SyntaxTree, call: NodeId) -> Vec<(String, NodeId)> {
    let mut kwargs = Vec::new();
    let Some(args) = tree.call_arguments(call) else {
        return kwargs;
    };
    for &arg in tree.children(args) {
        match tree.kind(arg) {
            NodeKind::Pair => push_pair(tree, arg, &mut kwargs),
            NodeKind::HashLiteral => {
                for &entry in tree.children(arg) {
                    if tree.kind(entry) == NodeKind::Pair {
                        push_pair(tree, entry, &mut kwargs);
                    }
                }
            }
            _ => {}
        }
    }
    kwargs
}

fn push_pair(tree: &SyntaxTree, pair: NodeId, kwargs: &mut Vec<(String, NodeId)>) {
    if let (Some(key), Some(value)) = (tree.name(pair), tree.pair_value(pair)) {
        kwargs.push((key.to_string(), value));
    }
}

/// Look up `key` among the call's keyword arguments; when `nested_under`
/// names a keyword whose value is a hash, also search one level inside it.
/// First match wins; never recurses past one nesting level.
pub fn keyword_value(
    tree: &SyntaxTree,
    signature: &CallSignature,
    key: &str,
    nested_under: Option<&str>,
) -> Option<NodeId> {
    if let Some((_, value)) = signature.kwargs.iter().find(|(k, _)| k == key) {
        return Some(*value);
    }
    let wrapper = nested_under?;
    let (_, hash) = signature.kwargs.iter().find(|(k, _)| k == wrapper)?;
    if tree.kind(*hash) != NodeKind::HashLiteral {
        return None;
    }
    tree.children(*hash)
        .iter()
        .find(|&&entry| tree.kind(entry) == NodeKind::Pair && tree.name(entry) == Some(key))
        .and_then(|&entry| tree.pair_value(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::ruby::parse_source;
    use crate::config::ClientsConfig;
    use indoc::indoc;

    const CHAT: &[&str] = &["chat"];

    fn clients() -> ClientsConfig {
        ClientsConfig::default()
    }

    fn find_call<'a>(tree: &'a SyntaxTree, method: &str) -> NodeId {
        tree.ids()
            .find(|&id| tree.kind(id) == NodeKind::Call && tree.name(id) == Some(method))
            .expect("call should exist")
    }

    #[test]
    fn matches_directly_constructed_client() {
        let tree = parse_source(r#"OpenAI::Client.new.chat(parameters: { model: "x" })"#).unwrap();
        let sig = match_client_call(&tree, find_call(&tree, "chat"), CHAT, &clients()).unwrap();
        assert_eq!(
            sig.receiver,
            Receiver::DirectConstruction {
                class_name: "OpenAI::Client".to_string()
            }
        );
    }

    #[test]
    fn traces_variable_through_assignment() {
        let tree = parse_source(indoc! {r#"
            def ask
              c = OpenAI::Client.new
              c.chat(parameters: { model: "x" })
            end
        "#})
        .unwrap();
        let sig = match_client_call(&tree, find_call(&tree, "chat"), CHAT, &clients()).unwrap();
        assert!(matches!(sig.receiver, Receiver::TracedVariable { .. }));
    }

    #[test]
    fn traces_instance_variable_assigned_in_initialize() {
        let tree = parse_source(indoc! {r#"
            class Bot
              def initialize
                @client = OpenAI::Client.new
              end

              def ask
                @client.chat(parameters: { model: "x" })
              end
            end
        "#})
        .unwrap();
        // The identifier receiver resolves through the class-level search.
        let sig = match_client_call(&tree, find_call(&tree, "chat"), CHAT, &clients()).unwrap();
        assert!(matches!(
            sig.receiver,
            Receiver::TracedVariable { .. } | Receiver::NamingHeuristic { .. }
        ));
    }

    #[test]
    fn falls_back_to_naming_heuristic() {
        let tree = parse_source(r#"llm_client.chat(parameters: { model: "x" })"#).unwrap();
        let sig = match_client_call(&tree, find_call(&tree, "chat"), CHAT, &clients()).unwrap();
        assert_eq!(
            sig.receiver,
            Receiver::NamingHeuristic {
                name: "llm_client".to_string()
            }
        );
    }

    #[test]
    fn unrelated_receivers_do_not_match() {
        let tree = parse_source(r#"socket.chat(parameters: { model: "x" })"#).unwrap();
        assert!(match_client_call(&tree, find_call(&tree, "chat"), CHAT, &clients()).is_none());
    }

    #[test]
    fn untargeted_methods_do_not_match() {
        let tree = parse_source(r#"client.transcribe(parameters: { model: "x" })"#).unwrap();
        let call = find_call(&tree, "transcribe");
        assert!(match_client_call(&tree, call, CHAT, &clients()).is_none());
    }

    #[test]
    fn keyword_lookup_is_flat_then_one_level_nested() {
        let tree = parse_source(indoc! {r#"
            client.chat(
              model: "x",
              parameters: { max_tokens: 100, messages: [] }
            )
        "#})
        .unwrap();
        let sig = match_client_call(&tree, find_call(&tree, "chat"), CHAT, &clients()).unwrap();

        assert!(keyword_value(&tree, &sig, "model", Some("parameters")).is_some());
        assert!(keyword_value(&tree, &sig, "max_tokens", Some("parameters")).is_some());
        assert!(keyword_value(&tree, &sig, "max_tokens", None).is_none());
        assert!(keyword_value(&tree, &sig, "stop", Some("parameters")).is_none());
    }
}
