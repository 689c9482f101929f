//! Ruby frontend: tree-sitter parsing and lowering into the syntax arena.
//!
//! tree-sitter-ruby emits a heredoc as an inline `heredoc_beginning` token
//! plus a floating `heredoc_body` sibling; [`link_heredocs`] zips the two in
//! document order so downstream code sees one ordinary string node, anchored
//! at the body's start offset.

use crate::analyzers::{Analyzer, SourceUnit};
use crate::config::PromptmapConfig;
use crate::core::syntax::{NodeId, NodeKind, Span, SyntaxNode, SyntaxTree};
use crate::core::FileReport;
use crate::prompt::tokens::TokenCounter;
use crate::rules::{self, RuleContext};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tree_sitter::{Node, Parser};

pub struct RubyAnalyzer {
    config: PromptmapConfig,
    tokens: TokenCounter,
}

impl RubyAnalyzer {
    pub fn new(config: PromptmapConfig) -> Self {
        let tokens = TokenCounter::from_config(&config.tokenizer);
        Self { config, tokens }
    }
}

impl Analyzer for RubyAnalyzer {
    fn parse(&self, content: &str, path: PathBuf) -> Result<SourceUnit> {
        let tree = parse_source(content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(SourceUnit { tree, path })
    }

    fn analyze(&self, unit: &SourceUnit) -> FileReport {
        let ctx = RuleContext {
            tree: &unit.tree,
            path: &unit.path,
            config: &self.config,
            tokens: &self.tokens,
        };
        FileReport {
            path: unit.path.clone(),
            findings: rules::run(&ctx),
        }
    }
}

/// Parse Ruby source and lower it into a [`SyntaxTree`].
pub fn parse_source(content: &str) -> Result<SyntaxTree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_ruby::LANGUAGE.into())
        .context("Failed to set tree-sitter language")?;

    let parsed = parser
        .parse(content, None)
        .context("Failed to parse source code")?;

    let mut tree = SyntaxTree::new(content.to_string());
    lower_node(parsed.root_node(), None, &mut tree, content);
    link_heredocs(&mut tree);
    Ok(tree)
}

fn lower_node(node: Node, parent: Option<NodeId>, tree: &mut SyntaxTree, source: &str) -> NodeId {
    let lowered = SyntaxNode {
        kind: map_kind(&node),
        span: span_of(&node),
        name: node_name(&node, source),
        children: Vec::new(),
    };
    let id = tree.push(lowered, parent);

    let mut child_ids = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if skip_child(&node, &child) {
            continue;
        }
        child_ids.push(lower_node(child, Some(id), tree, source));
    }
    tree.node_mut(id).children = child_ids;
    id
}

/// Children that carry no structure the rules care about: comments, heredoc
/// terminators, and the method-name identifier of a call (captured as the
/// call's name instead).
fn skip_child(parent: &Node, child: &Node) -> bool {
    match child.kind() {
        "comment" | "heredoc_end" => true,
        _ => {
            parent.kind() == "call"
                && parent
                    .child_by_field_name("method")
                    .map(|m| m.id() == child.id())
                    .unwrap_or(false)
        }
    }
}

fn map_kind(node: &Node) -> NodeKind {
    match node.kind() {
        "program" => NodeKind::Program,
        "string" => {
            if has_interpolation(node) {
                NodeKind::CompositeString
            } else {
                NodeKind::StringLiteral
            }
        }
        "string_content" | "escape_sequence" => NodeKind::StringContent,
        "interpolation" => NodeKind::Interpolation,
        "heredoc_beginning" => NodeKind::HeredocStart,
        "heredoc_body" => NodeKind::HeredocBody,
        "simple_symbol" | "hash_key_symbol" | "delimited_symbol" => NodeKind::SymbolLiteral,
        "integer" => NodeKind::IntLiteral,
        "float" => NodeKind::FloatLiteral,
        "pair" => NodeKind::Pair,
        "hash" => NodeKind::HashLiteral,
        "array" => NodeKind::ArrayLiteral,
        "call" => NodeKind::Call,
        "argument_list" => NodeKind::Arguments,
        "identifier" | "instance_variable" | "class_variable" | "global_variable" => {
            NodeKind::Identifier
        }
        "constant" => NodeKind::Constant,
        "scope_resolution" => NodeKind::ScopePath,
        "assignment" | "operator_assignment" => NodeKind::Assignment,
        "method" | "singleton_method" => NodeKind::MethodDef,
        "class" => NodeKind::ClassDef,
        "module" => NodeKind::ModuleDef,
        _ => NodeKind::Other,
    }
}

fn has_interpolation(node: &Node) -> bool {
    let mut cursor = node.walk();
    let result = node
        .named_children(&mut cursor)
        .any(|c| c.kind() == "interpolation");
    result
}

fn node_name(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "call" => field_text(node, "method", source),
        "method" | "singleton_method" | "class" | "module" => field_text(node, "name", source),
        "assignment" | "operator_assignment" => field_text(node, "left", source),
        "pair" => node
            .child_by_field_name("key")
            .and_then(|key| pair_key_name(&key, source)),
        _ => None,
    }
}

fn field_text(node: &Node, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| node_text(&n, source).to_string())
}

/// Normalize a pair key to its bare name: `system:`, `:system`, and
/// `"system"` all yield `system`.
fn pair_key_name(key: &Node, source: &str) -> Option<String> {
    match key.kind() {
        "hash_key_symbol" => Some(node_text(key, source).to_string()),
        "simple_symbol" => Some(node_text(key, source).trim_start_matches(':').to_string()),
        "string" => {
            let mut cursor = key.walk();
            let content: String = key
                .named_children(&mut cursor)
                .filter(|c| c.kind() == "string_content")
                .map(|c| node_text(&c, source).to_string())
                .collect();
            if content.is_empty() {
                None
            } else {
                Some(content)
            }
        }
        _ => None,
    }
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

fn span_of(node: &Node) -> Span {
    Span {
        start: node.start_byte(),
        end: node.end_byte(),
        line: node.start_position().row + 1,
        column: node.start_position().column + 1,
    }
}

/// Zip heredoc openers with their floating bodies, in document order, and
/// rewrite each opener into a plain or composite string node whose children
/// are the body's content fragments. The rewritten node is anchored at the
/// body's start so the line preceding it is the opener line.
fn link_heredocs(tree: &mut SyntaxTree) {
    let starts: Vec<NodeId> = tree
        .ids()
        .filter(|&id| tree.kind(id) == NodeKind::HeredocStart)
        .collect();
    let bodies: Vec<NodeId> = tree
        .ids()
        .filter(|&id| tree.kind(id) == NodeKind::HeredocBody)
        .collect();

    for (&start, &body) in starts.iter().zip(bodies.iter()) {
        let children = std::mem::take(&mut tree.node_mut(body).children);
        let body_span = tree.span(body);
        let has_dynamic = children
            .iter()
            .any(|&c| tree.kind(c) == NodeKind::Interpolation);
        let content_end = children
            .last()
            .map(|&c| tree.span(c).end)
            .unwrap_or(body_span.start);

        let node = tree.node_mut(start);
        node.kind = if has_dynamic {
            NodeKind::CompositeString
        } else {
            NodeKind::StringLiteral
        };
        node.span = Span {
            start: body_span.start,
            end: content_end,
            line: body_span.line,
            column: body_span.column,
        };
        node.children = children.clone();

        for child in children {
            tree.set_parent(child, Some(start));
        }
    }
}
