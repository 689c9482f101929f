//! Lowered syntax tree shared by the scope classifier, extractors, and rules.
//!
//! The Ruby frontend lowers a tree-sitter parse into this arena: nodes in
//! preorder, a parent-index table for O(1) ancestor steps, and a closed
//! [`NodeKind`] so every downstream matcher is an exhaustive `match`.

use serde::Serialize;

/// Index of a node within its [`SyntaxTree`].
pub type NodeId = usize;

/// Byte span plus 1-indexed line/column of a node's start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

/// Closed set of node kinds the rule engine distinguishes.
///
/// Anything the rules never inspect lowers to `Other` (children are still
/// lowered, so traversal descends through it).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Program,
    /// String with no interpolation; its compile-time text is fully known.
    StringLiteral,
    /// String with at least one embedded expression.
    CompositeString,
    /// Literal run of characters inside a string.
    StringContent,
    /// Embedded `#{...}` expression inside a string.
    Interpolation,
    /// `<<~TAG` opener, before heredoc linking rewrites it into a string kind.
    HeredocStart,
    /// Floating heredoc content node; inert after linking.
    HeredocBody,
    SymbolLiteral,
    IntLiteral,
    FloatLiteral,
    /// Key-value entry of a hash or keyword-argument list.
    Pair,
    HashLiteral,
    ArrayLiteral,
    Call,
    Arguments,
    /// Local, instance, class, or global variable reference.
    Identifier,
    Constant,
    /// Qualified constant path such as `OpenAI::Client`.
    ScopePath,
    /// Plain or operator assignment; children are `[left, right]`.
    Assignment,
    MethodDef,
    ClassDef,
    ModuleDef,
    Other,
}

#[derive(Clone, Debug)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    /// Declared or selected name where the kind has one: method name for
    /// calls and definitions, normalized key for pairs, left-hand-side text
    /// for assignments.
    pub name: Option<String>,
    pub children: Vec<NodeId>,
}

/// Immutable-after-lowering arena for one analyzed source unit.
#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    parents: Vec<Option<NodeId>>,
    source: String,
}

impl SyntaxTree {
    pub fn new(source: String) -> Self {
        Self {
            nodes: Vec::new(),
            parents: Vec::new(),
            source,
        }
    }

    pub(crate) fn push(&mut self, node: SyntaxNode, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.parents.push(parent);
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SyntaxNode {
        &mut self.nodes[id]
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.parents[id] = parent;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in document (preorder) order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes[id].name.as_deref()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id]
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Raw source text covered by the node's span.
    pub fn text(&self, id: NodeId) -> &str {
        let span = self.nodes[id].span;
        &self.source[span.start..span.end]
    }

    /// The node itself followed by its enclosing nodes, innermost first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Preorder walk of the subtree rooted at `id`, `id` included.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Value child of a pair, when present.
    pub fn pair_value(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Pair => self.children(id).get(1).copied(),
            _ => None,
        }
    }

    /// Receiver of a call, when the call has one.
    pub fn call_receiver(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Call => self
                .children(id)
                .first()
                .copied()
                .filter(|&c| self.kind(c) != NodeKind::Arguments),
            _ => None,
        }
    }

    /// Argument list of a call, when the call has one.
    pub fn call_arguments(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Call => self
                .children(id)
                .iter()
                .copied()
                .find(|&c| self.kind(c) == NodeKind::Arguments),
            _ => None,
        }
    }
}

pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        for &child in self.tree.children(current).iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}
