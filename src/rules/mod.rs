//! Prompt anti-pattern rules.
//!
//! Each rule is a pure function `(context, node) -> Option<Finding>` invoked
//! from one top-down traversal. Rules share no mutable state and their order
//! is irrelevant; a node that lacks the structure a rule expects is "rule
//! inapplicable", never a finding and never an error.

pub mod budget;
pub mod heading;
pub mod injection;
pub mod placement;
pub mod temperature;
pub mod termination;

use crate::config::PromptmapConfig;
use crate::core::syntax::{NodeKind, SyntaxTree};
use crate::core::Finding;
use crate::prompt::tokens::TokenCounter;
use std::path::Path;

pub struct RuleContext<'a> {
    pub tree: &'a SyntaxTree,
    pub path: &'a Path,
    pub config: &'a PromptmapConfig,
    pub tokens: &'a TokenCounter,
}

/// Visit every node once, dispatching to the rules whose trigger kind
/// matches. The match is exhaustive over [`NodeKind`] so a new kind forces
/// this dispatcher to be revisited.
pub fn run(ctx: &RuleContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for id in ctx.tree.ids() {
        match ctx.tree.kind(id) {
            NodeKind::Pair => {
                findings.extend(heading::check(ctx, id));
            }
            NodeKind::StringLiteral => {
                findings.extend(placement::check(ctx, id));
                findings.extend(budget::check(ctx, id));
            }
            NodeKind::CompositeString => {
                findings.extend(injection::check(ctx, id));
                findings.extend(placement::check(ctx, id));
                findings.extend(budget::check(ctx, id));
            }
            NodeKind::Call => {
                findings.extend(termination::check(ctx, id));
                findings.extend(temperature::check(ctx, id));
            }
            NodeKind::Program
            | NodeKind::StringContent
            | NodeKind::Interpolation
            | NodeKind::HeredocStart
            | NodeKind::HeredocBody
            | NodeKind::SymbolLiteral
            | NodeKind::IntLiteral
            | NodeKind::FloatLiteral
            | NodeKind::HashLiteral
            | NodeKind::ArrayLiteral
            | NodeKind::Arguments
            | NodeKind::Identifier
            | NodeKind::Constant
            | NodeKind::ScopePath
            | NodeKind::Assignment
            | NodeKind::MethodDef
            | NodeKind::ClassDef
            | NodeKind::ModuleDef
            | NodeKind::Other => {}
        }
    }
    findings
}
