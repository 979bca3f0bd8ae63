//! Left recursion elimination.
//!
//! Directly left-recursive parser rules are rewritten into a primary block
//! followed by a precedence-guarded loop of operator tails. Mutually
//! left-recursive rule sets cannot be rewritten and are reported instead.

mod detect;
mod rewrite;

#[cfg(test)]
mod rewrite_tests;

use crate::diagnostics::Diagnostics;
use crate::grammar::{Grammar, NodeId, NodeKind};

pub use detect::find_left_recursive_rules;

/// Per-alternative bookkeeping for a rewritten rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftRecursiveRuleAltInfo {
    /// 1-based alternative number in the original rule.
    pub alt: usize,
    /// Rewritten alternative: a primary alt, or a predicate-guarded op tail.
    pub alt_ast: NodeId,
    pub original_alt: NodeId,
    pub precedence: i32,
    /// Precedence passed to the rightmost self reference. Zero for suffix
    /// and primary alternatives.
    pub next_prec: i32,
    /// Label of the stripped leftmost self reference (`e1=e '+' e`).
    pub left_label: Option<String>,
    pub is_list_label: bool,
    pub alt_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftRecursiveRule {
    pub primary_alts: Vec<LeftRecursiveRuleAltInfo>,
    /// Binary alternatives first, then suffix alternatives.
    pub op_alts: Vec<LeftRecursiveRuleAltInfo>,
    pub original_alts: Vec<NodeId>,
    /// Block holding the primary alternatives inside the rewritten body.
    pub primary_block: NodeId,
    /// The `( ... )*` loop around the op alternatives.
    pub op_loop: NodeId,
}

impl LeftRecursiveRule {
    /// Labels of stripped left references, with whether each is a list label.
    pub fn left_labels(&self) -> Vec<(&str, bool)> {
        let mut labels: Vec<(&str, bool)> = Vec::new();
        for info in &self.op_alts {
            if let Some(label) = info.left_label.as_deref()
                && !labels.iter().any(|(l, _)| *l == label)
            {
                labels.push((label, info.is_list_label));
            }
        }
        labels
    }
}

/// Detect and rewrite left-recursive rules in a parser grammar.
///
/// Rules in a mutually left-recursive cycle are reported and left as they
/// are; the caller excludes them from code generation.
pub fn rewrite_left_recursion(grammar: &mut Grammar, diagnostics: &mut Diagnostics) {
    if grammar.is_lexer() {
        return;
    }

    let candidates = find_left_recursive_rules(grammar, diagnostics);
    let mut rewritten = Vec::new();
    for name in candidates {
        if rewrite::rewrite_rule(grammar, &name, diagnostics) {
            log::debug!(target: "antler::leftrec", "rewrote left-recursive rule `{name}`");
            rewritten.push(name);
        }
    }

    if !rewritten.is_empty() {
        set_default_precedence(grammar, &rewritten);
    }
}

/// References to rewritten rules without an explicit precedence start a fresh
/// expression, `expr<p=0>`.
fn set_default_precedence(grammar: &mut Grammar, rewritten: &[String]) {
    let blocks: Vec<NodeId> = grammar.rules.values().map(|r| r.block).collect();
    for block in blocks {
        for id in grammar.ast.descendants(block) {
            let node = grammar.ast.node_mut(id);
            if let NodeKind::RuleRef { precedence, .. } = &mut node.kind
                && precedence.is_none()
                && rewritten.iter().any(|r| r == &node.token.text)
            {
                *precedence = Some(0);
            }
        }
    }
}
