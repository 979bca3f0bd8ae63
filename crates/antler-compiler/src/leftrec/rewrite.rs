//! Precedence-climbing rewrite of one directly left-recursive rule.
//!
//! ```text
//! e : e '*' e | e '+' e | '-' e | INT ;
//! ```
//!
//! becomes
//!
//! ```text
//! e[int _p] : ('-' e<p=2> | INT) ({precpred(_ctx, 4)}? '*' e<p=5> | {precpred(_ctx, 3)}? '+' e<p=4>)* ;
//! ```
//!
//! Original alternatives stay in the arena untouched; the rewritten body is
//! built from copies.

use rowan::TextRange;

use super::{LeftRecursiveRule, LeftRecursiveRuleAltInfo};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::{Assoc, Grammar, GrammarAst, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AltShape {
    Binary,
    Suffix,
    Prefix,
    Other,
}

/// Rewrite `name` in place. Returns false when the rule cannot be rewritten;
/// the reason has been reported.
pub(super) fn rewrite_rule(grammar: &mut Grammar, name: &str, diagnostics: &mut Diagnostics) -> bool {
    let Some(rule) = grammar.rule(name) else {
        return false;
    };
    let rule_range = rule.range;
    let original_alts: Vec<NodeId> = rule.alts(&grammar.ast).to_vec();
    let n = original_alts.len() as i32;

    let mut shapes = Vec::with_capacity(original_alts.len());
    for &alt in &original_alts {
        let Some(shape) = classify(&grammar.ast, alt, name) else {
            diagnostics
                .report(DiagnosticKind::LeftRecursionCycle, grammar.ast.node(alt).range())
                .message(format!("{name} -> {name}"))
                .related_to("alternative consists only of a self reference", rule_range)
                .in_rule(name)
                .emit();
            return false;
        };
        shapes.push(shape);
    }

    if !shapes
        .iter()
        .any(|s| matches!(s, AltShape::Prefix | AltShape::Other))
    {
        diagnostics
            .report(DiagnosticKind::NoNonLeftRecursiveAlts, rule_range)
            .message(name)
            .in_rule(name)
            .emit();
        return false;
    }

    let ast = &mut grammar.ast;
    let mut primary_alts = Vec::new();
    let mut binary_alts = Vec::new();
    let mut suffix_alts = Vec::new();

    for (i, (&original, &shape)) in original_alts.iter().zip(&shapes).enumerate() {
        let precedence = n - i as i32;
        let (label, assoc) = match &ast.node(original).kind {
            NodeKind::Alt { label, assoc } => (label.clone(), *assoc),
            _ => (None, Assoc::Left),
        };
        let copy = ast.duplicate(original);

        let mut info = LeftRecursiveRuleAltInfo {
            alt: i + 1,
            alt_ast: copy,
            original_alt: original,
            precedence,
            next_prec: 0,
            left_label: None,
            is_list_label: false,
            alt_label: label.clone(),
        };

        match shape {
            AltShape::Binary => {
                strip_left_recursion(ast, &mut info);
                info.next_prec = if assoc == Assoc::Right {
                    precedence
                } else {
                    precedence + 1
                };
                set_rightmost_precedence(ast, copy, name, info.next_prec);
                info.alt_ast = guard_with_precedence(ast, copy, precedence);
                binary_alts.push(info);
            }
            AltShape::Suffix => {
                strip_left_recursion(ast, &mut info);
                info.alt_ast = guard_with_precedence(ast, copy, precedence);
                suffix_alts.push(info);
            }
            AltShape::Prefix => {
                info.next_prec = precedence;
                set_rightmost_precedence(ast, copy, name, precedence);
                primary_alts.push(info);
            }
            AltShape::Other => primary_alts.push(info),
        }
    }

    let range = rule_range;
    let primary_block = ast.add_with_children(
        NodeKind::Block,
        "(",
        range,
        primary_alts.iter().map(|a| a.alt_ast).collect(),
    );
    let op_alts: Vec<LeftRecursiveRuleAltInfo> =
        binary_alts.into_iter().chain(suffix_alts).collect();
    let op_block = ast.add_with_children(
        NodeKind::Block,
        "(",
        range,
        op_alts.iter().map(|a| a.alt_ast).collect(),
    );
    let op_loop =
        ast.add_with_children(NodeKind::Star { greedy: true }, "*", range, vec![op_block]);
    let outer_alt = ast.add_with_children(
        NodeKind::Alt {
            label: None,
            assoc: Assoc::Left,
        },
        "ALT",
        range,
        vec![primary_block, op_loop],
    );
    let body = ast.add_with_children(NodeKind::Block, "(", range, vec![outer_alt]);

    log::debug!(
        target: "antler::leftrec",
        "`{name}`: {} primary, {} op alternatives",
        primary_alts.len(),
        op_alts.len()
    );

    let Some(rule) = grammar.rule_mut(name) else {
        return false;
    };
    rule.block = body;
    rule.args = Some(match rule.args.take() {
        Some(args) => format!("{args}, int _p"),
        None => "int _p".to_string(),
    });
    rule.left_recursive = Some(LeftRecursiveRule {
        primary_alts,
        op_alts,
        original_alts,
        primary_block,
        op_loop,
    });
    true
}

fn is_self_ref(ast: &GrammarAst, id: NodeId, name: &str) -> bool {
    let node = ast.node(id);
    matches!(node.kind, NodeKind::RuleRef { .. }) && node.text() == name
}

/// `None` for an alternative that is nothing but a self reference.
fn classify(ast: &GrammarAst, alt: NodeId, name: &str) -> Option<AltShape> {
    let elems = ast.children(alt);
    // Trailing actions do not count when looking for the last element.
    let last = elems
        .iter()
        .rposition(|&e| ast.node(e).kind != NodeKind::Action);
    let first_self = elems.first().is_some_and(|&e| is_self_ref(ast, e, name));
    let last_self = last.is_some_and(|i| is_self_ref(ast, elems[i], name));

    match (first_self, last_self, last) {
        (true, true, Some(0)) => None,
        (true, true, _) => Some(AltShape::Binary),
        (true, false, _) => Some(AltShape::Suffix),
        (false, true, _) => Some(AltShape::Prefix),
        (false, false, _) => Some(AltShape::Other),
    }
}

/// Remove the leftmost self reference, keeping its label in `info`.
fn strip_left_recursion(ast: &mut GrammarAst, info: &mut LeftRecursiveRuleAltInfo) {
    let alt = info.alt_ast;
    let first = ast.children(alt)[0];
    if let Some(label) = &ast.node(first).label {
        info.left_label = Some(label.name.clone());
        info.is_list_label = label.list;
    }
    ast.node_mut(alt).children.remove(0);
}

/// The last rule reference in the alternative, in preorder, gets `prec`
/// when it refers back to the rule.
fn set_rightmost_precedence(ast: &mut GrammarAst, alt: NodeId, name: &str, prec: i32) {
    let Some(last) = ast
        .descendants(alt)
        .into_iter()
        .rev()
        .find(|&id| matches!(ast.node(id).kind, NodeKind::RuleRef { .. }))
    else {
        return;
    };
    if !is_self_ref(ast, last, name) {
        return;
    }
    if let NodeKind::RuleRef { precedence, .. } = &mut ast.node_mut(last).kind {
        *precedence = Some(prec);
    }
}

/// Prefix the op tail with `{precpred(_ctx, p)}?`.
fn guard_with_precedence(ast: &mut GrammarAst, alt: NodeId, precedence: i32) -> NodeId {
    let range = ast
        .children(alt)
        .first()
        .map(|&e| ast.node(e).range())
        .unwrap_or_else(|| ast.node(alt).range());
    let pred = ast.add(
        NodeKind::Predicate {
            precedence: Some(precedence),
        },
        format!("precpred(_ctx, {precedence})"),
        TextRange::empty(range.start()),
    );
    ast.node_mut(alt).children.insert(0, pred);
    alt
}
