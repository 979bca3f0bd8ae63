//! Left recursion detection over leftmost rule calls.
//!
//! An edge `a -> b` means `a` can invoke `b` before consuming any input.
//! Strongly connected components of that graph are the left-recursive
//! rule sets. Only a rule that reaches itself directly, through the first
//! element of its own top-level alternatives, can be rewritten.

use indexmap::{IndexMap, IndexSet};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::{Grammar, NodeId, NodeKind};
use crate::scc::{SccFinder, is_cycle};

/// Report left-recursive cycles and return the rules that can be rewritten.
pub fn find_left_recursive_rules(grammar: &Grammar, diagnostics: &mut Diagnostics) -> Vec<String> {
    let graph = LeftmostGraph::new(grammar);
    let mut rewritable = Vec::new();

    let mut sccs = graph.find_sccs();
    sccs.sort_by_key(|scc| scc.iter().filter_map(|n| grammar.rule(n)).map(|r| r.index).min());

    for mut scc in sccs {
        scc.sort_by_key(|n| grammar.rule(n).map(|r| r.index));
        if scc.len() > 1 {
            let chain = graph.cycle_chain(&scc);
            let first = &scc[0];
            let range = grammar.rule(first).map(|r| r.range).unwrap_or_default();
            let mut builder = diagnostics
                .report(DiagnosticKind::LeftRecursionCycle, range)
                .message(chain);
            for name in &scc {
                builder = builder.in_rule(name.as_str());
            }
            builder.emit();
            continue;
        }

        let name = &scc[0];
        if !graph.edges.get(name).is_some_and(|e| e.contains(name)) {
            continue;
        }
        if graph.is_directly_left_recursive(name) {
            rewritable.push(name.clone());
        } else {
            let range = grammar.rule(name).map(|r| r.range).unwrap_or_default();
            diagnostics
                .report(DiagnosticKind::LeftRecursionCycle, range)
                .message(format!("{name} -> {name}"))
                .related_to(
                    "left recursion must start a top-level alternative",
                    range,
                )
                .in_rule(name.as_str())
                .emit();
        }
    }

    rewritable
}

struct LeftmostGraph<'a> {
    grammar: &'a Grammar,
    nullable: IndexMap<String, bool>,
    edges: IndexMap<String, IndexSet<String>>,
}

impl<'a> LeftmostGraph<'a> {
    fn new(grammar: &'a Grammar) -> Self {
        let mut graph = Self {
            grammar,
            nullable: IndexMap::new(),
            edges: IndexMap::new(),
        };
        graph.compute_nullable();
        for rule in grammar.rules.values().filter(|r| !r.is_lexer()) {
            let mut refs = IndexSet::new();
            graph.leftmost_refs(rule.block, &mut refs);
            graph.edges.insert(rule.name.clone(), refs);
        }
        graph
    }

    fn compute_nullable(&mut self) {
        for name in self.grammar.rules.keys() {
            self.nullable.insert(name.clone(), false);
        }
        loop {
            let mut changed = false;
            for rule in self.grammar.rules.values() {
                if self.nullable[&rule.name] {
                    continue;
                }
                if self.is_nullable(rule.block) {
                    self.nullable.insert(rule.name.clone(), true);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn is_nullable(&self, id: NodeId) -> bool {
        let ast = &self.grammar.ast;
        let node = ast.node(id);
        match &node.kind {
            NodeKind::Block => node.children.iter().any(|&alt| self.is_nullable(alt)),
            NodeKind::Alt { .. } => node.children.iter().all(|&e| self.is_nullable(e)),
            NodeKind::Optional { .. } | NodeKind::Star { .. } => true,
            NodeKind::Plus { .. } => self.is_nullable(node.children[0]),
            NodeKind::RuleRef { .. } => self.nullable.get(node.text()).copied().unwrap_or(false),
            NodeKind::Action | NodeKind::Predicate { .. } => true,
            NodeKind::Terminal
            | NodeKind::Range
            | NodeKind::Set
            | NodeKind::NotSet
            | NodeKind::CharSet
            | NodeKind::Wildcard => false,
        }
    }

    /// Rules `id` can call before consuming input.
    fn leftmost_refs(&self, id: NodeId, refs: &mut IndexSet<String>) {
        let ast = &self.grammar.ast;
        let node = ast.node(id);
        match &node.kind {
            NodeKind::Block => {
                for &alt in &node.children {
                    self.leftmost_refs(alt, refs);
                }
            }
            NodeKind::Alt { .. } => {
                for &elem in &node.children {
                    self.leftmost_refs(elem, refs);
                    if !self.is_nullable(elem) {
                        break;
                    }
                }
            }
            kind if kind.is_ebnf() => {
                self.leftmost_refs(node.children[0], refs);
            }
            NodeKind::RuleRef { .. } => {
                if self.grammar.rule(node.text()).is_some_and(|r| !r.is_lexer()) {
                    refs.insert(node.text().to_string());
                }
            }
            _ => {}
        }
    }

    /// Leftmost self references occur only as the first element of top-level
    /// alternatives.
    fn is_directly_left_recursive(&self, name: &str) -> bool {
        let Some(rule) = self.grammar.rule(name) else {
            return false;
        };
        let ast = &self.grammar.ast;
        let mut refs = IndexSet::new();
        for &alt in rule.alts(ast) {
            let children = ast.children(alt);
            let starts_with_self = children.first().is_some_and(|&first| {
                let node = ast.node(first);
                matches!(node.kind, NodeKind::RuleRef { .. }) && node.text() == name
            });
            if !starts_with_self {
                self.leftmost_refs(alt, &mut refs);
            }
        }
        !refs.contains(name)
    }

    fn find_sccs(&self) -> Vec<Vec<String>> {
        SccFinder::find(&self.edges)
            .into_iter()
            .filter(|scc| is_cycle(&self.edges, scc))
            .collect()
    }

    /// `a -> b -> a`, following leftmost edges inside the component.
    fn cycle_chain(&self, scc: &[String]) -> String {
        let members: IndexSet<&str> = scc.iter().map(String::as_str).collect();
        let start = scc[0].as_str();

        // Breadth-first search back to `start`, remembering predecessors.
        let mut prev: IndexMap<&str, &str> = IndexMap::new();
        let mut queue = std::collections::VecDeque::from([start]);
        let mut closing = None;
        while let Some(current) = queue.pop_front() {
            let Some(targets) = self.edges.get(current) else {
                continue;
            };
            for target in targets.iter().map(String::as_str) {
                if !members.contains(target) {
                    continue;
                }
                if target == start {
                    closing = Some(current);
                    break;
                }
                if !prev.contains_key(target) {
                    prev.insert(target, current);
                    queue.push_back(target);
                }
            }
            if closing.is_some() {
                break;
            }
        }

        let mut path = vec![start];
        if let Some(mut current) = closing {
            let mut tail = Vec::new();
            while current != start {
                tail.push(current);
                current = prev[current];
            }
            tail.reverse();
            path.extend(tail);
        }
        path.push(start);
        path.join(" -> ")
    }
}
