//! Context getters from element frequencies.
//!
//! Each alternative is summarized by two counts per element name: the most
//! times it can occur (clipped at 2) and the fewest times it must occur.
//! An element seen twice in any alternative gets list getters; otherwise it
//! gets a single getter, optional unless every alternative requires it.

use antler_core::utils::context_name;
use indexmap::{IndexMap, IndexSet};

use super::model::Decl;
use crate::grammar::{Grammar, NodeId, NodeKind};

type Freq = IndexMap<String, u32>;

#[derive(Debug, Default, Clone)]
struct Counts {
    min: Freq,
    max: Freq,
}

impl Counts {
    fn one(name: String) -> Self {
        Self {
            min: IndexMap::from([(name.clone(), 1)]),
            max: IndexMap::from([(name, 1)]),
        }
    }

    /// Sequence: counts add up.
    fn then(mut self, other: Counts) -> Self {
        for (name, n) in other.max {
            let e = self.max.entry(name).or_default();
            *e = (*e + n).min(2);
        }
        for (name, n) in other.min {
            let e = self.min.entry(name).or_default();
            *e = (*e + n).min(2);
        }
        self
    }

    /// Alternation: most of the maxima, least of the minima.
    fn or(self, other: Counts) -> Self {
        let mut max = self.max;
        for (name, n) in other.max {
            let e = max.entry(name).or_default();
            *e = (*e).max(n);
        }
        let mut min = Freq::new();
        for name in self.min.keys().chain(other.min.keys()) {
            let a = self.min.get(name).copied().unwrap_or(0);
            let b = other.min.get(name).copied().unwrap_or(0);
            min.insert(name.clone(), a.min(b));
        }
        Self { min, max }
    }
}

/// Getter name of a rule reference or token reference. Literals only count
/// when a named token claims them.
pub(crate) fn element_name(grammar: &Grammar, id: NodeId) -> Option<String> {
    let node = grammar.ast.node(id);
    match node.kind {
        NodeKind::RuleRef { .. } => Some(node.text().to_string()),
        NodeKind::Terminal if node.is_literal() => {
            let ttype = grammar.token_type(node.text())?;
            let name = grammar.vocab.symbolic_name(ttype)?;
            (!name.starts_with("T__")).then(|| name.to_string())
        }
        NodeKind::Terminal => Some(node.text().to_string()),
        _ => None,
    }
}

fn counts(grammar: &Grammar, id: NodeId) -> Counts {
    let node = grammar.ast.node(id);
    let children = grammar.ast.children(id);
    match node.kind {
        NodeKind::Terminal | NodeKind::RuleRef { .. } => {
            element_name(grammar, id).map(Counts::one).unwrap_or_default()
        }
        NodeKind::Alt { .. } => children
            .iter()
            .fold(Counts::default(), |acc, &c| acc.then(counts(grammar, c))),
        NodeKind::Block | NodeKind::Set => alternatives(grammar, children),
        NodeKind::Optional { .. } => {
            let mut inner = alternatives(grammar, children);
            inner.min.clear();
            inner
        }
        NodeKind::Star { .. } | NodeKind::Plus { .. } => {
            let mut inner = alternatives(grammar, children);
            inner.max.values_mut().for_each(|n| *n = 2);
            if matches!(node.kind, NodeKind::Star { .. }) {
                inner.min.clear();
            }
            inner
        }
        _ => Counts::default(),
    }
}

fn alternatives(grammar: &Grammar, ids: &[NodeId]) -> Counts {
    let mut it = ids.iter().map(|&id| counts(grammar, id));
    let first = it.next().unwrap_or_default();
    it.fold(first, Counts::or)
}

/// Element references of an alternative in source order, skipping the
/// members of negated sets.
fn references(grammar: &Grammar, alt: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![alt];
    while let Some(id) = stack.pop() {
        let node = grammar.ast.node(id);
        match node.kind {
            NodeKind::Terminal | NodeKind::RuleRef { .. } => out.push(id),
            NodeKind::NotSet => {}
            _ => stack.extend(node.children.iter().rev()),
        }
    }
    out
}

/// Getters for a context shared by `alts`.
pub fn getters_for_alts(grammar: &Grammar, alts: &[NodeId]) -> Vec<Decl> {
    let mut needs_list: IndexSet<String> = IndexSet::new();
    let mut required: IndexSet<String> = IndexSet::new();

    for (i, &alt) in alts.iter().enumerate() {
        let freq = counts(grammar, alt);
        for id in references(grammar, alt) {
            let Some(name) = element_name(grammar, id) else {
                continue;
            };
            if freq.max.get(&name).copied().unwrap_or(0) > 1 {
                needs_list.insert(name.clone());
            }
            if i == 0 && freq.min.get(&name).copied().unwrap_or(0) != 0 {
                required.insert(name);
            }
        }
        required.retain(|name| freq.min.get(name).copied().unwrap_or(0) != 0);
    }

    let mut decls: Vec<Decl> = Vec::new();
    for &alt in alts {
        for id in references(grammar, alt) {
            let Some(name) = element_name(grammar, id) else {
                continue;
            };
            let list = needs_list.contains(&name);
            let optional = !required.contains(&name);
            for decl in getter_decls(grammar, id, name, list, optional) {
                super::model::add_unique(&mut decls, decl);
            }
        }
    }
    decls
}

fn getter_decls(grammar: &Grammar, id: NodeId, name: String, list: bool, optional: bool) -> Vec<Decl> {
    let is_rule = matches!(grammar.ast.node(id).kind, NodeKind::RuleRef { .. });
    match (is_rule, list) {
        (true, true) => {
            let ctx_name = context_name(&name);
            vec![
                Decl::ContextRuleListGetter {
                    name: name.clone(),
                    ctx_name: ctx_name.clone(),
                    signature: false,
                },
                Decl::ContextRuleListIndexedGetter {
                    name,
                    ctx_name,
                    signature: false,
                },
            ]
        }
        (true, false) => vec![Decl::ContextRuleGetter {
            ctx_name: context_name(&name),
            name,
            optional,
            signature: false,
        }],
        (false, true) => vec![
            Decl::ContextTokenListGetter {
                name: name.clone(),
                signature: false,
            },
            Decl::ContextTokenListIndexedGetter {
                name,
                signature: false,
            },
        ],
        (false, false) => vec![Decl::ContextTokenGetter {
            name,
            optional,
            signature: false,
        }],
    }
}
