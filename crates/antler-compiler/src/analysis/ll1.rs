//! LL(1) lookahead sets over the ATN.
//!
//! The walk follows epsilon edges, descends into rule calls with a return
//! stack, and pops that stack at rule stop states. When the stack is empty the
//! walk either reports the end (`EPSILON`/`EOF`) or continues through the
//! stop state's follow links, depending on how it was started.

use std::collections::HashSet;

use antler_core::IntervalSet;
use antler_core::token::{EOF, EPSILON, HIT_PRED};

use crate::atn::{Atn, StateId, StateKind, TransitionKind};

/// What an empty return stack means at a rule stop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookContext {
    /// Stop at the rule end and add `EPSILON`.
    RuleEnd,
    /// Keep going through the global follow links of the rule stop state.
    Follow,
}

pub struct Ll1Analyzer<'a> {
    atn: &'a Atn,
}

impl<'a> Ll1Analyzer<'a> {
    pub fn new(atn: &'a Atn) -> Self {
        Self { atn }
    }

    /// One set per outgoing transition of `state`, in transition order.
    ///
    /// An alternative whose set is empty, or that crosses a semantic
    /// predicate, is `None`. Non-greedy decisions are not analyzed.
    pub fn decision_lookahead(&self, state: StateId) -> Vec<Option<IntervalSet>> {
        let decision = self.atn.state(state);
        if decision.non_greedy {
            return vec![None; decision.transitions.len()];
        }
        decision
            .transitions
            .iter()
            .map(|t| {
                let set = self.look(t.target, LookContext::Follow, false, false);
                (!set.is_nil() && !set.contains(HIT_PRED)).then_some(set)
            })
            .collect()
    }

    /// Symbols that can be matched next from `state`.
    ///
    /// With `see_thru_preds` predicates are treated as epsilon edges, otherwise
    /// they add `HIT_PRED`. With `add_eof`, reaching the end of the start
    /// rule under [`LookContext::Follow`] adds `EOF`.
    pub fn look(
        &self,
        state: StateId,
        context: LookContext,
        see_thru_preds: bool,
        add_eof: bool,
    ) -> IntervalSet {
        let mut walk = Walk {
            atn: self.atn,
            context,
            see_thru_preds,
            add_eof,
            set: IntervalSet::new(),
            busy: HashSet::new(),
            called: vec![false; self.atn.rule_to_start.len()],
            stack: Vec::new(),
        };
        walk.visit(state);
        walk.set
    }
}

/// No two alternatives share a symbol and none is unknown.
pub fn disjoint(alts: &[Option<IntervalSet>]) -> bool {
    let mut combined = IntervalSet::new();
    for alt in alts {
        let Some(set) = alt else {
            return false;
        };
        if set.overlaps(&combined) {
            return false;
        }
        combined.add_all(set);
    }
    true
}

struct Walk<'a> {
    atn: &'a Atn,
    context: LookContext,
    see_thru_preds: bool,
    add_eof: bool,
    set: IntervalSet,
    busy: HashSet<(StateId, Vec<StateId>)>,
    /// Rules entered through a call on the current path, by rule index.
    called: Vec<bool>,
    /// Follow states of the calls on the current path; last is innermost.
    stack: Vec<StateId>,
}

impl Walk<'_> {
    fn visit(&mut self, id: StateId) {
        if !self.busy.insert((id, self.stack.clone())) {
            return;
        }
        let atn = self.atn;
        let state = atn.state(id);

        if state.kind == StateKind::RuleStop {
            if let Some(return_state) = self.stack.pop() {
                let caller = atn.state(return_state).rule_index;
                let was_called = caller.map(|r| std::mem::replace(&mut self.called[r], false));
                self.visit(return_state);
                if let (Some(r), Some(flag)) = (caller, was_called) {
                    self.called[r] = flag;
                }
                self.stack.push(return_state);
                return;
            }
            match self.context {
                LookContext::RuleEnd => {
                    self.set.add(EPSILON);
                    return;
                }
                LookContext::Follow if self.add_eof => {
                    self.set.add(EOF);
                    return;
                }
                LookContext::Follow => {}
            }
        }

        for t in &state.transitions {
            match &t.kind {
                TransitionKind::Rule {
                    rule_index, follow, ..
                } => {
                    if self.called[*rule_index] {
                        continue;
                    }
                    self.called[*rule_index] = true;
                    self.stack.push(*follow);
                    self.visit(t.target);
                    self.stack.pop();
                    self.called[*rule_index] = false;
                }
                TransitionKind::Predicate { .. } | TransitionKind::Precedence(_) => {
                    if self.see_thru_preds {
                        self.visit(t.target);
                    } else {
                        self.set.add(HIT_PRED);
                    }
                }
                kind if kind.is_epsilon() => self.visit(t.target),
                TransitionKind::Wildcard => {
                    let (min, max) = atn.vocabulary_bounds();
                    self.set.add_range(min, max);
                }
                TransitionKind::NotSet(set) => {
                    let (min, max) = atn.vocabulary_bounds();
                    self.set.add_all(&set.complement(min, max));
                }
                kind => {
                    if let Some(label) = kind.label() {
                        self.set.add_all(&label);
                    }
                }
            }
        }
    }
}
