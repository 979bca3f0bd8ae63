//! Structural consistency checks on a built ATN.

use super::{Atn, StateKind, TransitionKind};
use crate::grammar::Grammar;
use crate::{Error, Result};

/// Check that `atn` is internally consistent and agrees with the AST stamps
/// in `grammar`. Any failure is a bug in the factory, not in the grammar.
pub fn verify(atn: &Atn, grammar: &Grammar) -> Result<()> {
    let fail = |detail: String| Error::InternalInconsistency {
        grammar: grammar.name.clone(),
        detail,
    };
    let in_range = |id: u32| (id as usize) < atn.len();

    for (i, state) in atn.states.iter().enumerate() {
        if state.number as usize != i {
            return Err(fail(format!("state at {i} is numbered {}", state.number)));
        }
        for t in &state.transitions {
            if !in_range(t.target) {
                return Err(fail(format!("s{i} targets missing state s{}", t.target)));
            }
            if let TransitionKind::Rule {
                rule_index, follow, ..
            } = t.kind
            {
                if !in_range(follow) {
                    return Err(fail(format!("s{i} follows to missing state s{follow}")));
                }
                if atn.rule_to_start.get(rule_index) != Some(&t.target) {
                    return Err(fail(format!(
                        "s{i} calls rule {rule_index} but targets s{}",
                        t.target
                    )));
                }
            }
        }
        for link in [state.end_state, state.start_state, state.loop_back]
            .into_iter()
            .flatten()
        {
            if !in_range(link) {
                return Err(fail(format!("s{i} links to missing state s{link}")));
            }
        }

        match state.kind {
            StateKind::BlockStart(_) => {
                let Some(end) = state.end_state else {
                    return Err(fail(format!("block start s{i} has no end")));
                };
                let end_state = atn.state(end);
                if end_state.kind != StateKind::BlockEnd || end_state.start_state != Some(state.number) {
                    return Err(fail(format!("block start s{i} and s{end} are not paired")));
                }
            }
            StateKind::StarLoopEntry | StateKind::PlusLoopBack if !state.is_decision() => {
                return Err(fail(format!("loop state s{i} is not a decision")));
            }
            StateKind::StarLoopEntry | StateKind::LoopEnd if state.loop_back.is_none() => {
                return Err(fail(format!("s{i} has no loop-back state")));
            }
            _ => {}
        }

        if let Some(decision) = state.decision
            && atn.decision_to_state.get(decision) != Some(&state.number)
        {
            return Err(fail(format!("s{i} claims decision {decision}")));
        }
    }

    for (decision, &id) in atn.decision_to_state.iter().enumerate() {
        if atn.get(id).and_then(|s| s.decision) != Some(decision) {
            return Err(fail(format!("decision {decision} maps to s{id}")));
        }
    }

    if atn.rule_to_start.len() != grammar.rules.len() || atn.rule_to_stop.len() != grammar.rules.len() {
        return Err(fail("rule start and stop tables do not cover every rule".to_string()));
    }
    for (index, (&start, &stop)) in atn.rule_to_start.iter().zip(&atn.rule_to_stop).enumerate() {
        let start_state = atn.state(start);
        if start_state.kind != StateKind::RuleStart || start_state.end_state != Some(stop) {
            return Err(fail(format!("rule {index} start s{start} is not paired with s{stop}")));
        }
        if atn.state(stop).kind != StateKind::RuleStop {
            return Err(fail(format!("rule {index} stop s{stop} is not a stop state")));
        }
    }

    for rule in grammar.rules.values() {
        for id in grammar.ast.descendants(rule.block) {
            if let Some(state) = grammar.ast.node(id).atn_state
                && !in_range(state)
            {
                return Err(fail(format!(
                    "node `{}` in rule `{}` is stamped with missing state s{state}",
                    grammar.ast.render(id),
                    rule.name
                )));
            }
        }
    }

    Ok(())
}
