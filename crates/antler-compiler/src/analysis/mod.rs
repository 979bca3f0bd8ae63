//! Static lookahead analysis.
//!
//! Parser grammars get one [`DecisionLook`] per ATN decision, stored on the
//! grammar for the output model builder. Lexer grammars are only checked for
//! tokens that can match the empty string.

mod ll1;

#[cfg(test)]
mod ll1_tests;

use antler_core::IntervalSet;
use antler_core::token::EPSILON;

use crate::atn::Atn;
use crate::config::ToolConfig;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::{DecisionLook, Grammar};

pub use ll1::{Ll1Analyzer, LookContext, disjoint};

/// Fill `grammar.decision_look` and report ambiguous decisions.
pub fn analyze(grammar: &mut Grammar, atn: &Atn, config: &ToolConfig, diagnostics: &mut Diagnostics) {
    if grammar.is_lexer() {
        check_epsilon_tokens(grammar, atn, diagnostics);
        return;
    }

    let analyzer = Ll1Analyzer::new(atn);
    let mut table = Vec::with_capacity(atn.num_decisions());
    for (decision, &state) in atn.decision_to_state.iter().enumerate() {
        let alts = analyzer.decision_lookahead(state);
        let expecting = IntervalSet::or(alts.iter().flatten());
        let ll1 = disjoint(&alts);
        log::trace!(
            target: "antler::analysis",
            "decision {decision} (s{state}): {} ll1={ll1}",
            alts.iter()
                .map(|a| a.as_ref().map_or("?".to_string(), |s| s.to_string()))
                .collect::<Vec<_>>()
                .join(" | ")
        );

        if !ll1 && config.report_ambiguities {
            report_ambiguity(grammar, atn, decision, &alts, diagnostics);
        }
        table.push(DecisionLook {
            alts,
            expecting,
            ll1,
        });
    }

    log::debug!(
        target: "antler::analysis",
        "analyzed {} decisions in `{}`, {} LL(1)",
        table.len(),
        grammar.name,
        table.iter().filter(|d| d.ll1).count()
    );
    grammar.decision_look = table;
}

/// Overlapping known sets are resolved in favor of the lowest alternative.
fn report_ambiguity(
    grammar: &Grammar,
    atn: &Atn,
    decision: usize,
    alts: &[Option<IntervalSet>],
    diagnostics: &mut Diagnostics,
) {
    let mut shared = IntervalSet::new();
    let mut involved: Vec<usize> = Vec::new();
    for (i, a) in alts.iter().enumerate() {
        for (j, b) in alts.iter().enumerate().skip(i + 1) {
            let (Some(a), Some(b)) = (a, b) else {
                continue;
            };
            let overlap = a.and(b);
            if overlap.is_nil() {
                continue;
            }
            shared.add_all(&overlap);
            for alt in [i + 1, j + 1] {
                if !involved.contains(&alt) {
                    involved.push(alt);
                }
            }
        }
    }
    if shared.is_nil() {
        return;
    }
    involved.sort_unstable();

    let state = atn.state(atn.decision_to_state[decision]);
    let rule = state.rule_index.and_then(|r| grammar.rule_by_index(r));
    let range = state
        .ast
        .and_then(|id| grammar.ast.get(id))
        .map(|n| n.range())
        .or(rule.map(|r| r.range))
        .unwrap_or_default();
    let alts_text = involved
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let symbols = shared.to_string_with(|t| grammar.vocab.display_name(t));

    let mut builder = diagnostics
        .report(DiagnosticKind::AmbiguousDecision, range)
        .message(format!(
            "decision {decision}, alternatives {alts_text} all match {symbols}; alternative {} is chosen",
            involved[0]
        ));
    if let Some(rule) = rule {
        builder = builder.in_rule(rule.name.as_str());
    }
    builder.emit();
}

/// Non-fragment lexer rules must consume at least one character.
fn check_epsilon_tokens(grammar: &Grammar, atn: &Atn, diagnostics: &mut Diagnostics) {
    let analyzer = Ll1Analyzer::new(atn);
    for rule in grammar.rules.values() {
        if !rule.is_lexer() || rule.fragment || rule.excluded {
            continue;
        }
        let Some(&start) = atn.rule_to_start.get(rule.index) else {
            continue;
        };
        let look = analyzer.look(start, LookContext::RuleEnd, true, false);
        if look.contains(EPSILON) {
            diagnostics
                .report(DiagnosticKind::EpsilonToken, rule.range)
                .message(rule.name.as_str())
                .in_rule(rule.name.as_str())
                .emit();
        }
    }
}
