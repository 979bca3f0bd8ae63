use antler_core::IntervalSet;
use antler_core::token::{EOF, EPSILON};

use super::{Ll1Analyzer, LookContext, disjoint};
use crate::atn::{Atn, build_atn};
use crate::grammar::{GrammarBuilder, alt, lit, opt, pred, rule_ref, star_lazy, tok};
use crate::test_utils::{build, list_grammar};

fn atn_of(builder: GrammarBuilder) -> Atn {
    let mut grammar = build(builder);
    build_atn(&mut grammar)
}

fn decision(atn: &Atn, decision: usize) -> Vec<Option<IntervalSet>> {
    Ll1Analyzer::new(atn).decision_lookahead(atn.decision_to_state[decision])
}

fn set(values: &[i32]) -> Option<IntervalSet> {
    Some(IntervalSet::from_values(values.iter().copied()))
}

#[test]
fn token_alternatives_are_singletons() {
    let atn = atn_of(list_grammar());

    let look = decision(&atn, 1);

    assert_eq!(look, vec![set(&[1]), set(&[2]), set(&[3])]);
    assert!(disjoint(&look));
}

#[test]
fn loop_exit_sees_rule_follow() {
    let atn = atn_of(list_grammar());

    assert_eq!(decision(&atn, 0), vec![set(&[4]), set(&[EOF])]);
}

#[test]
fn optional_bypass_sees_next_element() {
    let atn = atn_of(list_grammar());

    assert_eq!(decision(&atn, 2), vec![set(&[1]), set(&[2])]);
}

#[test]
fn rule_end_follows_every_caller() {
    let atn = atn_of(
        GrammarBuilder::parser("P")
            .tokens(&["B", "C", "D"])
            .rule(
                "s",
                [
                    alt([rule_ref("a"), tok("C")]),
                    alt([rule_ref("a"), tok("D")]),
                ],
            )
            .rule("a", alt([opt(tok("B"))])),
    );

    assert_eq!(decision(&atn, 0), vec![set(&[1, 2]), set(&[1, 3])]);
    assert_eq!(decision(&atn, 1), vec![set(&[1]), set(&[2, 3])]);
    assert!(!disjoint(&decision(&atn, 0)));
}

#[test]
fn predicate_makes_alternative_unknown() {
    let atn = atn_of(
        GrammarBuilder::parser("P")
            .tokens(&["A", "B"])
            .rule("s", [alt([pred("ok()"), tok("A")]), alt([tok("B")])]),
    );

    let look = decision(&atn, 0);

    assert_eq!(look, vec![None, set(&[2])]);
    assert!(!disjoint(&look));
}

#[test]
fn non_greedy_decision_is_not_analyzed() {
    let atn = atn_of(
        GrammarBuilder::parser("P")
            .tokens(&["A", "B"])
            .rule("s", alt([star_lazy(tok("A")), tok("B")])),
    );

    assert_eq!(decision(&atn, 0), vec![None, None]);
}

#[test]
fn recursive_calls_terminate() {
    let atn = atn_of(
        GrammarBuilder::parser("P")
            .tokens(&["X", "Y", "Z"])
            .rule("a", [alt([rule_ref("b"), tok("X")]), alt([tok("Y")])])
            .rule("b", alt([rule_ref("a"), tok("Z")])),
    );

    let look = decision(&atn, 0);

    assert_eq!(look, vec![set(&[2]), set(&[2])]);
}

#[test]
fn rule_end_context_reports_epsilon() {
    let atn = atn_of(
        GrammarBuilder::lexer("L")
            .rule("A", [alt([lit("a")]), alt([rule_ref("F")])])
            .fragment("F", opt(lit("f"))),
    );
    let analyzer = Ll1Analyzer::new(&atn);

    let look = analyzer.look(atn.rule_to_start[0], LookContext::RuleEnd, true, false);

    assert!(look.contains(EPSILON));
    assert!(look.contains('a' as i32));
    assert!(look.contains('f' as i32));
}

#[test]
fn disjoint_requires_known_sets() {
    assert!(disjoint(&[set(&[1]), set(&[2, 3])]));
    assert!(!disjoint(&[set(&[1, 2]), set(&[2])]));
    assert!(!disjoint(&[set(&[1]), None]));
    assert!(disjoint(&[]));
}
