use indoc::indoc;

use super::rewrite_left_recursion;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::{Grammar, GrammarBuilder, action, alt, rule_ref, tok};
use crate::test_utils::{build, expr_grammar};

fn rewrite(builder: GrammarBuilder) -> (Grammar, Diagnostics) {
    let mut grammar = build(builder);
    let mut diagnostics = Diagnostics::new();
    rewrite_left_recursion(&mut grammar, &mut diagnostics);
    (grammar, diagnostics)
}

#[test]
fn binary_prefix_and_primary_alternatives() {
    let (grammar, diagnostics) = rewrite(expr_grammar());

    assert!(diagnostics.is_empty());
    assert_eq!(
        grammar.dump(),
        indoc! {"
            s : e<p=0> EOF ;
            e[int _p] : (SUB e<p=4> #Neg | LPAREN e<p=0> RPAREN #Parens | INT #Int | ID #Id) ({precpred(_ctx, 6)}? MUL e<p=7> #Mul | {precpred(_ctx, 5)}? ADD e<p=6> #Add)* ;
        "}
    );
}

#[test]
fn alt_infos_record_precedence() {
    let (grammar, _) = rewrite(expr_grammar());
    let lr = grammar.rule("e").unwrap().left_recursive.as_ref().unwrap();

    let primary: Vec<(usize, i32, i32)> = lr
        .primary_alts
        .iter()
        .map(|a| (a.alt, a.precedence, a.next_prec))
        .collect();
    assert_eq!(primary, vec![(3, 4, 4), (4, 3, 0), (5, 2, 0), (6, 1, 0)]);

    let ops: Vec<(usize, i32, i32, Option<&str>)> = lr
        .op_alts
        .iter()
        .map(|a| (a.alt, a.precedence, a.next_prec, a.alt_label.as_deref()))
        .collect();
    assert_eq!(ops, vec![(1, 6, 7, Some("Mul")), (2, 5, 6, Some("Add"))]);
    assert_eq!(lr.original_alts.len(), 6);
}

#[test]
fn original_alternatives_are_untouched() {
    let (grammar, _) = rewrite(expr_grammar());
    let rule = grammar.rule("e").unwrap();

    let original: Vec<String> = rule
        .original_alts(&grammar.ast)
        .iter()
        .map(|&a| grammar.ast.render(a))
        .collect();
    assert_eq!(original[0], "e MUL e #Mul");
    assert_eq!(original[2], "SUB e #Neg");
    assert_eq!(rule.alt_labels(&grammar.ast).len(), 6);
}

#[test]
fn right_associative_binary_keeps_precedence() {
    let (grammar, _) = rewrite(
        GrammarBuilder::parser("P").tokens(&["POW", "INT"]).rule(
            "e",
            [
                alt([rule_ref("e"), tok("POW"), rule_ref("e")]).right(),
                alt([tok("INT")]),
            ],
        ),
    );

    assert_eq!(
        grammar.dump(),
        "e[int _p] : (INT) (<assoc=right> {precpred(_ctx, 2)}? POW e<p=2>)* ;\n"
    );
}

#[test]
fn suffix_alternatives_follow_binary_ones() {
    let (grammar, _) = rewrite(
        GrammarBuilder::parser("P")
            .tokens(&["INC", "ADD", "LBRACK", "RBRACK", "ID"])
            .rule(
                "e",
                [
                    alt([rule_ref("e"), tok("INC")]),
                    alt([rule_ref("e"), tok("LBRACK"), rule_ref("e"), tok("RBRACK")]),
                    alt([rule_ref("e"), tok("ADD"), rule_ref("e")]),
                    alt([tok("ID")]),
                ],
            ),
    );

    assert_eq!(
        grammar.dump(),
        "e[int _p] : (ID) ({precpred(_ctx, 2)}? ADD e<p=3> | {precpred(_ctx, 4)}? INC | {precpred(_ctx, 3)}? LBRACK e<p=0> RBRACK)* ;\n"
    );
}

#[test]
fn left_label_is_recorded_and_stripped() {
    let (grammar, _) = rewrite(
        GrammarBuilder::parser("P").tokens(&["ADD", "INT"]).rule(
            "e",
            [
                alt([
                    rule_ref("e").label("lhs"),
                    tok("ADD"),
                    rule_ref("e").label("rhs"),
                ])
                .label("Add"),
                alt([tok("INT")]).label("Int"),
            ],
        ),
    );
    let lr = grammar.rule("e").unwrap().left_recursive.as_ref().unwrap();

    assert_eq!(lr.op_alts[0].left_label.as_deref(), Some("lhs"));
    assert!(!lr.op_alts[0].is_list_label);
    assert_eq!(lr.left_labels(), vec![("lhs", false)]);
    assert_eq!(
        grammar.ast.render(lr.op_alts[0].alt_ast),
        "{precpred(_ctx, 2)}? ADD rhs=e<p=3> #Add"
    );
}

#[test]
fn trailing_action_does_not_hide_recursion() {
    let (grammar, _) = rewrite(
        GrammarBuilder::parser("P").tokens(&["ADD", "INT"]).rule(
            "e",
            [
                alt([rule_ref("e"), tok("ADD"), rule_ref("e"), action("add()")]),
                alt([tok("INT")]),
            ],
        ),
    );
    let lr = grammar.rule("e").unwrap().left_recursive.as_ref().unwrap();

    assert_eq!(lr.op_alts.len(), 1);
    assert_eq!(
        grammar.ast.render(lr.op_alts[0].alt_ast),
        "{precpred(_ctx, 2)}? ADD e<p=3> {add()}"
    );
}

#[test]
fn existing_arguments_are_kept() {
    let (grammar, _) = rewrite(
        GrammarBuilder::parser("P").tokens(&["ADD", "INT"]).rule_def(
            crate::grammar::RuleDef::new(
                "e",
                [
                    alt([rule_ref("e"), tok("ADD"), rule_ref("e")]),
                    alt([tok("INT")]),
                ],
            )
            .args("bool strict"),
        ),
    );

    assert_eq!(
        grammar.rule("e").unwrap().args.as_deref(),
        Some("bool strict, int _p")
    );
}

#[test]
fn rule_without_primary_alternative() {
    let (grammar, diagnostics) = rewrite(
        GrammarBuilder::parser("P")
            .tokens(&["ADD"])
            .rule("e", alt([rule_ref("e"), tok("ADD"), rule_ref("e")])),
    );

    assert_eq!(diagnostics.count(DiagnosticKind::NoNonLeftRecursiveAlts), 1);
    assert!(!grammar.rule("e").unwrap().is_left_recursive());
}

#[test]
fn lone_self_reference_is_a_cycle() {
    let (_, diagnostics) = rewrite(
        GrammarBuilder::parser("P")
            .tokens(&["INT"])
            .rule("e", [alt([rule_ref("e")]), alt([tok("INT")])]),
    );

    assert_eq!(diagnostics.count(DiagnosticKind::LeftRecursionCycle), 1);
}
