use indoc::indoc;

use super::{
    GrammarBuilder, GrammarKind, NodeKind, RuleDef, RuleKind, action, alt, char_set, lit, not,
    opt_lazy, plus, pred, range, rule_ref, set, star, tok, wildcard,
};
use crate::diagnostics::DiagnosticKind;

#[test]
fn rules_keep_definition_order() {
    let (grammar, diagnostics) = GrammarBuilder::parser("P")
        .tokens(&["A", "B"])
        .rule("s", alt([rule_ref("e").label("x"), tok("A")]))
        .rule(
            "e",
            [
                alt([tok("B")]).label("Bee"),
                alt([lit("+"), rule_ref("e").args("1")]),
            ],
        )
        .build();

    assert!(diagnostics.is_empty());
    assert_eq!(grammar.kind, GrammarKind::Parser);
    assert_eq!(grammar.rule_names(), vec!["s", "e"]);
    assert_eq!(grammar.rule("e").map(|r| r.index), Some(1));
    assert_eq!(grammar.rule_by_index(0).map(|r| r.kind), Some(RuleKind::Parser));
    assert_eq!(
        grammar.dump(),
        indoc! {"
            s : x=e A ;
            e : B #Bee | '+' e[1] ;
        "}
    );
}

#[test]
fn element_notation() {
    let (grammar, _) = GrammarBuilder::parser("P")
        .rule(
            "s",
            alt([
                star(alt([tok("A")])),
                opt_lazy(alt([tok("B")])),
                plus([alt([tok("A")]), alt([tok("B")])]),
                not(tok("A")),
                wildcard().list_label("w"),
                action("go()"),
                pred("ok()"),
            ]),
        )
        .build();

    assert_eq!(
        grammar.dump(),
        "s : (A)* (B)?? (A | B)+ ~A w+=. {go()} {ok()}? ;\n"
    );
}

#[test]
fn lexer_elements_and_modes() {
    let (grammar, _) = GrammarBuilder::lexer("L")
        .rule("A", char_set("a-z"))
        .rule("B", alt([tok("A"), lit("b")]))
        .fragment("D", range("0", "9"))
        .mode("INSIDE")
        .rule("C", set([lit("c"), lit("d")]))
        .build();

    assert_eq!(
        grammar.dump(),
        indoc! {"
            A : [a-z] ;
            B : A 'b' ;
            D : '0'..'9' ;
            C : ('c' | 'd') ;
        "}
    );
    assert_eq!(grammar.modes, vec!["DEFAULT_MODE", "INSIDE"]);

    let mode = |name: &str| grammar.rule(name).map(|r| r.mode.as_str());
    assert_eq!(mode("A"), Some("DEFAULT_MODE"));
    assert_eq!(mode("C"), Some("INSIDE"));
    assert_eq!(grammar.rule("D").map(|r| r.fragment), Some(true));

    let b = grammar.rule("B").expect("rule B");
    let first = grammar.ast.children(b.alts(&grammar.ast)[0])[0];
    assert!(matches!(grammar.ast.node(first).kind, NodeKind::RuleRef { .. }));
}

#[test]
fn token_names_in_parser_rules_are_terminals() {
    let (grammar, _) = GrammarBuilder::parser("P").rule("s", rule_ref("ID")).build();

    let s = grammar.rule("s").expect("rule s");
    let elem = grammar.ast.children(s.alts(&grammar.ast)[0])[0];
    let node = grammar.ast.node(elem);
    assert_eq!(node.kind, NodeKind::Terminal);
    assert!(node.is_token_ref());
}

#[test]
fn redefinition_keeps_the_first_rule() {
    let (grammar, diagnostics) = GrammarBuilder::parser("P")
        .tokens(&["A", "B"])
        .rule("s", tok("A"))
        .rule("s", tok("B"))
        .build();

    assert_eq!(grammar.dump(), "s : A ;\n");
    let diagnostic = diagnostics.iter().next().expect("redefinition");
    assert_eq!(diagnostic.kind(), DiagnosticKind::RuleRedefinition);
    assert_eq!(diagnostic.message(), "rule `s` is already defined");
    assert_eq!(diagnostic.rules(), ["s"]);

    let related = &diagnostic.related()[0];
    assert_eq!(related.message(), "first defined here");
    assert_eq!(Some(related.range()), grammar.rule("s").map(|r| r.range));
    assert!(related.range().start() < diagnostic.range().start());
}

#[test]
fn syntax_errors_pass_through() {
    let (_, diagnostics) = GrammarBuilder::combined("G")
        .syntax_error("missing ';' at 'b'")
        .build();

    let diagnostic = diagnostics.iter().next().expect("syntax error");
    assert_eq!(diagnostic.kind(), DiagnosticKind::SyntaxError);
    assert_eq!(diagnostic.message(), "missing ';' at 'b'");
    assert!(diagnostic.rules().is_empty());
    assert!(diagnostics.has_grammar_errors());
}

#[test]
fn declarations_get_increasing_ranges() {
    let (grammar, _) = GrammarBuilder::parser("P")
        .tokens(&["A", "B"])
        .import("Base")
        .rule("s", tok("A"))
        .build();

    let starts = [
        grammar.range.start(),
        grammar.tokens[0].1.start(),
        grammar.tokens[1].1.start(),
        grammar.imports[0].1.start(),
        grammar.rules["s"].range.start(),
    ];
    assert!(starts.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(grammar.imports[0].0, "Base");
}

#[test]
fn rule_definitions_carry_their_extras() {
    let (grammar, _) = GrammarBuilder::parser("P")
        .tokens(&["A"])
        .rule_def(
            RuleDef::new("s", tok("A"))
                .args("int n")
                .returns("int r")
                .locals("int i = 0")
                .catch("Exception e", "recover();")
                .finally("done();"),
        )
        .build();

    let s = grammar.rule("s").expect("rule s");
    assert_eq!(s.args.as_deref(), Some("int n"));
    assert_eq!(s.returns.as_deref(), Some("int r"));
    assert_eq!(s.locals.as_deref(), Some("int i = 0"));
    assert_eq!(s.exceptions[0].catch_arg, "Exception e");
    assert_eq!(s.exceptions[0].action, "recover();");
    assert_eq!(s.finally_action.as_deref(), Some("done();"));
    assert_eq!(grammar.dump(), "s[int n] : A ;\n");
}

#[test]
fn lexer_commands_are_recorded_in_order() {
    let (grammar, _) = GrammarBuilder::lexer("L")
        .channels(&["COMMENTS"])
        .rule_def(
            RuleDef::new("C", lit("#"))
                .command_with("channel", "COMMENTS")
                .command("more"),
        )
        .build();

    let commands: Vec<(&str, Option<&str>)> = grammar.rules["C"]
        .commands
        .iter()
        .map(|c| (c.name.as_str(), c.arg.as_deref()))
        .collect();
    assert_eq!(commands, vec![("channel", Some("COMMENTS")), ("more", None)]);
    assert_eq!(grammar.channels, vec!["COMMENTS"]);
    assert_eq!(grammar.channel_value("COMMENTS"), Some(2));
}
