use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::{
    AltDef, GrammarBuilder, RuleDef, alt, char_set, lit, range, rule_ref, set, star, tok,
};
use crate::test_utils::build_with_diagnostics;

fn messages(diagnostics: &Diagnostics) -> Vec<(DiagnosticKind, String)> {
    diagnostics
        .iter()
        .map(|d| (d.kind(), d.message().to_string()))
        .collect()
}

fn check(builder: GrammarBuilder) -> Diagnostics {
    build_with_diagnostics(builder).1
}

#[test]
fn undefined_rule_names_the_referencing_rule() {
    let diagnostics = check(
        GrammarBuilder::parser("P")
            .tokens(&["A"])
            .rule("s", alt([rule_ref("missing"), tok("A")])),
    );

    assert_eq!(
        messages(&diagnostics),
        vec![(DiagnosticKind::UndefinedRule, "reference to undefined rule `missing`".to_string())]
    );
    let failed: Vec<String> = diagnostics.failed_rules().into_iter().collect();
    assert_eq!(failed, vec!["s"]);
    assert!(!diagnostics.has_grammar_errors());
}

#[test]
fn rule_kind_must_match_grammar_kind() {
    let parser = check(GrammarBuilder::parser("P").rule("ID", lit("x")));
    assert_eq!(
        messages(&parser),
        vec![(DiagnosticKind::LexerRuleInParser, "lexer rule not allowed in parser: ID".to_string())]
    );

    let lexer = check(GrammarBuilder::lexer("L").rule("a", lit("x")));
    assert_eq!(lexer.count(DiagnosticKind::ParserRuleInLexer), 1);
}

#[test]
fn implicit_tokens_and_undefined_literals() {
    let diagnostics = check(GrammarBuilder::parser("P").rule("s", alt([tok("A"), lit("+")])));

    assert_eq!(
        messages(&diagnostics),
        vec![
            (
                DiagnosticKind::ImplicitTokenDefinition,
                "implicit definition of token `A` in parser".to_string()
            ),
            (DiagnosticKind::UndefinedToken, "reference to undefined token `'+'`".to_string()),
        ]
    );
    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.error_count(), 1);
}

#[test]
fn lexer_set_members() {
    let diagnostics = check(
        GrammarBuilder::lexer("L")
            .rule("A", set([lit("ab"), lit("c")]))
            .rule("B", set([tok("A"), lit("d")])),
    );

    assert_eq!(
        messages(&diagnostics),
        vec![
            (
                DiagnosticKind::MultiCharLiteralInLexerSet,
                "multi-character literals are not allowed in lexer sets: 'ab'".to_string()
            ),
            (
                DiagnosticKind::ReferenceInLexerSet,
                "rule reference not supported in a set: A".to_string()
            ),
        ]
    );
}

#[test]
fn ranges() {
    let ok = check(GrammarBuilder::lexer("L").rule("A", range("a", "z")));
    assert!(ok.is_empty());

    let reversed = check(GrammarBuilder::lexer("L").rule("A", range("z", "a")));
    assert_eq!(reversed.count(DiagnosticKind::InvalidRange), 1);

    let wide = check(GrammarBuilder::lexer("L").rule("A", range("ab", "z")));
    assert_eq!(wide.count(DiagnosticKind::InvalidRange), 1);

    let parser = check(GrammarBuilder::parser("P").rule("s", range("a", "z")));
    assert_eq!(parser.count(DiagnosticKind::InvalidRange), 1);
}

#[test]
fn empty_literals_and_char_sets() {
    let diagnostics = check(
        GrammarBuilder::lexer("L")
            .rule("A", lit(""))
            .rule("B", char_set("[]")),
    );

    assert_eq!(diagnostics.count(DiagnosticKind::EmptyLexerLiteral), 2);
    let first = diagnostics.iter().next().map(|d| d.message().to_string());
    assert_eq!(first.as_deref(), Some("string literals and sets cannot be empty"));
}

#[test]
fn char_sets_belong_to_lexer_rules() {
    let diagnostics = check(
        GrammarBuilder::parser("P")
            .tokens(&["A"])
            .rule("s", alt([char_set("a-z"), tok("A")])),
    );

    assert_eq!(
        messages(&diagnostics),
        vec![(
            DiagnosticKind::InvalidCharSet,
            "invalid character set: character sets are not allowed in parser rules".to_string()
        )]
    );
}

#[test]
fn labels_keep_one_element_type() {
    let diagnostics = check(
        GrammarBuilder::parser("P")
            .tokens(&["A"])
            .rule("s", alt([tok("A").label("x"), rule_ref("e").label("x")]))
            .rule("t", alt([tok("A").label("y"), tok("A").label("y")]))
            .rule("u", alt([tok("A").label("z"), tok("A").list_label("z")]))
            .rule("e", tok("A")),
    );

    assert_eq!(diagnostics.count(DiagnosticKind::LabelTypeConflict), 2);
    let failed: Vec<String> = diagnostics.failed_rules().into_iter().collect();
    assert_eq!(failed, vec!["s", "u"]);
}

#[test]
fn lexer_commands() {
    let diagnostics = check(
        GrammarBuilder::lexer("L")
            .channels(&["COMMENTS"])
            .rule_def(RuleDef::new("WS", lit(" ")).command("skip"))
            .rule_def(RuleDef::new("C", lit("#")).command_with("channel", "COMMENTS"))
            .rule_def(RuleDef::new("H", lit("%")).command_with("channel", "HIDDEN"))
            .rule_def(RuleDef::new("D", lit("$")).command_with("channel", "NOPE"))
            .rule_def(RuleDef::new("E", lit("^")).command_with("mode", "INSIDE"))
            .rule_def(RuleDef::new("F", lit("&")).command_with("skip", "1"))
            .rule_def(RuleDef::new("G", lit("*")).command("frob"))
            .rule_def(RuleDef::new("I", lit("!")).command("type")),
    );

    let problems: Vec<String> = diagnostics.iter().map(|d| d.message().to_string()).collect();
    assert_eq!(
        problems,
        vec![
            "invalid lexer command: unknown channel `NOPE`",
            "invalid lexer command: unknown mode `INSIDE`",
            "invalid lexer command: `skip` takes no argument",
            "invalid lexer command: unknown command `frob`",
            "invalid lexer command: `type` requires an argument",
        ]
    );
    let failed: Vec<String> = diagnostics.failed_rules().into_iter().collect();
    assert_eq!(failed, vec!["D", "E", "F", "G", "I"]);
}

#[test]
fn blocks_need_an_alternative() {
    let diagnostics = check(
        GrammarBuilder::parser("P")
            .tokens(&["A"])
            .rule("s", alt([tok("A"), star(Vec::<AltDef>::new())]))
            .rule_def(RuleDef::new("t", Vec::<AltDef>::new()))
            .rule("u", tok("A")),
    );

    assert_eq!(
        messages(&diagnostics),
        vec![
            (DiagnosticKind::EmptyBlock, "block has no alternatives".to_string()),
            (DiagnosticKind::EmptyBlock, "block has no alternatives".to_string()),
        ]
    );
    let failed: Vec<String> = diagnostics.failed_rules().into_iter().collect();
    assert_eq!(failed, vec!["s", "t"]);
    assert!(!diagnostics.has_grammar_errors());
}
