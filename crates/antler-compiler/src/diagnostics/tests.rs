use rowan::TextRange;

use super::*;

fn range(a: u32, b: u32) -> TextRange {
    TextRange::new(a.into(), b.into())
}

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
    insta::assert_snapshot!(format!("{}", Severity::Info), @"info");
}

#[test]
fn severity_orders_by_weight() {
    assert!(Severity::Info < Severity::Warning);
    assert!(Severity::Warning < Severity::Error);
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ReferenceInLexerSet, range(0, 5))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    assert_eq!(
        diagnostics.raw()[0].message(),
        "rule reference not supported in a set"
    );
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedRule, range(0, 5))
        .message("expr")
        .in_rule("stat")
        .emit();

    let msg = &diagnostics.raw()[0];
    assert_eq!(msg.message(), "reference to undefined rule `expr`");
    assert_eq!(msg.kind().category(), Category::Semantic);
    insta::assert_snapshot!(msg.to_string(), @"error at 0..5: reference to undefined rule `expr`");
}

#[test]
fn builder_with_related() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::RuleRedefinition, range(10, 14))
        .message("expr")
        .related_to("first defined here", range(0, 4))
        .emit();

    insta::assert_snapshot!(
        diagnostics.raw()[0].to_string(),
        @"error at 10..14: rule `expr` is already defined (related: first defined here at 0..4)"
    );
}

#[test]
fn warnings_do_not_fail_rules() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::AmbiguousDecision, range(0, 1))
        .in_rule("a")
        .emit();
    diagnostics
        .report(DiagnosticKind::LeftRecursionCycle, range(2, 3))
        .message("b, c")
        .in_rule("b")
        .in_rule("c")
        .emit();

    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.error_count(), 1);
    let failed: Vec<_> = diagnostics.failed_rules().into_iter().collect();
    assert_eq!(failed, vec!["b".to_string(), "c".to_string()]);
    assert!(!diagnostics.has_grammar_errors());
    assert_eq!(diagnostics.worst_severity(), Some(Severity::Error));
}

#[test]
fn grammar_level_errors() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::SyntaxError, range(0, 1))
        .message("mismatched input ';'")
        .emit();

    assert!(diagnostics.has_grammar_errors());
    assert_eq!(diagnostics.raw()[0].message(), "mismatched input ';'");
}

#[test]
fn listener_dispatch_by_severity() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::RuleExcluded, range(0, 1))
        .message("a")
        .emit();
    diagnostics
        .report(DiagnosticKind::ImplicitTokenDefinition, range(0, 1))
        .message("ID")
        .emit();
    diagnostics
        .report(DiagnosticKind::EpsilonToken, range(0, 1))
        .emit();

    let mut listener = CollectingListener::new();
    dispatch(&mut listener, "T", &diagnostics);

    assert_eq!(listener.infos, vec!["T: rule `a` excluded from code generation"]);
    assert_eq!(listener.warnings, vec!["T: implicit definition of token `ID` in parser"]);
    assert_eq!(
        listener.errors,
        vec!["T: non-fragment lexer rule can match the empty string"]
    );
}
