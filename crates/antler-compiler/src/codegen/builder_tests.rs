use antler_core::IntervalSet;

use super::ModelRef;
use super::model::{
    AddToLabelList, CaptureNextTokenType, Choice, ChoiceKind, Decl, Op, RecognitionErrorKind,
    RuleFunction, RuleSempredFunction,
};
use crate::atn::{BlockKind, StateKind};
use crate::config::ToolConfig;
use crate::grammar::{
    GrammarBuilder, RuleDef, action, alt, lit, plus, pred, rule_ref, star_lazy, tok,
};
use crate::test_utils::{compile, compile_with, expr_grammar, list_grammar, outline};
use crate::tool::CompiledGrammar;

fn func<'a>(compiled: &'a CompiledGrammar, rule: &str) -> &'a RuleFunction {
    let parser = &compiled.file.as_parser().expect("parser file").parser;
    parser.func(rule).expect("rule function")
}

fn code(func: &RuleFunction) -> String {
    outline(func.code.iter().map(ModelRef::from))
}

/// The first choice of the rule's single outermost alternative.
fn first_choice(func: &RuleFunction) -> &Choice {
    let [Op::CodeBlock(outer)] = func.code.as_slice() else {
        panic!("expected one outermost alternative: {:#?}", func.code);
    };
    outer
        .ops
        .iter()
        .find_map(|op| match op {
            Op::Choice(choice) => Some(choice.as_ref()),
            _ => None,
        })
        .expect("choice")
}

fn strings(groups: &[&[&str]]) -> Vec<Vec<String>> {
    groups
        .iter()
        .map(|g| g.iter().map(|s| s.to_string()).collect())
        .collect()
}

#[test]
fn disjoint_alternatives_are_ll1() {
    let compiled = compile(
        GrammarBuilder::combined("G").rule("s", [alt([lit("a")]), alt([lit("b")]), alt([lit("c")])]),
    );
    let s = func(&compiled, "s");

    insta::assert_snapshot!(code(s), @r"
    Ll1AltBlock
      CodeBlockForOuterMostAlt
        MatchToken T__0
      CodeBlockForOuterMostAlt
        MatchToken T__1
      CodeBlockForOuterMostAlt
        MatchToken T__2
      ThrowNoViableAlt
    ");

    let [Op::Choice(choice)] = s.code.as_slice() else {
        panic!("expected a choice");
    };
    let ChoiceKind::Ll1AltBlock { alt_look, error } = &choice.kind else {
        panic!("expected an LL(1) block, got {}", choice.kind.name());
    };
    assert_eq!(alt_look, &strings(&[&["T__0"], &["T__1"], &["T__2"]]));
    assert_eq!(error.kind, RecognitionErrorKind::NoViableAlt);
    assert_eq!(error.expecting, Some(IntervalSet::of_range(1, 3)));
    let nums: Vec<Option<usize>> = choice.alts.iter().map(|a| a.alt_num).collect();
    assert_eq!(nums, vec![Some(1), Some(2), Some(3)]);
    assert!(!s.has_lookahead_block);
}

#[test]
fn star_loop_over_a_single_alternative() {
    let compiled = compile(list_grammar());
    let list = func(&compiled, "list");

    insta::assert_snapshot!(code(list), @r"
    CodeBlockForOuterMostAlt
      InvokeRule item
      Ll1StarBlockSingleAlt
        CodeBlockForAlt
          MatchToken COMMA
          InvokeRule item
        CaptureNextTokenType
        CaptureNextTokenType
        TestSetInline
          Bitset
    ");

    let choice = first_choice(list);
    assert_eq!(choice.decision, 0);
    assert_eq!(compiled.atn.state(choice.state_number).kind, StateKind::StarLoopEntry);
    let looping = choice.kind.looping().expect("loop");
    assert_eq!(looping.loop_entry_state, choice.state_number);
    assert_eq!(compiled.atn.state(looping.loop_back_state).kind, StateKind::StarLoopBack);
    assert_eq!(looping.exit_alt, 2);
    let ChoiceKind::Ll1StarBlockSingleAlt { loop_expr, .. } = &choice.kind else {
        panic!("expected an LL(1) star loop");
    };
    assert_eq!(loop_expr.token_types(), vec![4]);
    assert_eq!(list.locals, vec![Decl::TokenTypeDecl { name: "_la".to_string() }]);
}

#[test]
fn rule_block_with_alternatives() {
    let compiled = compile(list_grammar());
    let item = func(&compiled, "item");

    let [Op::Choice(choice)] = item.code.as_slice() else {
        panic!("expected a choice");
    };
    assert_eq!(choice.decision, 1);
    let ChoiceKind::Ll1AltBlock { alt_look, error } = &choice.kind else {
        panic!("expected an LL(1) block");
    };
    assert_eq!(alt_look, &strings(&[&["A"], &["B"], &["C"]]));
    assert_eq!(error.expecting, Some(IntervalSet::of_range(1, 3)));
    assert_eq!(error.rule_index, 1);
}

#[test]
fn optional_single_alternative_tests_enter_and_follow() {
    let compiled = compile(list_grammar());
    let tail = func(&compiled, "tail");

    insta::assert_snapshot!(code(tail), @r"
    CodeBlockForOuterMostAlt
      Ll1OptionalBlockSingleAlt
        CodeBlockForAlt
          MatchToken A
        CaptureNextTokenType
        TestSetInline
          Bitset
        TestSetInline
          Bitset
        ThrowNoViableAlt
      MatchToken B
    ");

    let choice = first_choice(tail);
    assert_eq!(choice.decision, 2);
    let ChoiceKind::Ll1OptionalBlockSingleAlt {
        expr,
        follow_expr,
        error,
    } = &choice.kind
    else {
        panic!("expected an LL(1) optional block");
    };
    assert_eq!(expr.token_types(), vec![1]);
    assert_eq!(follow_expr.token_types(), vec![2]);
    assert_eq!(error.expecting, Some(IntervalSet::of_range(1, 2)));
    assert_eq!(choice.preamble, vec![Op::CaptureNextTokenType(CaptureNextTokenType::new("_la"))]);
}

#[test]
fn plus_loop_decides_at_the_loop_back_state() {
    let compiled = compile(GrammarBuilder::parser("P").tokens(&["A"]).rule("s", plus(tok("A"))));
    let s = func(&compiled, "s");

    insta::assert_snapshot!(code(s), @r"
    CodeBlockForOuterMostAlt
      Ll1PlusBlockSingleAlt
        CodeBlockForAlt
          MatchToken A
        CaptureNextTokenType
        CaptureNextTokenType
        TestSetInline
          Bitset
    ");

    let choice = first_choice(s);
    let ChoiceKind::Ll1PlusBlockSingleAlt {
        looping,
        block_start_state,
        loop_expr,
    } = &choice.kind
    else {
        panic!("expected an LL(1) plus loop");
    };
    let loop_back = compiled.atn.state(looping.loop_back_state);
    assert_eq!(loop_back.kind, StateKind::PlusLoopBack);
    assert_eq!(loop_back.decision, Some(choice.decision));
    assert_eq!(choice.state_number, looping.loop_back_state);

    let start = compiled.atn.state(*block_start_state);
    assert_eq!(start.kind, StateKind::BlockStart(BlockKind::Plus));
    assert_eq!(start.loop_back, Some(looping.loop_back_state));
    assert_eq!(looping.loop_entry_state, *block_start_state);
    assert_eq!(loop_expr.token_types(), vec![1]);
    assert_eq!(s.locals, vec![Decl::TokenTypeDecl { name: "_la".to_string() }]);
}

#[test]
fn forced_adaptive_prediction() {
    let config = ToolConfig::default().force_atn(true);
    let compiled = compile_with(GrammarBuilder::parser("P").tokens(&["A"]).rule("s", plus(tok("A"))), &config);
    let s = func(&compiled, "s");

    insta::assert_snapshot!(code(s), @r"
    CodeBlockForOuterMostAlt
      PlusBlock
        CodeBlockForAlt
          MatchToken A
        ThrowEarlyExit
    ");

    let error = first_choice(s).kind.error().expect("error");
    assert_eq!(error.kind, RecognitionErrorKind::EarlyExit);
    assert_eq!(error.expecting, None);
    assert!(s.has_lookahead_block);
    assert!(s.locals.is_empty());
}

#[test]
fn non_greedy_loop_exits_first() {
    let compiled = compile(
        GrammarBuilder::parser("P")
            .tokens(&["A", "B"])
            .rule("s", alt([star_lazy(tok("A")), tok("B")])),
    );
    let s = func(&compiled, "s");

    let choice = first_choice(s);
    assert!(matches!(choice.kind, ChoiceKind::StarBlock { .. }));
    assert_eq!(choice.kind.looping().map(|l| l.exit_alt), Some(1));
    assert!(s.has_lookahead_block);
}

#[test]
fn element_labels() {
    let compiled = compile(
        GrammarBuilder::parser("P")
            .tokens(&["ID"])
            .rule(
                "s",
                alt([
                    tok("ID").label("x"),
                    tok("ID").list_label("xs"),
                    rule_ref("e").label("r"),
                    rule_ref("e").list_label("es"),
                ]),
            )
            .rule("e", tok("ID")),
    );
    let s = func(&compiled, "s");

    assert_eq!(
        s.rule_ctx.attrs,
        vec![
            Decl::TokenDecl {
                name: "x".to_string(),
                implicit: false,
            },
            Decl::TokenDecl {
                name: "_ID".to_string(),
                implicit: true,
            },
            Decl::TokenListDecl { name: "xs".to_string() },
            Decl::RuleContextDecl {
                name: "r".to_string(),
                ctx_name: "EContext".to_string(),
                implicit: false,
            },
            Decl::RuleContextDecl {
                name: "_e".to_string(),
                ctx_name: "EContext".to_string(),
                implicit: true,
            },
            Decl::RuleContextListDecl {
                name: "es".to_string(),
                ctx_name: "EContext".to_string(),
            },
        ]
    );

    let [Op::CodeBlock(outer)] = s.code.as_slice() else {
        panic!("expected one outermost alternative");
    };
    let labels: Vec<Vec<&str>> = outer
        .ops
        .iter()
        .map(|op| op.labels().iter().map(String::as_str).collect())
        .collect();
    assert_eq!(labels, vec![vec!["x"], vec!["_ID"], vec![], vec!["r"], vec!["_e"], vec![]]);
    let adds: Vec<&AddToLabelList> = outer
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::AddToLabelList(add) => Some(add),
            _ => None,
        })
        .collect();
    assert_eq!(adds[0].list_name, "xs");
    assert_eq!(adds[0].label, "_ID");
    assert_eq!(adds[1].list_name, "es");
    assert_eq!(adds[1].label, "_e");
}

#[test]
fn actions_predicates_and_handlers() {
    let compiled = compile(
        GrammarBuilder::parser("P").tokens(&["A"]).rule_def(
            RuleDef::new("s", alt([action("init();"), pred("ready()"), tok("A")]))
                .args("int depth")
                .returns("String text")
                .catch("RecognitionException e", "recover(e);")
                .finally("done();"),
        ),
    );
    let s = func(&compiled, "s");

    insta::assert_snapshot!(code(s), @r"
    CodeBlockForOuterMostAlt
      Action
      SemPred
      MatchToken A
    ");

    assert_eq!(
        s.args,
        vec![Decl::AttributeDecl {
            name: "depth".to_string(),
            ty: "int".to_string(),
            init: None,
        }]
    );
    assert!(s.rule_ctx.attr("text").is_some());
    assert_eq!(s.rule_ctx.ctor_attrs, s.args);
    assert_eq!(s.exceptions.len(), 1);
    assert_eq!(s.exceptions[0].catch_arg, "RecognitionException e");
    assert_eq!(s.finally_action.as_deref(), Some("done();"));

    let parser = &compiled.file.as_parser().expect("parser file").parser;
    assert_eq!(
        parser.sempred_funcs,
        vec![RuleSempredFunction {
            name: "s".to_string(),
            rule_index: 0,
            ctx_type: "SContext".to_string(),
            preds: vec![(0, "ready()".to_string())],
        }]
    );
}

#[test]
fn left_recursive_rule_switches_contexts() {
    let compiled = compile(expr_grammar());
    let e = func(&compiled, "e");

    insta::assert_snapshot!(code(e), @r"
    CodeBlockForOuterMostAlt
      Ll1AltBlock
        CodeBlockForAlt
          RecRuleReplaceContext
          MatchToken SUB
          InvokeRule e
        CodeBlockForAlt
          RecRuleReplaceContext
          MatchToken LPAREN
          InvokeRule e
          MatchToken RPAREN
        CodeBlockForAlt
          RecRuleReplaceContext
          MatchToken INT
        CodeBlockForAlt
          RecRuleReplaceContext
          MatchToken ID
        ThrowNoViableAlt
      RecRuleSetStopToken
      StarBlock
        CodeBlockForAlt
          AltBlock
            CodeBlockForAlt
              RecRuleAltStart
              PrecedencePredicate
              MatchToken MUL
              InvokeRule e
            CodeBlockForAlt
              RecRuleAltStart
              PrecedencePredicate
              MatchToken ADD
              InvokeRule e
        RecRuleSetPrevCtx
    ");

    assert!(e.left_recursive);
    assert!(e.has_lookahead_block);
    assert_eq!(
        e.args,
        vec![Decl::AttributeDecl {
            name: "_p".to_string(),
            ty: "int".to_string(),
            init: None,
        }]
    );

    let labels: Vec<&str> = e.alt_label_ctxs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        labels,
        vec!["MulContext", "AddContext", "NegContext", "ParensContext", "IntContext", "IdContext"]
    );
    let mul = e.alt_label_ctx("Mul").expect("Mul context");
    assert_eq!(mul.alt_nums, vec![1]);
    assert_eq!(
        mul.getters,
        vec![
            Decl::ContextRuleListGetter {
                name: "e".to_string(),
                ctx_name: "EContext".to_string(),
                signature: false,
            },
            Decl::ContextRuleListIndexedGetter {
                name: "e".to_string(),
                ctx_name: "EContext".to_string(),
                signature: false,
            },
            Decl::ContextTokenGetter {
                name: "MUL".to_string(),
                optional: false,
                signature: false,
            },
        ]
    );
    assert!(e.rule_ctx.provide_copy_from);

    let parser = &compiled.file.as_parser().expect("parser file").parser;
    let preds: Vec<&str> = parser.sempred_funcs[0].preds.iter().map(|(_, p)| p.as_str()).collect();
    assert_eq!(preds, vec!["precpred(6)", "precpred(5)"]);
}

#[test]
fn calls_into_left_recursive_rules_pass_precedence() {
    let compiled = compile(expr_grammar());
    let s = func(&compiled, "s");

    let [Op::CodeBlock(outer)] = s.code.as_slice() else {
        panic!("expected one outermost alternative");
    };
    let Op::InvokeRule(invoke) = &outer.ops[0] else {
        panic!("expected a rule invocation");
    };
    assert_eq!(invoke.name, "e");
    assert_eq!(invoke.ctx_name, "EContext");
    assert_eq!(invoke.args.as_deref(), Some("0"));
}

#[test]
fn rule_function_summary() {
    let compiled = compile(list_grammar());
    let list = func(&compiled, "list");

    let rendered = format!(
        "{} #{} -> {} (start s{})",
        list.name, list.index, list.ctx_type, list.start_state
    );
    assert_eq!(rendered, format!("list #0 -> ListContext (start s{})", compiled.atn.rule_to_start[0]));
    insta::assert_snapshot!(outline([ModelRef::from(&list.rule_ctx)]), @r"
    StructDecl ListContext
      ContextRuleListGetterDecl item
      ContextRuleListIndexedGetterDecl item
      ContextTokenListGetterDecl COMMA
      ContextTokenListIndexedGetterDecl COMMA
      ContextRuleListGetterDecl item
      ContextRuleListIndexedGetterDecl item
      ContextTokenListGetterDecl COMMA
      ContextTokenListIndexedGetterDecl COMMA
    ");
}
