use antler_core::IntervalSet;

use super::model::{CaptureNextTokenType, Decl, MatchSet, StructDecl, TestSetInline};
use super::{FieldValue, ModelKind, ModelRef, walk};
use crate::test_utils::{compile, list_grammar};

fn field_names(model: ModelRef<'_>) -> Vec<&'static str> {
    model.fields().iter().map(|f| f.name).collect()
}

fn match_set(invert: bool) -> MatchSet {
    let expr = TestSetInline::new(&IntervalSet::from_values([1, 2]), 64, |t| format!("T{t}"));
    MatchSet {
        state_number: 3,
        invert,
        capture: CaptureNextTokenType::new(expr.var_name.clone()),
        expr,
        labels: vec!["op".to_string()],
    }
}

#[test]
fn fields_follow_declaration_order() {
    let set = match_set(false);
    assert_eq!(
        field_names(ModelRef::from(&set)),
        vec!["state_number", "invert", "expr", "capture", "labels"]
    );
}

#[test]
fn only_model_elements_are_children() {
    let set = match_set(false);
    let model = ModelRef::from(&set);

    let elements: Vec<&str> = model
        .fields()
        .iter()
        .filter(|f| f.model_element)
        .map(|f| f.name)
        .collect();
    assert_eq!(elements, vec!["expr", "capture"]);

    let kinds: Vec<ModelKind> = model.children().into_iter().map(ModelRef::kind).collect();
    assert_eq!(kinds, vec![ModelKind::TestSetInline, ModelKind::CaptureNextTokenType]);
}

#[test]
fn inverted_set_is_its_own_kind() {
    let set = match_set(true);
    let model = ModelRef::from(&set);

    assert_eq!(model.kind(), ModelKind::MatchNotSet);
    assert_eq!(model.field("invert").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(field_names(model), field_names(ModelRef::from(&match_set(false))));
}

#[test]
fn label_contexts_publish_their_label() {
    let mut ctx = StructDecl::new("AddContext", "expr");
    assert_eq!(ModelRef::from(&ctx).kind(), ModelKind::StructDecl);
    assert!(ModelRef::from(&ctx).field("alt_label").is_none());

    ctx.alt_label = Some("Add".to_string());
    ctx.alt_nums = vec![2];
    let model = ModelRef::from(&ctx);
    assert_eq!(model.kind(), ModelKind::AltLabelStructDecl);
    assert_eq!(model.field("alt_label").and_then(|v| v.as_str()), Some("Add"));
    assert_eq!(model.field("derived_from_name").and_then(|v| v.as_str()), Some("expr"));
}

#[test]
fn scalar_values() {
    let decl = Decl::AttributeDecl {
        name: "n".to_string(),
        ty: "int".to_string(),
        init: None,
    };
    let model = ModelRef::from(&decl);

    assert_eq!(model.kind(), ModelKind::AttributeDecl);
    assert_eq!(field_names(model), vec!["name", "type", "init"]);
    assert_eq!(model.field("type").and_then(|v| v.as_str()), Some("int"));
    assert!(model.field("init").is_some_and(|v| v.is_null()));
    assert!(model.field("missing").is_none());
    assert!(model.children().is_empty());
}

#[test]
fn bitset_words() {
    let expr = TestSetInline::new(&IntervalSet::from_values([1, 3]), 64, |t| format!("T{t}"));
    let model = ModelRef::from(&expr.bitsets[0]);

    assert_eq!(model.field("shift").and_then(|v| v.as_int()), Some(0));
    assert_eq!(model.field("calculated").and_then(|v| v.as_int()), Some(0b1010));
    let Some(FieldValue::List(tokens)) = model.field("tokens") else {
        panic!("expected a token list");
    };
    assert_eq!(tokens.len(), 2);
}

#[test]
fn walk_visits_the_whole_file() {
    let compiled = compile(list_grammar());
    let mut kinds = Vec::new();
    walk(ModelRef::from(&compiled.file), &mut |m| kinds.push(m.kind()));

    assert_eq!(kinds[0], ModelKind::ParserFile);
    assert_eq!(kinds[1], ModelKind::Parser);
    let count = |kind| kinds.iter().filter(|&&k| k == kind).count();
    assert_eq!(count(ModelKind::RuleFunction), 3);
    assert_eq!(count(ModelKind::ListenerFile), 1);
    assert_eq!(count(ModelKind::VisitorFile), 0);
    assert_eq!(count(ModelKind::Ll1StarBlockSingleAlt), 1);
    assert_eq!(count(ModelKind::Ll1OptionalBlockSingleAlt), 1);
    assert_eq!(count(ModelKind::Ll1AltBlock), 1);
}

#[test]
fn parser_scalars() {
    let compiled = compile(list_grammar());
    let parser = &compiled.file.as_parser().expect("parser file").parser;
    let model = ModelRef::from(parser);

    assert_eq!(model.field("name").and_then(|v| v.as_str()), Some("Lists"));
    assert_eq!(model.field("decisions").and_then(|v| v.as_int()), Some(3));
    let Some(FieldValue::List(rules)) = model.field("rule_names") else {
        panic!("expected rule names");
    };
    let rules: Vec<&str> = rules.iter().filter_map(FieldValue::as_str).collect();
    assert_eq!(rules, vec!["list", "item", "tail"]);
}
