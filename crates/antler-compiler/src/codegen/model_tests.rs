use antler_core::IntervalSet;

use super::model::{Decl, Loop, TestSetInline, parse_attributes};

fn label(t: i32) -> String {
    format!("T{t}")
}

fn shifts(expr: &TestSetInline) -> Vec<i32> {
    expr.bitsets.iter().map(|b| b.shift).collect()
}

#[test]
fn small_types_pack_from_zero() {
    let expr = TestSetInline::new(&IntervalSet::from_values([1, 2, 3]), 64, label);

    assert_eq!(expr.var_name, "_la");
    assert_eq!(shifts(&expr), vec![0]);
    assert_eq!(expr.bitsets[0].calculated, 0b1110);
    let names: Vec<&str> = expr.bitsets[0].tokens.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["T1", "T2", "T3"]);
}

#[test]
fn shifted_layout_wins_when_it_needs_fewer_words() {
    let expr = TestSetInline::new(&IntervalSet::from_values([60, 100]), 64, label);

    assert_eq!(shifts(&expr), vec![60]);
    assert_eq!(expr.bitsets[0].calculated, 1 | (1 << 40));
    assert_eq!(expr.token_types(), vec![60, 100]);
}

#[test]
fn ties_keep_zero_offset() {
    let expr = TestSetInline::new(&IntervalSet::from_values([1, 2, 9]), 8, label);

    assert_eq!(expr.word_size, 8);
    assert_eq!(shifts(&expr), vec![0, 9]);
    assert_eq!(expr.token_types(), vec![1, 2, 9]);
}

#[test]
fn word_size_is_clamped() {
    let expr = TestSetInline::new(&IntervalSet::of(5), 500, label);
    assert_eq!(expr.word_size, 64);
}

#[test]
fn loop_exit_alternative() {
    assert_eq!(Loop::new(5, 7, 2, true).exit_alt, 3);
    assert_eq!(Loop::new(5, 7, 2, false).exit_alt, 1);

    let looping = Loop::new(5, 7, 1, true);
    assert_eq!((looping.loop_entry_state, looping.loop_back_state), (5, 7));
    assert!(looping.iteration.is_empty());
}

#[test]
fn signature_variant_keeps_shape() {
    let getter = Decl::ContextRuleGetter {
        name: "expr".to_string(),
        ctx_name: "ExprContext".to_string(),
        optional: true,
        signature: false,
    };

    let signature = getter.with_signature(true);
    assert!(signature.is_signature());
    assert!(!getter.is_signature());
    assert_eq!(signature.name(), "expr");
    assert!(signature.same_slot(&getter));
    assert_eq!(signature.with_signature(false), getter);
}

#[test]
fn signature_flag_ignores_plain_declarations() {
    let decl = Decl::TokenDecl {
        name: "op".to_string(),
        implicit: false,
    };
    assert_eq!(decl.with_signature(true), decl);
    assert!(!decl.is_signature());
}

#[test]
fn list_and_indexed_getters_use_different_slots() {
    let list = Decl::ContextTokenListGetter {
        name: "ID".to_string(),
        signature: false,
    };
    let indexed = Decl::ContextTokenListIndexedGetter {
        name: "ID".to_string(),
        signature: false,
    };
    let single = Decl::ContextTokenGetter {
        name: "ID".to_string(),
        optional: false,
        signature: false,
    };

    assert!(!list.same_slot(&indexed));
    assert!(list.same_slot(&single));
}

#[test]
fn attributes_split_on_top_level_commas() {
    let decls = parse_attributes("int a, Map<String, Integer> names = new HashMap<>(), boolean[] flags");

    assert_eq!(
        decls,
        vec![
            Decl::AttributeDecl {
                name: "a".to_string(),
                ty: "int".to_string(),
                init: None,
            },
            Decl::AttributeDecl {
                name: "names".to_string(),
                ty: "Map<String, Integer>".to_string(),
                init: Some("new HashMap<>()".to_string()),
            },
            Decl::AttributeDecl {
                name: "flags".to_string(),
                ty: "boolean[]".to_string(),
                init: None,
            },
        ]
    );
}

#[test]
fn empty_attribute_list() {
    assert!(parse_attributes("").is_empty());
    assert!(parse_attributes("  ").is_empty());
}
