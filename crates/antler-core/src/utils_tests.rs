use crate::utils::{capitalize, context_name};

#[test]
fn capitalize_keeps_tail() {
    assert_eq!(capitalize("expr"), "Expr");
    assert_eq!(capitalize("primaryExpr"), "PrimaryExpr");
    assert_eq!(capitalize("ID"), "ID");
    assert_eq!(capitalize(""), "");
}

#[test]
fn context_names() {
    assert_eq!(context_name("expr"), "ExprContext");
    assert_eq!(context_name("Mul"), "MulContext");
    assert_eq!(context_name("primaryExpr"), "PrimaryExprContext");
}
