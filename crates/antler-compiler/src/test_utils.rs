//! Test utilities: grammar fixtures and pipeline shortcuts.

use crate::codegen::ModelRef;
use crate::config::ToolConfig;
use crate::diagnostics::Diagnostics;
use crate::grammar::{
    Grammar, GrammarBuilder, alt, check_grammar, lit, opt, plus, rule_ref, set, star, tok,
};
use crate::tool::{CompiledGrammar, compile_grammar};

/// Build a grammar and assign token types. Semantic errors fail the test.
pub fn build(builder: GrammarBuilder) -> Grammar {
    let (grammar, diagnostics) = build_with_diagnostics(builder);
    assert!(
        !diagnostics.has_errors(),
        "unexpected errors:\n{}",
        render(&diagnostics)
    );
    grammar
}

/// Build a grammar, assign token types and run semantic checks.
pub fn build_with_diagnostics(builder: GrammarBuilder) -> (Grammar, Diagnostics) {
    let (mut grammar, mut diagnostics) = builder.build();
    grammar.assign_token_types(&mut diagnostics);
    check_grammar(&grammar, &mut diagnostics);
    (grammar, diagnostics)
}

/// Run the whole single-grammar pipeline with the default configuration.
pub fn compile(builder: GrammarBuilder) -> CompiledGrammar {
    compile_with(builder, &ToolConfig::default())
}

pub fn compile_with(builder: GrammarBuilder, config: &ToolConfig) -> CompiledGrammar {
    let (grammar, diagnostics) = builder.build();
    match compile_grammar(grammar, diagnostics, config) {
        Ok(compiled) => compiled,
        Err(err) => panic!("pipeline failed: {err}"),
    }
}

/// One diagnostic per line.
pub fn render(diagnostics: &Diagnostics) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// ```text
/// parser grammar Expr;
/// tokens { INT, ID, MUL, ADD, SUB, LPAREN, RPAREN }
/// s : e EOF ;
/// e : e MUL e | e ADD e | SUB e | LPAREN e RPAREN | INT | ID ;
/// ```
pub fn expr_grammar() -> GrammarBuilder {
    GrammarBuilder::parser("Expr")
        .tokens(&["INT", "ID", "MUL", "ADD", "SUB", "LPAREN", "RPAREN"])
        .rule("s", alt([rule_ref("e"), tok("EOF")]))
        .rule(
            "e",
            [
                alt([rule_ref("e"), tok("MUL"), rule_ref("e")]).label("Mul"),
                alt([rule_ref("e"), tok("ADD"), rule_ref("e")]).label("Add"),
                alt([tok("SUB"), rule_ref("e")]).label("Neg"),
                alt([tok("LPAREN"), rule_ref("e"), tok("RPAREN")]).label("Parens"),
                alt([tok("INT")]).label("Int"),
                alt([tok("ID")]).label("Id"),
            ],
        )
}

/// ```text
/// grammar Calc;
/// prog : stat+ EOF ;
/// stat : ID '=' expr ';' | expr ';' | ';' ;
/// expr : expr ('*'|'/') expr | expr ('+'|'-') expr | INT | ID | '(' expr ')' ;
/// ID : [a-zA-Z]+ ;
/// INT : [0-9]+ ;
/// WS : [ \t\r\n]+ -> skip ;
/// ```
pub fn calc_grammar() -> GrammarBuilder {
    use crate::grammar::{RuleDef, char_set};

    GrammarBuilder::combined("Calc")
        .rule("prog", alt([plus(rule_ref("stat")), tok("EOF")]))
        .rule(
            "stat",
            [
                alt([tok("ID"), lit("="), rule_ref("expr"), lit(";")]).label("Assign"),
                alt([rule_ref("expr"), lit(";")]).label("Print"),
                alt([lit(";")]).label("Blank"),
            ],
        )
        .rule(
            "expr",
            [
                alt([
                    rule_ref("expr"),
                    set([lit("*"), lit("/")]).label("op"),
                    rule_ref("expr"),
                ])
                .label("MulDiv"),
                alt([
                    rule_ref("expr"),
                    set([lit("+"), lit("-")]).label("op"),
                    rule_ref("expr"),
                ])
                .label("AddSub"),
                alt([tok("INT")]).label("Int"),
                alt([tok("ID")]).label("Id"),
                alt([lit("("), rule_ref("expr"), lit(")")]).label("Parens"),
            ],
        )
        .rule("ID", plus(char_set("a-zA-Z")))
        .rule("INT", plus(char_set("0-9")))
        .rule_def(RuleDef::new("WS", plus(char_set(" \\t\\r\\n"))).command("skip"))
}

/// ```text
/// parser grammar Lists;
/// tokens { A, B, C, COMMA }
/// list : item (COMMA item)* ;
/// item : A | B | C ;
/// tail : A? B ;
/// ```
pub fn list_grammar() -> GrammarBuilder {
    GrammarBuilder::parser("Lists")
        .tokens(&["A", "B", "C", "COMMA"])
        .rule(
            "list",
            alt([rule_ref("item"), star(alt([tok("COMMA"), rule_ref("item")]))]),
        )
        .rule("item", [alt([tok("A")]), alt([tok("B")]), alt([tok("C")])])
        .rule("tail", alt([opt(tok("A")), tok("B")]))
}

/// Indented outline of output model nodes, one node per line: its kind and
/// its `name` field when it has one.
pub fn outline<'a>(roots: impl IntoIterator<Item = ModelRef<'a>>) -> String {
    fn node(model: ModelRef<'_>, depth: usize, lines: &mut Vec<String>) {
        let mut line = format!("{}{:?}", "  ".repeat(depth), model.kind());
        if let Some(name) = model.field("name").and_then(|v| v.as_str()) {
            line.push(' ');
            line.push_str(name);
        }
        lines.push(line);
        for child in model.children() {
            node(child, depth + 1, lines);
        }
    }

    let mut lines = Vec::new();
    for root in roots {
        node(root, 0, &mut lines);
    }
    lines.join("\n")
}
