//! Semantic checks over rule bodies.
//!
//! Every error names the rule it was found in, so the rule can be left out
//! of code generation while the rest of the grammar still compiles.

use indexmap::IndexMap;

use super::ast::{NodeId, NodeKind};
use super::charset::{decode_literal, parse_char_set};
use super::{Grammar, Rule};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

#[derive(Debug, Clone, PartialEq, Eq)]
enum LabelType {
    Token,
    Rule(String),
}

/// Run all semantic checks. Token types must already be assigned.
pub fn check_grammar(grammar: &Grammar, diagnostics: &mut Diagnostics) {
    for rule in grammar.rules.values() {
        Checker {
            grammar,
            rule,
            diagnostics: &mut *diagnostics,
            labels: IndexMap::new(),
        }
        .check_rule();
    }
}

struct Checker<'a> {
    grammar: &'a Grammar,
    rule: &'a Rule,
    diagnostics: &'a mut Diagnostics,
    labels: IndexMap<String, (LabelType, bool)>,
}

impl Checker<'_> {
    fn check_rule(&mut self) {
        let rule = self.rule;
        if self.grammar.is_lexer() && !rule.is_lexer() {
            self.error(DiagnosticKind::ParserRuleInLexer, rule.range, Some(&rule.name));
        }
        if self.grammar.is_parser() && rule.is_lexer() {
            self.error(DiagnosticKind::LexerRuleInParser, rule.range, Some(&rule.name));
        }

        for id in self.grammar.ast.descendants(rule.block) {
            self.check_node(id);
        }

        if rule.is_lexer() {
            self.check_commands();
        }
    }

    fn lexer(&self) -> bool {
        self.rule.is_lexer()
    }

    fn error(&mut self, kind: DiagnosticKind, range: rowan::TextRange, detail: Option<&str>) {
        let mut builder = self.diagnostics.report(kind, range);
        if let Some(detail) = detail {
            builder = builder.message(detail);
        }
        builder.in_rule(self.rule.name.as_str()).emit();
    }

    fn check_node(&mut self, id: NodeId) {
        let node = self.grammar.ast.node(id);
        if let Some(label) = node.label.clone() {
            self.check_label(id, &label.name, label.list);
        }
        match &node.kind {
            NodeKind::Block if node.children.is_empty() => {
                self.error(DiagnosticKind::EmptyBlock, node.range(), None);
            }
            NodeKind::RuleRef { .. } => {
                if self.grammar.rule(node.text()).is_none() {
                    self.error(DiagnosticKind::UndefinedRule, node.range(), Some(node.text()));
                }
            }
            NodeKind::Terminal if self.lexer() && node.is_literal() => {
                self.check_lexer_literal(id);
            }
            NodeKind::Range => {
                if self.lexer() {
                    self.check_lexer_range(id);
                } else {
                    self.error(
                        DiagnosticKind::InvalidRange,
                        node.range(),
                        Some("token ranges are not allowed in parser rules"),
                    );
                }
            }
            NodeKind::CharSet => {
                if !self.lexer() {
                    self.error(
                        DiagnosticKind::InvalidCharSet,
                        node.range(),
                        Some("character sets are not allowed in parser rules"),
                    );
                } else if let Err(err) = parse_char_set(node.text()) {
                    let kind = if node.text() == "[]" {
                        DiagnosticKind::EmptyLexerLiteral
                    } else {
                        DiagnosticKind::InvalidCharSet
                    };
                    self.error(kind, node.range(), Some(&err));
                }
            }
            NodeKind::Set | NodeKind::NotSet => self.check_set(id),
            _ => {}
        }
    }

    fn check_lexer_literal(&mut self, id: NodeId) -> Option<Vec<i32>> {
        let node = self.grammar.ast.node(id);
        match decode_literal(node.text()) {
            Ok(chars) if chars.is_empty() => {
                self.error(DiagnosticKind::EmptyLexerLiteral, node.range(), None);
                None
            }
            Ok(chars) => Some(chars),
            Err(err) => {
                self.error(DiagnosticKind::InvalidCharSet, node.range(), Some(&err));
                None
            }
        }
    }

    fn check_lexer_range(&mut self, id: NodeId) {
        let node = self.grammar.ast.node(id);
        let [a, b] = node.children[..] else {
            self.error(DiagnosticKind::InvalidRange, node.range(), None);
            return;
        };
        let from = decode_literal(self.grammar.ast.node(a).text());
        let to = decode_literal(self.grammar.ast.node(b).text());
        let rendered = self.grammar.ast.render(id);
        match (from.as_deref(), to.as_deref()) {
            (Ok([x]), Ok([y])) if x <= y => {}
            (Ok([_]), Ok([_])) => {
                self.error(
                    DiagnosticKind::InvalidRange,
                    node.range(),
                    Some(&format!("`{rendered}` is reversed")),
                );
            }
            _ => {
                self.error(
                    DiagnosticKind::InvalidRange,
                    node.range(),
                    Some(&format!("`{rendered}` endpoints must be single characters")),
                );
            }
        }
    }

    fn check_set(&mut self, id: NodeId) {
        let children = self.grammar.ast.children(id).to_vec();
        for child in children {
            let node = self.grammar.ast.node(child);
            match &node.kind {
                NodeKind::Terminal if self.lexer() && node.is_literal() => {
                    if let Ok(chars) = decode_literal(node.text())
                        && chars.len() > 1
                    {
                        self.error(
                            DiagnosticKind::MultiCharLiteralInLexerSet,
                            node.range(),
                            Some(node.text()),
                        );
                    }
                }
                NodeKind::Terminal if self.lexer() => {
                    self.error(
                        DiagnosticKind::ReferenceInLexerSet,
                        node.range(),
                        Some(node.text()),
                    );
                }
                NodeKind::Terminal => {}
                NodeKind::Range | NodeKind::CharSet => {}
                _ => {
                    let kind = if self.lexer() {
                        DiagnosticKind::ReferenceInLexerSet
                    } else {
                        DiagnosticKind::InvalidRange
                    };
                    let rendered = self.grammar.ast.render(child);
                    self.error(kind, node.range(), Some(&rendered));
                }
            }
        }
    }

    fn check_label(&mut self, id: NodeId, name: &str, list: bool) {
        let node = self.grammar.ast.node(id);
        let label_type = match &node.kind {
            NodeKind::RuleRef { .. } => LabelType::Rule(node.text().to_string()),
            _ => LabelType::Token,
        };
        match self.labels.get(name) {
            None => {
                self.labels.insert(name.to_string(), (label_type, list));
            }
            Some((existing, existing_list)) if *existing == label_type && *existing_list == list => {}
            Some(_) => {
                self.error(DiagnosticKind::LabelTypeConflict, node.range(), Some(name));
            }
        }
    }

    fn check_commands(&mut self) {
        for command in &self.rule.commands {
            let problem = match (command.name.as_str(), command.arg.as_deref()) {
                ("skip" | "more" | "popMode", None) => None,
                ("skip" | "more" | "popMode", Some(_)) => {
                    Some(format!("`{}` takes no argument", command.name))
                }
                ("channel", Some(arg)) => self
                    .grammar
                    .channel_value(arg)
                    .is_none()
                    .then(|| format!("unknown channel `{arg}`")),
                ("mode" | "pushMode", Some(arg)) => (!self.grammar.modes.iter().any(|m| m == arg))
                    .then(|| format!("unknown mode `{arg}`")),
                ("type", Some(arg)) => self
                    .grammar
                    .vocab
                    .token_type(arg)
                    .is_none()
                    .then(|| format!("unknown token type `{arg}`")),
                ("channel" | "mode" | "pushMode" | "type", None) => {
                    Some(format!("`{}` requires an argument", command.name))
                }
                (other, _) => Some(format!("unknown command `{other}`")),
            };
            if let Some(problem) = problem {
                self.error(DiagnosticKind::InvalidLexerCommand, command.range, Some(&problem));
            }
        }
    }
}
