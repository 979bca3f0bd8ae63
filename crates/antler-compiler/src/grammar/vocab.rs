//! Token type assignment.

use super::ast::NodeKind;
use super::Grammar;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

impl Grammar {
    /// Give every token a type.
    ///
    /// Lexers number `tokens { }` names first, then non-fragment rules in
    /// definition order; a rule that is exactly one literal aliases it.
    /// Parsers start from their imported vocabulary and define the rest
    /// implicitly, with a warning.
    pub fn assign_token_types(&mut self, diagnostics: &mut Diagnostics) {
        for (name, _) in &self.tokens {
            self.vocab.define_name(name);
        }

        if self.is_lexer() {
            let names: Vec<String> = self
                .rules
                .values()
                .filter(|r| r.is_lexer() && !r.fragment)
                .map(|r| r.name.clone())
                .collect();
            for name in &names {
                self.vocab.define_name(name);
            }
            let aliases: Vec<(String, String)> = self
                .rules
                .values()
                .filter(|r| r.is_lexer() && !r.fragment)
                .filter_map(|r| self.single_literal(r).map(|lit| (lit, r.name.clone())))
                .collect();
            for (literal, name) in aliases {
                if self.vocab.literal_type(&literal).is_none() {
                    self.vocab.alias_literal(&literal, &name);
                }
            }
            return;
        }

        let mut implicit: Vec<(String, rowan::TextRange, String)> = Vec::new();
        let mut undefined_literals: Vec<(String, rowan::TextRange, String)> = Vec::new();
        for rule in self.rules.values().filter(|r| !r.is_lexer()) {
            for id in self.ast.descendants(rule.block) {
                let node = self.ast.node(id);
                if node.kind != NodeKind::Terminal {
                    continue;
                }
                if self.token_type(node.text()).is_some() {
                    continue;
                }
                let entry = (node.text().to_string(), node.range(), rule.name.clone());
                if node.is_literal() {
                    undefined_literals.push(entry);
                } else if !implicit.iter().any(|(n, _, _)| n == node.text()) {
                    implicit.push(entry);
                }
            }
        }

        for (name, range, _) in implicit {
            diagnostics
                .report(DiagnosticKind::ImplicitTokenDefinition, range)
                .message(name.as_str())
                .emit();
            self.vocab.define_name(&name);
        }
        for (literal, range, rule) in undefined_literals {
            diagnostics
                .report(DiagnosticKind::UndefinedToken, range)
                .message(literal.as_str())
                .in_rule(rule)
                .emit();
        }
    }
}
