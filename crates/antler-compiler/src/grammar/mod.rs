//! Grammar model: rules, alternatives, vocabulary and per-decision lookahead.
//!
//! A `Grammar` is produced by the (external) grammar parser through
//! [`GrammarBuilder`], then mutated in place by the semantic, left-recursion
//! and analysis passes. Once the output model is built it is no longer touched.

pub mod ast;
mod builder;
pub mod charset;
mod check;
mod options;
mod rule;
mod vocab;

#[cfg(test)]
mod builder_tests;
#[cfg(test)]
mod check_tests;

use antler_core::token::{DEFAULT_MODE, EOF};
use antler_core::{IntervalSet, Vocabulary};
use indexmap::IndexMap;
use rowan::TextRange;

pub use ast::{AstNode, Assoc, ElementLabel, GrammarAst, NodeId, NodeKind};
pub use builder::{
    AltDef, Elem, GrammarBuilder, IntoAlts, RuleDef, action, alt, block, char_set, lit, not, opt,
    opt_lazy, plus, plus_lazy, pred, range, rule_ref, set, star, star_lazy, tok, wildcard,
};
pub use check::check_grammar;
pub use options::GrammarOptions;
pub use rule::{ExceptionHandler, LexerCommand, Rule, RuleKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarKind {
    Lexer,
    Parser,
    Combined,
}

/// Lookahead computed for one decision.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DecisionLook {
    /// Per-alternative sets, in transition order. `None` when analysis gave up
    /// (empty set, predicate crossed, or non-greedy decision).
    pub alts: Vec<Option<IntervalSet>>,
    /// Union of the known alternative sets.
    pub expecting: IntervalSet,
    /// No set is unknown and no two sets overlap.
    pub ll1: bool,
}

#[derive(Debug, Clone)]
pub struct Grammar {
    pub name: String,
    pub kind: GrammarKind,
    /// Parser half of a combined grammar.
    pub from_combined: bool,
    pub options: GrammarOptions,
    pub ast: GrammarAst,
    pub rules: IndexMap<String, Rule>,
    pub vocab: Vocabulary,
    /// `tokens { ... }` names.
    pub tokens: Vec<(String, TextRange)>,
    /// `channels { ... }` names; user channels start after the two built-ins.
    pub channels: Vec<String>,
    pub modes: Vec<String>,
    pub imports: Vec<(String, TextRange)>,
    /// Indexed by decision number.
    pub decision_look: Vec<DecisionLook>,
    /// Predicate node to grammar-wide predicate index.
    pub sempreds: IndexMap<NodeId, usize>,
    pub range: TextRange,
}

impl Grammar {
    pub fn new(name: impl Into<String>, kind: GrammarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            from_combined: false,
            options: GrammarOptions::default(),
            ast: GrammarAst::new(),
            rules: IndexMap::new(),
            vocab: Vocabulary::new(),
            tokens: Vec::new(),
            channels: Vec::new(),
            modes: vec![DEFAULT_MODE.to_string()],
            imports: Vec::new(),
            decision_look: Vec::new(),
            sempreds: IndexMap::new(),
            range: TextRange::default(),
        }
    }

    pub fn is_lexer(&self) -> bool {
        self.kind == GrammarKind::Lexer
    }

    pub fn is_parser(&self) -> bool {
        self.kind == GrammarKind::Parser
    }

    pub fn is_combined(&self) -> bool {
        self.kind == GrammarKind::Combined
    }

    /// Name of the generated recognizer.
    pub fn recognizer_name(&self) -> String {
        if self.from_combined {
            format!("{}Parser", self.name)
        } else {
            self.name.clone()
        }
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn rule_mut(&mut self, name: &str) -> Option<&mut Rule> {
        self.rules.get_mut(name)
    }

    pub fn rule_by_index(&self, index: usize) -> Option<&Rule> {
        self.rules.get_index(index).map(|(_, r)| r)
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.rules.keys().cloned().collect()
    }

    /// Token type matched by a terminal's text: a token name, a literal or `EOF`.
    pub fn token_type(&self, text: &str) -> Option<i32> {
        if text == "EOF" {
            return Some(EOF);
        }
        if text.starts_with('\'') {
            self.vocab.literal_type(text)
        } else {
            self.vocab.token_type(text)
        }
    }

    /// Channel number for a channel name.
    pub fn channel_value(&self, name: &str) -> Option<i32> {
        match name {
            "DEFAULT_TOKEN_CHANNEL" => Some(antler_core::token::DEFAULT_CHANNEL),
            "HIDDEN" => Some(antler_core::token::HIDDEN_CHANNEL),
            _ => {
                if let Ok(n) = name.parse::<i32>() {
                    return Some(n);
                }
                self.channels
                    .iter()
                    .position(|c| c == name)
                    .map(|i| i as i32 + 2)
            }
        }
    }

    /// Renumber rules after insertion or removal.
    pub(crate) fn reindex_rules(&mut self) {
        for (i, rule) in self.rules.values_mut().enumerate() {
            rule.index = i;
        }
    }

    /// Merge rules and token names from an imported grammar. Rules the
    /// importer already defines win.
    pub fn import_from(&mut self, other: &Grammar) {
        for (name, range) in &other.tokens {
            if !self.tokens.iter().any(|(n, _)| n == name) {
                self.tokens.push((name.clone(), *range));
            }
        }
        for channel in &other.channels {
            if !self.channels.contains(channel) {
                self.channels.push(channel.clone());
            }
        }
        for mode in &other.modes {
            if !self.modes.contains(mode) {
                self.modes.push(mode.clone());
            }
        }
        for rule in other.rules.values() {
            if self.rules.contains_key(&rule.name) {
                continue;
            }
            let block = self.ast.import_subtree(&other.ast, rule.block);
            let mut copy = rule.clone();
            copy.block = block;
            copy.left_recursive = None;
            copy.excluded = false;
            self.rules.insert(rule.name.clone(), copy);
        }
        self.reindex_rules();
    }

    /// Split a combined grammar into its parser half and an implicit lexer.
    ///
    /// Literals used by parser rules that no lexer rule defines on its own get
    /// implicit lexer rules `T__0`, `T__1`, ... ahead of the user's lexer rules.
    pub fn split_combined(&self) -> (Grammar, Grammar) {
        let mut lexer = Grammar::new(format!("{}Lexer", self.name), GrammarKind::Lexer);
        lexer.options = self.options.clone();
        lexer.tokens = self.tokens.clone();
        lexer.channels = self.channels.clone();
        lexer.modes = self.modes.clone();
        lexer.range = self.range;

        let defined_literals: Vec<String> = self
            .rules
            .values()
            .filter(|r| r.is_lexer() && !r.fragment)
            .filter_map(|r| self.single_literal(r))
            .collect();

        let mut implicit: Vec<(String, TextRange)> = Vec::new();
        for rule in self.rules.values().filter(|r| !r.is_lexer()) {
            for id in self.ast.descendants(rule.block) {
                let node = self.ast.node(id);
                if !node.is_literal() {
                    continue;
                }
                if defined_literals.iter().any(|l| l == node.text())
                    || implicit.iter().any(|(l, _)| l == node.text())
                {
                    continue;
                }
                implicit.push((node.text().to_string(), node.range()));
            }
        }

        for (i, (literal, range)) in implicit.into_iter().enumerate() {
            let name = format!("T__{i}");
            let lit = lexer.ast.add(NodeKind::Terminal, literal, range);
            let alt = lexer.ast.add_with_children(
                NodeKind::Alt {
                    label: None,
                    assoc: Assoc::Left,
                },
                "",
                range,
                vec![lit],
            );
            let block = lexer
                .ast
                .add_with_children(NodeKind::Block, "", range, vec![alt]);
            lexer.rules.insert(
                name.clone(),
                Rule {
                    name,
                    index: 0,
                    kind: RuleKind::Lexer,
                    block,
                    range,
                    fragment: false,
                    mode: DEFAULT_MODE.to_string(),
                    commands: Vec::new(),
                    args: None,
                    returns: None,
                    locals: None,
                    exceptions: Vec::new(),
                    finally_action: None,
                    left_recursive: None,
                    excluded: false,
                },
            );
        }

        for rule in self.rules.values().filter(|r| r.is_lexer()) {
            let block = lexer.ast.import_subtree(&self.ast, rule.block);
            let mut copy = rule.clone();
            copy.block = block;
            lexer.rules.insert(rule.name.clone(), copy);
        }
        lexer.reindex_rules();

        let mut parser = Grammar::new(self.name.clone(), GrammarKind::Parser);
        parser.from_combined = true;
        parser.options = self.options.clone();
        parser.range = self.range;
        parser.imports = self.imports.clone();
        for rule in self.rules.values().filter(|r| !r.is_lexer()) {
            let block = parser.ast.import_subtree(&self.ast, rule.block);
            let mut copy = rule.clone();
            copy.block = block;
            parser.rules.insert(rule.name.clone(), copy);
        }
        parser.reindex_rules();

        (parser, lexer)
    }

    /// The literal a rule consists of, for rules of the form `X : 'lit' ;`.
    pub(crate) fn single_literal(&self, rule: &Rule) -> Option<String> {
        let alts = rule.alts(&self.ast);
        let [alt] = alts else {
            return None;
        };
        let [elem] = self.ast.children(*alt) else {
            return None;
        };
        let node = self.ast.node(*elem);
        node.is_literal().then(|| node.text().to_string())
    }

    /// Dump rules in grammar notation, one per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for rule in self.rules.values() {
            out.push_str(&rule.name);
            if let Some(args) = &rule.args {
                out.push_str(&format!("[{args}]"));
            }
            out.push_str(" : ");
            let alts: Vec<String> = rule
                .alts(&self.ast)
                .iter()
                .map(|&a| self.ast.render(a))
                .collect();
            out.push_str(&alts.join(" | "));
            out.push_str(" ;\n");
        }
        out
    }
}
