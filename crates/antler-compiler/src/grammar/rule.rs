use indexmap::IndexMap;
use rowan::TextRange;

use super::ast::{GrammarAst, NodeId};
use crate::leftrec::LeftRecursiveRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Parser,
    Lexer,
}

impl RuleKind {
    /// Lexer rule names start uppercase, parser rule names lowercase.
    pub fn from_name(name: &str) -> Self {
        if name.chars().next().is_some_and(|c| c.is_uppercase()) {
            RuleKind::Lexer
        } else {
            RuleKind::Parser
        }
    }
}

/// `-> skip`, `-> channel(HIDDEN)`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerCommand {
    pub name: String,
    pub arg: Option<String>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    pub catch_arg: String,
    pub action: String,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub index: usize,
    pub kind: RuleKind,
    /// Top-level `Block`; its children are the rule's alternatives.
    pub block: NodeId,
    pub range: TextRange,
    pub fragment: bool,
    pub mode: String,
    pub commands: Vec<LexerCommand>,
    pub args: Option<String>,
    pub returns: Option<String>,
    pub locals: Option<String>,
    pub exceptions: Vec<ExceptionHandler>,
    pub finally_action: Option<String>,
    /// Present once the rule has been rewritten out of left-recursive form.
    pub left_recursive: Option<LeftRecursiveRule>,
    /// Set when errors keep the rule out of code generation.
    pub excluded: bool,
}

impl Rule {
    pub fn is_lexer(&self) -> bool {
        self.kind == RuleKind::Lexer
    }

    pub fn is_left_recursive(&self) -> bool {
        self.left_recursive.is_some()
    }

    /// Alternatives of the current (possibly rewritten) body.
    pub fn alts<'a>(&self, ast: &'a GrammarAst) -> &'a [NodeId] {
        ast.children(self.block)
    }

    /// Alternatives as written, before any rewriting.
    pub fn original_alts(&self, ast: &GrammarAst) -> Vec<NodeId> {
        match &self.left_recursive {
            Some(lr) => lr.original_alts.clone(),
            None => self.alts(ast).to_vec(),
        }
    }

    /// Labeled alternatives grouped by label, with 1-based alternative numbers.
    pub fn alt_labels(&self, ast: &GrammarAst) -> IndexMap<String, Vec<(usize, NodeId)>> {
        let mut labels: IndexMap<String, Vec<(usize, NodeId)>> = IndexMap::new();
        for (i, &alt) in self.original_alts(ast).iter().enumerate() {
            if let Some(label) = ast.node(alt).alt_label() {
                labels.entry(label.to_string()).or_default().push((i + 1, alt));
            }
        }
        labels
    }

    pub fn unlabeled_alts(&self, ast: &GrammarAst) -> Vec<NodeId> {
        self.original_alts(ast)
            .into_iter()
            .filter(|&alt| ast.node(alt).alt_label().is_none())
            .collect()
    }
}
