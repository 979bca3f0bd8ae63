//! Programmatic grammar construction.
//!
//! Grammar text parsing lives outside this crate; its result arrives as an
//! owned [`Elem`] tree per alternative. Source tokens get synthetic,
//! monotonically increasing ranges so diagnostics stay ordered and stable.

use antler_core::token::DEFAULT_MODE;
use antler_core::Vocabulary;
use indexmap::IndexMap;
use rowan::{TextRange, TextSize};

use super::ast::{Assoc, ElementLabel, GrammarAst, NodeId, NodeKind};
use super::rule::{ExceptionHandler, LexerCommand, Rule, RuleKind};
use super::{Grammar, GrammarKind, GrammarOptions};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// One grammar element as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elem {
    Token(String),
    /// Quoted literal text, e.g. `'+'`.
    Literal(String),
    Rule {
        name: String,
        args: Option<String>,
    },
    /// Literal endpoints, quoted.
    Range(String, String),
    CharSet(String),
    Set(Vec<Elem>),
    Not(Box<Elem>),
    Wildcard,
    Block(Vec<AltDef>),
    Optional(Vec<AltDef>, bool),
    Star(Vec<AltDef>, bool),
    Plus(Vec<AltDef>, bool),
    Action(String),
    Predicate(String),
    Labeled {
        name: String,
        list: bool,
        elem: Box<Elem>,
    },
}

impl Elem {
    /// `name=elem`
    pub fn label(self, name: &str) -> Elem {
        Elem::Labeled {
            name: name.to_string(),
            list: false,
            elem: Box::new(self),
        }
    }

    /// `name+=elem`
    pub fn list_label(self, name: &str) -> Elem {
        Elem::Labeled {
            name: name.to_string(),
            list: true,
            elem: Box::new(self),
        }
    }

    /// Attach a rule argument, `expr[3]`.
    pub fn args(self, args: &str) -> Elem {
        match self {
            Elem::Rule { name, .. } => Elem::Rule {
                name,
                args: Some(args.to_string()),
            },
            other => other,
        }
    }
}

/// One alternative: a sequence of elements, an optional `# Label` and
/// associativity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AltDef {
    pub elems: Vec<Elem>,
    pub label: Option<String>,
    pub assoc: Assoc,
}

impl AltDef {
    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// `<assoc=right>`
    pub fn right(mut self) -> Self {
        self.assoc = Assoc::Right;
        self
    }
}

/// Anything that can stand for a list of alternatives.
pub trait IntoAlts {
    fn into_alts(self) -> Vec<AltDef>;
}

impl IntoAlts for Elem {
    fn into_alts(self) -> Vec<AltDef> {
        vec![alt([self])]
    }
}

impl IntoAlts for AltDef {
    fn into_alts(self) -> Vec<AltDef> {
        vec![self]
    }
}

impl IntoAlts for Vec<AltDef> {
    fn into_alts(self) -> Vec<AltDef> {
        self
    }
}

impl<const N: usize> IntoAlts for [AltDef; N] {
    fn into_alts(self) -> Vec<AltDef> {
        self.into()
    }
}

pub fn alt(elems: impl IntoIterator<Item = Elem>) -> AltDef {
    AltDef {
        elems: elems.into_iter().collect(),
        label: None,
        assoc: Assoc::Left,
    }
}

pub fn tok(name: &str) -> Elem {
    Elem::Token(name.to_string())
}

/// Literal; quotes are added unless already present.
pub fn lit(text: &str) -> Elem {
    Elem::Literal(quote(text))
}

fn quote(text: &str) -> String {
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        text.to_string()
    } else {
        format!("'{text}'")
    }
}

pub fn rule_ref(name: &str) -> Elem {
    Elem::Rule {
        name: name.to_string(),
        args: None,
    }
}

pub fn range(from: &str, to: &str) -> Elem {
    Elem::Range(quote(from), quote(to))
}

/// Lexer character set; brackets are added unless already present.
pub fn char_set(text: &str) -> Elem {
    if text.starts_with('[') {
        Elem::CharSet(text.to_string())
    } else {
        Elem::CharSet(format!("[{text}]"))
    }
}

pub fn set(elems: impl IntoIterator<Item = Elem>) -> Elem {
    Elem::Set(elems.into_iter().collect())
}

pub fn not(elem: Elem) -> Elem {
    Elem::Not(Box::new(elem))
}

pub fn wildcard() -> Elem {
    Elem::Wildcard
}

pub fn block(alts: impl IntoAlts) -> Elem {
    Elem::Block(alts.into_alts())
}

pub fn opt(alts: impl IntoAlts) -> Elem {
    Elem::Optional(alts.into_alts(), true)
}

pub fn opt_lazy(alts: impl IntoAlts) -> Elem {
    Elem::Optional(alts.into_alts(), false)
}

pub fn star(alts: impl IntoAlts) -> Elem {
    Elem::Star(alts.into_alts(), true)
}

pub fn star_lazy(alts: impl IntoAlts) -> Elem {
    Elem::Star(alts.into_alts(), false)
}

pub fn plus(alts: impl IntoAlts) -> Elem {
    Elem::Plus(alts.into_alts(), true)
}

pub fn plus_lazy(alts: impl IntoAlts) -> Elem {
    Elem::Plus(alts.into_alts(), false)
}

pub fn action(text: &str) -> Elem {
    Elem::Action(text.to_string())
}

pub fn pred(text: &str) -> Elem {
    Elem::Predicate(text.to_string())
}

/// A rule with everything beyond its alternatives.
#[derive(Debug, Clone)]
pub struct RuleDef {
    name: String,
    alts: Vec<AltDef>,
    fragment: bool,
    args: Option<String>,
    returns: Option<String>,
    locals: Option<String>,
    exceptions: Vec<ExceptionHandler>,
    finally_action: Option<String>,
    commands: Vec<(String, Option<String>)>,
}

impl RuleDef {
    pub fn new(name: &str, alts: impl IntoAlts) -> Self {
        Self {
            name: name.to_string(),
            alts: alts.into_alts(),
            fragment: false,
            args: None,
            returns: None,
            locals: None,
            exceptions: Vec::new(),
            finally_action: None,
            commands: Vec::new(),
        }
    }

    pub fn fragment(mut self) -> Self {
        self.fragment = true;
        self
    }

    pub fn args(mut self, args: &str) -> Self {
        self.args = Some(args.to_string());
        self
    }

    pub fn returns(mut self, returns: &str) -> Self {
        self.returns = Some(returns.to_string());
        self
    }

    pub fn locals(mut self, locals: &str) -> Self {
        self.locals = Some(locals.to_string());
        self
    }

    pub fn catch(mut self, arg: &str, action: &str) -> Self {
        self.exceptions.push(ExceptionHandler {
            catch_arg: arg.to_string(),
            action: action.to_string(),
        });
        self
    }

    pub fn finally(mut self, action: &str) -> Self {
        self.finally_action = Some(action.to_string());
        self
    }

    /// Lexer command without argument, e.g. `skip`.
    pub fn command(mut self, name: &str) -> Self {
        self.commands.push((name.to_string(), None));
        self
    }

    /// Lexer command with argument, e.g. `channel(HIDDEN)`.
    pub fn command_with(mut self, name: &str, arg: &str) -> Self {
        self.commands.push((name.to_string(), Some(arg.to_string())));
        self
    }
}

/// Collects rules and grammar-level declarations, then lowers them into a [`Grammar`].
#[derive(Debug)]
pub struct GrammarBuilder {
    name: String,
    kind: GrammarKind,
    options: GrammarOptions,
    tokens: Vec<String>,
    channels: Vec<String>,
    imports: Vec<String>,
    vocab: Option<Vocabulary>,
    rules: Vec<(RuleDef, String)>,
    current_mode: String,
    modes: Vec<String>,
    syntax_errors: Vec<String>,
}

impl GrammarBuilder {
    pub fn new(kind: GrammarKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            options: GrammarOptions::default(),
            tokens: Vec::new(),
            channels: Vec::new(),
            imports: Vec::new(),
            vocab: None,
            rules: Vec::new(),
            current_mode: DEFAULT_MODE.to_string(),
            modes: vec![DEFAULT_MODE.to_string()],
            syntax_errors: Vec::new(),
        }
    }

    pub fn parser(name: &str) -> Self {
        Self::new(GrammarKind::Parser, name)
    }

    pub fn lexer(name: &str) -> Self {
        Self::new(GrammarKind::Lexer, name)
    }

    pub fn combined(name: &str) -> Self {
        Self::new(GrammarKind::Combined, name)
    }

    pub fn options(mut self, options: GrammarOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tokens(mut self, names: &[&str]) -> Self {
        self.tokens.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn channels(mut self, names: &[&str]) -> Self {
        self.channels.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn import(mut self, name: &str) -> Self {
        self.imports.push(name.to_string());
        self
    }

    /// Pre-seeded vocabulary, e.g. from a `tokenVocab` file.
    pub fn vocabulary(mut self, vocab: Vocabulary) -> Self {
        self.vocab = Some(vocab);
        self
    }

    /// Start a lexer mode; following lexer rules belong to it.
    pub fn mode(mut self, name: &str) -> Self {
        if !self.modes.iter().any(|m| m == name) {
            self.modes.push(name.to_string());
        }
        self.current_mode = name.to_string();
        self
    }

    pub fn rule(self, name: &str, alts: impl IntoAlts) -> Self {
        self.rule_def(RuleDef::new(name, alts))
    }

    pub fn fragment(self, name: &str, alts: impl IntoAlts) -> Self {
        self.rule_def(RuleDef::new(name, alts).fragment())
    }

    pub fn rule_def(mut self, def: RuleDef) -> Self {
        let mode = self.current_mode.clone();
        self.rules.push((def, mode));
        self
    }

    /// Pass through an error reported by the grammar parser.
    pub fn syntax_error(mut self, message: &str) -> Self {
        self.syntax_errors.push(message.to_string());
        self
    }

    pub fn build(self) -> (Grammar, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let mut lower = Lowering {
            ast: GrammarAst::new(),
            offset: 0,
        };

        let mut grammar = Grammar::new(self.name.clone(), self.kind);
        grammar.options = self.options;
        grammar.channels = self.channels;
        grammar.modes = self.modes;
        grammar.range = lower.span(&self.name);
        if let Some(vocab) = self.vocab {
            grammar.vocab = vocab;
        }
        for message in &self.syntax_errors {
            let range = lower.span(message);
            diagnostics
                .report(DiagnosticKind::SyntaxError, range)
                .message(message.as_str())
                .emit();
        }
        for name in self.tokens {
            let range = lower.span(&name);
            grammar.tokens.push((name, range));
        }
        for name in self.imports {
            let range = lower.span(&name);
            grammar.imports.push((name, range));
        }

        let mut rules: IndexMap<String, Rule> = IndexMap::new();
        for (def, mode) in self.rules {
            let range = lower.span(&def.name);
            if let Some(existing) = rules.get(&def.name) {
                diagnostics
                    .report(DiagnosticKind::RuleRedefinition, range)
                    .message(def.name.as_str())
                    .related_to("first defined here", existing.range)
                    .in_rule(def.name.as_str())
                    .emit();
                continue;
            }
            let kind = RuleKind::from_name(&def.name);
            let block = lower.alts(&def.alts, kind == RuleKind::Lexer);
            let commands = def
                .commands
                .into_iter()
                .map(|(name, arg)| {
                    let range = lower.span(&name);
                    LexerCommand { name, arg, range }
                })
                .collect();
            rules.insert(
                def.name.clone(),
                Rule {
                    name: def.name,
                    index: rules.len(),
                    kind,
                    block,
                    range,
                    fragment: def.fragment,
                    mode,
                    commands,
                    args: def.args,
                    returns: def.returns,
                    locals: def.locals,
                    exceptions: def.exceptions,
                    finally_action: def.finally_action,
                    left_recursive: None,
                    excluded: false,
                },
            );
        }

        grammar.rules = rules;
        grammar.ast = lower.ast;
        (grammar, diagnostics)
    }
}

struct Lowering {
    ast: GrammarAst,
    offset: u32,
}

impl Lowering {
    fn span(&mut self, text: &str) -> TextRange {
        let len = text.len().max(1) as u32;
        let start = self.offset;
        self.offset += len + 1;
        TextRange::new(TextSize::from(start), TextSize::from(start + len))
    }

    fn add(&mut self, kind: NodeKind, text: &str) -> NodeId {
        let range = self.span(text);
        self.ast.add(kind, text, range)
    }

    fn alts(&mut self, alts: &[AltDef], lexer: bool) -> NodeId {
        let block = self.add(NodeKind::Block, "(");
        let children = alts.iter().map(|a| self.alt(a, lexer)).collect();
        self.ast.node_mut(block).children = children;
        block
    }

    fn alt(&mut self, def: &AltDef, lexer: bool) -> NodeId {
        let id = self.add(
            NodeKind::Alt {
                label: def.label.clone(),
                assoc: def.assoc,
            },
            "ALT",
        );
        let children = def.elems.iter().map(|e| self.elem(e, lexer)).collect();
        self.ast.node_mut(id).children = children;
        id
    }

    fn elem(&mut self, elem: &Elem, lexer: bool) -> NodeId {
        match elem {
            // Uppercase references in lexer rules call other lexer rules.
            Elem::Token(name) if lexer => self.add(
                NodeKind::RuleRef {
                    precedence: None,
                    args: None,
                },
                name,
            ),
            Elem::Token(name) => self.add(NodeKind::Terminal, name),
            Elem::Literal(text) => self.add(NodeKind::Terminal, text),
            Elem::Rule { name, .. } if !lexer && RuleKind::from_name(name) == RuleKind::Lexer => {
                self.add(NodeKind::Terminal, name)
            }
            Elem::Rule { name, args } => self.add(
                NodeKind::RuleRef {
                    precedence: None,
                    args: args.clone(),
                },
                name,
            ),
            Elem::Range(from, to) => {
                let id = self.add(NodeKind::Range, "..");
                let a = self.add(NodeKind::Terminal, from);
                let b = self.add(NodeKind::Terminal, to);
                self.ast.node_mut(id).children = vec![a, b];
                id
            }
            Elem::CharSet(text) => self.add(NodeKind::CharSet, text),
            Elem::Set(elems) => {
                let id = self.add(NodeKind::Set, "SET");
                let children = elems.iter().map(|e| self.set_elem(e)).collect();
                self.ast.node_mut(id).children = children;
                id
            }
            Elem::Not(inner) => {
                let id = self.add(NodeKind::NotSet, "~");
                let children = match inner.as_ref() {
                    Elem::Set(elems) => elems.iter().map(|e| self.set_elem(e)).collect(),
                    other => vec![self.set_elem(other)],
                };
                self.ast.node_mut(id).children = children;
                id
            }
            Elem::Wildcard => self.add(NodeKind::Wildcard, "."),
            Elem::Block(alts) => self.alts(alts, lexer),
            Elem::Optional(alts, greedy) => self.ebnf(NodeKind::Optional { greedy: *greedy }, "?", alts, lexer),
            Elem::Star(alts, greedy) => self.ebnf(NodeKind::Star { greedy: *greedy }, "*", alts, lexer),
            Elem::Plus(alts, greedy) => self.ebnf(NodeKind::Plus { greedy: *greedy }, "+", alts, lexer),
            Elem::Action(text) => self.add(NodeKind::Action, text),
            Elem::Predicate(text) => self.add(NodeKind::Predicate { precedence: None }, text),
            Elem::Labeled { name, list, elem } => {
                let id = self.elem(elem, lexer);
                self.ast.node_mut(id).label = Some(ElementLabel {
                    name: name.clone(),
                    list: *list,
                });
                id
            }
        }
    }

    /// Set members keep references as terminals so the checker can reject them.
    fn set_elem(&mut self, elem: &Elem) -> NodeId {
        match elem {
            Elem::Token(name) | Elem::Rule { name, .. } => self.add(NodeKind::Terminal, name),
            other => self.elem(other, false),
        }
    }

    fn ebnf(&mut self, kind: NodeKind, text: &str, alts: &[AltDef], lexer: bool) -> NodeId {
        let id = self.add(kind, text);
        let block = self.alts(alts, lexer);
        self.ast.node_mut(id).children = vec![block];
        id
    }
}
