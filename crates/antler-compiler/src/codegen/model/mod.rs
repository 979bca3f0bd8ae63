//! Output model types.
//!
//! A tree of plain values, owned top-down from an [`OutputFile`]. Nodes keep
//! ATN state numbers and names, never references into the grammar.

mod choice;
mod decl;
mod ops;
mod rule;
mod test_set;

pub use choice::{Choice, ChoiceKind, Loop, RecognitionErrorKind, ThrowRecognitionError};
pub use decl::{Decl, parse_attributes};
pub use ops::{
    Action, AddToLabelList, CaptureNextTokenType, CodeBlockForAlt, InvokeRule, MatchSet,
    MatchToken, Op, PrecedencePredicate, RecRuleAltStart, RecRuleReplaceContext, SemPred,
    Wildcard,
};
pub use rule::{DispatchMethod, ExceptionClause, RuleFunction, RuleSempredFunction, StructDecl};
pub use test_set::{Bitset, TestSetInline, TokenInfo};

pub(crate) use decl::add_unique;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "file")]
pub enum OutputFile {
    Parser(ParserFile),
    Lexer(LexerFile),
}

impl OutputFile {
    pub fn as_parser(&self) -> Option<&ParserFile> {
        match self {
            OutputFile::Parser(f) => Some(f),
            OutputFile::Lexer(_) => None,
        }
    }

    pub fn as_lexer(&self) -> Option<&LexerFile> {
        match self {
            OutputFile::Lexer(f) => Some(f),
            OutputFile::Parser(_) => None,
        }
    }

    /// Pretty-printed JSON, the form JSON-driven template engines consume.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDef {
    pub name: String,
    pub ttype: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserFile {
    pub grammar_name: String,
    pub package: Option<String>,
    pub parser: Parser,
    pub listener: Option<ListenerFile>,
    pub visitor: Option<VisitorFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parser {
    pub name: String,
    pub grammar_name: String,
    pub superclass: Option<String>,
    pub tokens: Vec<TokenDef>,
    pub literal_names: Vec<Option<String>>,
    pub symbolic_names: Vec<Option<String>>,
    pub rule_names: Vec<String>,
    pub funcs: Vec<RuleFunction>,
    pub sempred_funcs: Vec<RuleSempredFunction>,
    pub atn_states: usize,
    pub decisions: usize,
}

impl Parser {
    pub fn func(&self, name: &str) -> Option<&RuleFunction> {
        self.funcs.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexerFile {
    pub grammar_name: String,
    pub package: Option<String>,
    pub lexer: Lexer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lexer {
    pub name: String,
    pub grammar_name: String,
    pub tokens: Vec<TokenDef>,
    /// User-defined channels, numbered from 2.
    pub channels: Vec<String>,
    pub modes: Vec<String>,
    pub rule_names: Vec<String>,
    pub literal_names: Vec<Option<String>>,
    pub symbolic_names: Vec<Option<String>>,
    /// Lexer action table, rendered (`skip`, `channel(2)`, ...).
    pub actions: Vec<String>,
    pub sempred_funcs: Vec<RuleSempredFunction>,
}

/// One enter/exit (or visit) method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerEntry {
    /// Rule name, or alternative label.
    pub name: String,
    pub rule_name: String,
    pub ctx_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerFile {
    pub grammar_name: String,
    pub parser_name: String,
    pub package: Option<String>,
    pub entries: Vec<ListenerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorFile {
    pub grammar_name: String,
    pub parser_name: String,
    pub package: Option<String>,
    pub entries: Vec<ListenerEntry>,
}
