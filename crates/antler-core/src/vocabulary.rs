//! Token vocabulary: symbolic names, literal aliases and display names.

use indexmap::IndexMap;
use serde::Serialize;

use crate::token::{EOF, INVALID_TYPE, MIN_USER_TOKEN_TYPE};

/// Bidirectional map between token types and their names.
///
/// Types are handed out densely from [`MIN_USER_TOKEN_TYPE`] in definition
/// order. A literal (`'+'`) either owns an implicit type or aliases the
/// named token whose lexer rule is exactly that literal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Vocabulary {
    names: IndexMap<String, i32>,
    literals: IndexMap<String, i32>,
    max_token_type: i32,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self {
            names: IndexMap::new(),
            literals: IndexMap::new(),
            max_token_type: MIN_USER_TOKEN_TYPE - 1,
        }
    }

    /// Define a symbolic token, returning its (possibly existing) type.
    pub fn define_name(&mut self, name: &str) -> i32 {
        if let Some(&ttype) = self.names.get(name) {
            return ttype;
        }
        let ttype = self.next_type();
        self.names.insert(name.to_string(), ttype);
        ttype
    }

    /// Define a literal, returning its (possibly existing) type.
    pub fn define_literal(&mut self, literal: &str) -> i32 {
        if let Some(&ttype) = self.literals.get(literal) {
            return ttype;
        }
        let ttype = self.next_type();
        self.literals.insert(literal.to_string(), ttype);
        ttype
    }

    /// Make `literal` match the same type as the token `name`.
    pub fn alias_literal(&mut self, literal: &str, name: &str) -> Option<i32> {
        let ttype = *self.names.get(name)?;
        self.literals.insert(literal.to_string(), ttype);
        Some(ttype)
    }

    fn next_type(&mut self) -> i32 {
        self.max_token_type += 1;
        self.max_token_type
    }

    pub fn token_type(&self, name: &str) -> Option<i32> {
        if name == "EOF" {
            return Some(EOF);
        }
        self.names.get(name).copied()
    }

    pub fn literal_type(&self, literal: &str) -> Option<i32> {
        self.literals.get(literal).copied()
    }

    pub fn max_token_type(&self) -> i32 {
        self.max_token_type
    }

    /// Symbolic name for `ttype`, if any.
    pub fn symbolic_name(&self, ttype: i32) -> Option<&str> {
        if ttype == EOF {
            return Some("EOF");
        }
        self.names
            .iter()
            .find(|(_, t)| **t == ttype)
            .map(|(n, _)| n.as_str())
    }

    pub fn literal_name(&self, ttype: i32) -> Option<&str> {
        self.literals
            .iter()
            .find(|(_, t)| **t == ttype)
            .map(|(l, _)| l.as_str())
    }

    /// Name used in diagnostics and lookahead label lists.
    pub fn display_name(&self, ttype: i32) -> String {
        if let Some(name) = self.symbolic_name(ttype) {
            return name.to_string();
        }
        if let Some(lit) = self.literal_name(ttype) {
            return lit.to_string();
        }
        if ttype == INVALID_TYPE {
            return "<INVALID>".to_string();
        }
        ttype.to_string()
    }

    pub fn names(&self) -> impl Iterator<Item = (&str, i32)> {
        self.names.iter().map(|(n, t)| (n.as_str(), *t))
    }

    pub fn literals(&self) -> impl Iterator<Item = (&str, i32)> {
        self.literals.iter().map(|(l, t)| (l.as_str(), *t))
    }

    /// Symbolic names indexed by token type; `None` where a type only has a literal.
    pub fn symbolic_names(&self) -> Vec<Option<String>> {
        (0..=self.max_token_type.max(0))
            .map(|t| {
                if t == INVALID_TYPE {
                    None
                } else {
                    self.symbolic_name(t).map(str::to_string)
                }
            })
            .collect()
    }

    /// Literal names indexed by token type.
    pub fn literal_names(&self) -> Vec<Option<String>> {
        (0..=self.max_token_type.max(0))
            .map(|t| self.literal_name(t).map(str::to_string))
            .collect()
    }
}
