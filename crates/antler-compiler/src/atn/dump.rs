//! Text dump of an ATN for snapshot testing and debugging.

use std::fmt;

use antler_core::IntervalSet;

use super::{Atn, AtnKind, AtnState, TransitionKind};
use crate::grammar::Grammar;

/// Printer for `Atn`, one line per state grouped by rule.
pub struct AtnPrinter<'a> {
    atn: &'a Atn,
    grammar: &'a Grammar,
    rule: Option<&'a str>,
}

impl<'a> AtnPrinter<'a> {
    pub fn new(atn: &'a Atn, grammar: &'a Grammar) -> Self {
        Self {
            atn,
            grammar,
            rule: None,
        }
    }

    /// Print only the states of one rule.
    pub fn only_rule(mut self, name: &'a str) -> Self {
        self.rule = Some(name);
        self
    }

    pub fn dump(&self) -> String {
        self.to_string()
    }

    fn format_state(&self, w: &mut fmt::Formatter<'_>, state: &AtnState) -> fmt::Result {
        write!(w, "  s{} {}", state.number, state.kind)?;
        if let Some(decision) = state.decision {
            write!(w, " d{decision}")?;
        }
        if state.non_greedy {
            write!(w, " lazy")?;
        }
        for (i, t) in state.transitions.iter().enumerate() {
            w.write_str(if i == 0 { ": " } else { " | " })?;
            match &t.kind {
                TransitionKind::Epsilon => write!(w, "-> s{}", t.target)?,
                TransitionKind::Rule {
                    rule_index,
                    precedence,
                    follow,
                } => {
                    let name = self
                        .grammar
                        .rule_by_index(*rule_index)
                        .map_or("?", |r| r.name.as_str());
                    write!(w, "-{name}")?;
                    if *precedence != 0 {
                        write!(w, "<p={precedence}>")?;
                    }
                    write!(w, "-> s{} ret s{follow}", t.target)?;
                }
                other => write!(w, "-{}-> s{}", self.label(other), t.target)?,
            }
        }
        writeln!(w)
    }

    fn label(&self, kind: &TransitionKind) -> String {
        match kind {
            TransitionKind::Atom(t) => self.symbol(*t),
            TransitionKind::Range(a, b) => format!("{}..{}", self.symbol(*a), self.symbol(*b)),
            TransitionKind::Set(set) => self.set(set),
            TransitionKind::NotSet(set) => format!("~{}", self.set(set)),
            TransitionKind::Wildcard => ".".to_string(),
            TransitionKind::Predicate { pred_index, .. } => format!("pred{pred_index}"),
            TransitionKind::Precedence(p) => format!("prec>={p}"),
            TransitionKind::Action {
                action_index: Some(i),
                ..
            } => match self.atn.lexer_actions.get(*i) {
                Some(action) => format!("{{{action}}}"),
                None => format!("{{action {i}}}"),
            },
            TransitionKind::Action { .. } => "{}".to_string(),
            TransitionKind::Epsilon | TransitionKind::Rule { .. } => String::new(),
        }
    }

    fn set(&self, set: &IntervalSet) -> String {
        set.to_string_with(|t| self.symbol(t))
    }

    fn symbol(&self, t: i32) -> String {
        if self.atn.kind == AtnKind::Parser || t == antler_core::token::EOF {
            return self.grammar.vocab.display_name(t);
        }
        match char::from_u32(t as u32) {
            Some(c) if c.is_ascii_graphic() || c == ' ' => format!("'{c}'"),
            _ => format!("'\\u{{{t:x}}}'"),
        }
    }
}

impl fmt::Display for AtnPrinter<'_> {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rule.is_none() {
            let global: Vec<&AtnState> = self
                .atn
                .states
                .iter()
                .filter(|s| s.rule_index.is_none())
                .collect();
            if !global.is_empty() {
                writeln!(w, "(global):")?;
                for state in global {
                    self.format_state(w, state)?;
                }
            }
        }

        for rule in self.grammar.rules.values() {
            if self.rule.is_some_and(|name| name != rule.name) {
                continue;
            }
            writeln!(w, "{}:", rule.name)?;
            for state in self
                .atn
                .states
                .iter()
                .filter(|s| s.rule_index == Some(rule.index))
            {
                self.format_state(w, state)?;
            }
        }
        Ok(())
    }
}
