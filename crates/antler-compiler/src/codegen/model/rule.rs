//! Rule functions and their context structs.

use serde::Serialize;

use super::decl::{Decl, add_unique};
use super::ops::Op;
use crate::atn::StateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DispatchMethod {
    ListenerEnter,
    ListenerExit,
    Visitor,
}

/// Context type of a rule, or of one alternative label of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructDecl {
    pub name: String,
    /// Rule the context belongs to.
    pub derived_from_name: String,
    /// Set for alternative-label contexts.
    pub alt_label: Option<String>,
    /// Outermost alternatives sharing this label.
    pub alt_nums: Vec<usize>,
    /// The rule context is a base that label contexts copy from.
    pub provide_copy_from: bool,
    pub attrs: Vec<Decl>,
    pub getters: Vec<Decl>,
    /// Signature-only forms of `getters`, for interface-style targets.
    pub signatures: Vec<Decl>,
    pub ctor_attrs: Vec<Decl>,
    pub dispatch_methods: Vec<DispatchMethod>,
}

impl StructDecl {
    pub fn new(name: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            derived_from_name: rule.into(),
            alt_label: None,
            alt_nums: Vec::new(),
            provide_copy_from: false,
            attrs: Vec::new(),
            getters: Vec::new(),
            signatures: Vec::new(),
            ctor_attrs: Vec::new(),
            dispatch_methods: Vec::new(),
        }
    }

    pub fn add_decl(&mut self, decl: Decl) {
        if decl.is_getter() {
            add_unique(&mut self.signatures, decl.with_signature(true));
            add_unique(&mut self.getters, decl);
        } else {
            add_unique(&mut self.attrs, decl);
        }
    }

    pub(crate) fn set_dispatch(&mut self, listener: bool, visitor: bool) {
        self.dispatch_methods.clear();
        if listener {
            self.dispatch_methods.push(DispatchMethod::ListenerEnter);
            self.dispatch_methods.push(DispatchMethod::ListenerExit);
        }
        if visitor {
            self.dispatch_methods.push(DispatchMethod::Visitor);
        }
    }

    pub fn getter(&self, name: &str) -> Option<&Decl> {
        self.getters.iter().find(|d| d.name() == name)
    }

    pub fn attr(&self, name: &str) -> Option<&Decl> {
        self.attrs.iter().find(|d| d.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionClause {
    pub catch_arg: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFunction {
    pub name: String,
    pub index: usize,
    pub ctx_type: String,
    pub start_state: StateId,
    pub args: Vec<Decl>,
    /// Function-local temporaries such as `_la`.
    pub locals: Vec<Decl>,
    pub rule_ctx: StructDecl,
    pub alt_label_ctxs: Vec<StructDecl>,
    pub code: Vec<Op>,
    pub exceptions: Vec<ExceptionClause>,
    pub finally_action: Option<String>,
    pub left_recursive: bool,
    /// The body contains a generic loop that needs adaptive prediction.
    pub has_lookahead_block: bool,
}

impl RuleFunction {
    pub fn alt_label_ctx(&self, label: &str) -> Option<&StructDecl> {
        self.alt_label_ctxs
            .iter()
            .find(|s| s.alt_label.as_deref() == Some(label))
    }
}

/// Semantic predicates of one rule, dispatched by predicate index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSempredFunction {
    pub name: String,
    pub rule_index: usize,
    pub ctx_type: String,
    /// `(pred_index, predicate text)` in index order. Precedence predicates
    /// have the text `precpred(p)`.
    pub preds: Vec<(usize, String)>,
}
