//! Source operations: the statements of a rule function body.

use serde::Serialize;

use super::choice::Choice;
use super::test_set::TestSetInline;
use crate::atn::StateId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op")]
pub enum Op {
    Choice(Box<Choice>),
    /// Inlined single-alternative block.
    CodeBlock(CodeBlockForAlt),
    MatchToken(MatchToken),
    /// Set match; `invert` makes it a not-set match.
    MatchSet(MatchSet),
    Wildcard(Wildcard),
    InvokeRule(InvokeRule),
    Action(Action),
    SemPred(SemPred),
    PrecedencePredicate(PrecedencePredicate),
    CaptureNextTokenType(CaptureNextTokenType),
    AddToLabelList(AddToLabelList),
    RecRuleReplaceContext(RecRuleReplaceContext),
    /// Record the stop token after the primary block of a left-recursive rule.
    RecRuleSetStopToken,
    /// Remember the previous context at the top of each operator iteration.
    RecRuleSetPrevCtx,
    RecRuleAltStart(RecRuleAltStart),
}

impl Op {
    /// Labels assigned by a matcher or rule invocation.
    pub fn labels(&self) -> &[String] {
        match self {
            Op::MatchToken(m) => &m.labels,
            Op::MatchSet(m) => &m.labels,
            Op::Wildcard(m) => &m.labels,
            Op::InvokeRule(m) => &m.labels,
            _ => &[],
        }
    }

    pub(crate) fn labels_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Op::MatchToken(m) => Some(&mut m.labels),
            Op::MatchSet(m) => Some(&mut m.labels),
            Op::Wildcard(m) => Some(&mut m.labels),
            Op::InvokeRule(m) => Some(&mut m.labels),
            _ => None,
        }
    }
}

/// The code of one alternative. Outermost alternatives of a rule carry their
/// 1-based number and label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeBlockForAlt {
    pub alt_num: Option<usize>,
    pub alt_label: Option<String>,
    pub ops: Vec<Op>,
}

impl CodeBlockForAlt {
    pub fn is_outer_most(&self) -> bool {
        self.alt_num.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchToken {
    pub state_number: StateId,
    pub ttype: i32,
    pub name: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSet {
    pub state_number: StateId,
    pub invert: bool,
    pub expr: TestSetInline,
    pub capture: CaptureNextTokenType,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wildcard {
    pub state_number: StateId,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvokeRule {
    pub state_number: StateId,
    pub name: String,
    pub ctx_name: String,
    /// Argument expressions, with the precedence argument last for calls
    /// into left-recursive rules.
    pub args: Option<String>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub state_number: Option<StateId>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemPred {
    pub state_number: StateId,
    pub rule_index: usize,
    pub pred_index: usize,
    pub predicate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrecedencePredicate {
    pub state_number: StateId,
    pub rule_index: usize,
    pub pred_index: usize,
    pub precedence: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureNextTokenType {
    pub var_name: String,
}

impl CaptureNextTokenType {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }
}

/// `list_name.add(label)` for `xs+=` labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToLabelList {
    pub list_name: String,
    pub label: String,
}

/// Switch to the labeled context of a primary alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecRuleReplaceContext {
    pub ctx_name: String,
}

/// Start of an operator alternative: push a new context wrapping the
/// previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecRuleAltStart {
    pub rule_name: String,
    pub ctx_name: String,
    pub alt_label: Option<String>,
    /// Label of the removed leftmost self reference.
    pub label: Option<String>,
    pub is_list_label: bool,
}
