//! Augmented transition network.
//!
//! States live in one arena indexed by [`StateId`]; transitions refer to
//! their targets by index. The graph is cyclic (loops, recursive rule calls),
//! so every traversal goes through [`Atn::visit`] or keeps its own visited set.

mod build;
mod dump;
mod verify;


use antler_core::IntervalSet;
use antler_core::token::{MAX_CHAR_VALUE, MIN_CHAR_VALUE, MIN_USER_TOKEN_TYPE};
use indexmap::IndexMap;
use serde::Serialize;

use crate::grammar::NodeId;

pub use build::build_atn;
pub use dump::AtnPrinter;
pub use verify::verify;

/// Index into `Atn::states`; doubles as the state number.
pub type StateId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AtnKind {
    Lexer,
    Parser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    Basic,
    Star,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StateKind {
    Basic,
    RuleStart,
    RuleStop,
    BlockStart(BlockKind),
    BlockEnd,
    StarLoopEntry,
    StarLoopBack,
    PlusLoopBack,
    LoopEnd,
    /// Lexer mode entry.
    TokenStart,
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StateKind::Basic => "Basic",
            StateKind::RuleStart => "RuleStart",
            StateKind::RuleStop => "RuleStop",
            StateKind::BlockStart(BlockKind::Basic) => "BlockStart",
            StateKind::BlockStart(BlockKind::Star) => "StarBlockStart",
            StateKind::BlockStart(BlockKind::Plus) => "PlusBlockStart",
            StateKind::BlockEnd => "BlockEnd",
            StateKind::StarLoopEntry => "StarLoopEntry",
            StateKind::StarLoopBack => "StarLoopBack",
            StateKind::PlusLoopBack => "PlusLoopBack",
            StateKind::LoopEnd => "LoopEnd",
            StateKind::TokenStart => "TokenStart",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransitionKind {
    Epsilon,
    Atom(i32),
    Range(i32, i32),
    Set(IntervalSet),
    NotSet(IntervalSet),
    Wildcard,
    /// Call into `rule_index`; matching resumes at `follow`.
    Rule {
        rule_index: usize,
        precedence: i32,
        follow: StateId,
    },
    Predicate {
        rule_index: usize,
        pred_index: usize,
    },
    /// `{precpred(_ctx, p)}?` injected by left recursion rewriting.
    Precedence(i32),
    /// Parser actions have no index; lexer commands index `Atn::lexer_actions`.
    Action {
        rule_index: usize,
        action_index: Option<usize>,
    },
}

impl TransitionKind {
    /// Transitions that consume no input.
    pub fn is_epsilon(&self) -> bool {
        matches!(
            self,
            TransitionKind::Epsilon
                | TransitionKind::Rule { .. }
                | TransitionKind::Predicate { .. }
                | TransitionKind::Precedence(_)
                | TransitionKind::Action { .. }
        )
    }

    /// Symbols matched, before complementing a `NotSet`. `None` for epsilon
    /// and wildcard transitions.
    pub fn label(&self) -> Option<IntervalSet> {
        match self {
            TransitionKind::Atom(t) => Some(IntervalSet::of(*t)),
            TransitionKind::Range(a, b) => Some(IntervalSet::of_range(*a, *b)),
            TransitionKind::Set(set) | TransitionKind::NotSet(set) => Some(set.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub target: StateId,
    pub kind: TransitionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtnState {
    pub number: StateId,
    pub kind: StateKind,
    /// `None` only for mode entries and the shared EOF target.
    pub rule_index: Option<usize>,
    pub transitions: Vec<Transition>,
    pub decision: Option<usize>,
    pub non_greedy: bool,
    /// Block start to its block end; rule start to its rule stop.
    pub end_state: Option<StateId>,
    /// Block end back to its block start.
    pub start_state: Option<StateId>,
    /// Star entry, plus block start and loop end to the loop-back state.
    pub loop_back: Option<StateId>,
    #[serde(skip)]
    pub ast: Option<NodeId>,
}

impl AtnState {
    pub fn is_decision(&self) -> bool {
        self.decision.is_some()
    }
}

/// One lexer command, deduplicated across the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum LexerAction {
    Skip,
    More,
    PopMode,
    Channel(i32),
    Mode(usize),
    PushMode(usize),
    Type(i32),
}

impl std::fmt::Display for LexerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexerAction::Skip => write!(f, "skip"),
            LexerAction::More => write!(f, "more"),
            LexerAction::PopMode => write!(f, "popMode"),
            LexerAction::Channel(c) => write!(f, "channel({c})"),
            LexerAction::Mode(m) => write!(f, "mode({m})"),
            LexerAction::PushMode(m) => write!(f, "pushMode({m})"),
            LexerAction::Type(t) => write!(f, "type({t})"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Atn {
    pub kind: AtnKind,
    pub states: Vec<AtnState>,
    /// Indexed by rule index.
    pub rule_to_start: Vec<StateId>,
    pub rule_to_stop: Vec<StateId>,
    /// Token type produced by each lexer rule; 0 for fragments and parser rules.
    pub rule_to_token_type: Vec<i32>,
    /// Indexed by decision number.
    pub decision_to_state: Vec<StateId>,
    pub mode_to_start: IndexMap<String, StateId>,
    pub max_token_type: i32,
    pub lexer_actions: Vec<LexerAction>,
}

impl Atn {
    pub fn new(kind: AtnKind, max_token_type: i32) -> Self {
        Self {
            kind,
            states: Vec::new(),
            rule_to_start: Vec::new(),
            rule_to_stop: Vec::new(),
            rule_to_token_type: Vec::new(),
            decision_to_state: Vec::new(),
            mode_to_start: IndexMap::new(),
            max_token_type,
            lexer_actions: Vec::new(),
        }
    }

    pub fn add_state(&mut self, kind: StateKind, rule_index: Option<usize>, ast: Option<NodeId>) -> StateId {
        let number = self.states.len() as StateId;
        self.states.push(AtnState {
            number,
            kind,
            rule_index,
            transitions: Vec::new(),
            decision: None,
            non_greedy: false,
            end_state: None,
            start_state: None,
            loop_back: None,
            ast,
        });
        number
    }

    pub fn state(&self, id: StateId) -> &AtnState {
        &self.states[id as usize]
    }

    pub fn state_mut(&mut self, id: StateId) -> &mut AtnState {
        &mut self.states[id as usize]
    }

    pub fn get(&self, id: StateId) -> Option<&AtnState> {
        self.states.get(id as usize)
    }

    pub fn add_transition(&mut self, from: StateId, target: StateId, kind: TransitionKind) {
        self.state_mut(from).transitions.push(Transition { target, kind });
    }

    /// Make `state` a decision; numbers are handed out in creation order.
    pub fn define_decision(&mut self, state: StateId) -> usize {
        let decision = self.decision_to_state.len();
        self.decision_to_state.push(state);
        self.state_mut(state).decision = Some(decision);
        decision
    }

    pub fn decision_state(&self, decision: usize) -> Option<&AtnState> {
        self.decision_to_state
            .get(decision)
            .map(|&id| self.state(id))
    }

    pub fn num_decisions(&self) -> usize {
        self.decision_to_state.len()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Smallest and largest symbol this ATN can match.
    pub fn vocabulary_bounds(&self) -> (i32, i32) {
        match self.kind {
            AtnKind::Lexer => (MIN_CHAR_VALUE, MAX_CHAR_VALUE),
            AtnKind::Parser => (MIN_USER_TOKEN_TYPE, self.max_token_type),
        }
    }

    /// Depth-first walk from `start`, following transitions in order and
    /// calling `f` once per reachable state. Rule transitions are followed
    /// into the callee and to the follow state.
    pub fn visit(&self, start: StateId, mut f: impl FnMut(&AtnState)) {
        let mut visited = vec![false; self.states.len()];
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(seen) = visited.get_mut(id as usize) else {
                continue;
            };
            if *seen {
                continue;
            }
            *seen = true;
            let state = self.state(id);
            f(state);
            for t in state.transitions.iter().rev() {
                if let TransitionKind::Rule { follow, .. } = t.kind {
                    stack.push(follow);
                }
                stack.push(t.target);
            }
        }
    }

    /// States reachable from `start`, in visit order.
    pub fn reachable(&self, start: StateId) -> Vec<StateId> {
        let mut out = Vec::new();
        self.visit(start, |s| out.push(s.number));
        out
    }
}
