//! Decision blocks and loops.

use antler_core::IntervalSet;
use serde::Serialize;

use super::ops::{CodeBlockForAlt, Op};
use super::test_set::TestSetInline;
use crate::atn::StateId;

/// A decision over `alts`, numbered by its ATN decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub kind: ChoiceKind,
    pub decision: usize,
    pub state_number: StateId,
    pub alts: Vec<CodeBlockForAlt>,
    /// Ops run before deciding, e.g. capturing the next token type.
    pub preamble: Vec<Op>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ChoiceKind {
    /// Predicted at runtime.
    AltBlock,
    /// `alt_look[i]` holds the token names that select alternative `i + 1`.
    Ll1AltBlock {
        alt_look: Vec<Vec<String>>,
        error: ThrowRecognitionError,
    },
    /// `( A | B )?` with disjoint lookahead; the last entry of `alt_look` is
    /// the bypass.
    Ll1OptionalBlock {
        alt_look: Vec<Vec<String>>,
        error: ThrowRecognitionError,
    },
    Ll1OptionalBlockSingleAlt {
        expr: TestSetInline,
        follow_expr: TestSetInline,
        error: ThrowRecognitionError,
    },
    OptionalBlock,
    StarBlock {
        looping: Loop,
    },
    PlusBlock {
        looping: Loop,
        block_start_state: StateId,
        error: ThrowRecognitionError,
    },
    Ll1StarBlockSingleAlt {
        looping: Loop,
        loop_expr: TestSetInline,
    },
    Ll1PlusBlockSingleAlt {
        looping: Loop,
        block_start_state: StateId,
        loop_expr: TestSetInline,
    },
}

impl ChoiceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChoiceKind::AltBlock => "AltBlock",
            ChoiceKind::Ll1AltBlock { .. } => "LL1AltBlock",
            ChoiceKind::Ll1OptionalBlock { .. } => "LL1OptionalBlock",
            ChoiceKind::Ll1OptionalBlockSingleAlt { .. } => "LL1OptionalBlockSingleAlt",
            ChoiceKind::OptionalBlock => "OptionalBlock",
            ChoiceKind::StarBlock { .. } => "StarBlock",
            ChoiceKind::PlusBlock { .. } => "PlusBlock",
            ChoiceKind::Ll1StarBlockSingleAlt { .. } => "LL1StarBlockSingleAlt",
            ChoiceKind::Ll1PlusBlockSingleAlt { .. } => "LL1PlusBlockSingleAlt",
        }
    }

    pub fn is_ll1(&self) -> bool {
        matches!(
            self,
            ChoiceKind::Ll1AltBlock { .. }
                | ChoiceKind::Ll1OptionalBlock { .. }
                | ChoiceKind::Ll1OptionalBlockSingleAlt { .. }
                | ChoiceKind::Ll1StarBlockSingleAlt { .. }
                | ChoiceKind::Ll1PlusBlockSingleAlt { .. }
        )
    }

    pub fn looping(&self) -> Option<&Loop> {
        match self {
            ChoiceKind::StarBlock { looping }
            | ChoiceKind::PlusBlock { looping, .. }
            | ChoiceKind::Ll1StarBlockSingleAlt { looping, .. }
            | ChoiceKind::Ll1PlusBlockSingleAlt { looping, .. } => Some(looping),
            _ => None,
        }
    }

    pub fn looping_mut(&mut self) -> Option<&mut Loop> {
        match self {
            ChoiceKind::StarBlock { looping }
            | ChoiceKind::PlusBlock { looping, .. }
            | ChoiceKind::Ll1StarBlockSingleAlt { looping, .. }
            | ChoiceKind::Ll1PlusBlockSingleAlt { looping, .. } => Some(looping),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ThrowRecognitionError> {
        match self {
            ChoiceKind::Ll1AltBlock { error, .. }
            | ChoiceKind::Ll1OptionalBlock { error, .. }
            | ChoiceKind::Ll1OptionalBlockSingleAlt { error, .. }
            | ChoiceKind::PlusBlock { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Shared part of star and plus loops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loop {
    /// Star loop entry, or the plus block start.
    pub loop_entry_state: StateId,
    pub loop_back_state: StateId,
    /// Alternative that leaves the loop: 1 when non-greedy, else one past
    /// the last alternative.
    pub exit_alt: usize,
    /// Ops run at the end of every iteration.
    pub iteration: Vec<Op>,
}

impl Loop {
    pub fn new(
        loop_entry_state: StateId,
        loop_back_state: StateId,
        alts: usize,
        greedy: bool,
    ) -> Self {
        Self {
            loop_entry_state,
            loop_back_state,
            exit_alt: if greedy { alts + 1 } else { 1 },
            iteration: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecognitionErrorKind {
    NoViableAlt,
    EarlyExit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThrowRecognitionError {
    pub kind: RecognitionErrorKind,
    pub rule_index: usize,
    /// Source offset of the grammar construct.
    pub offset: u32,
    pub expecting: Option<IntervalSet>,
}
