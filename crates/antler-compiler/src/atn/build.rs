//! ATN construction from rule bodies.
//!
//! Each construct is built from its parts first and then wrapped, so states
//! and decisions are numbered in post-order: the alternatives of a block get
//! lower numbers than the block's start state. Every AST node that matches or
//! decides is stamped with the state it produced.

use antler_core::IntervalSet;
use antler_core::token::{EOF, INVALID_TYPE};

use super::{
    Atn, AtnKind, BlockKind, LexerAction, StateId, StateKind, Transition, TransitionKind,
};
use crate::grammar::charset::{decode_literal, parse_char_set, with_both_cases};
use crate::grammar::{Grammar, LexerCommand, NodeId, NodeKind};

/// Entry and exit state of a built fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Handle {
    left: StateId,
    right: StateId,
}

struct RulePlan {
    index: usize,
    block: NodeId,
    excluded: bool,
    lexer: bool,
    fragment: bool,
    mode: String,
    commands: Vec<LexerCommand>,
    token_type: i32,
}

/// Build the ATN for every rule of `grammar`, stamping AST nodes and
/// numbering semantic predicates along the way.
///
/// Excluded rules keep their start and stop states joined by a single
/// epsilon edge, so references to them stay well formed.
pub fn build_atn(grammar: &mut Grammar) -> Atn {
    let kind = if grammar.is_lexer() {
        AtnKind::Lexer
    } else {
        AtnKind::Parser
    };
    let atn = Atn::new(kind, grammar.vocab.max_token_type());
    grammar.ast.clear_atn_states();
    grammar.sempreds.clear();

    let plans: Vec<RulePlan> = grammar
        .rules
        .values()
        .map(|r| RulePlan {
            index: r.index,
            block: r.block,
            excluded: r.excluded,
            lexer: r.is_lexer(),
            fragment: r.fragment,
            mode: r.mode.clone(),
            commands: r.commands.clone(),
            token_type: if r.is_lexer() && !r.fragment {
                grammar.vocab.token_type(&r.name).unwrap_or(INVALID_TYPE)
            } else {
                INVALID_TYPE
            },
        })
        .collect();

    let mut factory = AtnFactory {
        case_insensitive: grammar.options.case_insensitive,
        grammar,
        atn,
        current_rule: 0,
    };

    if kind == AtnKind::Lexer {
        factory.create_mode_start_states();
    }
    factory.create_rule_start_and_stop_states(&plans);

    for plan in &plans {
        factory.current_rule = plan.index;
        let start = factory.atn.rule_to_start[plan.index];
        let stop = factory.atn.rule_to_stop[plan.index];
        if plan.excluded {
            factory.epsilon(start, stop);
            continue;
        }
        let mut body = factory.block(plan.block, None);
        if plan.lexer && !plan.commands.is_empty() {
            let mut parts = vec![body];
            for command in &plan.commands {
                if let Some(action) = factory.lexer_action(command) {
                    parts.push(factory.lexer_command(action));
                }
            }
            body = factory.elem_list(&parts);
        }
        factory.epsilon(start, body.left);
        factory.epsilon(body.right, stop);
    }

    match kind {
        AtnKind::Lexer => factory.link_mode_start_states(&plans),
        AtnKind::Parser => {
            factory.add_rule_follow_links();
            factory.add_eof_transition_to_start_rules();
        }
    }

    let AtnFactory { grammar, atn, .. } = factory;
    log::debug!(
        target: "antler::atn",
        "built ATN for `{}`: {} states, {} decisions",
        grammar.name,
        atn.len(),
        atn.num_decisions()
    );
    atn
}

struct AtnFactory<'g> {
    grammar: &'g mut Grammar,
    atn: Atn,
    current_rule: usize,
    case_insensitive: bool,
}

impl AtnFactory<'_> {
    fn new_state(&mut self, kind: StateKind, ast: Option<NodeId>) -> StateId {
        self.atn.add_state(kind, Some(self.current_rule), ast)
    }

    fn stamp(&mut self, node: NodeId, state: StateId) {
        self.grammar.ast.node_mut(node).atn_state = Some(state);
    }

    fn epsilon(&mut self, from: StateId, to: StateId) {
        self.atn.add_transition(from, to, TransitionKind::Epsilon);
    }

    fn epsilon_first(&mut self, from: StateId, to: StateId) {
        self.atn.state_mut(from).transitions.insert(
            0,
            Transition {
                target: to,
                kind: TransitionKind::Epsilon,
            },
        );
    }

    fn create_mode_start_states(&mut self) {
        let modes = self.grammar.modes.clone();
        for mode in modes {
            let start = self.atn.add_state(StateKind::TokenStart, None, None);
            self.atn.mode_to_start.insert(mode, start);
            self.atn.define_decision(start);
        }
    }

    fn create_rule_start_and_stop_states(&mut self, plans: &[RulePlan]) {
        for plan in plans {
            let start = self
                .atn
                .add_state(StateKind::RuleStart, Some(plan.index), Some(plan.block));
            let stop = self
                .atn
                .add_state(StateKind::RuleStop, Some(plan.index), Some(plan.block));
            self.atn.state_mut(start).end_state = Some(stop);
            self.atn.rule_to_start.push(start);
            self.atn.rule_to_stop.push(stop);
            self.atn.rule_to_token_type.push(plan.token_type);
        }
    }

    fn link_mode_start_states(&mut self, plans: &[RulePlan]) {
        let modes: Vec<(String, StateId)> = self
            .atn
            .mode_to_start
            .iter()
            .map(|(m, &s)| (m.clone(), s))
            .collect();
        for (mode, start) in modes {
            for plan in plans.iter().filter(|p| p.lexer && !p.fragment && p.mode == mode) {
                let rule_start = self.atn.rule_to_start[plan.index];
                self.epsilon(start, rule_start);
            }
        }
    }

    /// Rule stop states return to every call site's follow state.
    fn add_rule_follow_links(&mut self) {
        let mut links = Vec::new();
        for state in &self.atn.states {
            for t in &state.transitions {
                if let TransitionKind::Rule {
                    rule_index, follow, ..
                } = t.kind
                {
                    links.push((self.atn.rule_to_stop[rule_index], follow));
                }
            }
        }
        for (stop, follow) in links {
            self.epsilon(stop, follow);
        }
    }

    /// Rules nobody calls can be followed by end of input.
    fn add_eof_transition_to_start_rules(&mut self) {
        let eof_target = self.atn.add_state(StateKind::Basic, None, None);
        let stops = self.atn.rule_to_stop.clone();
        for stop in stops {
            if self.atn.state(stop).transitions.is_empty() {
                self.atn
                    .add_transition(stop, eof_target, TransitionKind::Atom(EOF));
            }
        }
    }

    fn block(&mut self, block: NodeId, ebnf: Option<NodeId>) -> Handle {
        let alts = self.grammar.ast.children(block).to_vec();
        let handles: Vec<Handle> = alts.iter().map(|&alt| self.alt(alt)).collect();
        if handles.is_empty() {
            return self.epsilon_node(block);
        }

        let Some(ebnf) = ebnf else {
            if let [single] = handles[..] {
                self.stamp(block, single.left);
                return single;
            }
            let start = self.new_state(StateKind::BlockStart(BlockKind::Basic), Some(block));
            self.atn.define_decision(start);
            return self.make_block(start, block, &handles);
        };

        let kind = self.grammar.ast.node(ebnf).kind.clone();
        match kind {
            NodeKind::Optional { greedy } => {
                let start = self.new_state(StateKind::BlockStart(BlockKind::Basic), Some(block));
                self.atn.define_decision(start);
                let h = self.make_block(start, block, &handles);
                self.optional(ebnf, h, greedy)
            }
            NodeKind::Star { greedy } => {
                let start = self.new_state(StateKind::BlockStart(BlockKind::Star), Some(ebnf));
                if handles.len() > 1 {
                    self.atn.define_decision(start);
                }
                let h = self.make_block(start, block, &handles);
                self.star(ebnf, h, greedy)
            }
            NodeKind::Plus { greedy } => {
                let start = self.new_state(StateKind::BlockStart(BlockKind::Plus), Some(ebnf));
                if handles.len() > 1 {
                    self.atn.define_decision(start);
                }
                let h = self.make_block(start, block, &handles);
                self.plus(ebnf, h, greedy)
            }
            _ => self.block(block, None),
        }
    }

    fn make_block(&mut self, start: StateId, block: NodeId, alts: &[Handle]) -> Handle {
        let end = self.new_state(StateKind::BlockEnd, Some(block));
        self.atn.state_mut(start).end_state = Some(end);
        self.atn.state_mut(end).start_state = Some(start);
        for alt in alts {
            self.epsilon(start, alt.left);
            self.epsilon(alt.right, end);
        }
        self.stamp(block, start);
        Handle {
            left: start,
            right: end,
        }
    }

    /// `(...)?`: the block start also decides whether to skip the block.
    fn optional(&mut self, ebnf: NodeId, blk: Handle, greedy: bool) -> Handle {
        self.atn.state_mut(blk.left).non_greedy = !greedy;
        if greedy {
            self.epsilon(blk.left, blk.right);
        } else {
            self.epsilon_first(blk.left, blk.right);
        }
        self.stamp(ebnf, blk.left);
        blk
    }

    /// `(...)*`: entry decides between entering the block and leaving.
    fn star(&mut self, ebnf: NodeId, blk: Handle, greedy: bool) -> Handle {
        let entry = self.new_state(StateKind::StarLoopEntry, Some(ebnf));
        self.atn.state_mut(entry).non_greedy = !greedy;
        self.atn.define_decision(entry);
        let end = self.new_state(StateKind::LoopEnd, Some(ebnf));
        let loop_back = self.new_state(StateKind::StarLoopBack, Some(ebnf));
        self.atn.state_mut(end).loop_back = Some(loop_back);
        self.atn.state_mut(entry).loop_back = Some(loop_back);

        if greedy {
            self.epsilon(entry, blk.left);
            self.epsilon(entry, end);
        } else {
            self.epsilon(entry, end);
            self.epsilon(entry, blk.left);
        }
        self.epsilon(blk.right, loop_back);
        self.epsilon(loop_back, entry);

        self.stamp(ebnf, entry);
        Handle {
            left: entry,
            right: end,
        }
    }

    /// `(...)+`: the loop-back state decides between another pass and leaving.
    fn plus(&mut self, ebnf: NodeId, blk: Handle, greedy: bool) -> Handle {
        let loop_back = self.new_state(StateKind::PlusLoopBack, Some(ebnf));
        self.atn.state_mut(loop_back).non_greedy = !greedy;
        self.atn.define_decision(loop_back);
        let end = self.new_state(StateKind::LoopEnd, Some(ebnf));
        self.atn.state_mut(blk.left).loop_back = Some(loop_back);
        self.atn.state_mut(end).loop_back = Some(loop_back);
        self.stamp(ebnf, loop_back);

        self.epsilon(blk.right, loop_back);
        if greedy {
            self.epsilon(loop_back, blk.left);
            self.epsilon(loop_back, end);
        } else {
            self.epsilon(loop_back, end);
            self.epsilon(loop_back, blk.left);
        }
        Handle {
            left: blk.left,
            right: end,
        }
    }

    fn alt(&mut self, alt: NodeId) -> Handle {
        let elems = self.grammar.ast.children(alt).to_vec();
        if elems.is_empty() {
            return self.epsilon_node(alt);
        }
        let handles: Vec<Handle> = elems.iter().map(|&e| self.element(e)).collect();
        self.elem_list(&handles)
    }

    fn elem_list(&mut self, elems: &[Handle]) -> Handle {
        for pair in elems.windows(2) {
            self.epsilon(pair[0].right, pair[1].left);
        }
        Handle {
            left: elems[0].left,
            right: elems[elems.len() - 1].right,
        }
    }

    fn element(&mut self, id: NodeId) -> Handle {
        let node = self.grammar.ast.node(id);
        let kind = node.kind.clone();
        let literal = node.is_literal();
        let inner = node.children.first().copied();
        let lexer = self.atn.kind == AtnKind::Lexer;
        match kind {
            NodeKind::Block => self.block(id, None),
            NodeKind::Optional { .. } | NodeKind::Star { .. } | NodeKind::Plus { .. } => {
                match inner {
                    Some(inner) => self.block(inner, Some(id)),
                    None => self.epsilon_node(id),
                }
            }
            NodeKind::Alt { .. } => self.alt(id),
            NodeKind::Terminal if lexer && literal => self.string_literal(id),
            NodeKind::Terminal => self.token_ref(id),
            NodeKind::Range if lexer => self.range(id),
            NodeKind::Set => self.set(id, false),
            NodeKind::NotSet => self.set(id, true),
            NodeKind::CharSet if lexer => self.char_set(id),
            NodeKind::Wildcard => self.matcher(id, TransitionKind::Wildcard),
            NodeKind::RuleRef { precedence, .. } => self.rule_ref(id, precedence.unwrap_or(0)),
            NodeKind::Action => self.action(id),
            NodeKind::Predicate { precedence } => self.sempred(id, precedence),
            // Rejected by the semantic checks; the rule is excluded.
            NodeKind::Range | NodeKind::CharSet => self.epsilon_node(id),
        }
    }

    /// `o -x-> o`, stamping the left state on `id`.
    fn matcher(&mut self, id: NodeId, transition: TransitionKind) -> Handle {
        let left = self.new_state(StateKind::Basic, Some(id));
        let right = self.new_state(StateKind::Basic, Some(id));
        self.atn.add_transition(left, right, transition);
        self.stamp(id, left);
        Handle { left, right }
    }

    fn epsilon_node(&mut self, id: NodeId) -> Handle {
        self.matcher(id, TransitionKind::Epsilon)
    }

    fn token_ref(&mut self, id: NodeId) -> Handle {
        let text = self.grammar.ast.node(id).text().to_string();
        let ttype = self.grammar.token_type(&text).unwrap_or(INVALID_TYPE);
        self.matcher(id, TransitionKind::Atom(ttype))
    }

    fn rule_ref(&mut self, id: NodeId, precedence: i32) -> Handle {
        let name = self.grammar.ast.node(id).text().to_string();
        let Some(rule_index) = self.grammar.rule(&name).map(|r| r.index) else {
            return self.epsilon_node(id);
        };
        let target = self.atn.rule_to_start[rule_index];
        let left = self.new_state(StateKind::Basic, Some(id));
        let right = self.new_state(StateKind::Basic, Some(id));
        self.atn.add_transition(
            left,
            target,
            TransitionKind::Rule {
                rule_index,
                precedence,
                follow: right,
            },
        );
        self.stamp(id, left);
        Handle { left, right }
    }

    fn action(&mut self, id: NodeId) -> Handle {
        let transition = TransitionKind::Action {
            rule_index: self.current_rule,
            action_index: None,
        };
        self.matcher(id, transition)
    }

    fn sempred(&mut self, id: NodeId, precedence: Option<i32>) -> Handle {
        let pred_index = self.grammar.sempreds.len();
        self.grammar.sempreds.insert(id, pred_index);
        let transition = match precedence {
            Some(p) => TransitionKind::Precedence(p),
            None => TransitionKind::Predicate {
                rule_index: self.current_rule,
                pred_index,
            },
        };
        self.matcher(id, transition)
    }

    fn set(&mut self, id: NodeId, invert: bool) -> Handle {
        let mut set = IntervalSet::new();
        let lexer = self.atn.kind == AtnKind::Lexer;
        for &child in self.grammar.ast.children(id) {
            let node = self.grammar.ast.node(child);
            match &node.kind {
                NodeKind::Terminal if lexer => {
                    if let Ok(chars) = decode_literal(node.text())
                        && let [c] = chars[..]
                    {
                        set.add(c);
                    }
                }
                NodeKind::Terminal => {
                    if let Some(ttype) = self.grammar.token_type(node.text()) {
                        set.add(ttype);
                    }
                }
                NodeKind::Range => {
                    if let Some((a, b)) = self.range_bounds(child) {
                        set.add_range(a, b);
                    }
                }
                NodeKind::CharSet => {
                    if let Ok(chars) = parse_char_set(node.text()) {
                        set.add_all(&chars);
                    }
                }
                _ => {}
            }
        }

        let transition = if !lexer {
            if invert {
                TransitionKind::NotSet(set)
            } else {
                TransitionKind::Set(set)
            }
        } else if invert {
            TransitionKind::NotSet(self.fold_case(set))
        } else {
            self.code_point_transition(set)
        };
        self.matcher(id, transition)
    }

    fn string_literal(&mut self, id: NodeId) -> Handle {
        let chars = decode_literal(self.grammar.ast.node(id).text()).unwrap_or_default();
        if chars.is_empty() {
            return self.epsilon_node(id);
        }
        let left = self.new_state(StateKind::Basic, Some(id));
        let mut prev = left;
        for c in chars {
            let next = self.new_state(StateKind::Basic, Some(id));
            let transition = self.code_point_transition(IntervalSet::of(c));
            self.atn.add_transition(prev, next, transition);
            prev = next;
        }
        self.stamp(id, left);
        Handle { left, right: prev }
    }

    fn range_bounds(&self, id: NodeId) -> Option<(i32, i32)> {
        let [a, b] = self.grammar.ast.children(id) else {
            return None;
        };
        let from = decode_literal(self.grammar.ast.node(*a).text()).ok()?;
        let to = decode_literal(self.grammar.ast.node(*b).text()).ok()?;
        match (&from[..], &to[..]) {
            ([x], [y]) if x <= y => Some((*x, *y)),
            _ => None,
        }
    }

    fn range(&mut self, id: NodeId) -> Handle {
        let Some((a, b)) = self.range_bounds(id) else {
            return self.epsilon_node(id);
        };
        let transition = self.code_point_transition(IntervalSet::of_range(a, b));
        self.matcher(id, transition)
    }

    fn char_set(&mut self, id: NodeId) -> Handle {
        let set = parse_char_set(self.grammar.ast.node(id).text()).unwrap_or_default();
        if set.is_nil() {
            return self.epsilon_node(id);
        }
        let transition = self.code_point_transition(set);
        self.matcher(id, transition)
    }

    fn fold_case(&self, set: IntervalSet) -> IntervalSet {
        if self.case_insensitive {
            with_both_cases(&set)
        } else {
            set
        }
    }

    /// One interval becomes an atom or range transition, anything else a set.
    fn code_point_transition(&self, set: IntervalSet) -> TransitionKind {
        let set = self.fold_case(set);
        match set.intervals() {
            [iv] if iv.a == iv.b => TransitionKind::Atom(iv.a),
            [iv] => TransitionKind::Range(iv.a, iv.b),
            _ => TransitionKind::Set(set),
        }
    }

    fn lexer_action(&self, command: &LexerCommand) -> Option<LexerAction> {
        let arg = command.arg.as_deref();
        let mode_index = |name: &str| self.grammar.modes.iter().position(|m| m == name);
        match (command.name.as_str(), arg) {
            ("skip", None) => Some(LexerAction::Skip),
            ("more", None) => Some(LexerAction::More),
            ("popMode", None) => Some(LexerAction::PopMode),
            ("channel", Some(arg)) => self.grammar.channel_value(arg).map(LexerAction::Channel),
            ("mode", Some(arg)) => mode_index(arg).map(LexerAction::Mode),
            ("pushMode", Some(arg)) => mode_index(arg).map(LexerAction::PushMode),
            ("type", Some(arg)) => self.grammar.vocab.token_type(arg).map(LexerAction::Type),
            _ => None,
        }
    }

    fn lexer_command(&mut self, action: LexerAction) -> Handle {
        let action_index = match self.atn.lexer_actions.iter().position(|a| *a == action) {
            Some(i) => i,
            None => {
                self.atn.lexer_actions.push(action);
                self.atn.lexer_actions.len() - 1
            }
        };
        let left = self.new_state(StateKind::Basic, None);
        let right = self.new_state(StateKind::Basic, None);
        self.atn.add_transition(
            left,
            right,
            TransitionKind::Action {
                rule_index: self.current_rule,
                action_index: Some(action_index),
            },
        );
        Handle { left, right }
    }
}
