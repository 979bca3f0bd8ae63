//! Rule functions from the rewritten grammar, its ATN and the decision table.
//!
//! The walk mirrors the rule body: blocks become choices (or inline code when
//! they have a single alternative), `?`/`*`/`+` become optional blocks and
//! loops, and leaves become matchers. Choices are LL(1) variants when the
//! analysis found the decision disjoint and `force_atn` is off.

use antler_core::IntervalSet;
use antler_core::token::INVALID_TYPE;
use antler_core::utils::context_name;

use super::getters::getters_for_alts;
use super::model::{
    Action, AddToLabelList, CaptureNextTokenType, Choice, ChoiceKind, CodeBlockForAlt, Decl,
    ExceptionClause, InvokeRule, Loop, MatchSet, MatchToken, Op, PrecedencePredicate,
    RecRuleAltStart, RecRuleReplaceContext, RecognitionErrorKind, RuleFunction,
    RuleSempredFunction, SemPred, StructDecl, TestSetInline, ThrowRecognitionError, Wildcard,
    add_unique, parse_attributes,
};
use crate::atn::{Atn, StateId, TransitionKind};
use crate::config::ToolConfig;
use crate::grammar::{DecisionLook, Grammar, NodeId, NodeKind, Rule};
use crate::leftrec::LeftRecursiveRule;
use crate::{Error, Result};

/// Builds the function of one rule.
pub struct RuleFunctionBuilder<'a> {
    grammar: &'a Grammar,
    atn: &'a Atn,
    config: &'a ToolConfig,
    rule: &'a Rule,
    rule_ctx: StructDecl,
    alt_label_ctxs: Vec<StructDecl>,
    locals: Vec<Decl>,
    has_lookahead_block: bool,
    /// Labels of the enclosing labeled alternatives, innermost last.
    alt_labels: Vec<String>,
}

impl<'a> RuleFunctionBuilder<'a> {
    pub fn new(
        grammar: &'a Grammar,
        atn: &'a Atn,
        config: &'a ToolConfig,
        rule: &'a Rule,
        listener: bool,
        visitor: bool,
    ) -> Self {
        let ast = &grammar.ast;
        let labels = rule.alt_labels(ast);

        let mut rule_ctx = StructDecl::new(context_name(&rule.name), &rule.name);
        rule_ctx.provide_copy_from = !labels.is_empty();
        if labels.is_empty() {
            rule_ctx.set_dispatch(listener, visitor);
        }
        let unlabeled = rule.unlabeled_alts(ast);
        for decl in getters_for_alts(grammar, &unlabeled) {
            rule_ctx.add_decl(decl);
        }

        let mut alt_label_ctxs = Vec::with_capacity(labels.len());
        for (label, alts) in &labels {
            let mut ctx = StructDecl::new(context_name(label), &rule.name);
            ctx.alt_label = Some(label.clone());
            ctx.alt_nums = alts.iter().map(|(n, _)| *n).collect();
            ctx.set_dispatch(listener, visitor);
            let nodes: Vec<NodeId> = alts.iter().map(|(_, id)| *id).collect();
            for decl in getters_for_alts(grammar, &nodes) {
                ctx.add_decl(decl);
            }
            alt_label_ctxs.push(ctx);
        }

        Self {
            grammar,
            atn,
            config,
            rule,
            rule_ctx,
            alt_label_ctxs,
            locals: Vec::new(),
            has_lookahead_block: false,
            alt_labels: Vec::new(),
        }
    }

    pub fn build(mut self) -> Result<(RuleFunction, Option<RuleSempredFunction>)> {
        let rule = self.rule;
        let args = rule.args.as_deref().map(parse_attributes).unwrap_or_default();
        for decl in &args {
            self.rule_ctx.add_decl(decl.clone());
        }
        self.rule_ctx.ctor_attrs = args.clone();
        for attrs in [&rule.returns, &rule.locals].into_iter().flatten() {
            for decl in parse_attributes(attrs) {
                self.rule_ctx.add_decl(decl);
            }
        }
        if let Some(lr) = &rule.left_recursive {
            self.declare_left_labels(lr);
        }

        let mut code = self.block(rule.block, None, true)?;
        if let Some(lr) = &rule.left_recursive {
            self.inject_recursion_ops(&mut code, lr)?;
        }

        let start_state = *self
            .atn
            .rule_to_start
            .get(rule.index)
            .ok_or_else(|| self.inconsistent(format!("rule `{}` has no start state", rule.name)))?;
        let ctx_type = context_name(&rule.name);
        let sempreds = rule_sempreds(self.grammar, rule, &ctx_type);

        log::trace!(
            target: "antler::codegen",
            "rule `{}`: {} ops, {} getters, {} label contexts",
            rule.name,
            code.len(),
            self.rule_ctx.getters.len(),
            self.alt_label_ctxs.len()
        );

        let function = RuleFunction {
            name: rule.name.clone(),
            index: rule.index,
            ctx_type,
            start_state,
            args,
            locals: self.locals,
            rule_ctx: self.rule_ctx,
            alt_label_ctxs: self.alt_label_ctxs,
            code,
            exceptions: rule
                .exceptions
                .iter()
                .map(|e| ExceptionClause {
                    catch_arg: e.catch_arg.clone(),
                    action: e.action.clone(),
                })
                .collect(),
            finally_action: rule.finally_action.clone(),
            left_recursive: rule.is_left_recursive(),
            has_lookahead_block: self.has_lookahead_block,
        };
        Ok((function, sempreds))
    }

    fn inconsistent(&self, detail: String) -> Error {
        Error::InternalInconsistency {
            grammar: self.grammar.name.clone(),
            detail,
        }
    }

    fn state_of(&self, id: NodeId) -> Result<StateId> {
        self.grammar.ast.node(id).atn_state.ok_or_else(|| {
            self.inconsistent(format!(
                "`{}` in rule `{}` has no ATN state",
                self.grammar.ast.render(id),
                self.rule.name
            ))
        })
    }

    fn decision_look(&self, state: StateId) -> Result<(usize, &'a DecisionLook)> {
        let grammar = self.grammar;
        let decision = self
            .atn
            .get(state)
            .and_then(|s| s.decision)
            .ok_or_else(|| self.inconsistent(format!("s{state} is not a decision")))?;
        let look = grammar
            .decision_look
            .get(decision)
            .ok_or_else(|| self.inconsistent(format!("decision {decision} was not analyzed")))?;
        Ok((decision, look))
    }

    fn target_label(&self, ttype: i32) -> String {
        target_label(self.grammar, ttype)
    }

    fn test_set(&self, set: &IntervalSet) -> TestSetInline {
        TestSetInline::new(set, self.config.inline_test_set_word_size, |t| {
            self.target_label(t)
        })
    }

    fn add_local(&mut self, decl: Decl) {
        add_unique(&mut self.locals, decl);
    }

    /// Declarations go to the context of the innermost labeled alternative,
    /// or to the rule context.
    fn add_context_decl(&mut self, decl: Decl) {
        if let Some(label) = self.alt_labels.last()
            && let Some(ctx) = self
                .alt_label_ctxs
                .iter_mut()
                .find(|c| c.alt_label.as_deref() == Some(label.as_str()))
        {
            ctx.add_decl(decl);
            return;
        }
        self.rule_ctx.add_decl(decl);
    }

    fn error(&self, id: NodeId, kind: RecognitionErrorKind, expecting: Option<IntervalSet>) -> ThrowRecognitionError {
        ThrowRecognitionError {
            kind,
            rule_index: self.rule.index,
            offset: self.grammar.ast.node(id).range().start().into(),
            expecting,
        }
    }

    fn block(&mut self, block: NodeId, ebnf: Option<NodeId>, outer_most: bool) -> Result<Vec<Op>> {
        let alt_ids = self.grammar.ast.children(block).to_vec();
        if alt_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut alts = Vec::with_capacity(alt_ids.len());
        for (i, &alt) in alt_ids.iter().enumerate() {
            alts.push(self.alternative(alt, outer_most.then_some(i + 1))?);
        }

        match ebnf {
            None if alts.len() == 1 => Ok(alts.into_iter().map(Op::CodeBlock).collect()),
            None => Ok(vec![Op::Choice(Box::new(self.choice_block(block, alts)?))]),
            Some(ebnf) => Ok(vec![Op::Choice(Box::new(self.ebnf_block(ebnf, block, alts)?))]),
        }
    }

    fn alternative(&mut self, alt: NodeId, alt_num: Option<usize>) -> Result<CodeBlockForAlt> {
        let label = self.grammar.ast.node(alt).alt_label().map(str::to_string);
        if let Some(label) = &label {
            self.alt_labels.push(label.clone());
        }
        let grammar = self.grammar;
        let mut ops = Vec::new();
        for &elem in grammar.ast.children(alt) {
            ops.extend(self.element(elem)?);
        }
        if label.is_some() {
            self.alt_labels.pop();
        }
        Ok(CodeBlockForAlt {
            alt_num,
            alt_label: alt_num.and(label),
            ops,
        })
    }

    fn element(&mut self, id: NodeId) -> Result<Vec<Op>> {
        let grammar = self.grammar;
        let node = grammar.ast.node(id);
        match &node.kind {
            NodeKind::Terminal => self.token_ref(id),
            NodeKind::Set => self.set(id, false),
            NodeKind::NotSet => self.set(id, true),
            NodeKind::Wildcard => {
                let op = Op::Wildcard(Wildcard {
                    state_number: self.state_of(id)?,
                    labels: Vec::new(),
                });
                Ok(self.label_token_match(id, op))
            }
            NodeKind::RuleRef { .. } => self.rule_ref(id),
            NodeKind::Action => Ok(vec![Op::Action(Action {
                state_number: node.atn_state,
                text: node.text().to_string(),
            })]),
            NodeKind::Predicate { precedence } => {
                let state_number = self.state_of(id)?;
                let pred_index = *grammar
                    .sempreds
                    .get(&id)
                    .ok_or_else(|| self.inconsistent(format!("predicate `{}` has no index", node.text())))?;
                let op = match precedence {
                    Some(precedence) => Op::PrecedencePredicate(PrecedencePredicate {
                        state_number,
                        rule_index: self.rule.index,
                        pred_index,
                        precedence: *precedence,
                    }),
                    None => Op::SemPred(SemPred {
                        state_number,
                        rule_index: self.rule.index,
                        pred_index,
                        predicate: node.text().to_string(),
                    }),
                };
                Ok(vec![op])
            }
            NodeKind::Block => self.block(id, None, false),
            NodeKind::Optional { .. } => {
                let block = self.only_child(id)?;
                self.block(block, Some(id), false)
            }
            NodeKind::Star { .. } | NodeKind::Plus { .. } => {
                let block = self.only_child(id)?;
                let body = loop_body(self.block(block, None, false)?);
                let choice = self.ebnf_block(id, block, vec![body])?;
                Ok(vec![Op::Choice(Box::new(choice))])
            }
            NodeKind::Alt { .. } | NodeKind::Range | NodeKind::CharSet => Ok(Vec::new()),
        }
    }

    fn only_child(&self, id: NodeId) -> Result<NodeId> {
        match self.grammar.ast.children(id) {
            [child] => Ok(*child),
            _ => Err(self.inconsistent(format!(
                "`{}` must wrap exactly one block",
                self.grammar.ast.render(id)
            ))),
        }
    }

    fn token_ref(&mut self, id: NodeId) -> Result<Vec<Op>> {
        let ttype = self
            .grammar
            .token_type(self.grammar.ast.node(id).text())
            .unwrap_or(INVALID_TYPE);
        let op = Op::MatchToken(MatchToken {
            state_number: self.state_of(id)?,
            ttype,
            name: self.target_label(ttype),
            labels: Vec::new(),
        });
        Ok(self.label_token_match(id, op))
    }

    fn set(&mut self, id: NodeId, invert: bool) -> Result<Vec<Op>> {
        let state_number = self.state_of(id)?;
        let set = self
            .atn
            .state(state_number)
            .transitions
            .first()
            .and_then(|t| match &t.kind {
                TransitionKind::Set(s) | TransitionKind::NotSet(s) => Some(s.clone()),
                kind => kind.label(),
            })
            .unwrap_or_default();
        let expr = self.test_set(&set);
        self.add_local(Decl::TokenTypeDecl {
            name: expr.var_name.clone(),
        });
        let op = Op::MatchSet(MatchSet {
            state_number,
            invert,
            capture: CaptureNextTokenType::new(expr.var_name.clone()),
            expr,
            labels: Vec::new(),
        });
        Ok(self.label_token_match(id, op))
    }

    /// `_ID` for a token, `s{type}` for a literal, `_tset{node}` for sets and
    /// wildcards.
    fn implicit_token_label(&self, id: NodeId) -> String {
        let node = self.grammar.ast.node(id);
        match node.kind {
            NodeKind::Terminal => {
                let ttype = self.grammar.token_type(node.text()).unwrap_or(INVALID_TYPE);
                if node.is_literal() {
                    format!("s{ttype}")
                } else {
                    format!("_{}", self.target_label(ttype))
                }
            }
            _ => format!("_tset{id}"),
        }
    }

    /// Apply the element label of a token, set or wildcard match.
    fn label_token_match(&mut self, id: NodeId, mut op: Op) -> Vec<Op> {
        let Some(label) = self.grammar.ast.node(id).label.clone() else {
            return vec![op];
        };
        let assigned = if label.list {
            let implicit = self.implicit_token_label(id);
            self.add_context_decl(Decl::TokenDecl {
                name: implicit.clone(),
                implicit: true,
            });
            self.add_context_decl(Decl::TokenListDecl {
                name: label.name.clone(),
            });
            implicit
        } else {
            self.add_context_decl(Decl::TokenDecl {
                name: label.name.clone(),
                implicit: false,
            });
            label.name.clone()
        };
        if let Some(labels) = op.labels_mut() {
            labels.push(assigned.clone());
        }

        let mut ops = vec![op];
        if label.list {
            ops.push(Op::AddToLabelList(AddToLabelList {
                list_name: label.name,
                label: assigned,
            }));
        }
        ops
    }

    fn rule_ref(&mut self, id: NodeId) -> Result<Vec<Op>> {
        let grammar = self.grammar;
        let node = grammar.ast.node(id);
        let NodeKind::RuleRef { precedence, args } = &node.kind else {
            return Ok(Vec::new());
        };
        let name = node.text().to_string();
        let ctx_name = context_name(&name);
        let args = match (args, precedence) {
            (Some(a), Some(p)) => Some(format!("{a}, {p}")),
            (None, Some(p)) => Some(p.to_string()),
            (Some(a), None) => Some(a.clone()),
            (None, None) => None,
        };
        let mut invoke = InvokeRule {
            state_number: self.state_of(id)?,
            name: name.clone(),
            ctx_name: ctx_name.clone(),
            args,
            labels: Vec::new(),
        };

        let Some(label) = node.label.clone() else {
            return Ok(vec![Op::InvokeRule(invoke)]);
        };
        if label.list {
            let implicit = format!("_{name}");
            self.add_context_decl(Decl::RuleContextDecl {
                name: implicit.clone(),
                ctx_name: ctx_name.clone(),
                implicit: true,
            });
            self.add_context_decl(Decl::RuleContextListDecl {
                name: label.name.clone(),
                ctx_name,
            });
            invoke.labels.push(implicit.clone());
            Ok(vec![
                Op::InvokeRule(invoke),
                Op::AddToLabelList(AddToLabelList {
                    list_name: label.name,
                    label: implicit,
                }),
            ])
        } else {
            self.add_context_decl(Decl::RuleContextDecl {
                name: label.name.clone(),
                ctx_name,
                implicit: false,
            });
            invoke.labels.push(label.name);
            Ok(vec![Op::InvokeRule(invoke)])
        }
    }

    fn choice_block(&mut self, block: NodeId, alts: Vec<CodeBlockForAlt>) -> Result<Choice> {
        let state_number = self.state_of(block)?;
        let (decision, look) = self.decision_look(state_number)?;
        let kind = if !self.config.force_atn && look.ll1 {
            ChoiceKind::Ll1AltBlock {
                alt_look: self.alt_look(look),
                error: self.error(block, RecognitionErrorKind::NoViableAlt, Some(look.expecting.clone())),
            }
        } else {
            ChoiceKind::AltBlock
        };
        Ok(Choice {
            kind,
            decision,
            state_number,
            alts,
            preamble: Vec::new(),
        })
    }

    fn ebnf_block(&mut self, ebnf: NodeId, block: NodeId, alts: Vec<CodeBlockForAlt>) -> Result<Choice> {
        let node_kind = self.grammar.ast.node(ebnf).kind.clone();
        let greedy = node_kind.greedy();
        let state_number = self.state_of(ebnf)?;
        let (decision, look) = self.decision_look(state_number)?;
        let ll1 = !self.config.force_atn && look.ll1;
        let single = alts.len() == 1;
        let mut preamble = Vec::new();

        let kind = match node_kind {
            NodeKind::Optional { .. } if ll1 && single => {
                let enter = alt_set(look, 0);
                let follow = alt_set(look, 1);
                let expr = self.lookahead_temp(&enter, &mut preamble);
                ChoiceKind::Ll1OptionalBlockSingleAlt {
                    follow_expr: self.test_set(&follow),
                    error: self.error(ebnf, RecognitionErrorKind::NoViableAlt, Some(enter.union(&follow))),
                    expr,
                }
            }
            NodeKind::Optional { .. } if ll1 => ChoiceKind::Ll1OptionalBlock {
                alt_look: self.alt_look(look),
                error: self.error(ebnf, RecognitionErrorKind::NoViableAlt, Some(look.expecting.clone())),
            },
            NodeKind::Optional { .. } => ChoiceKind::OptionalBlock,
            NodeKind::Star { .. } => {
                let loop_back = self
                    .atn
                    .state(state_number)
                    .loop_back
                    .ok_or_else(|| self.inconsistent(format!("loop entry s{state_number} has no loop-back state")))?;
                let mut looping = Loop::new(state_number, loop_back, alts.len(), greedy);
                if ll1 && single {
                    let loop_expr = self.loop_lookahead(&alt_set(look, 0), &mut preamble, &mut looping);
                    ChoiceKind::Ll1StarBlockSingleAlt { looping, loop_expr }
                } else {
                    self.has_lookahead_block = true;
                    ChoiceKind::StarBlock { looping }
                }
            }
            NodeKind::Plus { .. } => {
                let block_start_state = self.state_of(block)?;
                let mut looping = Loop::new(block_start_state, state_number, alts.len(), greedy);
                if ll1 && single {
                    let loop_expr = self.loop_lookahead(&alt_set(look, 0), &mut preamble, &mut looping);
                    ChoiceKind::Ll1PlusBlockSingleAlt {
                        looping,
                        block_start_state,
                        loop_expr,
                    }
                } else {
                    self.has_lookahead_block = true;
                    ChoiceKind::PlusBlock {
                        looping,
                        block_start_state,
                        error: self.error(ebnf, RecognitionErrorKind::EarlyExit, None),
                    }
                }
            }
            _ => {
                return Err(self.inconsistent(format!(
                    "`{}` is not a subrule",
                    self.grammar.ast.render(ebnf)
                )));
            }
        };

        Ok(Choice {
            kind,
            decision,
            state_number,
            alts,
            preamble,
        })
    }

    fn alt_look(&self, look: &DecisionLook) -> Vec<Vec<String>> {
        look.alts
            .iter()
            .map(|set| {
                set.iter()
                    .flat_map(|s| s.iter())
                    .map(|t| self.target_label(t))
                    .collect()
            })
            .collect()
    }

    /// Test on `_la`, captured right before the decision.
    fn lookahead_temp(&mut self, set: &IntervalSet, preamble: &mut Vec<Op>) -> TestSetInline {
        let expr = self.test_set(set);
        self.add_local(Decl::TokenTypeDecl {
            name: expr.var_name.clone(),
        });
        preamble.push(Op::CaptureNextTokenType(CaptureNextTokenType::new(expr.var_name.clone())));
        expr
    }

    /// As [`Self::lookahead_temp`], recapturing at the end of every iteration.
    fn loop_lookahead(&mut self, set: &IntervalSet, preamble: &mut Vec<Op>, looping: &mut Loop) -> TestSetInline {
        let expr = self.lookahead_temp(set, preamble);
        looping
            .iteration
            .push(Op::CaptureNextTokenType(CaptureNextTokenType::new(expr.var_name.clone())));
        expr
    }

    /// Labels of removed leftmost self references become context fields.
    fn declare_left_labels(&mut self, lr: &LeftRecursiveRule) {
        let ctx_name = context_name(&self.rule.name);
        for info in &lr.op_alts {
            let Some(label) = &info.left_label else {
                continue;
            };
            let decl = if info.is_list_label {
                Decl::RuleContextListDecl {
                    name: label.clone(),
                    ctx_name: ctx_name.clone(),
                }
            } else {
                Decl::RuleContextDecl {
                    name: label.clone(),
                    ctx_name: ctx_name.clone(),
                    implicit: false,
                }
            };
            let target = info.alt_label.as_deref().and_then(|l| {
                self.alt_label_ctxs
                    .iter_mut()
                    .find(|c| c.alt_label.as_deref() == Some(l))
            });
            match target {
                Some(ctx) => ctx.add_decl(decl),
                None => self.rule_ctx.add_decl(decl),
            }
        }
    }

    /// Context switching ops of a rewritten left-recursive rule.
    ///
    /// The body is a single outermost alternative holding the primary block
    /// and the operator loop.
    fn inject_recursion_ops(&self, code: &mut [Op], lr: &LeftRecursiveRule) -> Result<()> {
        let rule_name = self.rule.name.clone();
        let malformed = |what: &str| self.inconsistent(format!("left-recursive rule `{rule_name}`: {what}"));

        let [Op::CodeBlock(outer)] = code else {
            return Err(malformed("body is not a single alternative"));
        };
        if outer.ops.len() != 2 {
            return Err(malformed("expected a primary block and an operator loop"));
        }

        let primary: Vec<&mut CodeBlockForAlt> = match &mut outer.ops[0] {
            Op::Choice(choice) => choice.alts.iter_mut().collect(),
            Op::CodeBlock(alt) => vec![alt],
            _ => return Err(malformed("primary block is missing")),
        };
        if primary.len() != lr.primary_alts.len() {
            return Err(malformed("primary alternatives do not match"));
        }
        for (alt, info) in primary.into_iter().zip(&lr.primary_alts) {
            if let Some(label) = &info.alt_label {
                alt.ops.insert(
                    0,
                    Op::RecRuleReplaceContext(RecRuleReplaceContext {
                        ctx_name: context_name(label),
                    }),
                );
            }
        }

        outer.ops.insert(1, Op::RecRuleSetStopToken);

        let Op::Choice(star) = &mut outer.ops[2] else {
            return Err(malformed("operator loop is missing"));
        };
        star.kind
            .looping_mut()
            .ok_or_else(|| malformed("operator loop is not a loop"))?
            .iteration
            .push(Op::RecRuleSetPrevCtx);
        let [body] = star.alts.as_mut_slice() else {
            return Err(malformed("operator loop has no body"));
        };
        let ops: Vec<&mut CodeBlockForAlt> = if lr.op_alts.len() == 1 {
            vec![body]
        } else {
            match body.ops.first_mut() {
                Some(Op::Choice(choice)) => choice.alts.iter_mut().collect(),
                _ => return Err(malformed("operator alternatives are missing")),
            }
        };
        if ops.len() != lr.op_alts.len() {
            return Err(malformed("operator alternatives do not match"));
        }
        for (alt, info) in ops.into_iter().zip(&lr.op_alts) {
            let ctx_name = context_name(info.alt_label.as_deref().unwrap_or(&rule_name));
            alt.ops.insert(
                0,
                Op::RecRuleAltStart(RecRuleAltStart {
                    rule_name: rule_name.clone(),
                    ctx_name,
                    alt_label: info.alt_label.clone(),
                    label: info.left_label.clone(),
                    is_list_label: info.is_list_label,
                }),
            );
        }
        Ok(())
    }
}

/// A loop body of one alternative is that alternative's code.
fn loop_body(mut ops: Vec<Op>) -> CodeBlockForAlt {
    if ops.len() == 1
        && matches!(ops[0], Op::CodeBlock(_))
        && let Some(Op::CodeBlock(alt)) = ops.pop()
    {
        return alt;
    }
    CodeBlockForAlt {
        ops,
        ..CodeBlockForAlt::default()
    }
}

/// Name of a token type in generated code: its symbolic name, or the number.
pub(crate) fn target_label(grammar: &Grammar, ttype: i32) -> String {
    grammar
        .vocab
        .symbolic_name(ttype)
        .map_or_else(|| ttype.to_string(), str::to_string)
}

fn alt_set(look: &DecisionLook, alt: usize) -> IntervalSet {
    look.alts.get(alt).cloned().flatten().unwrap_or_default()
}

/// Predicates of a rule, by predicate index.
pub(crate) fn rule_sempreds(grammar: &Grammar, rule: &Rule, ctx_type: &str) -> Option<RuleSempredFunction> {
    let mut preds: Vec<(usize, String)> = grammar
        .ast
        .descendants(rule.block)
        .into_iter()
        .filter_map(|id| {
            let index = *grammar.sempreds.get(&id)?;
            let text = match grammar.ast.node(id).kind {
                NodeKind::Predicate {
                    precedence: Some(p),
                } => format!("precpred({p})"),
                _ => grammar.ast.node(id).text().to_string(),
            };
            Some((index, text))
        })
        .collect();
    if preds.is_empty() {
        return None;
    }
    preds.sort_by_key(|(i, _)| *i);
    Some(RuleSempredFunction {
        name: rule.name.clone(),
        rule_index: rule.index,
        ctx_type: ctx_type.to_string(),
        preds,
    })
}
