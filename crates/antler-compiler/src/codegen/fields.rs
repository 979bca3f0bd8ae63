//! Named field access over the output model.
//!
//! Template engines resolve field names on whatever node they are looking
//! at. Every node kind publishes a fixed list of [`FieldDescriptor`]s; fields
//! marked `model_element` hold child nodes and are the only ones [`walk`]
//! descends into. The table is built once, on first use.

use std::sync::LazyLock;

use antler_core::IntervalSet;
use indexmap::IndexMap;

use super::model::{
    Action, AddToLabelList, Bitset, CaptureNextTokenType, Choice, ChoiceKind, CodeBlockForAlt,
    Decl, DispatchMethod, ExceptionClause, InvokeRule, Lexer, LexerFile, ListenerEntry,
    ListenerFile, MatchSet, MatchToken, Op, OutputFile, Parser, ParserFile, PrecedencePredicate,
    RecRuleAltStart, RecRuleReplaceContext, RecognitionErrorKind, RuleFunction,
    RuleSempredFunction, SemPred, StructDecl, TestSetInline, ThrowRecognitionError, TokenDef,
    VisitorFile, Wildcard,
};

/// Borrowed view of any output model node.
#[derive(Debug, Clone, Copy)]
pub enum ModelRef<'a> {
    ParserFile(&'a ParserFile),
    LexerFile(&'a LexerFile),
    Parser(&'a Parser),
    Lexer(&'a Lexer),
    ListenerFile(&'a ListenerFile),
    VisitorFile(&'a VisitorFile),
    ListenerEntry(&'a ListenerEntry),
    RuleFunction(&'a RuleFunction),
    RuleSempredFunction(&'a RuleSempredFunction),
    StructDecl(&'a StructDecl),
    Decl(&'a Decl),
    ExceptionClause(&'a ExceptionClause),
    CodeBlock(&'a CodeBlockForAlt),
    Choice(&'a Choice),
    MatchToken(&'a MatchToken),
    MatchSet(&'a MatchSet),
    Wildcard(&'a Wildcard),
    InvokeRule(&'a InvokeRule),
    Action(&'a Action),
    SemPred(&'a SemPred),
    PrecedencePredicate(&'a PrecedencePredicate),
    CaptureNextTokenType(&'a CaptureNextTokenType),
    AddToLabelList(&'a AddToLabelList),
    RecRuleReplaceContext(&'a RecRuleReplaceContext),
    RecRuleSetStopToken,
    RecRuleSetPrevCtx,
    RecRuleAltStart(&'a RecRuleAltStart),
    TestSetInline(&'a TestSetInline),
    Bitset(&'a Bitset),
    ThrowRecognitionError(&'a ThrowRecognitionError),
}

/// Node kinds as templates see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    ParserFile,
    LexerFile,
    Parser,
    Lexer,
    ListenerFile,
    VisitorFile,
    ListenerEntry,
    RuleFunction,
    RuleSempredFunction,
    StructDecl,
    AltLabelStructDecl,
    TokenDecl,
    TokenTypeDecl,
    TokenListDecl,
    RuleContextDecl,
    RuleContextListDecl,
    AttributeDecl,
    ContextTokenGetterDecl,
    ContextTokenListGetterDecl,
    ContextTokenListIndexedGetterDecl,
    ContextRuleGetterDecl,
    ContextRuleListGetterDecl,
    ContextRuleListIndexedGetterDecl,
    ExceptionClause,
    CodeBlockForAlt,
    CodeBlockForOuterMostAlt,
    AltBlock,
    Ll1AltBlock,
    Ll1OptionalBlock,
    Ll1OptionalBlockSingleAlt,
    OptionalBlock,
    StarBlock,
    PlusBlock,
    Ll1StarBlockSingleAlt,
    Ll1PlusBlockSingleAlt,
    MatchToken,
    MatchSet,
    MatchNotSet,
    Wildcard,
    InvokeRule,
    Action,
    SemPred,
    PrecedencePredicate,
    CaptureNextTokenType,
    AddToLabelList,
    RecRuleReplaceContext,
    RecRuleSetStopToken,
    RecRuleSetPrevCtx,
    RecRuleAltStart,
    TestSetInline,
    Bitset,
    ThrowNoViableAlt,
    ThrowEarlyExit,
}

/// Value of one field.
#[derive(Debug, Clone)]
pub enum FieldValue<'a> {
    Null,
    Str(&'a str),
    Int(i64),
    Bool(bool),
    Set(&'a IntervalSet),
    List(Vec<FieldValue<'a>>),
    Model(ModelRef<'a>),
    Models(Vec<ModelRef<'a>>),
}

impl<'a> FieldValue<'a> {
    fn opt(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(FieldValue::Null, FieldValue::Str)
    }

    fn strs(values: &'a [String]) -> Self {
        FieldValue::List(values.iter().map(|s| FieldValue::Str(s)).collect())
    }

    fn opt_strs(values: &'a [Option<String>]) -> Self {
        FieldValue::List(values.iter().map(FieldValue::opt).collect())
    }

    fn int(value: impl TryInto<i64>) -> Self {
        value.try_into().map_or(FieldValue::Null, FieldValue::Int)
    }

    fn models<T>(items: &'a [T]) -> Self
    where
        &'a T: Into<ModelRef<'a>>,
    {
        FieldValue::Models(items.iter().map(Into::into).collect())
    }

    fn model_opt<T>(item: &'a Option<T>) -> Self
    where
        &'a T: Into<ModelRef<'a>>,
    {
        item.as_ref().map_or(FieldValue::Null, |m| FieldValue::Model(m.into()))
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

pub type Extractor = for<'a> fn(ModelRef<'a>) -> FieldValue<'a>;

#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    /// The field holds child model nodes.
    pub model_element: bool,
    pub extract: Extractor,
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("model_element", &self.model_element)
            .finish()
    }
}

macro_rules! model_ref_from {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for ModelRef<'a> {
                fn from(value: &'a $ty) -> Self {
                    ModelRef::$ty(value)
                }
            }
        )*
    };
}

model_ref_from!(
    ParserFile,
    LexerFile,
    Parser,
    Lexer,
    ListenerFile,
    VisitorFile,
    ListenerEntry,
    RuleFunction,
    RuleSempredFunction,
    StructDecl,
    Decl,
    ExceptionClause,
    Choice,
    MatchToken,
    MatchSet,
    Wildcard,
    InvokeRule,
    Action,
    SemPred,
    PrecedencePredicate,
    CaptureNextTokenType,
    AddToLabelList,
    RecRuleReplaceContext,
    RecRuleAltStart,
    TestSetInline,
    Bitset,
    ThrowRecognitionError,
);

impl<'a> From<&'a CodeBlockForAlt> for ModelRef<'a> {
    fn from(value: &'a CodeBlockForAlt) -> Self {
        ModelRef::CodeBlock(value)
    }
}

impl<'a> From<&'a Op> for ModelRef<'a> {
    fn from(op: &'a Op) -> Self {
        match op {
            Op::Choice(c) => ModelRef::Choice(c),
            Op::CodeBlock(c) => ModelRef::CodeBlock(c),
            Op::MatchToken(m) => ModelRef::MatchToken(m),
            Op::MatchSet(m) => ModelRef::MatchSet(m),
            Op::Wildcard(m) => ModelRef::Wildcard(m),
            Op::InvokeRule(m) => ModelRef::InvokeRule(m),
            Op::Action(m) => ModelRef::Action(m),
            Op::SemPred(m) => ModelRef::SemPred(m),
            Op::PrecedencePredicate(m) => ModelRef::PrecedencePredicate(m),
            Op::CaptureNextTokenType(m) => ModelRef::CaptureNextTokenType(m),
            Op::AddToLabelList(m) => ModelRef::AddToLabelList(m),
            Op::RecRuleReplaceContext(m) => ModelRef::RecRuleReplaceContext(m),
            Op::RecRuleSetStopToken => ModelRef::RecRuleSetStopToken,
            Op::RecRuleSetPrevCtx => ModelRef::RecRuleSetPrevCtx,
            Op::RecRuleAltStart(m) => ModelRef::RecRuleAltStart(m),
        }
    }
}

impl<'a> From<&'a OutputFile> for ModelRef<'a> {
    fn from(file: &'a OutputFile) -> Self {
        match file {
            OutputFile::Parser(f) => ModelRef::ParserFile(f),
            OutputFile::Lexer(f) => ModelRef::LexerFile(f),
        }
    }
}

impl<'a> ModelRef<'a> {
    pub fn kind(self) -> ModelKind {
        match self {
            ModelRef::ParserFile(_) => ModelKind::ParserFile,
            ModelRef::LexerFile(_) => ModelKind::LexerFile,
            ModelRef::Parser(_) => ModelKind::Parser,
            ModelRef::Lexer(_) => ModelKind::Lexer,
            ModelRef::ListenerFile(_) => ModelKind::ListenerFile,
            ModelRef::VisitorFile(_) => ModelKind::VisitorFile,
            ModelRef::ListenerEntry(_) => ModelKind::ListenerEntry,
            ModelRef::RuleFunction(_) => ModelKind::RuleFunction,
            ModelRef::RuleSempredFunction(_) => ModelKind::RuleSempredFunction,
            ModelRef::StructDecl(s) if s.alt_label.is_some() => ModelKind::AltLabelStructDecl,
            ModelRef::StructDecl(_) => ModelKind::StructDecl,
            ModelRef::Decl(d) => decl_kind(d),
            ModelRef::ExceptionClause(_) => ModelKind::ExceptionClause,
            ModelRef::CodeBlock(c) if c.is_outer_most() => ModelKind::CodeBlockForOuterMostAlt,
            ModelRef::CodeBlock(_) => ModelKind::CodeBlockForAlt,
            ModelRef::Choice(c) => choice_kind(&c.kind),
            ModelRef::MatchToken(_) => ModelKind::MatchToken,
            ModelRef::MatchSet(m) if m.invert => ModelKind::MatchNotSet,
            ModelRef::MatchSet(_) => ModelKind::MatchSet,
            ModelRef::Wildcard(_) => ModelKind::Wildcard,
            ModelRef::InvokeRule(_) => ModelKind::InvokeRule,
            ModelRef::Action(_) => ModelKind::Action,
            ModelRef::SemPred(_) => ModelKind::SemPred,
            ModelRef::PrecedencePredicate(_) => ModelKind::PrecedencePredicate,
            ModelRef::CaptureNextTokenType(_) => ModelKind::CaptureNextTokenType,
            ModelRef::AddToLabelList(_) => ModelKind::AddToLabelList,
            ModelRef::RecRuleReplaceContext(_) => ModelKind::RecRuleReplaceContext,
            ModelRef::RecRuleSetStopToken => ModelKind::RecRuleSetStopToken,
            ModelRef::RecRuleSetPrevCtx => ModelKind::RecRuleSetPrevCtx,
            ModelRef::RecRuleAltStart(_) => ModelKind::RecRuleAltStart,
            ModelRef::TestSetInline(_) => ModelKind::TestSetInline,
            ModelRef::Bitset(_) => ModelKind::Bitset,
            ModelRef::ThrowRecognitionError(e) => match e.kind {
                RecognitionErrorKind::NoViableAlt => ModelKind::ThrowNoViableAlt,
                RecognitionErrorKind::EarlyExit => ModelKind::ThrowEarlyExit,
            },
        }
    }

    pub fn fields(self) -> &'static [FieldDescriptor] {
        FIELDS.get(&self.kind()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn field(self, name: &str) -> Option<FieldValue<'a>> {
        self.fields()
            .iter()
            .find(|f| f.name == name)
            .map(|f| (f.extract)(self))
    }

    /// Child nodes, in field order.
    pub fn children(self) -> Vec<ModelRef<'a>> {
        let mut out = Vec::new();
        for f in self.fields().iter().filter(|f| f.model_element) {
            match (f.extract)(self) {
                FieldValue::Model(m) => out.push(m),
                FieldValue::Models(ms) => out.extend(ms),
                _ => {}
            }
        }
        out
    }
}

/// Preorder walk over `root` and every node below it.
pub fn walk<'a>(root: ModelRef<'a>, f: &mut impl FnMut(ModelRef<'a>)) {
    f(root);
    for child in root.children() {
        walk(child, f);
    }
}

fn decl_kind(decl: &Decl) -> ModelKind {
    match decl {
        Decl::TokenDecl { .. } => ModelKind::TokenDecl,
        Decl::TokenTypeDecl { .. } => ModelKind::TokenTypeDecl,
        Decl::TokenListDecl { .. } => ModelKind::TokenListDecl,
        Decl::RuleContextDecl { .. } => ModelKind::RuleContextDecl,
        Decl::RuleContextListDecl { .. } => ModelKind::RuleContextListDecl,
        Decl::AttributeDecl { .. } => ModelKind::AttributeDecl,
        Decl::ContextTokenGetter { .. } => ModelKind::ContextTokenGetterDecl,
        Decl::ContextTokenListGetter { .. } => ModelKind::ContextTokenListGetterDecl,
        Decl::ContextTokenListIndexedGetter { .. } => ModelKind::ContextTokenListIndexedGetterDecl,
        Decl::ContextRuleGetter { .. } => ModelKind::ContextRuleGetterDecl,
        Decl::ContextRuleListGetter { .. } => ModelKind::ContextRuleListGetterDecl,
        Decl::ContextRuleListIndexedGetter { .. } => ModelKind::ContextRuleListIndexedGetterDecl,
    }
}

fn choice_kind(kind: &ChoiceKind) -> ModelKind {
    match kind {
        ChoiceKind::AltBlock => ModelKind::AltBlock,
        ChoiceKind::Ll1AltBlock { .. } => ModelKind::Ll1AltBlock,
        ChoiceKind::Ll1OptionalBlock { .. } => ModelKind::Ll1OptionalBlock,
        ChoiceKind::Ll1OptionalBlockSingleAlt { .. } => ModelKind::Ll1OptionalBlockSingleAlt,
        ChoiceKind::OptionalBlock => ModelKind::OptionalBlock,
        ChoiceKind::StarBlock { .. } => ModelKind::StarBlock,
        ChoiceKind::PlusBlock { .. } => ModelKind::PlusBlock,
        ChoiceKind::Ll1StarBlockSingleAlt { .. } => ModelKind::Ll1StarBlockSingleAlt,
        ChoiceKind::Ll1PlusBlockSingleAlt { .. } => ModelKind::Ll1PlusBlockSingleAlt,
    }
}

/// `field!("name", Variant(x) => value)` for scalar fields,
/// `field!(model "name", Variant(x) => value)` for child nodes.
macro_rules! field {
    (@make $name:literal, $model:literal, $variant:ident($x:ident) => $body:expr) => {
        FieldDescriptor {
            name: $name,
            model_element: $model,
            extract: {
                fn extract(m: ModelRef<'_>) -> FieldValue<'_> {
                    match m {
                        ModelRef::$variant($x) => $body,
                        _ => FieldValue::Null,
                    }
                }
                extract
            },
        }
    };
    (model $name:literal, $variant:ident($x:ident) => $body:expr) => {
        field!(@make $name, true, $variant($x) => $body)
    };
    ($name:literal, $variant:ident($x:ident) => $body:expr) => {
        field!(@make $name, false, $variant($x) => $body)
    };
}

fn token_defs(tokens: &[TokenDef]) -> FieldValue<'_> {
    FieldValue::List(
        tokens
            .iter()
            .map(|t| FieldValue::List(vec![FieldValue::Str(&t.name), FieldValue::Int(t.ttype.into())]))
            .collect(),
    )
}

fn decl_ctx_name(decl: &Decl) -> FieldValue<'_> {
    match decl {
        Decl::RuleContextDecl { ctx_name, .. }
        | Decl::RuleContextListDecl { ctx_name, .. }
        | Decl::ContextRuleGetter { ctx_name, .. }
        | Decl::ContextRuleListGetter { ctx_name, .. }
        | Decl::ContextRuleListIndexedGetter { ctx_name, .. } => FieldValue::Str(ctx_name),
        _ => FieldValue::Null,
    }
}

fn decl_flag(decl: &Decl, flag: &str) -> FieldValue<'static> {
    let value = match (decl, flag) {
        (Decl::TokenDecl { implicit, .. } | Decl::RuleContextDecl { implicit, .. }, "implicit") => *implicit,
        (Decl::ContextTokenGetter { optional, .. } | Decl::ContextRuleGetter { optional, .. }, "optional") => {
            *optional
        }
        (_, "signature") if decl.is_getter() => decl.is_signature(),
        _ => return FieldValue::Null,
    };
    FieldValue::Bool(value)
}

fn choice_fields() -> Vec<FieldDescriptor> {
    vec![
        field!("decision", Choice(c) => FieldValue::int(c.decision)),
        field!("state_number", Choice(c) => FieldValue::int(c.state_number)),
        field!(model "alts", Choice(c) => FieldValue::models(&c.alts)),
        field!(model "preamble", Choice(c) => FieldValue::models(&c.preamble)),
    ]
}

fn loop_fields() -> Vec<FieldDescriptor> {
    vec![
        field!("loop_entry_state", Choice(c) => c.kind.looping().map_or(FieldValue::Null, |l| FieldValue::int(l.loop_entry_state))),
        field!("loop_back_state", Choice(c) => c.kind.looping().map_or(FieldValue::Null, |l| FieldValue::int(l.loop_back_state))),
        field!("exit_alt", Choice(c) => c.kind.looping().map_or(FieldValue::Null, |l| FieldValue::int(l.exit_alt))),
        field!(model "iteration", Choice(c) => c.kind.looping().map_or(FieldValue::Null, |l| FieldValue::models(&l.iteration))),
    ]
}

fn choice_error() -> FieldDescriptor {
    field!(model "error", Choice(c) => c.kind.error().map_or(FieldValue::Null, |e| FieldValue::Model(e.into())))
}

fn alt_look() -> FieldDescriptor {
    field!("alt_look", Choice(c) => match &c.kind {
        ChoiceKind::Ll1AltBlock { alt_look, .. } | ChoiceKind::Ll1OptionalBlock { alt_look, .. } => {
            FieldValue::List(alt_look.iter().map(|a| FieldValue::strs(a)).collect())
        }
        _ => FieldValue::Null,
    })
}

fn block_start_state() -> FieldDescriptor {
    field!("block_start_state", Choice(c) => match &c.kind {
        ChoiceKind::PlusBlock { block_start_state, .. }
        | ChoiceKind::Ll1PlusBlockSingleAlt { block_start_state, .. } => FieldValue::int(*block_start_state),
        _ => FieldValue::Null,
    })
}

fn loop_expr() -> FieldDescriptor {
    field!(model "loop_expr", Choice(c) => match &c.kind {
        ChoiceKind::Ll1StarBlockSingleAlt { loop_expr, .. }
        | ChoiceKind::Ll1PlusBlockSingleAlt { loop_expr, .. } => FieldValue::Model(loop_expr.into()),
        _ => FieldValue::Null,
    })
}

fn struct_fields() -> Vec<FieldDescriptor> {
    vec![
        field!("name", StructDecl(s) => FieldValue::Str(&s.name)),
        field!("derived_from_name", StructDecl(s) => FieldValue::Str(&s.derived_from_name)),
        field!("provide_copy_from", StructDecl(s) => FieldValue::Bool(s.provide_copy_from)),
        field!(model "attrs", StructDecl(s) => FieldValue::models(&s.attrs)),
        field!(model "getters", StructDecl(s) => FieldValue::models(&s.getters)),
        field!(model "signatures", StructDecl(s) => FieldValue::models(&s.signatures)),
        field!(model "ctor_attrs", StructDecl(s) => FieldValue::models(&s.ctor_attrs)),
        field!("dispatch_methods", StructDecl(s) => FieldValue::List(
            s.dispatch_methods
                .iter()
                .map(|d| FieldValue::Str(match d {
                    DispatchMethod::ListenerEnter => "enter",
                    DispatchMethod::ListenerExit => "exit",
                    DispatchMethod::Visitor => "visit",
                }))
                .collect()
        )),
    ]
}

fn decl_fields(extra: &[&'static str]) -> Vec<FieldDescriptor> {
    let mut fields = vec![field!("name", Decl(d) => FieldValue::Str(d.name()))];
    for &name in extra {
        fields.push(match name {
            "ctx_name" => field!("ctx_name", Decl(d) => decl_ctx_name(d)),
            "implicit" => field!("implicit", Decl(d) => decl_flag(d, "implicit")),
            "optional" => field!("optional", Decl(d) => decl_flag(d, "optional")),
            "signature" => field!("signature", Decl(d) => decl_flag(d, "signature")),
            "type" => field!("type", Decl(d) => match d {
                Decl::AttributeDecl { ty, .. } => FieldValue::Str(ty),
                _ => FieldValue::Null,
            }),
            _ => field!("init", Decl(d) => match d {
                Decl::AttributeDecl { init, .. } => FieldValue::opt(init),
                _ => FieldValue::Null,
            }),
        });
    }
    fields
}

fn error_fields() -> Vec<FieldDescriptor> {
    vec![
        field!("rule_index", ThrowRecognitionError(e) => FieldValue::int(e.rule_index)),
        field!("offset", ThrowRecognitionError(e) => FieldValue::int(e.offset)),
        field!("expecting", ThrowRecognitionError(e) => e.expecting.as_ref().map_or(FieldValue::Null, FieldValue::Set)),
    ]
}

fn concat(parts: impl IntoIterator<Item = Vec<FieldDescriptor>>) -> Vec<FieldDescriptor> {
    parts.into_iter().flatten().collect()
}

static FIELDS: LazyLock<IndexMap<ModelKind, Vec<FieldDescriptor>>> = LazyLock::new(|| {
    use ModelKind as K;

    let mut t: IndexMap<ModelKind, Vec<FieldDescriptor>> = IndexMap::new();
    t.insert(K::ParserFile, vec![
        field!("grammar_name", ParserFile(f) => FieldValue::Str(&f.grammar_name)),
        field!("package", ParserFile(f) => FieldValue::opt(&f.package)),
        field!(model "parser", ParserFile(f) => FieldValue::Model((&f.parser).into())),
        field!(model "listener", ParserFile(f) => FieldValue::model_opt(&f.listener)),
        field!(model "visitor", ParserFile(f) => FieldValue::model_opt(&f.visitor)),
    ]);
    t.insert(K::LexerFile, vec![
        field!("grammar_name", LexerFile(f) => FieldValue::Str(&f.grammar_name)),
        field!("package", LexerFile(f) => FieldValue::opt(&f.package)),
        field!(model "lexer", LexerFile(f) => FieldValue::Model((&f.lexer).into())),
    ]);
    t.insert(K::Parser, vec![
        field!("name", Parser(p) => FieldValue::Str(&p.name)),
        field!("grammar_name", Parser(p) => FieldValue::Str(&p.grammar_name)),
        field!("superclass", Parser(p) => FieldValue::opt(&p.superclass)),
        field!("tokens", Parser(p) => token_defs(&p.tokens)),
        field!("literal_names", Parser(p) => FieldValue::opt_strs(&p.literal_names)),
        field!("symbolic_names", Parser(p) => FieldValue::opt_strs(&p.symbolic_names)),
        field!("rule_names", Parser(p) => FieldValue::strs(&p.rule_names)),
        field!(model "funcs", Parser(p) => FieldValue::models(&p.funcs)),
        field!(model "sempred_funcs", Parser(p) => FieldValue::models(&p.sempred_funcs)),
        field!("atn_states", Parser(p) => FieldValue::int(p.atn_states)),
        field!("decisions", Parser(p) => FieldValue::int(p.decisions)),
    ]);
    t.insert(K::Lexer, vec![
        field!("name", Lexer(l) => FieldValue::Str(&l.name)),
        field!("grammar_name", Lexer(l) => FieldValue::Str(&l.grammar_name)),
        field!("tokens", Lexer(l) => token_defs(&l.tokens)),
        field!("channels", Lexer(l) => FieldValue::strs(&l.channels)),
        field!("modes", Lexer(l) => FieldValue::strs(&l.modes)),
        field!("rule_names", Lexer(l) => FieldValue::strs(&l.rule_names)),
        field!("literal_names", Lexer(l) => FieldValue::opt_strs(&l.literal_names)),
        field!("symbolic_names", Lexer(l) => FieldValue::opt_strs(&l.symbolic_names)),
        field!("actions", Lexer(l) => FieldValue::strs(&l.actions)),
        field!(model "sempred_funcs", Lexer(l) => FieldValue::models(&l.sempred_funcs)),
    ]);
    t.insert(K::ListenerFile, vec![
        field!("grammar_name", ListenerFile(f) => FieldValue::Str(&f.grammar_name)),
        field!("parser_name", ListenerFile(f) => FieldValue::Str(&f.parser_name)),
        field!("package", ListenerFile(f) => FieldValue::opt(&f.package)),
        field!(model "entries", ListenerFile(f) => FieldValue::models(&f.entries)),
    ]);
    t.insert(K::VisitorFile, vec![
        field!("grammar_name", VisitorFile(f) => FieldValue::Str(&f.grammar_name)),
        field!("parser_name", VisitorFile(f) => FieldValue::Str(&f.parser_name)),
        field!("package", VisitorFile(f) => FieldValue::opt(&f.package)),
        field!(model "entries", VisitorFile(f) => FieldValue::models(&f.entries)),
    ]);
    t.insert(K::ListenerEntry, vec![
        field!("name", ListenerEntry(e) => FieldValue::Str(&e.name)),
        field!("rule_name", ListenerEntry(e) => FieldValue::Str(&e.rule_name)),
        field!("ctx_type", ListenerEntry(e) => FieldValue::Str(&e.ctx_type)),
    ]);
    t.insert(K::RuleFunction, vec![
        field!("name", RuleFunction(r) => FieldValue::Str(&r.name)),
        field!("index", RuleFunction(r) => FieldValue::int(r.index)),
        field!("ctx_type", RuleFunction(r) => FieldValue::Str(&r.ctx_type)),
        field!("start_state", RuleFunction(r) => FieldValue::int(r.start_state)),
        field!(model "args", RuleFunction(r) => FieldValue::models(&r.args)),
        field!(model "locals", RuleFunction(r) => FieldValue::models(&r.locals)),
        field!(model "rule_ctx", RuleFunction(r) => FieldValue::Model((&r.rule_ctx).into())),
        field!(model "alt_label_ctxs", RuleFunction(r) => FieldValue::models(&r.alt_label_ctxs)),
        field!(model "code", RuleFunction(r) => FieldValue::models(&r.code)),
        field!(model "exceptions", RuleFunction(r) => FieldValue::models(&r.exceptions)),
        field!("finally_action", RuleFunction(r) => FieldValue::opt(&r.finally_action)),
        field!("left_recursive", RuleFunction(r) => FieldValue::Bool(r.left_recursive)),
        field!("has_lookahead_block", RuleFunction(r) => FieldValue::Bool(r.has_lookahead_block)),
    ]);
    t.insert(K::RuleSempredFunction, vec![
        field!("name", RuleSempredFunction(r) => FieldValue::Str(&r.name)),
        field!("rule_index", RuleSempredFunction(r) => FieldValue::int(r.rule_index)),
        field!("ctx_type", RuleSempredFunction(r) => FieldValue::Str(&r.ctx_type)),
        field!("preds", RuleSempredFunction(r) => FieldValue::List(
            r.preds
                .iter()
                .map(|(i, text)| FieldValue::List(vec![FieldValue::int(*i), FieldValue::Str(text)]))
                .collect()
        )),
    ]);
    t.insert(K::StructDecl, struct_fields());
    t.insert(K::AltLabelStructDecl, concat([
        struct_fields(),
        vec![
            field!("alt_label", StructDecl(s) => FieldValue::opt(&s.alt_label)),
            field!("alt_nums", StructDecl(s) => FieldValue::List(s.alt_nums.iter().map(|n| FieldValue::int(*n)).collect())),
        ],
    ]));

    t.insert(K::TokenDecl, decl_fields(&["implicit"]));
    t.insert(K::TokenTypeDecl, decl_fields(&[]));
    t.insert(K::TokenListDecl, decl_fields(&[]));
    t.insert(K::RuleContextDecl, decl_fields(&["ctx_name", "implicit"]));
    t.insert(K::RuleContextListDecl, decl_fields(&["ctx_name"]));
    t.insert(K::AttributeDecl, decl_fields(&["type", "init"]));
    t.insert(K::ContextTokenGetterDecl, decl_fields(&["optional", "signature"]));
    t.insert(K::ContextTokenListGetterDecl, decl_fields(&["signature"]));
    t.insert(K::ContextTokenListIndexedGetterDecl, decl_fields(&["signature"]));
    t.insert(K::ContextRuleGetterDecl, decl_fields(&["ctx_name", "optional", "signature"]));
    t.insert(K::ContextRuleListGetterDecl, decl_fields(&["ctx_name", "signature"]));
    t.insert(K::ContextRuleListIndexedGetterDecl, decl_fields(&["ctx_name", "signature"]));

    t.insert(K::ExceptionClause, vec![
        field!("catch_arg", ExceptionClause(e) => FieldValue::Str(&e.catch_arg)),
        field!("action", ExceptionClause(e) => FieldValue::Str(&e.action)),
    ]);
    t.insert(K::CodeBlockForAlt, vec![
        field!(model "ops", CodeBlock(c) => FieldValue::models(&c.ops)),
    ]);
    t.insert(K::CodeBlockForOuterMostAlt, vec![
        field!("alt_num", CodeBlock(c) => c.alt_num.map_or(FieldValue::Null, FieldValue::int)),
        field!("alt_label", CodeBlock(c) => FieldValue::opt(&c.alt_label)),
        field!(model "ops", CodeBlock(c) => FieldValue::models(&c.ops)),
    ]);

    t.insert(K::AltBlock, choice_fields());
    t.insert(K::OptionalBlock, choice_fields());
    t.insert(K::Ll1AltBlock, concat([choice_fields(), vec![alt_look(), choice_error()]]));
    t.insert(K::Ll1OptionalBlock, concat([choice_fields(), vec![alt_look(), choice_error()]]));
    t.insert(K::Ll1OptionalBlockSingleAlt, concat([
        choice_fields(),
        vec![
            field!(model "expr", Choice(c) => match &c.kind {
                ChoiceKind::Ll1OptionalBlockSingleAlt { expr, .. } => FieldValue::Model(expr.into()),
                _ => FieldValue::Null,
            }),
            field!(model "follow_expr", Choice(c) => match &c.kind {
                ChoiceKind::Ll1OptionalBlockSingleAlt { follow_expr, .. } => FieldValue::Model(follow_expr.into()),
                _ => FieldValue::Null,
            }),
            choice_error(),
        ],
    ]));
    t.insert(K::StarBlock, concat([choice_fields(), loop_fields()]));
    t.insert(K::PlusBlock, concat([choice_fields(), loop_fields(), vec![block_start_state(), choice_error()]]));
    t.insert(K::Ll1StarBlockSingleAlt, concat([choice_fields(), loop_fields(), vec![loop_expr()]]));
    t.insert(K::Ll1PlusBlockSingleAlt, concat([choice_fields(), loop_fields(), vec![block_start_state(), loop_expr()]]));

    t.insert(K::MatchToken, vec![
        field!("state_number", MatchToken(m) => FieldValue::int(m.state_number)),
        field!("ttype", MatchToken(m) => FieldValue::int(m.ttype)),
        field!("name", MatchToken(m) => FieldValue::Str(&m.name)),
        field!("labels", MatchToken(m) => FieldValue::strs(&m.labels)),
    ]);
    let match_set = || {
        vec![
            field!("state_number", MatchSet(m) => FieldValue::int(m.state_number)),
            field!("invert", MatchSet(m) => FieldValue::Bool(m.invert)),
            field!(model "expr", MatchSet(m) => FieldValue::Model((&m.expr).into())),
            field!(model "capture", MatchSet(m) => FieldValue::Model((&m.capture).into())),
            field!("labels", MatchSet(m) => FieldValue::strs(&m.labels)),
        ]
    };
    t.insert(K::MatchSet, match_set());
    t.insert(K::MatchNotSet, match_set());
    t.insert(K::Wildcard, vec![
        field!("state_number", Wildcard(m) => FieldValue::int(m.state_number)),
        field!("labels", Wildcard(m) => FieldValue::strs(&m.labels)),
    ]);
    t.insert(K::InvokeRule, vec![
        field!("state_number", InvokeRule(m) => FieldValue::int(m.state_number)),
        field!("name", InvokeRule(m) => FieldValue::Str(&m.name)),
        field!("ctx_name", InvokeRule(m) => FieldValue::Str(&m.ctx_name)),
        field!("args", InvokeRule(m) => FieldValue::opt(&m.args)),
        field!("labels", InvokeRule(m) => FieldValue::strs(&m.labels)),
    ]);
    t.insert(K::Action, vec![
        field!("state_number", Action(a) => a.state_number.map_or(FieldValue::Null, FieldValue::int)),
        field!("text", Action(a) => FieldValue::Str(&a.text)),
    ]);
    t.insert(K::SemPred, vec![
        field!("state_number", SemPred(p) => FieldValue::int(p.state_number)),
        field!("rule_index", SemPred(p) => FieldValue::int(p.rule_index)),
        field!("pred_index", SemPred(p) => FieldValue::int(p.pred_index)),
        field!("predicate", SemPred(p) => FieldValue::Str(&p.predicate)),
    ]);
    t.insert(K::PrecedencePredicate, vec![
        field!("state_number", PrecedencePredicate(p) => FieldValue::int(p.state_number)),
        field!("rule_index", PrecedencePredicate(p) => FieldValue::int(p.rule_index)),
        field!("pred_index", PrecedencePredicate(p) => FieldValue::int(p.pred_index)),
        field!("precedence", PrecedencePredicate(p) => FieldValue::int(p.precedence)),
    ]);
    t.insert(K::CaptureNextTokenType, vec![
        field!("var_name", CaptureNextTokenType(c) => FieldValue::Str(&c.var_name)),
    ]);
    t.insert(K::AddToLabelList, vec![
        field!("list_name", AddToLabelList(a) => FieldValue::Str(&a.list_name)),
        field!("label", AddToLabelList(a) => FieldValue::Str(&a.label)),
    ]);
    t.insert(K::RecRuleReplaceContext, vec![
        field!("ctx_name", RecRuleReplaceContext(r) => FieldValue::Str(&r.ctx_name)),
    ]);
    t.insert(K::RecRuleSetStopToken, Vec::new());
    t.insert(K::RecRuleSetPrevCtx, Vec::new());
    t.insert(K::RecRuleAltStart, vec![
        field!("rule_name", RecRuleAltStart(r) => FieldValue::Str(&r.rule_name)),
        field!("ctx_name", RecRuleAltStart(r) => FieldValue::Str(&r.ctx_name)),
        field!("alt_label", RecRuleAltStart(r) => FieldValue::opt(&r.alt_label)),
        field!("label", RecRuleAltStart(r) => FieldValue::opt(&r.label)),
        field!("is_list_label", RecRuleAltStart(r) => FieldValue::Bool(r.is_list_label)),
    ]);
    t.insert(K::TestSetInline, vec![
        field!("var_name", TestSetInline(s) => FieldValue::Str(&s.var_name)),
        field!("word_size", TestSetInline(s) => FieldValue::int(s.word_size)),
        field!(model "bitsets", TestSetInline(s) => FieldValue::models(&s.bitsets)),
    ]);
    t.insert(K::Bitset, vec![
        field!("shift", Bitset(b) => FieldValue::int(b.shift)),
        field!("calculated", Bitset(b) => FieldValue::int(b.calculated)),
        field!("tokens", Bitset(b) => FieldValue::List(
            b.tokens
                .iter()
                .map(|t| FieldValue::List(vec![FieldValue::int(t.ttype), FieldValue::Str(&t.name)]))
                .collect()
        )),
    ]);
    t.insert(K::ThrowNoViableAlt, error_fields());
    t.insert(K::ThrowEarlyExit, error_fields());
    t
});
