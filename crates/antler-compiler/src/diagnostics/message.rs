use rowan::TextRange;

/// Error taxonomy. Every kind belongs to exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Syntax,
    Semantic,
    LeftRecursionCycle,
    Ambiguity,
    Analysis,
    Import,
}

/// Diagnostic kinds, grouped by the pass that reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Passed through from the grammar parser
    SyntaxError,

    // Rules and references
    UndefinedRule,
    UndefinedToken,
    ImplicitTokenDefinition,
    RuleRedefinition,
    ParserRuleInLexer,
    LexerRuleInParser,
    LabelTypeConflict,
    EmptyBlock,

    // Lexer sets, ranges and literals
    MultiCharLiteralInLexerSet,
    ReferenceInLexerSet,
    InvalidRange,
    EmptyLexerLiteral,
    InvalidCharSet,
    InvalidLexerCommand,

    // Left recursion
    LeftRecursionCycle,
    NoNonLeftRecursiveAlts,

    // Lookahead analysis
    AmbiguousDecision,
    EpsilonToken,

    // Batch scheduling
    ImportNotFound,
    ImportCycle,
    ImportFailed,

    RuleExcluded,
}

impl DiagnosticKind {
    pub fn category(&self) -> Category {
        match self {
            Self::SyntaxError => Category::Syntax,
            Self::LeftRecursionCycle | Self::NoNonLeftRecursiveAlts => {
                Category::LeftRecursionCycle
            }
            Self::AmbiguousDecision => Category::Ambiguity,
            Self::EpsilonToken | Self::RuleExcluded => Category::Analysis,
            Self::ImportNotFound | Self::ImportCycle | Self::ImportFailed => Category::Import,
            _ => Category::Semantic,
        }
    }

    /// Default severity for this kind.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::ImplicitTokenDefinition | Self::AmbiguousDecision => Severity::Warning,
            Self::RuleExcluded => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::SyntaxError => "syntax error",

            Self::UndefinedRule => "reference to undefined rule",
            Self::UndefinedToken => "reference to undefined token",
            Self::ImplicitTokenDefinition => "implicit definition of token in parser",
            Self::RuleRedefinition => "rule redefinition",
            Self::ParserRuleInLexer => "parser rule not allowed in lexer",
            Self::LexerRuleInParser => "lexer rule not allowed in parser",
            Self::LabelTypeConflict => "label assigned to different element types",
            Self::EmptyBlock => "block has no alternatives",

            Self::MultiCharLiteralInLexerSet => {
                "multi-character literals are not allowed in lexer sets"
            }
            Self::ReferenceInLexerSet => "rule reference not supported in a set",
            Self::InvalidRange => "invalid range",
            Self::EmptyLexerLiteral => "string literals and sets cannot be empty",
            Self::InvalidCharSet => "invalid character set",
            Self::InvalidLexerCommand => "invalid lexer command",

            Self::LeftRecursionCycle => "rules are mutually left-recursive",
            Self::NoNonLeftRecursiveAlts => "left-recursive rule has no non-left-recursive alternative",

            Self::AmbiguousDecision => "alternatives share lookahead",
            Self::EpsilonToken => "non-fragment lexer rule can match the empty string",

            Self::ImportNotFound => "imported grammar not found",
            Self::ImportCycle => "grammars import each other",
            Self::ImportFailed => "imported grammar failed to compile",

            Self::RuleExcluded => "rule excluded from code generation",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::SyntaxError => "{}".to_string(),
            Self::UndefinedRule => "reference to undefined rule `{}`".to_string(),
            Self::UndefinedToken => "reference to undefined token `{}`".to_string(),
            Self::ImplicitTokenDefinition => "implicit definition of token `{}` in parser".to_string(),
            Self::RuleRedefinition => "rule `{}` is already defined".to_string(),
            Self::LeftRecursionCycle => "left-recursive cycle: {}".to_string(),
            Self::RuleExcluded => "rule `{}` excluded from code generation".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Info,
    Warning,
    #[default]
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) range: TextRange,
    pub(crate) message: String,
    /// Rule the problem was found in, if any. Rules named by error
    /// diagnostics are left out of code generation.
    pub(crate) rules: Vec<String>,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            message: message.into(),
            rules: Vec::new(),
            related: Vec::new(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self::new(kind, range, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn related(&self) -> &[RelatedInfo] {
        &self.related
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity(),
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        Ok(())
    }
}
