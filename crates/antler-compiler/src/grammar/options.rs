//! Grammar-level options supplied by the grammar parser.

/// Options declared in a grammar's `options { ... }` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrammarOptions {
    pub(crate) generate_listener: bool,
    pub(crate) generate_visitor: bool,
    pub(crate) package: Option<String>,
    pub(crate) superclass: Option<String>,
    pub(crate) token_vocab: Option<String>,
    pub(crate) case_insensitive: bool,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self {
            generate_listener: true,
            generate_visitor: false,
            package: None,
            superclass: None,
            token_vocab: None,
            case_insensitive: false,
        }
    }
}

impl GrammarOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_listener(mut self, value: bool) -> Self {
        self.generate_listener = value;
        self
    }

    pub fn generate_visitor(mut self, value: bool) -> Self {
        self.generate_visitor = value;
        self
    }

    pub fn package(mut self, value: impl Into<String>) -> Self {
        self.package = Some(value.into());
        self
    }

    pub fn superclass(mut self, value: impl Into<String>) -> Self {
        self.superclass = Some(value.into());
        self
    }

    /// Name of the grammar whose vocabulary this grammar uses.
    pub fn token_vocab(mut self, value: impl Into<String>) -> Self {
        self.token_vocab = Some(value.into());
        self
    }

    /// Lexer literals and sets match both letter cases.
    pub fn case_insensitive(mut self, value: bool) -> Self {
        self.case_insensitive = value;
        self
    }
}
