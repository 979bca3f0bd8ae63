//! Tool-level configuration.

/// Configuration for one tool run, shared by every grammar in the batch.
#[derive(Clone, Debug)]
pub struct ToolConfig {
    /// Never build LL(1) choice variants
    pub(crate) force_atn: bool,
    /// Overrides the grammar's `generate_listener` option when set
    pub(crate) generate_listener: Option<bool>,
    /// Overrides the grammar's `generate_visitor` option when set
    pub(crate) generate_visitor: Option<bool>,
    /// Count warnings as errors for the exit status
    pub(crate) warnings_are_errors: bool,
    /// Bits per word in inline lookahead bitsets
    pub(crate) inline_test_set_word_size: u32,
    /// Report decisions whose alternatives share lookahead
    pub(crate) report_ambiguities: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            force_atn: false,
            generate_listener: None,
            generate_visitor: None,
            warnings_are_errors: false,
            inline_test_set_word_size: 64,
            report_ambiguities: true,
        }
    }
}

impl ToolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always use adaptive prediction, even for LL(1) decisions.
    pub fn force_atn(mut self, value: bool) -> Self {
        self.force_atn = value;
        self
    }

    pub fn generate_listener(mut self, value: bool) -> Self {
        self.generate_listener = Some(value);
        self
    }

    pub fn generate_visitor(mut self, value: bool) -> Self {
        self.generate_visitor = Some(value);
        self
    }

    pub fn warnings_are_errors(mut self, value: bool) -> Self {
        self.warnings_are_errors = value;
        self
    }

    /// Bits per word in inline lookahead bitsets. Clamped to `1..=64`.
    pub fn inline_test_set_word_size(mut self, value: u32) -> Self {
        self.inline_test_set_word_size = value.clamp(1, 64);
        self
    }

    pub fn report_ambiguities(mut self, value: bool) -> Self {
        self.report_ambiguities = value;
        self
    }
}
