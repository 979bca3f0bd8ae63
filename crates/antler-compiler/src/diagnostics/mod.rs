mod listener;
mod message;

#[cfg(test)]
mod tests;

use indexmap::IndexSet;
use rowan::TextRange;

pub use listener::{CollectingListener, DiagnosticListener, LogListener, dispatch};
pub use message::{Category, DiagnosticKind, DiagnosticMessage, RelatedInfo, Severity};

/// Diagnostics collected while compiling one grammar.
///
/// Passes take `&mut Diagnostics` and keep going after reporting, so a
/// single malformed rule never hides problems elsewhere.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a diagnostic with the given kind and span.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to override.
    pub fn report(&mut self, kind: DiagnosticKind, range: TextRange) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::with_default_message(kind, range),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.messages.iter().filter(|d| d.kind == kind).count()
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        self.messages.iter().map(|d| d.severity()).max()
    }

    /// Rules named by at least one error.
    pub fn failed_rules(&self) -> IndexSet<String> {
        self.messages
            .iter()
            .filter(|d| d.is_error())
            .flat_map(|d| d.rules.iter().cloned())
            .collect()
    }

    /// Errors not attributed to any rule; these fail the whole grammar.
    pub fn has_grammar_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|d| d.is_error() && d.rules.is_empty())
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    /// Raw access to all diagnostics (for debugging/testing).
    #[allow(dead_code)]
    pub(crate) fn raw(&self) -> &[DiagnosticMessage] {
        &self.messages
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Provide custom detail for this diagnostic, rendered using the kind's template.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        let detail = msg.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    pub fn related_to(mut self, msg: impl Into<String>, range: TextRange) -> Self {
        self.message.related.push(RelatedInfo::new(range, msg));
        self
    }

    /// Attribute the diagnostic to a rule.
    pub fn in_rule(mut self, rule: impl Into<String>) -> Self {
        self.message.rules.push(rule.into());
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticMessage;
    type IntoIter = std::slice::Iter<'a, DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
