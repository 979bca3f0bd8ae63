//! Injected sinks for classified diagnostics.
//!
//! The compiler never formats diagnostics for display. It hands each
//! message to a listener according to its severity.

use super::{DiagnosticMessage, Diagnostics, Severity};

pub trait DiagnosticListener {
    fn info(&mut self, grammar: &str, message: &DiagnosticMessage);
    fn warning(&mut self, grammar: &str, message: &DiagnosticMessage);
    fn error(&mut self, grammar: &str, message: &DiagnosticMessage);
}

/// Route every message in `diagnostics` to `listener` by severity.
pub fn dispatch(listener: &mut dyn DiagnosticListener, grammar: &str, diagnostics: &Diagnostics) {
    for message in diagnostics {
        match message.severity() {
            Severity::Info => listener.info(grammar, message),
            Severity::Warning => listener.warning(grammar, message),
            Severity::Error => listener.error(grammar, message),
        }
    }
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl DiagnosticListener for LogListener {
    fn info(&mut self, grammar: &str, message: &DiagnosticMessage) {
        log::info!(target: "antler", "{grammar}: {}", message.message());
    }

    fn warning(&mut self, grammar: &str, message: &DiagnosticMessage) {
        log::warn!(target: "antler", "{grammar}: {}", message.message());
    }

    fn error(&mut self, grammar: &str, message: &DiagnosticMessage) {
        log::error!(target: "antler", "{grammar}: {}", message.message());
    }
}

/// Keeps `grammar: message` lines per severity.
#[derive(Debug, Default, Clone)]
pub struct CollectingListener {
    pub infos: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CollectingListener {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticListener for CollectingListener {
    fn info(&mut self, grammar: &str, message: &DiagnosticMessage) {
        self.infos.push(format!("{grammar}: {}", message.message()));
    }

    fn warning(&mut self, grammar: &str, message: &DiagnosticMessage) {
        self.warnings.push(format!("{grammar}: {}", message.message()));
    }

    fn error(&mut self, grammar: &str, message: &DiagnosticMessage) {
        self.errors.push(format!("{grammar}: {}", message.message()));
    }
}
