//! Antler: grammar compiler core.
//!
//! Takes grammars built with [`grammar::GrammarBuilder`], rewrites
//! left recursion, builds the ATN, computes LL(1) lookahead and produces a
//! target-independent output model for code generation.
//!
//! # Example
//!
//! ```
//! use antler_compiler::grammar::{GrammarBuilder, alt, tok};
//! use antler_compiler::{ToolConfig, compile_grammar};
//!
//! let (grammar, diagnostics) = GrammarBuilder::parser("P")
//!     .tokens(&["A", "B"])
//!     .rule("s", [alt([tok("A")]), alt([tok("B")])])
//!     .build();
//! let compiled = compile_grammar(grammar, diagnostics, &ToolConfig::default()).unwrap();
//! assert!(compiled.grammar.decision_look[0].ll1);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analysis;
pub mod atn;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod grammar;
pub mod leftrec;
pub mod scc;
pub mod tool;

#[cfg(test)]
mod scc_tests;

#[cfg(test)]
pub mod test_utils;

pub use config::ToolConfig;
pub use diagnostics::{Diagnostics, Severity};
pub use tool::{BatchResult, CompiledGrammar, Tool, compile_grammar};

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A pass produced a structure that breaks its own invariants.
    #[error("internal inconsistency in grammar `{grammar}`: {detail}")]
    InternalInconsistency { grammar: String, detail: String },

    #[error("unknown grammar `{0}`")]
    UnknownGrammar(String),

    #[error("grammar failed with {} errors", .0.error_count())]
    GrammarFailed(Diagnostics),
}

/// Grammar problems are diagnostics; `Err` is reserved for failures that
/// stop the whole grammar.
pub type Result<T> = std::result::Result<T, Error>;
