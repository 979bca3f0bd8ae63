//! Pipeline driver.
//!
//! [`compile_grammar`] runs one grammar through every pass. [`Tool`] compiles a
//! batch of grammars that import each other, in dependency order, and keeps
//! going when one of them fails.

use indexmap::IndexMap;

use crate::analysis::analyze;
use crate::atn::{Atn, build_atn, verify};
use crate::codegen::build_output_model;
use crate::codegen::model::OutputFile;
use crate::config::ToolConfig;
use crate::diagnostics::{
    DiagnosticKind, DiagnosticListener, Diagnostics, LogListener, Severity, dispatch,
};
use crate::grammar::{Grammar, check_grammar};
use crate::leftrec::rewrite_left_recursion;
use crate::scc::{SccFinder, is_cycle};
use crate::{Error, Result};

/// One grammar after the whole pipeline.
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    pub grammar: Grammar,
    pub atn: Atn,
    pub file: OutputFile,
    pub diagnostics: Diagnostics,
    /// Implicit lexer of a combined grammar, compiled first.
    pub lexer: Option<Box<CompiledGrammar>>,
}

impl CompiledGrammar {
    /// Names of rules left out of the output model.
    pub fn excluded_rules(&self) -> Vec<&str> {
        self.grammar
            .rules
            .values()
            .filter(|r| r.excluded)
            .map(|r| r.name.as_str())
            .collect()
    }
}

/// Compile one grammar. Combined grammars are split; the implicit lexer is
/// compiled first and the parser takes over its vocabulary.
///
/// Errors not attributed to a rule fail the grammar with
/// [`Error::GrammarFailed`]. Rule errors only exclude the rules involved.
pub fn compile_grammar(grammar: Grammar, diagnostics: Diagnostics, config: &ToolConfig) -> Result<CompiledGrammar> {
    if !grammar.is_combined() {
        return compile_single(grammar, diagnostics, config);
    }

    let (mut parser, lexer) = grammar.split_combined();
    log::debug!(target: "antler::tool", "split `{}` into `{}` and `{}`", grammar.name, parser.name, lexer.name);
    let lexer = compile_single(lexer, Diagnostics::new(), config)?;
    parser.vocab = lexer.grammar.vocab.clone();
    let mut compiled = compile_single(parser, diagnostics, config)?;
    compiled.lexer = Some(Box::new(lexer));
    Ok(compiled)
}

fn compile_single(mut grammar: Grammar, mut diagnostics: Diagnostics, config: &ToolConfig) -> Result<CompiledGrammar> {
    grammar.assign_token_types(&mut diagnostics);
    check_grammar(&grammar, &mut diagnostics);
    if diagnostics.has_grammar_errors() {
        return Err(Error::GrammarFailed(diagnostics));
    }

    rewrite_left_recursion(&mut grammar, &mut diagnostics);
    exclude_failed_rules(&mut grammar, &diagnostics);

    let atn = build_atn(&mut grammar);
    verify(&atn, &grammar)?;
    log::debug!(
        target: "antler::tool",
        "`{}`: {} states, {} decisions",
        grammar.name,
        atn.len(),
        atn.num_decisions()
    );

    analyze(&mut grammar, &atn, config, &mut diagnostics);
    exclude_failed_rules(&mut grammar, &diagnostics);
    if diagnostics.has_grammar_errors() {
        return Err(Error::GrammarFailed(diagnostics));
    }

    let file = build_output_model(&grammar, &atn, config)?;
    for rule in grammar.rules.values().filter(|r| r.excluded) {
        diagnostics
            .report(DiagnosticKind::RuleExcluded, rule.range)
            .message(rule.name.as_str())
            .emit();
    }

    Ok(CompiledGrammar {
        grammar,
        atn,
        file,
        diagnostics,
        lexer: None,
    })
}

fn exclude_failed_rules(grammar: &mut Grammar, diagnostics: &Diagnostics) {
    for name in diagnostics.failed_rules() {
        if let Some(rule) = grammar.rule_mut(&name)
            && !rule.excluded
        {
            log::debug!(target: "antler::tool", "excluding rule `{name}`");
            rule.excluded = true;
        }
    }
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Successfully compiled grammars, in processing order.
    pub compiled: IndexMap<String, CompiledGrammar>,
    /// Diagnostics of grammars that failed.
    pub failed: IndexMap<String, Diagnostics>,
    /// Internal errors, one per grammar that hit one.
    pub internal_errors: Vec<Error>,
    warnings_are_errors: bool,
}

impl BatchResult {
    /// Most severe diagnostic across the batch. Internal errors count as errors.
    pub fn worst_severity(&self) -> Option<Severity> {
        let compiled = self.compiled.values().flat_map(|c| {
            let lexer = c.lexer.as_ref().and_then(|l| l.diagnostics.worst_severity());
            [c.diagnostics.worst_severity(), lexer]
        });
        let failed = self.failed.values().map(Diagnostics::worst_severity);
        let internal = (!self.internal_errors.is_empty()).then_some(Severity::Error);
        compiled.chain(failed).chain([internal]).flatten().max()
    }

    /// 1 when an error was seen, or a warning with `warnings_are_errors`.
    pub fn exit_code(&self) -> i32 {
        match self.worst_severity() {
            Some(Severity::Error) => 1,
            Some(Severity::Warning) if self.warnings_are_errors => 1,
            _ => 0,
        }
    }

    pub fn get(&self, name: &str) -> Option<&CompiledGrammar> {
        self.compiled.get(name)
    }

    /// As [`Self::get`], failing for grammars that did not compile.
    pub fn require(&self, name: &str) -> Result<&CompiledGrammar> {
        self.compiled
            .get(name)
            .ok_or_else(|| Error::UnknownGrammar(name.to_string()))
    }

    pub fn is_failed(&self, name: &str) -> bool {
        self.failed.contains_key(name) || self.internal_errors.iter().any(|e| failed_grammar(e) == Some(name))
    }
}

fn failed_grammar(error: &Error) -> Option<&str> {
    match error {
        Error::InternalInconsistency { grammar, .. } => Some(grammar.as_str()),
        Error::UnknownGrammar(name) => Some(name.as_str()),
        Error::GrammarFailed(_) => None,
    }
}

/// A batch of grammars compiled together.
///
/// Grammars are processed leaves first along `import` and `tokenVocab`
/// edges. A grammar whose dependency failed is reported and skipped; the
/// rest of the batch still compiles.
#[derive(Debug, Default)]
pub struct Tool {
    config: ToolConfig,
    grammars: IndexMap<String, (Grammar, Diagnostics)>,
}

impl Tool {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            grammars: IndexMap::new(),
        }
    }

    /// Add a grammar with the diagnostics its producer reported.
    pub fn add_grammar(&mut self, grammar: Grammar, diagnostics: Diagnostics) -> &mut Self {
        self.grammars.insert(grammar.name.clone(), (grammar, diagnostics));
        self
    }

    /// Compile the batch, reporting through the `log` facade.
    pub fn process(self) -> BatchResult {
        self.process_with(&mut LogListener)
    }

    /// Compile the batch. Each grammar's diagnostics go to `listener` as soon
    /// as it is done.
    pub fn process_with(self, listener: &mut dyn DiagnosticListener) -> BatchResult {
        let Tool { config, mut grammars } = self;
        let mut result = BatchResult {
            warnings_are_errors: config.warnings_are_errors,
            ..BatchResult::default()
        };

        let deps: IndexMap<String, Vec<String>> = grammars
            .iter()
            .map(|(name, (g, _))| (name.clone(), dependencies(g)))
            .collect();
        let sccs = SccFinder::find(&deps);

        // Compiled grammars with their imports merged, for grammars importing them.
        let mut merged: IndexMap<String, Grammar> = IndexMap::new();

        for scc in sccs {
            let cyclic = is_cycle(&deps, &scc);
            for name in &scc {
                let Some((mut grammar, mut diagnostics)) = grammars.swap_remove(name) else {
                    continue;
                };
                if cyclic {
                    diagnostics
                        .report(DiagnosticKind::ImportCycle, grammar.range)
                        .message(scc.join(", "))
                        .emit();
                    dispatch(listener, name, &diagnostics);
                    result.failed.insert(name.clone(), diagnostics);
                    continue;
                }

                resolve_imports(&mut grammar, &mut diagnostics, &merged, &result);
                let imported_form = grammar.clone();
                resolve_token_vocab(&mut grammar, &mut diagnostics, &result);

                log::debug!(target: "antler::tool", "compiling `{name}`");
                match compile_grammar(grammar, diagnostics, &config) {
                    Ok(compiled) => {
                        merged.insert(name.clone(), imported_form);
                        if let Some(lexer) = &compiled.lexer {
                            dispatch(listener, &lexer.grammar.name, &lexer.diagnostics);
                        }
                        dispatch(listener, name, &compiled.diagnostics);
                        result.compiled.insert(name.clone(), compiled);
                    }
                    Err(Error::GrammarFailed(diagnostics)) => {
                        dispatch(listener, name, &diagnostics);
                        result.failed.insert(name.clone(), diagnostics);
                    }
                    Err(err) => {
                        log::error!(target: "antler::tool", "{err}");
                        result.internal_errors.push(err);
                    }
                }
            }
        }
        result
    }
}

/// Names a grammar needs compiled before itself.
fn dependencies(grammar: &Grammar) -> Vec<String> {
    let mut deps: Vec<String> = grammar.imports.iter().map(|(n, _)| n.clone()).collect();
    if let Some(vocab) = &grammar.options.token_vocab
        && !deps.contains(vocab)
    {
        deps.push(vocab.clone());
    }
    deps
}

fn resolve_imports(
    grammar: &mut Grammar,
    diagnostics: &mut Diagnostics,
    merged: &IndexMap<String, Grammar>,
    result: &BatchResult,
) {
    for (name, range) in grammar.imports.clone() {
        if let Some(imported) = merged.get(&name) {
            grammar.import_from(imported);
            continue;
        }
        let kind = if result.is_failed(&name) {
            DiagnosticKind::ImportFailed
        } else {
            DiagnosticKind::ImportNotFound
        };
        diagnostics.report(kind, range).message(name.as_str()).emit();
    }
}

fn resolve_token_vocab(grammar: &mut Grammar, diagnostics: &mut Diagnostics, result: &BatchResult) {
    let Some(name) = grammar.options.token_vocab.clone() else {
        return;
    };
    match result.get(&name) {
        Some(source) => grammar.vocab = source.grammar.vocab.clone(),
        None => {
            let kind = if result.is_failed(&name) {
                DiagnosticKind::ImportFailed
            } else {
                DiagnosticKind::ImportNotFound
            };
            diagnostics
                .report(kind, grammar.range)
                .message(name.as_str())
                .emit();
        }
    }
}
