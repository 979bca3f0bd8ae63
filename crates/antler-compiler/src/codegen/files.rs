//! Recognizer files: parser with its listener and visitor, or lexer.

use antler_core::utils::context_name;

use super::builder::{RuleFunctionBuilder, rule_sempreds};
use super::model::{
    Lexer, LexerFile, ListenerEntry, ListenerFile, OutputFile, Parser, ParserFile, TokenDef,
    VisitorFile,
};
use crate::Result;
use crate::atn::Atn;
use crate::config::ToolConfig;
use crate::grammar::Grammar;

/// Build the output model of an analyzed grammar. Excluded rules get no
/// function but keep their index in `rule_names`.
pub fn build_output_model(grammar: &Grammar, atn: &Atn, config: &ToolConfig) -> Result<OutputFile> {
    let file = if grammar.is_lexer() {
        OutputFile::Lexer(lexer_file(grammar, atn))
    } else {
        OutputFile::Parser(parser_file(grammar, atn, config)?)
    };
    log::debug!(target: "antler::codegen", "built output model for `{}`", grammar.name);
    Ok(file)
}

fn parser_file(grammar: &Grammar, atn: &Atn, config: &ToolConfig) -> Result<ParserFile> {
    let listener = config
        .generate_listener
        .unwrap_or(grammar.options.generate_listener);
    let visitor = config
        .generate_visitor
        .unwrap_or(grammar.options.generate_visitor);

    let mut funcs = Vec::new();
    let mut sempred_funcs = Vec::new();
    for rule in grammar.rules.values() {
        if rule.excluded || rule.is_lexer() {
            continue;
        }
        let (func, preds) = RuleFunctionBuilder::new(grammar, atn, config, rule, listener, visitor).build()?;
        funcs.push(func);
        sempred_funcs.extend(preds);
    }

    let parser = Parser {
        name: grammar.recognizer_name(),
        grammar_name: grammar.name.clone(),
        superclass: grammar.options.superclass.clone(),
        tokens: token_defs(grammar),
        literal_names: grammar.vocab.literal_names(),
        symbolic_names: grammar.vocab.symbolic_names(),
        rule_names: grammar.rule_names(),
        funcs,
        sempred_funcs,
        atn_states: atn.len(),
        decisions: atn.num_decisions(),
    };
    let package = grammar.options.package.clone();

    Ok(ParserFile {
        grammar_name: grammar.name.clone(),
        listener: listener.then(|| ListenerFile {
            grammar_name: grammar.name.clone(),
            parser_name: parser.name.clone(),
            package: package.clone(),
            entries: listener_entries(grammar),
        }),
        visitor: visitor.then(|| VisitorFile {
            grammar_name: grammar.name.clone(),
            parser_name: parser.name.clone(),
            package: package.clone(),
            entries: listener_entries(grammar),
        }),
        package,
        parser,
    })
}

fn lexer_file(grammar: &Grammar, atn: &Atn) -> LexerFile {
    let sempred_funcs = grammar
        .rules
        .values()
        .filter(|r| !r.excluded)
        .filter_map(|r| rule_sempreds(grammar, r, &context_name(&r.name)))
        .collect();
    LexerFile {
        grammar_name: grammar.name.clone(),
        package: grammar.options.package.clone(),
        lexer: Lexer {
            name: grammar.recognizer_name(),
            grammar_name: grammar.name.clone(),
            tokens: token_defs(grammar),
            channels: grammar.channels.clone(),
            modes: grammar.modes.clone(),
            rule_names: grammar.rule_names(),
            literal_names: grammar.vocab.literal_names(),
            symbolic_names: grammar.vocab.symbolic_names(),
            actions: atn.lexer_actions.iter().map(|a| a.to_string()).collect(),
            sempred_funcs,
        },
    }
}

fn token_defs(grammar: &Grammar) -> Vec<TokenDef> {
    let mut tokens: Vec<TokenDef> = grammar
        .vocab
        .names()
        .filter(|(_, ttype)| *ttype > 0)
        .map(|(name, ttype)| TokenDef {
            name: name.to_string(),
            ttype,
        })
        .collect();
    tokens.sort_by_key(|t| t.ttype);
    tokens
}

/// One entry per rule, or per alternative label for rules with labels.
fn listener_entries(grammar: &Grammar) -> Vec<ListenerEntry> {
    let mut entries = Vec::new();
    for rule in grammar.rules.values() {
        if rule.excluded || rule.is_lexer() {
            continue;
        }
        let labels = rule.alt_labels(&grammar.ast);
        if labels.is_empty() {
            entries.push(ListenerEntry {
                name: rule.name.clone(),
                rule_name: rule.name.clone(),
                ctx_type: context_name(&rule.name),
            });
        }
        for label in labels.keys() {
            entries.push(ListenerEntry {
                name: label.clone(),
                rule_name: rule.name.clone(),
                ctx_type: context_name(label),
            });
        }
    }
    entries
}
