//! Output model construction.
//!
//! Turns an analyzed grammar and its ATN into a tree of [`model`] values:
//! one function per rule, made of choices, matches and rule invocations, plus
//! the context structs, listener and visitor entries a target needs. The
//! model names decisions and states by number, so any target template can
//! render it without the grammar at hand.

mod builder;
pub mod fields;
mod files;
mod getters;
pub mod model;

#[cfg(test)]
mod builder_tests;
#[cfg(test)]
mod fields_tests;
#[cfg(test)]
mod model_tests;

pub use builder::RuleFunctionBuilder;
pub use fields::{FieldDescriptor, FieldValue, ModelKind, ModelRef, walk};
pub use files::build_output_model;
pub use getters::getters_for_alts;
