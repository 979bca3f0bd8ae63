#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the Antler grammar compiler.
//!
//! - [`IntervalSet`]: symbol sets as ordered unions of closed intervals
//! - [`Vocabulary`]: token type numbering and display names
//! - [`token`]: reserved token types and character bounds

pub mod interval;
pub mod token;
pub mod utils;
pub mod vocabulary;

#[cfg(test)]
mod interval_tests;
#[cfg(test)]
mod utils_tests;

pub use interval::{Interval, IntervalSet};
pub use vocabulary::Vocabulary;
