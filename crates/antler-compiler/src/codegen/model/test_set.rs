//! Inline lookahead tests as word-sized bitsets.

use antler_core::IntervalSet;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub ttype: i32,
    pub name: String,
}

/// Token types `shift..shift + word_size` packed into one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bitset {
    pub shift: i32,
    pub tokens: Vec<TokenInfo>,
    pub calculated: u64,
}

impl Bitset {
    fn new(shift: i32) -> Self {
        Self {
            shift,
            tokens: Vec::new(),
            calculated: 0,
        }
    }

    fn add(&mut self, ttype: i32, name: String) {
        self.calculated |= 1u64 << (ttype - self.shift);
        self.tokens.push(TokenInfo { ttype, name });
    }
}

/// Test of the temporary `var_name` against a lookahead set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSetInline {
    pub var_name: String,
    pub word_size: u32,
    pub bitsets: Vec<Bitset>,
}

impl TestSetInline {
    pub const VAR_NAME: &'static str = "_la";

    /// Pack `set` into bitsets, using whichever of the zero-based and the
    /// first-type-based layouts needs fewer words (zero-based on ties).
    pub fn new(set: &IntervalSet, word_size: u32, label: impl Fn(i32) -> String) -> Self {
        let word_size = word_size.clamp(1, 64);
        let zero = pack(set, word_size, true, &label);
        let shifted = pack(set, word_size, false, &label);
        let bitsets = if zero.len() <= shifted.len() { zero } else { shifted };
        Self {
            var_name: Self::VAR_NAME.to_string(),
            word_size,
            bitsets,
        }
    }

    /// Every token type the test accepts, in ascending order.
    pub fn token_types(&self) -> Vec<i32> {
        self.bitsets
            .iter()
            .flat_map(|b| b.tokens.iter().map(|t| t.ttype))
            .collect()
    }
}

fn pack(set: &IntervalSet, word_size: u32, zero_offset: bool, label: &impl Fn(i32) -> String) -> Vec<Bitset> {
    let width = word_size as i32;
    let mut bitsets: Vec<Bitset> = Vec::new();
    for ttype in set.iter() {
        let fits = bitsets
            .last()
            .is_some_and(|b| ttype <= b.shift + width - 1);
        if !fits {
            let shift = if zero_offset && (0..width - 1).contains(&ttype) {
                0
            } else {
                ttype
            };
            bitsets.push(Bitset::new(shift));
        }
        if let Some(current) = bitsets.last_mut() {
            current.add(ttype, label(ttype));
        }
    }
    bitsets
}
