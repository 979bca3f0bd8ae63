//! Reserved token types and character bounds.

/// End of input.
pub const EOF: i32 = -1;

/// Marks "can reach the end of the analyzed region without consuming input".
pub const EPSILON: i32 = -2;

/// Never a valid token type. Lookahead analysis reuses it as the
/// "a semantic predicate was crossed" marker.
pub const INVALID_TYPE: i32 = 0;

pub const HIT_PRED: i32 = INVALID_TYPE;

pub const MIN_USER_TOKEN_TYPE: i32 = 1;

pub const MIN_CHAR_VALUE: i32 = 0;

pub const MAX_CHAR_VALUE: i32 = 0x10FFFF;

pub const DEFAULT_CHANNEL: i32 = 0;

pub const HIDDEN_CHANNEL: i32 = 1;

pub const DEFAULT_MODE: &str = "DEFAULT_MODE";
