//! Pattern matching for base64-encoded public keys.
//!
//! Supports two matching strategies:
//! - Prefix: Match at the start of the encoded key
//! - Contains: Match anywhere in the encoded key
//!
//! Matching is always case-insensitive.

mod pattern;

pub use pattern::{validate_pattern, MatchMode, Pattern, PatternError, MAX_PATTERN_LEN};
