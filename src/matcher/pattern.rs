//! Pattern validation and matching implementation.

use std::str::FromStr;

use crate::crypto::SIGNIFICANT_KEY_CHARS;

/// Longest pattern that can occur in an encoded 32-byte key.
pub const MAX_PATTERN_LEN: usize = SIGNIFICANT_KEY_CHARS;

/// Why a target pattern was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("target pattern is empty")]
    Empty,
    #[error("target pattern is {len} characters long, the maximum is {}", MAX_PATTERN_LEN)]
    TooLong { len: usize },
    #[error("character {ch:?} at position {position} is not in the base64 alphabet (A-Z, a-z, 0-9, +, /)")]
    InvalidChar { ch: char, position: usize },
}

#[inline]
fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/'
}

/// Checks that `pattern` could ever appear in an encoded public key.
///
/// Each condition is checked on its own; any single violation rejects the
/// pattern.
pub fn validate_pattern(pattern: &str) -> Result<(), PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }

    let len = pattern.chars().count();
    if len > MAX_PATTERN_LEN {
        return Err(PatternError::TooLong { len });
    }

    if let Some((position, ch)) = pattern.chars().enumerate().find(|&(_, c)| !is_base64_char(c)) {
        return Err(PatternError::InvalidChar { ch, position });
    }

    Ok(())
}

/// Where in the encoded key the pattern must occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Match at the beginning of the key
    #[default]
    Prefix,
    /// Match anywhere in the key
    Contains,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "startswith" | "prefix" | "start" => Ok(MatchMode::Prefix),
            "contains" | "substring" | "anywhere" => Ok(MatchMode::Contains),
            _ => Err(format!(
                "unknown match method '{}', expected 'startswith' or 'contains'",
                s
            )),
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMode::Prefix => write!(f, "startswith"),
            MatchMode::Contains => write!(f, "contains"),
        }
    }
}

/// A compiled, immutable match predicate.
///
/// The pattern is lowercased once here; callers hand in keys that are
/// already lowercased (or use [`Pattern::matches_key`]).
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The lowercased pattern
    pattern: String,
    mode: MatchMode,
}

impl Pattern {
    /// Builds the predicate for `pattern` under `mode`.
    ///
    /// No validation happens here, see [`validate_pattern`].
    pub fn new(pattern: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
            mode,
        }
    }

    /// Returns the normalized pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Tests a lowercased encoded key.
    #[inline]
    pub fn matches(&self, encoded_lowercase: &str) -> bool {
        match self.mode {
            MatchMode::Prefix => encoded_lowercase.starts_with(&self.pattern),
            MatchMode::Contains => encoded_lowercase.contains(&self.pattern),
        }
    }

    /// Lowercases `encoded` and tests it.
    #[inline]
    pub fn matches_key(&self, encoded: &str) -> bool {
        self.matches(&encoded.to_ascii_lowercase())
    }

    /// Returns the expected number of keys to generate per match.
    ///
    /// Under case-insensitive comparison a letter is hit by 2 of the 64
    /// base64 symbols, anything else by 1. Contains mode gets one chance per
    /// possible offset.
    pub fn estimated_attempts(&self) -> u64 {
        let odds = self.pattern.chars().fold(1u64, |acc, c| {
            let per_char = if c.is_ascii_alphabetic() { 32 } else { 64 };
            acc.saturating_mul(per_char)
        });

        match self.mode {
            MatchMode::Prefix => odds,
            MatchMode::Contains => {
                let len = self.pattern.chars().count();
                let positions = (MAX_PATTERN_LEN + 1).saturating_sub(len).max(1) as u64;
                (odds / positions).max(1)
            }
        }
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        match self.estimated_attempts() {
            0..=10_000 => "Very Easy (< 1 second)".into(),
            10_001..=1_000_000 => "Easy (seconds)".into(),
            1_000_001..=100_000_000 => "Medium (minutes)".into(),
            100_000_001..=10_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}
