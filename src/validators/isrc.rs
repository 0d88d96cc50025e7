//! ISRC value type and format validation
//!
//! An ISRC (International Standard Recording Code) is a 12-character
//! identifier assigned to a recorded track:
//!
//! ```text
//! CC XXX YY NNNNN
//! │  │   │  └─ designation code (5 digits)
//! │  │   └─ year of reference (2 digits)
//! │  └─ registrant code (3 letters or digits)
//! └─ country code (2 letters)
//! ```
//!
//! Backends print the code with varying separators (`US-S1Z-99-00001`,
//! `USS1Z9900001`, occasionally spaces). [`Isrc::parse`] strips every
//! non-alphanumeric character, upper-cases the rest, and validates the
//! fixed-width character classes, so equality is always on the normalized
//! form. Normalization is idempotent: parsing an already-normalized code
//! yields an equal value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reasons a raw string is not an ISRC.
///
/// Never fatal: callers log the offending line and drop it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IsrcFormatError {
    /// Wrong length after stripping separators (must be exactly 12)
    #[error("ISRC must have 12 characters after stripping separators, got {0}")]
    Length(usize),

    /// A character does not match its position's class
    #[error("invalid ISRC character {found:?} at position {position}: expected {expected}")]
    CharacterClass {
        /// 0-based position within the normalized string
        position: usize,
        /// The offending character (already upper-cased)
        found: char,
        /// Human-readable class description
        expected: &'static str,
    },
}

/// A validated, normalized ISRC.
///
/// Stored without separators, letters upper-cased. Equality, ordering and
/// hashing operate on the normalized form only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isrc(String);

impl Isrc {
    /// Parse a raw matched substring into a normalized ISRC.
    ///
    /// Strips all non-alphanumeric characters (hyphens, spaces, quotes),
    /// upper-cases letters, then checks the pattern
    /// `[A-Z]{2}[A-Z0-9]{3}[0-9]{2}[0-9]{5}`.
    pub fn parse(raw: &str) -> std::result::Result<Self, IsrcFormatError> {
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.len() != 12 {
            return Err(IsrcFormatError::Length(normalized.len()));
        }

        for (position, found) in normalized.char_indices() {
            let expected = match position {
                0..=1 => "a letter (country code)",
                2..=4 => "a letter or digit (registrant code)",
                _ => "a digit",
            };
            let ok = match position {
                0..=1 => found.is_ascii_uppercase(),
                2..=4 => found.is_ascii_uppercase() || found.is_ascii_digit(),
                _ => found.is_ascii_digit(),
            };
            if !ok {
                return Err(IsrcFormatError::CharacterClass {
                    position,
                    found,
                    expected,
                });
            }
        }

        Ok(Self(normalized))
    }

    /// The normalized 12-character form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Isrc {
    type Err = IsrcFormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Isrc {
    type Error = IsrcFormatError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Isrc> for String {
    fn from(isrc: Isrc) -> Self {
        isrc.0
    }
}

// ============================================================================
// Tests
// ============================================================================
