#![forbid(unsafe_code)]

//! Reading direction and mirroring of command patterns.
//!
//! Input sources (controls, keyboard, swipe) speak in physical terms: "the
//! arrow on the right was pressed". Under a right-to-left layout the right
//! arrow means *backward*, so those sources pass their pattern through
//! [`Direction::resolve`] before handing it to the index resolver.
//!
//! # Invariants
//!
//! 1. `Ltr` never changes a pattern.
//! 2. Under `Rtl`, resolving twice restores the pattern.
//! 3. Only the leading token character is mirrored, but every occurrence of
//!    it is, so `">>"` becomes `"<<"`.
//!
//! # Failure Modes
//!
//! - Leading token without a mirror (`|`, unknown characters): the pattern
//!   is returned unchanged and a warning is logged.
//! - Unknown direction name in configuration: [`DirectionError`], the caller
//!   keeps its previous value.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Horizontal reading direction of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

impl Direction {
    /// Canonical configuration name (`"ltr"` or `"rtl"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }

    /// Whether the configured direction equals `value`.
    #[must_use]
    pub fn is(self, value: Direction) -> bool {
        self == value
    }

    /// Whether the strip is laid out right to left.
    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }

    /// Mirror a single token character, if it has a mirror.
    #[must_use]
    pub const fn mirror_token(token: char) -> Option<char> {
        match token {
            '>' => Some('<'),
            '<' => Some('>'),
            '=' => Some('='),
            _ => None,
        }
    }

    /// Resolve a physical pattern into a logical one.
    ///
    /// Under `Rtl` every occurrence of the leading token is replaced by its
    /// mirror. Patterns are borrowed back untouched whenever nothing needs to
    /// change.
    #[must_use]
    pub fn resolve(self, pattern: &str) -> Cow<'_, str> {
        if !self.is_rtl() {
            return Cow::Borrowed(pattern);
        }
        let Some(token) = pattern.chars().next() else {
            return Cow::Borrowed(pattern);
        };
        match Self::mirror_token(token) {
            Some(mirror) if mirror == token => Cow::Borrowed(pattern),
            Some(mirror) => Cow::Owned(
                pattern
                    .chars()
                    .map(|c| if c == token { mirror } else { c })
                    .collect(),
            ),
            None => {
                crate::warn!(pattern, "pattern has no mirrored form, left unchanged");
                Cow::Borrowed(pattern)
            }
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A direction name other than `ltr` or `rtl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionError {
    /// The rejected value.
    pub value: String,
}

impl fmt::Display for DirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "direction must be \"ltr\" or \"rtl\", got {:?}",
            self.value
        )
    }
}

impl std::error::Error for DirectionError {}

impl FromStr for Direction {
    type Err = DirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ltr" => Ok(Self::Ltr),
            "rtl" => Ok(Self::Rtl),
            other => Err(DirectionError {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ltr_is_identity() {
        for pattern in [">", "<", "=3", ">>", "<<", "|>", "<2"] {
            assert_eq!(Direction::Ltr.resolve(pattern), pattern);
        }
    }

    #[test]
    fn rtl_mirrors_step() {
        assert_eq!(Direction::Rtl.resolve("<2"), ">2");
        assert_eq!(Direction::Rtl.resolve(">"), "<");
    }

    #[test]
    fn rtl_mirrors_every_leading_token_occurrence() {
        assert_eq!(Direction::Rtl.resolve(">>"), "<<");
        assert_eq!(Direction::Rtl.resolve("<<"), ">>");
    }

    #[test]
    fn equals_is_its_own_mirror() {
        assert!(matches!(Direction::Rtl.resolve("=4"), Cow::Borrowed("=4")));
    }

    #[test]
    fn unmirrorable_token_is_left_unchanged() {
        assert_eq!(Direction::Rtl.resolve("|>"), "|>");
        assert_eq!(Direction::Rtl.resolve(""), "");
    }

    #[test]
    fn is_compares_configured_value() {
        assert!(Direction::Rtl.is(Direction::Rtl));
        assert!(!Direction::Ltr.is(Direction::Rtl));
    }

    #[test]
    fn parse_accepts_only_known_names() {
        assert_eq!("ltr".parse::<Direction>(), Ok(Direction::Ltr));
        assert_eq!("rtl".parse::<Direction>(), Ok(Direction::Rtl));
        let err = "RTL".parse::<Direction>().unwrap_err();
        assert_eq!(err.value, "RTL");
        assert!(err.to_string().contains("\"RTL\""));
    }
}
