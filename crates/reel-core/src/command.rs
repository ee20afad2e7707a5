#![forbid(unsafe_code)]

//! Movement command grammar.
//!
//! A command is a direction token followed by an optional step payload:
//!
//! | Pattern | Meaning |
//! |---------|---------|
//! | `>` / `<` | one item forward / backward |
//! | `>3` / `<3` | three items forward / backward |
//! | `>>` / `<<` | jump to the last / first index |
//! | `=2` | absolute jump to index 2 |
//! | `\|>` / `\|<` | one page (`perView` items) forward / backward |
//!
//! Parsing is lenient the way input sources expect: the token is the first
//! character, a numeric remainder becomes a count, anything else is kept as a
//! sentinel. Whether the token/payload pair makes sense is decided later by
//! [`Command::motion`].

use std::fmt;
use std::str::FromStr;

/// Leading character of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// `>`
    Forward,
    /// `<`
    Backward,
    /// `=`
    Exact,
    /// `|`
    Page,
}

impl Token {
    /// The token's character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Forward => '>',
            Self::Backward => '<',
            Self::Exact => '=',
            Self::Page => '|',
        }
    }

    /// Parse a token character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Forward),
            '<' => Some(Self::Backward),
            '=' => Some(Self::Exact),
            '|' => Some(Self::Page),
            _ => None,
        }
    }
}

/// Payload following the token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Steps {
    /// Integer payload. An empty remainder parses as `Count(0)`.
    Count(i64),
    /// Non-numeric remainder, kept verbatim (`">"` in `">>"` or `"|>"`).
    Sentinel(String),
}

impl Steps {
    /// Whether this payload is the sentinel `s`.
    #[must_use]
    pub fn is_sentinel(&self, s: &str) -> bool {
        matches!(self, Self::Sentinel(v) if v == s)
    }
}

impl fmt::Display for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(0) => Ok(()),
            Self::Count(n) => write!(f, "{n}"),
            Self::Sentinel(s) => f.write_str(s),
        }
    }
}

/// A parsed movement command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    /// Leading direction token.
    pub token: Token,
    /// Step payload.
    pub steps: Steps,
}

/// What a well-formed command asks the index resolver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Absolute jump to an index (may be out of range; the resolver clamps).
    Jump(i64),
    /// Jump to the last index.
    ToEnd,
    /// Jump to the first index.
    ToStart,
    /// Move forward by a view of this many items.
    Forward(usize),
    /// Move backward by a view of this many items.
    Backward(usize),
}

/// Failure to interpret a command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Empty string or unknown leading token.
    Malformed(String),
    /// Known token with a payload it cannot take (e.g. `"|3"`, `"=>"`).
    InvalidPattern(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(p) => write!(f, "malformed movement command {p:?}"),
            Self::InvalidPattern(p) => write!(f, "invalid direction pattern [{p}] has been used"),
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    /// Build a command from parts.
    #[must_use]
    pub fn new(token: Token, steps: Steps) -> Self {
        Self { token, steps }
    }

    /// Parse a command string (see the module table).
    pub fn parse(pattern: &str) -> Result<Self, CommandError> {
        let mut chars = pattern.chars();
        let token = chars
            .next()
            .and_then(Token::from_char)
            .ok_or_else(|| CommandError::Malformed(pattern.to_owned()))?;
        let rest = chars.as_str();
        let steps = if rest.is_empty() {
            Steps::Count(0)
        } else {
            match rest.parse::<i64>() {
                Ok(n) => Steps::Count(n),
                Err(_) => Steps::Sentinel(rest.to_owned()),
            }
        };
        Ok(Self { token, steps })
    }

    /// Interpret the command, given the configured items per view.
    ///
    /// Returns `None` for token/payload pairs that have no meaning.
    #[must_use]
    pub fn motion(&self, per_view: usize) -> Option<Motion> {
        match (self.token, &self.steps) {
            (Token::Exact, Steps::Count(n)) => Some(Motion::Jump(*n)),
            (Token::Forward, s) if s.is_sentinel(">") => Some(Motion::ToEnd),
            (Token::Backward, s) if s.is_sentinel("<") => Some(Motion::ToStart),
            (Token::Forward, Steps::Count(n)) => Some(Motion::Forward(view_of(*n))),
            (Token::Backward, Steps::Count(n)) => Some(Motion::Backward(view_of(*n))),
            (Token::Page, s) if s.is_sentinel(">") => Some(Motion::Forward(per_view.max(1))),
            (Token::Page, s) if s.is_sentinel("<") => Some(Motion::Backward(per_view.max(1))),
            _ => None,
        }
    }

    /// Whether the command matches a direction pattern.
    ///
    /// Plain tokens (`">"`, `"<"`, `"="`) match on the token alone; the
    /// composite page patterns `"|>"` and `"|<"` also match the sentinel.
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        match pattern {
            "|>" => self.token == Token::Page && self.steps.is_sentinel(">"),
            "|<" => self.token == Token::Page && self.steps.is_sentinel("<"),
            p => {
                let mut chars = p.chars();
                match (chars.next().and_then(Token::from_char), chars.next()) {
                    (Some(token), None) => self.token == token,
                    _ => false,
                }
            }
        }
    }
}

/// Step count to view size: zero means the default single item. Capped so
/// index arithmetic stays far from overflow.
fn view_of(steps: i64) -> usize {
    let magnitude = steps.unsigned_abs().min(u64::from(u32::MAX));
    usize::try_from(magnitude).unwrap_or(u32::MAX as usize).max(1)
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.token.as_char(), self.steps)
    }
}
