//! Request-level domain values
//!
//! `MovieId` is the only identifier the gateway understands. It is used as an
//! upstream lookup key and as a filename component, so parsing is strict.

use std::fmt;
use std::str::FromStr;

const ID_PREFIX: &str = "tt";
const ID_DIGITS: usize = 7;

/// IMDb-style movie identifier, e.g. `tt1234567`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovieId(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MovieIdError {
    #[error("movie id is empty")]
    Empty,
    #[error("movie id '{0}' must look like tt1234567")]
    Malformed(String),
}

impl MovieId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MovieId {
    type Err = MovieIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(MovieIdError::Empty);
        }

        let digits = s
            .strip_prefix(ID_PREFIX)
            .ok_or_else(|| MovieIdError::Malformed(s.to_string()))?;

        if digits.len() != ID_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MovieIdError::Malformed(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decode a title taken from a path segment
///
/// Returns `None` for titles that are blank or not valid UTF-8 once decoded.
pub fn decode_title(segment: &str) -> Option<String> {
    let decoded = urlencoding::decode(segment).ok()?;
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
