//! Account username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("enter a username")]
    Empty,
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside letters, digits and `@.+-_`.
    #[error("username may only contain letters, digits and @/./+/-/_ (found {0:?})")]
    InvalidCharacter(char),
}

/// A login name.
///
/// Letters and digits from any script are accepted, plus `@ . + - _`.
/// Surrounding whitespace is trimmed; the name is otherwise kept as typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 150;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`UsernameError`] if the input is empty, too long, or contains
    /// a disallowed character.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')))
        {
            return Err(UsernameError::InvalidCharacter(bad));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_allowed_characters() {
        assert_eq!(Username::parse("vincent").unwrap().as_str(), "vincent");
        assert!(Username::parse("axel.dupont+test@home_1-2").is_ok());
        assert!(Username::parse("Élodie").is_ok());
    }

    #[test]
    fn test_parse_trims() {
        assert_eq!(Username::parse("  camille ").unwrap().as_str(), "camille");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            Username::parse("jean pierre"),
            Err(UsernameError::InvalidCharacter(' '))
        );
        assert_eq!(
            Username::parse("semi;colon"),
            Err(UsernameError::InvalidCharacter(';'))
        );
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(151);
        assert!(matches!(
            Username::parse(&long),
            Err(UsernameError::TooLong { max: 150 })
        ));
        assert!(Username::parse(&"a".repeat(150)).is_ok());
    }
}
