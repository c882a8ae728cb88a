//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("Username is a required field")]
    Empty,
    /// The input string is shorter than the minimum.
    #[error("Username must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
}

/// A QKart account username.
///
/// ## Constraints
///
/// - Length: at least 6 characters, counted as Unicode scalar values
///
/// ## Examples
///
/// ```
/// use qkart_core::Username;
///
/// assert!(Username::parse("crio.do").is_ok());
/// assert!(Username::parse("").is_err());      // empty
/// assert!(Username::parse("short").is_err()); // fewer than 6 characters
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length of a username.
    pub const MIN_LENGTH: usize = 6;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or shorter than 6 characters.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        if s.chars().count() < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Username::parse("crio.do").is_ok());
        assert!(Username::parse("sixsix").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_too_short() {
        assert_eq!(
            Username::parse("abcde"),
            Err(UsernameError::TooShort { min: 6 })
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Six characters, twelve bytes
        assert!(Username::parse("éééééé").is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            UsernameError::Empty.to_string(),
            "Username is a required field"
        );
        assert_eq!(
            UsernameError::TooShort { min: 6 }.to_string(),
            "Username must be at least 6 characters"
        );
    }
}
