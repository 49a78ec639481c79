//! Seller contact phone numbers.
//!
//! Checkout handoff builds a chat deep link from the seller's registered
//! number, so the number has to be valid enough to appear in a URL path.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains a character that is not a digit or separator.
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// The digit count is outside the accepted range.
    #[error("phone number must have between {min} and {max} digits")]
    BadLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A seller's contact phone number.
///
/// Accepts international-format numbers with an optional leading `+` and
/// common separators (spaces, dashes, parentheses), which are tolerated on
/// parse and dropped from the stored form.
///
/// ## Examples
///
/// ```
/// use sokoni_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("+256 772 123456").unwrap();
/// assert_eq!(phone.as_str(), "+256772123456");
/// assert_eq!(phone.digits(), "256772123456");
///
/// assert!(PhoneNumber::parse("").is_err());
/// assert!(PhoneNumber::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

// Deserialization validates: a phone number that reaches the type system
// is always one a deep link can be built from.
impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl PhoneNumber {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 7;
    /// Maximum number of digits (ITU E.164 limit).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other
    /// than digits and separators, or has a digit count outside 7..=15.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let mut normalized = String::with_capacity(trimmed.len() + 1);
        for (i, c) in trimmed.chars().enumerate() {
            match c {
                '+' if i == 0 => normalized.push('+'),
                '0'..='9' => normalized.push(c),
                ' ' | '-' | '(' | ')' | '.' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        let digit_count = normalized.chars().filter(char::is_ascii_digit).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digit_count) {
            return Err(PhoneError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized number (optional `+` followed by digits).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the digits-only form used in chat deep-link paths.
    #[must_use]
    pub fn digits(&self) -> &str {
        self.0.strip_prefix('+').unwrap_or(&self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        assert!(PhoneNumber::parse("+256772123456").is_ok());
        assert!(PhoneNumber::parse("0772123456").is_ok());
        assert!(PhoneNumber::parse("+256 772-123-456").is_ok());
        assert!(PhoneNumber::parse("(256) 772 123456").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(PhoneNumber::parse(""), Err(PhoneError::Empty)));
        assert!(matches!(PhoneNumber::parse("   "), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert!(matches!(
            PhoneNumber::parse("call me"),
            Err(PhoneError::InvalidCharacter(_))
        ));
        // A + anywhere but the front is invalid
        assert!(matches!(
            PhoneNumber::parse("256+772123456"),
            Err(PhoneError::InvalidCharacter('+'))
        ));
    }

    #[test]
    fn test_parse_bad_length() {
        assert!(matches!(
            PhoneNumber::parse("12345"),
            Err(PhoneError::BadLength { .. })
        ));
        assert!(matches!(
            PhoneNumber::parse("1234567890123456"),
            Err(PhoneError::BadLength { .. })
        ));
    }

    #[test]
    fn test_separator_normalization() {
        let phone = PhoneNumber::parse("+256 772-123.456").unwrap();
        assert_eq!(phone.as_str(), "+256772123456");
    }

    #[test]
    fn test_digits_strips_plus() {
        let phone = PhoneNumber::parse("+256772123456").unwrap();
        assert_eq!(phone.digits(), "256772123456");

        let local = PhoneNumber::parse("0772123456").unwrap();
        assert_eq!(local.digits(), "0772123456");
    }

    #[test]
    fn test_serde_roundtrip() {
        let phone = PhoneNumber::parse("+256772123456").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"+256772123456\"");
        let back: PhoneNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, phone);
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<PhoneNumber>("\"not a number\"").is_err());
        assert!(serde_json::from_str::<PhoneNumber>("\"+256 772 123456\"").is_ok());
    }
}
