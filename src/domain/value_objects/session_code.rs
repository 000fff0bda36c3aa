//! Session join codes.
//!
//! Codes are short upper-case alphanumeric strings (e.g. `K7Q2ZD`) that a
//! moderator reads out and participants type in. Lookups are
//! case-insensitive: inbound codes are normalized before comparison.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters used when generating codes.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default generated code length.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// A normalized session code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCode(String);

impl SessionCode {
    /// Generate a random code of the given length.
    pub fn generate(len: usize) -> Self {
        let mut rng = rand::rng();
        let code = (0..len)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect();
        Self(code)
    }

    /// Normalize user input into a code: surrounding whitespace is dropped
    /// and letters are upper-cased.
    pub fn parse(input: &str) -> Self {
        Self(input.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let code = SessionCode::generate(DEFAULT_CODE_LENGTH);
        assert_eq!(code.as_str().len(), DEFAULT_CODE_LENGTH);
        assert!(code
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    }

    #[test]
    fn test_parse_normalizes_input() {
        assert_eq!(SessionCode::parse("  ab12cd "), SessionCode::parse("AB12CD"));
        assert_eq!(SessionCode::parse("ab12cd").as_str(), "AB12CD");
    }
}
