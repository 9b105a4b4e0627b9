//! Secret codes and strike/ball scoring.

use std::fmt;

use skirmish_match::RuleError;

/// Number of digits in a code.
pub const CODE_LEN: usize = 3;

/// Returns `true` if `code` is exactly three distinct decimal digits.
pub fn validate_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == CODE_LEN
        && bytes.iter().all(u8::is_ascii_digit)
        && bytes[0] != bytes[1]
        && bytes[0] != bytes[2]
        && bytes[1] != bytes[2]
}

/// A validated code: three distinct ASCII digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretCode([u8; CODE_LEN]);

impl SecretCode {
    /// Parses and validates a code.
    ///
    /// # Errors
    /// Returns [`RuleError::Validation`] unless `code` is three distinct
    /// decimal digits.
    pub fn parse(code: &str) -> Result<Self, RuleError> {
        if !validate_code(code) {
            return Err(RuleError::Validation(
                "invalid number: enter 3 distinct digits".into(),
            ));
        }
        let b = code.as_bytes();
        Ok(Self([b[0], b[1], b[2]]))
    }

    /// The code as text.
    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for SecretCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessResult {
    /// Digits in the right position.
    pub strikes: u8,
    /// Digits present elsewhere.
    pub balls: u8,
    /// All three digits in place.
    pub is_win: bool,
}

/// Scores `guess` against `secret`.
///
/// A strike is a digit in the right place. For every position that isn't a
/// strike, one ball is counted if the secret's digit there appears in the
/// guess at some other position that isn't itself a strike.
pub fn score(secret: &SecretCode, guess: &SecretCode) -> GuessResult {
    let (s, g) = (&secret.0, &guess.0);
    let strikes = (0..CODE_LEN).filter(|&i| s[i] == g[i]).count() as u8;
    let balls = (0..CODE_LEN)
        .filter(|&i| s[i] != g[i])
        .filter(|&i| (0..CODE_LEN).any(|j| j != i && s[i] == g[j] && s[j] != g[j]))
        .count() as u8;

    GuessResult {
        strikes,
        balls,
        is_win: strikes as usize == CODE_LEN,
    }
}
