//! Verification codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of digits in a verification code.
pub const VERIFICATION_CODE_LEN: usize = 4;

/// A fixed-length numeric verification code.
///
/// Set once when the check-in is created and never regenerated, so every
/// resend of a reminder carries the same code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerificationCode(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("verification code must be {VERIFICATION_CODE_LEN} digits")]
pub struct MalformedCode;

impl VerificationCode {
    /// Parse a submitted code, rejecting anything that is not exactly
    /// [`VERIFICATION_CODE_LEN`] ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, MalformedCode> {
        if raw.len() == VERIFICATION_CODE_LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(MalformedCode)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare without short-circuiting on the first differing digit.
    pub fn matches(&self, other: &VerificationCode) -> bool {
        self.0
            .bytes()
            .zip(other.0.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl TryFrom<String> for VerificationCode {
    type Error = MalformedCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VerificationCode> for String {
    fn from(code: VerificationCode) -> Self {
        code.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
