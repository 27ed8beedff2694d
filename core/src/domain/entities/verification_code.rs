//! Verification code entity, store key format and code generation.

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};

use crate::errors::CodeError;

/// Verification attempts allowed per issued code
pub const MAX_ATTEMPTS: u32 = 3;

/// Digits in a generated code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Longest code that still fits the `u32` sampling range
pub const MAX_CODE_LENGTH: usize = 9;

/// Default lifetime of an issued code (10 minutes)
pub const DEFAULT_TTL_SECONDS: u64 = 600;

/// Category prefix of code store keys
pub const CODE_KEY_PREFIX: &str = "phone_code";

/// Store key for the code issued to `phone` within `scope`,
/// e.g. `phone_code:login:15212345678`
pub fn code_key(scope: &str, phone: &str) -> String {
    format!("{}:{}:{}", CODE_KEY_PREFIX, scope, phone)
}

/// Companion key holding the remaining attempt count for `key`
pub fn attempts_key(key: &str) -> String {
    format!("{}:cnt", key)
}

/// Code length actually used for `requested` digits
pub fn effective_code_length(requested: usize) -> usize {
    requested.clamp(1, MAX_CODE_LENGTH)
}

/// Whether `length` can be generated without clamping
pub fn is_supported_code_length(length: usize) -> bool {
    (1..=MAX_CODE_LENGTH).contains(&length)
}

/// Generate a uniformly random numeric code of `length` digits,
/// left-padded with zeros. All-zero codes are possible.
///
/// `length` goes through [`effective_code_length`].
pub fn generate_code(length: usize) -> String {
    let length = effective_code_length(length);
    let upper = 10u32.pow(length as u32);
    let value = OsRng.gen_range(0..upper);
    format!("{:0width$}", value, width = length)
}

/// Whether `input` has the shape of a generated code
pub fn is_well_formed_code(input: &str, length: usize) -> bool {
    input.len() == length && input.bytes().all(|b| b.is_ascii_digit())
}

/// Compare two codes without leaking the position of the first mismatch
pub fn codes_match(stored: &str, input: &str) -> bool {
    constant_time_eq(stored.as_bytes(), input.as_bytes())
}

/// A live code with its remaining verification budget
///
/// Expiry is tracked by whichever store holds the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRecord {
    pub code: String,
    pub remaining_attempts: u32,
}

impl CodeRecord {
    pub fn new(code: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            code: code.into(),
            remaining_attempts: max_attempts,
        }
    }

    /// Spend one attempt on `input`.
    ///
    /// Returns `VerifyTooMany` without spending anything once the budget is
    /// gone. A match leaves the record in place.
    pub fn attempt(&mut self, input: &str) -> Result<bool, CodeError> {
        if self.remaining_attempts == 0 {
            return Err(CodeError::VerifyTooMany);
        }
        self.remaining_attempts -= 1;
        Ok(codes_match(&self.code, input))
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_attempts == 0
    }
}
