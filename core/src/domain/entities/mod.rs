//! Domain entities representing core business objects.

pub mod verification_code;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use verification_code::{
    attempts_key, code_key, codes_match, effective_code_length, generate_code, is_supported_code_length,
    is_well_formed_code, CodeRecord,
    CODE_KEY_PREFIX, DEFAULT_CODE_LENGTH, DEFAULT_TTL_SECONDS, MAX_ATTEMPTS, MAX_CODE_LENGTH,
};
