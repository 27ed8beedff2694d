//! Unit tests for verification code entity

use std::collections::HashSet;

use crate::domain::entities::verification_code::{
    attempts_key, code_key, codes_match, effective_code_length, generate_code,
    is_supported_code_length, is_well_formed_code, CodeRecord,
    DEFAULT_CODE_LENGTH, MAX_ATTEMPTS, MAX_CODE_LENGTH,
};
use crate::errors::CodeError;

#[test]
fn test_code_key_format() {
    assert_eq!(code_key("login", "15212345678"), "phone_code:login:15212345678");
    assert_eq!(
        attempts_key(&code_key("login", "15212345678")),
        "phone_code:login:15212345678:cnt"
    );
}

#[test]
fn test_generate_code_format() {
    for _ in 0..100 {
        let code = generate_code(DEFAULT_CODE_LENGTH);
        assert_eq!(code.len(), DEFAULT_CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let num: u32 = code.parse().expect("Generated code should be a valid number");
        assert!(num < 1_000_000);
    }
}

#[test]
fn test_generate_code_clamps_length() {
    assert_eq!(generate_code(0).len(), 1);
    assert_eq!(generate_code(4).len(), 4);
    assert_eq!(generate_code(20).len(), 9);
}

#[test]
fn test_supported_code_lengths() {
    assert!(!is_supported_code_length(0));
    assert!(is_supported_code_length(1));
    assert!(is_supported_code_length(MAX_CODE_LENGTH));
    assert!(!is_supported_code_length(MAX_CODE_LENGTH + 1));
    assert_eq!(effective_code_length(0), 1);
    assert_eq!(effective_code_length(10), MAX_CODE_LENGTH);
}

#[test]
fn test_single_digit_codes_cover_zero() {
    // 500 draws from 10 values miss "0" with probability ~1e-23
    let seen: HashSet<String> = (0..500).map(|_| generate_code(1)).collect();
    assert!(seen.contains("0"));
    assert_eq!(seen.len(), 10);
}

#[test]
fn test_code_uniqueness() {
    let codes: HashSet<String> = (0..100).map(|_| generate_code(DEFAULT_CODE_LENGTH)).collect();
    assert!(codes.len() > 1);
}

#[test]
fn test_well_formed_code() {
    assert!(is_well_formed_code("012345", 6));
    assert!(!is_well_formed_code("12345", 6));
    assert!(!is_well_formed_code("12a456", 6));
    assert!(!is_well_formed_code("１２３４５６", 6));
}

#[test]
fn test_codes_match() {
    assert!(codes_match("123456", "123456"));
    assert!(!codes_match("123456", "123457"));
    assert!(!codes_match("123456", "12345"));
}

#[test]
fn test_record_spends_one_attempt_per_check() {
    let mut record = CodeRecord::new("123456", MAX_ATTEMPTS);

    assert_eq!(record.attempt("000000"), Ok(false));
    assert_eq!(record.remaining_attempts, 2);

    assert_eq!(record.attempt("123456"), Ok(true));
    assert_eq!(record.remaining_attempts, 1);

    // A matched record can be checked again until the budget runs out
    assert_eq!(record.attempt("123456"), Ok(true));
    assert!(record.is_exhausted());

    assert_eq!(record.attempt("123456"), Err(CodeError::VerifyTooMany));
    assert_eq!(record.remaining_attempts, 0);
}
