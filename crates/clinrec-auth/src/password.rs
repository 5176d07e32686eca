//! Password policy and hashing.
//!
//! Hashing uses Argon2id (hybrid mode) with default parameters and an
//! `OsRng` salt, stored in PHC string format. Plaintext passwords never
//! leave this module's function arguments.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::PasswordPolicy;

/// Passwords that pass the structural rules but are too well-known to allow.
const COMMON_PASSWORDS: &[&str] = &["password", "12345678", "qwerty", "abc123"];

/// Checks a candidate password against the policy.
///
/// Collects every unmet rule rather than stopping at the first, so the
/// caller can present the complete list.
#[must_use]
pub fn policy_violations(policy: &PasswordPolicy, password: &str) -> Vec<String> {
    let mut reasons = Vec::new();

    if password.chars().count() < policy.min_length {
        reasons.push(format!(
            "must be at least {} characters long",
            policy.min_length
        ));
    }
    if password.chars().count() > policy.max_length {
        reasons.push(format!(
            "must be at most {} characters long",
            policy.max_length
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        reasons.push("must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        reasons.push("must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        reasons.push("must contain at least one digit".to_string());
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        reasons.push("is too common".to_string());
    }

    reasons
}

/// Hashes a password for storage using Argon2id.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored Argon2 hash.
///
/// Returns `Ok(true)` on a match, `Ok(false)` on a mismatch. Errors only
/// when the stored hash itself is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("Secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secret123", &hash).unwrap());
        assert!(!verify_password("Secret124", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("Secret123").unwrap();
        let b = hash_password("Secret123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn policy_accepts_conforming_password() {
        let policy = PasswordPolicy::default();
        assert!(policy_violations(&policy, "Secret123").is_empty());
    }

    #[test]
    fn policy_collects_every_unmet_rule() {
        let policy = PasswordPolicy::default();
        // Too short, no uppercase, no digit.
        let reasons = policy_violations(&policy, "abc");
        assert_eq!(reasons.len(), 3);
    }

    #[test]
    fn policy_rejects_common_passwords() {
        let policy = PasswordPolicy::default();
        let reasons = policy_violations(&policy, "Qwerty");
        assert!(reasons.iter().any(|r| r == "is too common"));
    }

    #[test]
    fn malformed_stored_hash_is_an_error_not_a_mismatch() {
        assert!(verify_password("Secret123", "not-a-phc-string").is_err());
    }
}
