//! Handoff code generation and verification
//!
//! The handoff code is the one-time secret a buyer shows the seller at
//! physical delivery. Only its Argon2id hash is ever stored; the plaintext
//! exists in memory between generation and the HTTP response, and is never
//! logged.

use super::error::{CheckoutError, CheckoutResult};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Handoff code length in characters (~71 bits of entropy over [A-Za-z0-9])
pub const HANDOFF_CODE_LEN: usize = 12;

/// Generate a fresh plaintext handoff code and its hash
pub fn generate() -> CheckoutResult<(String, String)> {
    let code = random_code();
    let hash = hash_code(&code)?;
    Ok((code, hash))
}

/// Hash a handoff code using argon2 (salted PHC string)
pub fn hash_code(code: &str) -> CheckoutResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(code.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CheckoutError::Hashing(e.to_string()))
}

/// Verify a presented code against a stored hash using argon2
///
/// The comparison runs in constant time inside the verifier; a mismatch is
/// indistinguishable timing-wise from a match.
pub fn verify_code(code: &str, hash: &str) -> CheckoutResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| CheckoutError::Hashing(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(code.as_bytes(), &parsed)
        .is_ok())
}

/// Mint a transaction id
///
/// High-entropy; the storage layer still enforces uniqueness and callers
/// regenerate on the vanishingly-rare collision.
pub fn new_transaction_id() -> String {
    format!("txn-{}", uuid::Uuid::new_v4())
}

fn random_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(HANDOFF_CODE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify() {
        let (code, hash) = generate().unwrap();
        assert_eq!(code.len(), HANDOFF_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(verify_code(&code, &hash).unwrap());
    }

    #[test]
    fn test_wrong_code_fails() {
        let (_, hash) = generate().unwrap();
        assert!(!verify_code("definitely-not-it", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_code("same-code").unwrap();
        let second = hash_code("same-code").unwrap();
        assert_ne!(first, second);
        assert!(verify_code("same-code", &first).unwrap());
        assert!(verify_code("same-code", &second).unwrap());
    }

    #[test]
    fn test_plaintext_not_contained_in_hash() {
        let (code, hash) = generate().unwrap();
        assert!(!hash.contains(&code));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_code("abc", "not-a-phc-string"),
            Err(CheckoutError::Hashing(_))
        ));
    }

    #[test]
    fn test_transaction_ids_are_distinct() {
        assert_ne!(new_transaction_id(), new_transaction_id());
    }
}
