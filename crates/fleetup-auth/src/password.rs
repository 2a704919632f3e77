//! Password hashing and verification using Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

/// Error types for password operations
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHashFormat(String),
}

/// Hash a password with Argon2id and a random 16-byte salt.
///
/// Returns a PHC-formatted string suitable for the `password_hash`
/// column. The default parameters are the OWASP-recommended Argon2id
/// settings (19 MiB memory, 2 iterations, parallelism 1).
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; `Err` is reserved for malformed hashes and
/// hashing failures so callers can distinguish bad credentials from bad
/// data.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHashFormat(e.to_string()))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_produces_phc_string() {
        let hash = hash_password("FleetPass123!").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let hash = hash_password("CorrectHorse9!").expect("Failed to hash password");

        assert!(verify_password("CorrectHorse9!", &hash).unwrap());
        assert!(!verify_password("WrongHorse9!", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("AnyPassword", "not-a-phc-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat(_))));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hash1 = hash_password("SamePassword1!").unwrap();
        let hash2 = hash_password("SamePassword1!").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("SamePassword1!", &hash1).unwrap());
        assert!(verify_password("SamePassword1!", &hash2).unwrap());
    }

    #[test]
    fn test_verify_password_case_sensitive() {
        let hash = hash_password("MixedCase123").unwrap();

        assert!(!verify_password("mixedcase123", &hash).unwrap());
    }
}
