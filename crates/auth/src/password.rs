//! Password hashing.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;

use crate::AuthResult;

/// Hashes and verifies account passwords.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash(&self, password: &str) -> AuthResult<String>;

    /// Returns true if `password` matches `hash`.
    fn verify(&self, password: &str, hash: &str) -> AuthResult<bool>;
}

/// Argon2id hasher with a random 16-byte salt per hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> AuthResult<String> {
        let mut salt_bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)?;

        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("12345678").unwrap();

        assert_ne!(hash, "12345678");
        assert!(hasher.verify("12345678", &hash).unwrap());
        assert!(!hasher.verify("87654321", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = Argon2Hasher::new();
        let first = hasher.hash("12345678").unwrap();
        let second = hasher.hash("12345678").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = Argon2Hasher::new();
        assert!(hasher.verify("12345678", "not-a-phc-string").is_err());
    }
}
