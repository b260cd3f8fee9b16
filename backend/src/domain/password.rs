//! One-way salted password hashing.
//!
//! Hashes are Argon2id PHC strings. Every call to [`PasswordHasher::hash`]
//! draws a fresh salt so equal secrets produce different hashes.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use thiserror::Error;

use super::PasswordHash;

/// Failures raised while hashing or verifying secrets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// The hashing primitive failed.
    #[error("password hashing failed: {message}")]
    HashingFailure {
        /// Primitive failure detail.
        message: String,
    },
    /// The candidate does not match the stored hash.
    #[error("password does not match")]
    Mismatch,
}

/// Argon2id hasher with the crate's default parameters.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Argon2id with the library defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `secret` with a random salt.
    ///
    /// # Examples
    /// ```
    /// use agora_backend::domain::password::PasswordHasher;
    ///
    /// let hasher = PasswordHasher::new();
    /// let hash = hasher.hash("hunter2").expect("hashing succeeds");
    /// assert!(hasher.verify(&hash, "hunter2").is_ok());
    /// ```
    pub fn hash(&self, secret: &str) -> Result<PasswordHash, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|err| PasswordError::HashingFailure {
                message: err.to_string(),
            })?;
        Ok(PasswordHash::from_phc(phc.to_string()))
    }

    /// Check `candidate` against `hash` in constant time.
    ///
    /// An unparsable stored hash is reported as [`PasswordError::Mismatch`].
    pub fn verify(&self, hash: &PasswordHash, candidate: &str) -> Result<(), PasswordError> {
        let parsed = PhcString::new(hash.as_str()).map_err(|_| PasswordError::Mismatch)?;
        self.argon2
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|_| PasswordError::Mismatch)
    }
}
