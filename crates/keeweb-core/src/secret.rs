//! Argon2 hash guarding a database secret.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};

use crate::loader::LoadError;

/// PHC string stored next to a database, e.g. `$argon2id$v=19$...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretHash(String);

impl SecretHash {
    /// Hashes `secret` with a fresh random salt.
    pub fn seal(secret: &str) -> Result<Self, LoadError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|e| LoadError::Decode(format!("cannot hash secret: {}", e)))
    }

    /// A mismatch is `WrongSecret`; a hash that is not a PHC string is `Decode`.
    ///
    /// CPU bound, keep it off the async workers.
    pub fn verify(&self, secret: &str) -> Result<(), LoadError> {
        let parsed = PasswordHash::new(&self.0)
            .map_err(|e| LoadError::Decode(format!("malformed secret hash: {}", e)))?;
        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .map_err(|_| LoadError::WrongSecret)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
