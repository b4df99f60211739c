use uuid::Uuid;

use crate::errors::AuthError;
use crate::password::PasswordHasher;

/// An identity paired with its password hash.
///
/// The plaintext is never kept. Persisting credentials is the caller's
/// concern; this type only carries the values between the store and the
/// hasher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub subject: Uuid,
    pub password_hash: String,
}

impl Credential {
    /// Hash `password` and pair it with `subject`.
    ///
    /// # Errors
    /// * `HashingFailure` - Hashing operation failed
    pub fn new(subject: Uuid, password: &str, hasher: &PasswordHasher) -> Result<Self, AuthError> {
        Ok(Self {
            subject,
            password_hash: hasher.hash(password)?,
        })
    }

    /// Rebuild a credential from a stored hash.
    pub fn from_stored(subject: Uuid, password_hash: impl Into<String>) -> Self {
        Self {
            subject,
            password_hash: password_hash.into(),
        }
    }

    /// Check `password` against the stored hash.
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match
    /// * `InvalidHashFormat` - Stored hash is corrupted or foreign
    pub fn verify(&self, password: &str, hasher: &PasswordHasher) -> Result<(), AuthError> {
        hasher.verify(&self.password_hash, password)
    }
}
