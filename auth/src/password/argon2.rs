use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::password_hash::Error as PasswordHashError;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use crate::errors::AuthError;

/// Salt length in bytes, drawn fresh from the OS RNG for every hash.
const SALT_LEN: usize = 16;

/// Password hashing implementation.
///
/// Produces self-describing Argon2id PHC strings: algorithm, version, cost
/// parameters, salt and digest are all encoded together, so verification
/// needs nothing but the stored string.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a password hasher with the default Argon2id work factor.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Create a password hasher with an explicit work factor.
    ///
    /// # Arguments
    /// * `params` - Argon2 memory cost (KiB), iterations and parallelism
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    /// Work factor applied to newly created hashes.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// No policy is applied to the plaintext; any string, including the
    /// empty one, is hashed.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash
    ///
    /// # Errors
    /// * `HashingFailure` - Randomness unavailable or the primitive failed
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        OsRng.try_fill_bytes(&mut salt_bytes).map_err(|e| {
            tracing::error!(error = %e, "Failed to read salt from OS random source");
            AuthError::HashingFailure(e.to_string())
        })?;

        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AuthError::HashingFailure(e.to_string()))?;

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!(error = %e, "Argon2 hashing failed");
                AuthError::HashingFailure(e.to_string())
            })
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// The salt and cost parameters are read from `hash`, not from this
    /// hasher, so hashes created under an older work factor still verify.
    ///
    /// # Arguments
    /// * `hash` - Stored password hash in PHC string format
    /// * `password` - Plaintext password to check
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match the hash
    /// * `InvalidHashFormat` - Hash was not produced by this scheme
    pub fn verify(&self, hash: &str, password: &str) -> Result<(), AuthError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::InvalidHashFormat(e.to_string()))?;

        if parsed_hash.salt.is_none() || parsed_hash.hash.is_none() {
            return Err(AuthError::InvalidHashFormat(
                "hash is missing salt or digest".to_string(),
            ));
        }

        match self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(()),
            Err(PasswordHashError::Password) => Err(AuthError::Mismatch),
            Err(e) => Err(AuthError::InvalidHashFormat(e.to_string())),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
