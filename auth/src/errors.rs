use thiserror::Error;

/// Error type for every credential and token operation.
///
/// The set is closed: callers match on the variant to pick a response and
/// never need to inspect the message. Messages never contain secrets,
/// plaintext passwords or token text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token subject is malformed")]
    MalformedSubject,

    #[error("Password does not match")]
    Mismatch,

    #[error("Invalid password hash format: {0}")]
    InvalidHashFormat(String),

    #[error("Password hashing failed: {0}")]
    HashingFailure(String),

    #[error("Token signing failed: {0}")]
    SigningFailure(String),
}

/// How a dispatcher should surface an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller presented bad or missing credentials.
    Unauthorized,
    /// Stored data or infrastructure is broken; not the caller's fault.
    Internal,
}

impl AuthError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AuthError::MissingToken
            | AuthError::MalformedToken
            | AuthError::BadSignature
            | AuthError::Expired
            | AuthError::MalformedSubject
            | AuthError::Mismatch => ErrorClass::Unauthorized,
            AuthError::InvalidHashFormat(_)
            | AuthError::HashingFailure(_)
            | AuthError::SigningFailure(_) => ErrorClass::Internal,
        }
    }

    /// True when the error should be reported as a generic "unauthorized".
    pub fn is_credential_failure(&self) -> bool {
        self.class() == ErrorClass::Unauthorized
    }
}
