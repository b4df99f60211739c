use serde::Deserialize;
use serde::Serialize;

/// Issuer embedded in every token minted by this service.
pub const ISSUER: &str = "chirpy";

/// Token payload.
///
/// Timestamps are whole Unix seconds. The signature covers the serialized
/// form of this struct, so every field is tamper-evident.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,

    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `subject` issued by this service.
    pub fn new(subject: impl ToString, issued_at: i64, expires_at: i64) -> Self {
        Self {
            iss: ISSUER.to_string(),
            sub: subject.to_string(),
            iat: issued_at,
            exp: expires_at,
        }
    }

    /// A token is expired from its `exp` second onward.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}
