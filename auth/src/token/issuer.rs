use std::time::Duration;

use jsonwebtoken::encode;
use jsonwebtoken::Header;
use uuid::Uuid;

use super::claims::Claims;
use super::clock::Clock;
use super::clock::SystemClock;
use super::secret::SigningSecret;
use super::ALGORITHM;
use crate::errors::AuthError;

/// Lifetime applied when the caller passes a zero TTL.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Mints signed, time-bounded tokens.
///
/// Tokens are `header.claims.signature`, each segment base64url encoded,
/// signed with HS256 over the first two segments.
#[derive(Debug, Clone, Default)]
pub struct TokenIssuer<C = SystemClock> {
    clock: C,
}

impl TokenIssuer<SystemClock> {
    /// Create an issuer reading the wall clock.
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> TokenIssuer<C> {
    /// Create an issuer reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Issue a token asserting `subject`.
    ///
    /// `iat` is the current time truncated to whole seconds and
    /// `exp = iat + ttl`. A sub-second remainder in `ttl` rounds up so the
    /// token always outlives its issuance second.
    ///
    /// # Arguments
    /// * `subject` - Identity the token asserts
    /// * `secret` - Signing secret
    /// * `ttl` - Token lifetime; `Duration::ZERO` selects [`DEFAULT_TOKEN_TTL`]
    ///
    /// # Returns
    /// Token string
    ///
    /// # Errors
    /// * `SigningFailure` - Lifetime out of range, or serialization/signing failed
    pub fn issue(
        &self,
        subject: Uuid,
        secret: &SigningSecret,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let ttl = if ttl.is_zero() { DEFAULT_TOKEN_TTL } else { ttl };

        let issued_at = self.clock.now().timestamp();
        let expires_at = ttl_seconds(ttl)
            .and_then(|seconds| issued_at.checked_add(seconds))
            .ok_or_else(|| AuthError::SigningFailure("token lifetime out of range".to_string()))?;

        let claims = Claims::new(subject, issued_at, expires_at);

        let token = encode(&Header::new(ALGORITHM), &claims, &secret.encoding_key()).map_err(
            |e| {
                tracing::error!(error = %e, "Failed to sign token");
                AuthError::SigningFailure(e.to_string())
            },
        )?;

        tracing::debug!(
            subject = %subject,
            issued_at,
            expires_at,
            "Token issued"
        );

        Ok(token)
    }
}

fn ttl_seconds(ttl: Duration) -> Option<i64> {
    let whole = ttl.as_secs();
    let seconds = if ttl.subsec_nanos() > 0 {
        whole.checked_add(1)?
    } else {
        whole
    };
    i64::try_from(seconds).ok()
}
