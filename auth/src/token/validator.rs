use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::GeneralPurpose;
use base64::engine::GeneralPurposeConfig;
use base64::Engine;
use jsonwebtoken::decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Validation;
use serde::Deserialize;
use uuid::Uuid;

use super::claims::Claims;
use super::claims::ISSUER;
use super::clock::Clock;
use super::clock::SystemClock;
use super::secret::SigningSecret;
use super::ALGORITHM;
use super::ALGORITHM_NAME;
use crate::errors::AuthError;

/// Unpadded base64url that tolerates non-zero trailing bits, so swapping one
/// character for another alphabet character never turns a decodable segment
/// into an undecodable one.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

/// Only the algorithm is read from the header before the signature is
/// checked; everything else in it is ignored.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Verifies tokens minted by [`TokenIssuer`](super::TokenIssuer) and recovers
/// their subject.
///
/// Checks run in a fixed order and the first failure wins:
/// 1. three base64url segments and a decodable header (`MalformedToken`)
/// 2. header algorithm is exactly HS256 (`BadSignature`)
/// 3. HMAC over header and claims matches, issuer is ours (`BadSignature`)
/// 4. claims decode and `exp` is still in the future (`Expired`)
/// 5. subject parses as a UUID (`MalformedSubject`)
#[derive(Debug, Clone)]
pub struct TokenValidator<C = SystemClock> {
    clock: C,
    validation: Validation,
}

impl TokenValidator<SystemClock> {
    /// Create a validator reading the wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TokenValidator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TokenValidator<C> {
    /// Create a validator reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against our own clock below.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self { clock, validation }
    }

    /// Validate `token` and return the subject it asserts.
    ///
    /// # Arguments
    /// * `token` - Token string, as returned by the issuer
    /// * `secret` - Signing secret the token must have been signed with
    ///
    /// # Returns
    /// Subject identity
    ///
    /// # Errors
    /// * `MalformedToken` - Wrong segment count, bad base64, undecodable header or claims
    /// * `BadSignature` - Unexpected algorithm, MAC mismatch or foreign issuer
    /// * `Expired` - `exp` is at or before the current second
    /// * `MalformedSubject` - Subject is not a UUID
    pub fn validate(&self, token: &str, secret: &SigningSecret) -> Result<Uuid, AuthError> {
        let header_segment = header_segment(token)
            .ok_or_else(|| reject(AuthError::MalformedToken, "bad segment structure"))?;

        let header = decode_header(header_segment)
            .ok_or_else(|| reject(AuthError::MalformedToken, "undecodable header"))?;

        if header.alg != ALGORITHM_NAME {
            return Err(reject(AuthError::BadSignature, "unexpected algorithm"));
        }

        let claims = decode::<Claims>(token, &secret.decoding_key(), &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    reject(AuthError::BadSignature, "signature mismatch")
                }
                _ => reject(AuthError::MalformedToken, "undecodable claims"),
            })?
            .claims;

        if claims.iss != ISSUER {
            return Err(reject(AuthError::BadSignature, "foreign issuer"));
        }

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(reject(AuthError::Expired, "expired"));
        }

        Uuid::parse_str(&claims.sub)
            .map_err(|_| reject(AuthError::MalformedSubject, "subject is not a uuid"))
    }
}

/// Returns the header segment when `token` has exactly three segments that
/// decode as base64url. Header and claims must be non-empty; an empty
/// signature is left for the algorithm and MAC checks to reject.
fn header_segment(token: &str) -> Option<&str> {
    let mut segments = token.split('.');
    let header = segments.next()?;
    let claims = segments.next()?;
    let signature = segments.next()?;

    if segments.next().is_some() || header.is_empty() || claims.is_empty() {
        return None;
    }

    [claims, signature]
        .iter()
        .all(|segment| SEGMENT_ENGINE.decode(segment).is_ok())
        .then_some(header)
}

fn decode_header(segment: &str) -> Option<RawHeader> {
    let bytes = SEGMENT_ENGINE.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn reject(error: AuthError, reason: &'static str) -> AuthError {
    tracing::debug!(error = %error, reason, "Token rejected");
    error
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::TimeZone;
    use chrono::Utc;
    use jsonwebtoken::encode;
    use jsonwebtoken::Algorithm;
    use jsonwebtoken::EncodingKey;
    use jsonwebtoken::Header;
    use serde::Serialize;

    use super::*;
    use crate::token::clock::FixedClock;
    use crate::token::clock::MockClock;
    use crate::token::TokenIssuer;

    const NOW: i64 = 1_700_000_000;

    fn clock_at(timestamp: i64) -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .return_const(Utc.timestamp_opt(timestamp, 0).single().unwrap());
        clock
    }

    fn issue_at(timestamp: i64, subject: Uuid, secret: &SigningSecret, ttl: Duration) -> String {
        let clock = FixedClock(Utc.timestamp_opt(timestamp, 0).single().unwrap());
        TokenIssuer::with_clock(clock)
            .issue(subject, secret, ttl)
            .expect("Failed to issue token")
    }

    fn b64(value: &serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    #[derive(Serialize)]
    struct ForgedClaims<'a> {
        iss: &'a str,
        sub: &'a str,
        iat: i64,
        exp: i64,
    }

    fn sign(claims: &ForgedClaims<'_>, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_returns_subject() {
        let subject = Uuid::new_v4();
        let secret = SigningSecret::from("secret");
        let token = issue_at(NOW, subject, &secret, Duration::from_secs(60));

        let validator = TokenValidator::with_clock(clock_at(NOW + 30));

        assert_eq!(validator.validate(&token, &secret), Ok(subject));
    }

    #[test]
    fn test_expires_at_exp_second() {
        let secret = SigningSecret::from("secret");
        let token = issue_at(NOW, Uuid::new_v4(), &secret, Duration::from_secs(60));

        let before = TokenValidator::with_clock(clock_at(NOW + 59));
        assert!(before.validate(&token, &secret).is_ok());

        let at = TokenValidator::with_clock(clock_at(NOW + 60));
        assert_eq!(at.validate(&token, &secret), Err(AuthError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_at(
            NOW,
            Uuid::new_v4(),
            &SigningSecret::from("secret1"),
            Duration::from_secs(60),
        );

        let validator = TokenValidator::with_clock(clock_at(NOW));

        assert_eq!(
            validator.validate(&token, &SigningSecret::from("secret2")),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_bad_signature_wins_over_expiry() {
        let token = issue_at(
            NOW,
            Uuid::new_v4(),
            &SigningSecret::from("secret1"),
            Duration::from_secs(1),
        );

        let validator = TokenValidator::with_clock(clock_at(NOW + 3_600));

        assert_eq!(
            validator.validate(&token, &SigningSecret::from("secret2")),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_wrong_segment_count() {
        let validator = TokenValidator::with_clock(clock_at(NOW));
        let secret = SigningSecret::from("secret");

        for token in ["", "abc", "abc.def", "a.b.c.d", "..", "abc..def"] {
            assert_eq!(
                validator.validate(token, &secret),
                Err(AuthError::MalformedToken),
                "{token:?}"
            );
        }
    }

    #[test]
    fn test_non_base64_segment() {
        let secret = SigningSecret::from("secret");
        let token = issue_at(NOW, Uuid::new_v4(), &secret, Duration::from_secs(60));
        let broken = format!("{token}+");

        let validator = TokenValidator::with_clock(clock_at(NOW));

        assert_eq!(
            validator.validate(&broken, &secret),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn test_undecodable_signature() {
        let secret = SigningSecret::from("secret");
        let token = issue_at(NOW, Uuid::new_v4(), &secret, Duration::from_secs(60));
        let (message, _) = token.rsplit_once('.').unwrap();

        let validator = TokenValidator::with_clock(clock_at(NOW));

        for signature in ["A", "AAAAA"] {
            assert_eq!(
                validator.validate(&format!("{message}.{signature}"), &secret),
                Err(AuthError::MalformedToken),
                "{signature:?}"
            );
        }
    }

    #[test]
    fn test_undecodable_claims() {
        let secret = SigningSecret::from("secret");
        let token = issue_at(NOW, Uuid::new_v4(), &secret, Duration::from_secs(60));
        let (header, rest) = token.split_once('.').unwrap();
        let (_, signature) = rest.split_once('.').unwrap();

        let validator = TokenValidator::with_clock(clock_at(NOW));

        assert_eq!(
            validator.validate(&format!("{header}.A.{signature}"), &secret),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn test_header_not_json() {
        let secret = SigningSecret::from("secret");
        let token = issue_at(NOW, Uuid::new_v4(), &secret, Duration::from_secs(60));
        let (_, rest) = token.split_once('.').unwrap();
        let forged = format!("{}.{rest}", URL_SAFE_NO_PAD.encode(b"not json"));

        let validator = TokenValidator::with_clock(clock_at(NOW));

        assert_eq!(
            validator.validate(&forged, &secret),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn test_none_algorithm_is_rejected() {
        let secret = SigningSecret::from("secret");
        let subject = Uuid::new_v4();
        let header = b64(&serde_json::json!({"alg": "none", "typ": "JWT"}));
        let claims = b64(&serde_json::json!({
            "iss": ISSUER,
            "sub": subject.to_string(),
            "iat": NOW,
            "exp": NOW + 60,
        }));
        let token = format!("{header}.{claims}.");

        let validator = TokenValidator::with_clock(clock_at(NOW));

        assert_eq!(
            validator.validate(&token, &secret),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_other_algorithms_are_rejected() {
        let secret = SigningSecret::from("secret");
        let validator = TokenValidator::with_clock(clock_at(NOW));
        let claims = ForgedClaims {
            iss: ISSUER,
            sub: "11111111-1111-1111-1111-111111111111",
            iat: NOW,
            exp: NOW + 60,
        };

        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert_eq!(
            validator.validate(&hs512, &secret),
            Err(AuthError::BadSignature)
        );

        let valid = sign(&claims, "secret");
        let (_, rest) = valid.split_once('.').unwrap();
        let lowercase = format!("{}.{rest}", b64(&serde_json::json!({"alg": "hs256"})));
        assert_eq!(
            validator.validate(&lowercase, &secret),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_foreign_issuer() {
        let token = sign(
            &ForgedClaims {
                iss: "another-service",
                sub: "11111111-1111-1111-1111-111111111111",
                iat: NOW,
                exp: NOW + 60,
            },
            "secret",
        );

        let validator = TokenValidator::with_clock(clock_at(NOW));

        assert_eq!(
            validator.validate(&token, &SigningSecret::from("secret")),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_malformed_subject() {
        let token = sign(
            &ForgedClaims {
                iss: ISSUER,
                sub: "not-a-uuid",
                iat: NOW,
                exp: NOW + 60,
            },
            "secret",
        );

        let validator = TokenValidator::with_clock(clock_at(NOW));

        assert_eq!(
            validator.validate(&token, &SigningSecret::from("secret")),
            Err(AuthError::MalformedSubject)
        );
    }

    #[test]
    fn test_expiry_checked_before_subject() {
        let token = sign(
            &ForgedClaims {
                iss: ISSUER,
                sub: "not-a-uuid",
                iat: NOW - 120,
                exp: NOW - 60,
            },
            "secret",
        );

        let validator = TokenValidator::with_clock(clock_at(NOW));

        assert_eq!(
            validator.validate(&token, &SigningSecret::from("secret")),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_signed_claims_missing_fields() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({"iss": ISSUER, "sub": "11111111-1111-1111-1111-111111111111"}),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let validator = TokenValidator::with_clock(clock_at(NOW));

        assert_eq!(
            validator.validate(&token, &SigningSecret::from("secret")),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn test_flipped_claims_byte() {
        let secret = SigningSecret::from("secret");
        let token = issue_at(NOW, Uuid::new_v4(), &secret, Duration::from_secs(60));
        let validator = TokenValidator::with_clock(clock_at(NOW));

        let header_len = token.find('.').unwrap() + 1;
        let claims_len = token[header_len..].find('.').unwrap();

        for offset in header_len..header_len + claims_len {
            let mut bytes = token.clone().into_bytes();
            bytes[offset] = if bytes[offset] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            assert_eq!(
                validator.validate(&tampered, &secret),
                Err(AuthError::BadSignature),
                "offset {offset}"
            );
        }
    }
}
