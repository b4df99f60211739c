#![allow(dead_code)]

use std::time::Duration;

use argon2::Params;
use chirpy_auth::Authenticator;
use chirpy_auth::FixedClock;
use chirpy_auth::PasswordHasher;
use chirpy_auth::SigningSecret;
use chirpy_auth::TokenIssuer;
use chirpy_auth::TokenValidator;
use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use uuid::Uuid;

pub const ISSUED_AT: i64 = 1_700_000_000;

/// Hasher with the smallest valid work factor so tests stay fast.
pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(Params::new(64, 1, 1, None).expect("valid params"))
}

pub fn instant(timestamp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .expect("valid timestamp")
}

/// Issue a token at `ISSUED_AT`.
pub fn issue(subject: Uuid, secret: &str, ttl: Duration) -> String {
    TokenIssuer::with_clock(FixedClock(instant(ISSUED_AT)))
        .issue(subject, &SigningSecret::from(secret), ttl)
        .expect("Failed to issue token")
}

/// Validator whose clock reads `ISSUED_AT + elapsed`.
pub fn validator_after(elapsed: Duration) -> TokenValidator<FixedClock> {
    let elapsed = i64::try_from(elapsed.as_secs()).expect("elapsed fits in i64");
    TokenValidator::with_clock(FixedClock(instant(ISSUED_AT + elapsed)))
}

pub fn authenticator_at(timestamp: i64) -> Authenticator<FixedClock> {
    Authenticator::new()
        .with_password_hasher(fast_hasher())
        .with_clock(FixedClock(instant(timestamp)))
}
