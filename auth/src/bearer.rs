use http::header::AUTHORIZATION;
use http::HeaderMap;

use crate::errors::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization` header value.
///
/// The scheme must be exactly `Bearer ` (case-sensitive, one space). The
/// remainder is returned as is, without trimming, so the token seen by the
/// validator is byte-for-byte what the client sent.
///
/// # Errors
/// * `MissingToken` - Value does not start with `Bearer `
pub fn extract(header_value: &str) -> Result<&str, AuthError> {
    header_value.strip_prefix(BEARER_PREFIX).ok_or_else(|| {
        tracing::debug!("Authorization header lacks bearer scheme");
        AuthError::MissingToken
    })
}

/// Extract the bearer token from the first `Authorization` header.
///
/// # Errors
/// * `MissingToken` - Header absent, not visible ASCII, or not a bearer value
pub fn extract_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or_else(|| {
        tracing::debug!("Missing Authorization header");
        AuthError::MissingToken
    })?;

    let value = value.to_str().map_err(|_| {
        tracing::debug!("Authorization header is not visible ASCII");
        AuthError::MissingToken
    })?;

    extract(value)
}
