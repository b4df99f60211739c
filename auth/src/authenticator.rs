use std::time::Duration;

use config::ConfigError;
use http::HeaderMap;
use uuid::Uuid;

use crate::bearer;
use crate::config::AuthConfig;
use crate::credential::Credential;
use crate::errors::AuthError;
use crate::password::PasswordHasher;
use crate::token::Clock;
use crate::token::SigningSecret;
use crate::token::SystemClock;
use crate::token::TokenIssuer;
use crate::token::TokenValidator;
use crate::token::DEFAULT_TOKEN_TTL;

/// Authentication coordinator combining password verification and tokens.
///
/// Composes the login flow (verify, then issue) and the request flow
/// (extract bearer, then validate). It never holds the signing secret; the
/// caller passes it into every call.
#[derive(Debug, Clone)]
pub struct Authenticator<C = SystemClock> {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer<C>,
    token_validator: TokenValidator<C>,
    token_ttl: Duration,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Subject the token was issued for
    pub subject: Uuid,
    /// Signed access token
    pub access_token: String,
}

impl Authenticator<SystemClock> {
    /// Create an authenticator with default work factor and token lifetime.
    pub fn new() -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_issuer: TokenIssuer::new(),
            token_validator: TokenValidator::new(),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Create an authenticator from loaded configuration.
    ///
    /// # Errors
    /// * `ConfigError` - Password work factor is invalid
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Ok(Self::new()
            .with_password_hasher(PasswordHasher::with_params(config.password.params()?))
            .with_token_ttl(config.token_ttl()))
    }
}

impl Default for Authenticator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> Authenticator<C> {
    /// Replace the password hasher.
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    /// Set the lifetime of tokens issued by [`login`](Self::login).
    ///
    /// `Duration::ZERO` falls back to the one hour default.
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Read time from `clock` for both issuance and validation.
    pub fn with_clock<D: Clock + Clone>(self, clock: D) -> Authenticator<D> {
        Authenticator {
            password_hasher: self.password_hasher,
            token_issuer: TokenIssuer::with_clock(clock.clone()),
            token_validator: TokenValidator::with_clock(clock),
            token_ttl: self.token_ttl,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `HashingFailure` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored hash.
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match
    /// * `InvalidHashFormat` - Hash is corrupted or foreign
    pub fn verify_password(&self, hash: &str, password: &str) -> Result<(), AuthError> {
        self.password_hasher.verify(hash, password)
    }

    /// Create a credential for a new account.
    ///
    /// # Errors
    /// * `HashingFailure` - Hashing operation failed
    pub fn register(&self, subject: Uuid, password: &str) -> Result<Credential, AuthError> {
        Credential::new(subject, password, &self.password_hasher)
    }

    /// Verify credentials and issue a token.
    ///
    /// # Arguments
    /// * `credential` - Stored credential of the account logging in
    /// * `password` - Plaintext password presented by the client
    /// * `secret` - Signing secret
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match
    /// * `InvalidHashFormat` - Stored hash is corrupted
    /// * `SigningFailure` - Token generation failed
    pub fn login(
        &self,
        credential: &Credential,
        password: &str,
        secret: &SigningSecret,
    ) -> Result<AuthenticationResult, AuthError> {
        if let Err(e) = credential.verify(password, &self.password_hasher) {
            tracing::debug!(subject = %credential.subject, error = %e, "Login rejected");
            return Err(e);
        }

        let access_token = self.issue_token(credential.subject, secret)?;

        Ok(AuthenticationResult {
            subject: credential.subject,
            access_token,
        })
    }

    /// Issue a token without password verification.
    ///
    /// Useful for token refresh flows or when authentication
    /// has already been verified by other means.
    ///
    /// # Errors
    /// * `SigningFailure` - Token generation failed
    pub fn issue_token(&self, subject: Uuid, secret: &SigningSecret) -> Result<String, AuthError> {
        self.token_issuer.issue(subject, secret, self.token_ttl)
    }

    /// Resolve the subject behind an `Authorization` header value.
    ///
    /// # Errors
    /// * `MissingToken` - Not a bearer header
    /// * `MalformedToken`, `BadSignature`, `Expired`, `MalformedSubject` - Token rejected
    pub fn authorize(&self, header_value: &str, secret: &SigningSecret) -> Result<Uuid, AuthError> {
        let token = bearer::extract(header_value)?;
        self.token_validator.validate(token, secret)
    }

    /// Resolve the subject behind the `Authorization` header of a request.
    pub fn authorize_headers(
        &self,
        headers: &HeaderMap,
        secret: &SigningSecret,
    ) -> Result<Uuid, AuthError> {
        let token = bearer::extract_from_headers(headers)?;
        self.token_validator.validate(token, secret)
    }
}
