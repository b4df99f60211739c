//! Credential and token library
//!
//! Authenticates API callers for a small multi-user service:
//! - Password hashing (Argon2id)
//! - Signed session token issuance and validation (HS256)
//! - Bearer header parsing
//! - Login / request authorization coordination
//!
//! Every operation is a pure function of its arguments and the current time.
//! The signing secret is passed explicitly into each call, and every failure
//! is one of the closed [`AuthError`] kinds so callers can dispatch on the
//! variant.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use chirpy_auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify(&hash, "my_password").is_ok());
//! ```
//!
//! ## Tokens
//! ```
//! use std::time::Duration;
//!
//! use chirpy_auth::{SigningSecret, TokenIssuer, TokenValidator};
//! use uuid::Uuid;
//!
//! let secret = SigningSecret::from("s3cr3t");
//! let subject = Uuid::new_v4();
//!
//! let token = TokenIssuer::new()
//!     .issue(subject, &secret, Duration::from_secs(3600))
//!     .unwrap();
//! let recovered = TokenValidator::new().validate(&token, &secret).unwrap();
//! assert_eq!(recovered, subject);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use chirpy_auth::{Authenticator, SigningSecret};
//! use uuid::Uuid;
//!
//! let auth = Authenticator::new();
//! let secret = SigningSecret::from("secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let credential = auth.register(Uuid::new_v4(), "password123").unwrap();
//!
//! // Login: verify and issue token
//! let result = auth.login(&credential, "password123", &secret).unwrap();
//!
//! // Request: resolve the subject from the Authorization header
//! let header = format!("Bearer {}", result.access_token);
//! let subject = auth.authorize(&header, &secret).unwrap();
//! assert_eq!(subject, credential.subject);
//! ```

pub mod authenticator;
pub mod bearer;
pub mod config;
pub mod credential;
pub mod errors;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use crate::config::AuthConfig;
pub use credential::Credential;
pub use errors::AuthError;
pub use errors::ErrorClass;
pub use password::PasswordHasher;
pub use token::Clock;
pub use token::FixedClock;
pub use token::SigningSecret;
pub use token::SystemClock;
pub use token::TokenIssuer;
pub use token::TokenValidator;
pub use token::DEFAULT_TOKEN_TTL;
