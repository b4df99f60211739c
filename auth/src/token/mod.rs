use jsonwebtoken::Algorithm;

pub mod claims;
pub mod clock;
pub mod issuer;
pub mod secret;
pub mod validator;

pub use claims::Claims;
pub use claims::ISSUER;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use issuer::TokenIssuer;
pub use issuer::DEFAULT_TOKEN_TTL;
pub use secret::SigningSecret;
pub use validator::TokenValidator;

/// The only signing algorithm issued or accepted.
pub(crate) const ALGORITHM: Algorithm = Algorithm::HS256;
pub(crate) const ALGORITHM_NAME: &str = "HS256";
