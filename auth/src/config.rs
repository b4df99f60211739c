use std::env;
use std::fmt;
use std::time::Duration;

use argon2::Params;
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::token::SigningSecret;
use crate::token::DEFAULT_TOKEN_TTL;

/// Secrets shorter than this are accepted but logged as weak.
const RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub token: TokenConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Deserialize, Clone)]
pub struct TokenConfig {
    pub secret: String,
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

/// Argon2id work factor for newly created hashes.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_TOKEN_TTL.as_secs()
}

fn default_memory_kib() -> u32 {
    Params::DEFAULT_M_COST
}

fn default_iterations() -> u32 {
    Params::DEFAULT_T_COST
}

fn default_parallelism() -> u32 {
    Params::DEFAULT_P_COST
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl PasswordConfig {
    /// Argon2 parameters for this work factor.
    pub fn params(&self) -> Result<Params, ConfigError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| ConfigError::Message(format!("invalid password work factor: {}", e)))
    }
}

/// `CHIRPY__TOKEN__SECRET` maps to `token.secret`.
fn environment() -> Environment {
    Environment::with_prefix("CHIRPY")
        .separator("__")
        .try_parsing(true)
}

impl AuthConfig {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (CHIRPY__TOKEN__SECRET, CHIRPY__PASSWORD__MEMORY_KIB, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment());

        Self::from_builder(builder)
    }

    /// Build and validate configuration from an arbitrary set of sources.
    ///
    /// # Errors
    /// * Missing or ill-typed keys, an empty secret, or an invalid work factor
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AuthConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.secret.is_empty() {
            return Err(ConfigError::Message("token.secret must not be empty".to_string()));
        }

        if self.token.secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                length = self.token.secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "Signing secret is shorter than recommended"
            );
        }

        self.password.params()?;
        Ok(())
    }

    pub fn signing_secret(&self) -> SigningSecret {
        SigningSecret::from(self.token.secret.as_str())
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token.ttl_seconds)
    }
}
