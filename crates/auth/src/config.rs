//! Authenticator configuration

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Environment variable holding the hex-encoded signing seed
pub const SIGNING_KEY_ENV: &str = "CLEARANCE_SIGNING_KEY";

fn default_token_ttl_hours() -> i64 {
    24
}

/// Signing key and token lifetime, built once at startup and handed to the
/// authenticator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 32-byte ed25519 seed, hex-encoded
    pub signing_key_hex: String,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

impl AuthConfig {
    pub fn new(signing_key_hex: impl Into<String>) -> Self {
        Self {
            signing_key_hex: signing_key_hex.into(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }

    pub fn with_ttl_hours(mut self, hours: i64) -> Self {
        self.token_ttl_hours = hours;
        self
    }

    /// Read the signing key from `CLEARANCE_SIGNING_KEY`
    pub fn from_env() -> Result<Self, AuthError> {
        match std::env::var(SIGNING_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(AuthError::MissingKey(SIGNING_KEY_ENV.to_string())),
        }
    }
}
