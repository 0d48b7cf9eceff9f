//! Clearance auth - identity tokens for subject-scoped requests
//!
//! The workflow core never authenticates anyone. Boundary code resolves the
//! caller's identity through an [`Authenticator`] and passes the resulting
//! subject id to the core, which trusts it.

pub mod config;
pub mod error;
pub mod token;

pub use config::{AuthConfig, SIGNING_KEY_ENV};
pub use error::AuthError;
pub use token::{generate_seed_hex, TokenAuthenticator, TokenClaims};

/// Resolves inbound credentials to a subject identity
pub trait Authenticator: Send + Sync {
    /// Return the subject id the credentials belong to, or `Unauthorized`
    fn authenticate(&self, credentials: &str) -> Result<String, AuthError>;
}
