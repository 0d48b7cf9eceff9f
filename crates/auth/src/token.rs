//! Ed25519-signed identity tokens
//!
//! Token format: `hex(claims_json).hex(signature)` where the claims are
//! `{"sub": <subject id>, "exp": <unix seconds>}`.

use chrono::{DateTime, Duration, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::Authenticator;

/// Claims carried by a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject id
    pub sub: String,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// Generate a fresh signing seed (hex) for `CLEARANCE_SIGNING_KEY`
pub fn generate_seed_hex() -> String {
    let mut rng = rand::thread_rng();
    hex::encode(SigningKey::generate(&mut rng).to_bytes())
}

/// Issues and verifies identity tokens with one ed25519 key
pub struct TokenAuthenticator {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    ttl: Duration,
}

impl TokenAuthenticator {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let bytes = hex::decode(config.signing_key_hex.trim())
            .map_err(|e| AuthError::InvalidKey(format!("Invalid key hex: {}", e)))?;

        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AuthError::InvalidKey("Key must be 32 bytes".to_string()))?;

        let signing_key = SigningKey::from_bytes(&seed);
        Ok(Self {
            verifying_key: signing_key.verifying_key(),
            signing_key,
            ttl: Duration::hours(config.token_ttl_hours),
        })
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key.to_bytes())
    }

    /// Issue a token for a subject, valid for the configured lifetime
    pub fn issue(&self, subject_id: &str) -> String {
        self.issue_at(subject_id, Utc::now())
    }

    pub fn issue_at(&self, subject_id: &str, now: DateTime<Utc>) -> String {
        let claims = TokenClaims {
            sub: subject_id.to_string(),
            exp: (now + self.ttl).timestamp(),
        };
        // Two plain fields; serialization cannot fail
        let payload = serde_json::to_vec(&claims).unwrap_or_default();
        let signature = self.signing_key.sign(&payload);

        tracing::debug!(subject_id, exp = claims.exp, "Identity token issued");
        format!("{}.{}", hex::encode(&payload), hex::encode(signature.to_bytes()))
    }

    /// Verify a token as of `now` and return its claims
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let (payload_hex, signature_hex) = token
            .trim()
            .split_once('.')
            .ok_or_else(|| unauthorized("malformed token"))?;

        let payload = hex::decode(payload_hex).map_err(|_| unauthorized("malformed payload"))?;
        let signature_bytes: [u8; 64] = hex::decode(signature_hex)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| unauthorized("malformed signature"))?;

        self.verifying_key
            .verify(&payload, &Signature::from_bytes(&signature_bytes))
            .map_err(|_| unauthorized("bad signature"))?;

        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| unauthorized("malformed claims"))?;

        if claims.exp <= now.timestamp() {
            return Err(unauthorized("token expired"));
        }

        Ok(claims)
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, credentials: &str) -> Result<String, AuthError> {
        let claims = self.verify_at(credentials, Utc::now()).map_err(|e| {
            tracing::warn!(error = %e, "Rejected identity token");
            e
        })?;
        Ok(claims.sub)
    }
}

fn unauthorized(reason: &str) -> AuthError {
    AuthError::Unauthorized(reason.to_string())
}
