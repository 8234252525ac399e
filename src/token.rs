//! Manage json web tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EXPIRATION_TIME: u64 = 60 * 60; // 1 hour.
const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

pub type Result<T> = std::result::Result<T, TokenError>;

/// Errors produced while issuing or checking a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret is not configured")]
    Configuration,
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Identity asserted by a caller when asking for a token.
///
/// Only `email` is required. Any other field is kept as-is and travels with
/// the token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    /// Create an [`Identity`] carrying only an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }
}

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: Identity,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
}

/// Manage JWT tokens signed with a shared secret.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Create a new [`TokenManager`] instance.
    pub fn new(secret: Option<&str>) -> Result<Self> {
        let secret = secret
            .filter(|secret| !secret.is_empty())
            .ok_or(TokenError::Configuration)?;

        Ok(Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Create a new [`jsonwebtoken`] valid for [`EXPIRATION_TIME`] seconds.
    pub fn create(&self, identity: &Identity) -> Result<String> {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        self.create_at(identity, time)
    }

    pub(crate) fn create_at(&self, identity: &Identity, issued_at: u64) -> Result<String> {
        let mut identity = identity.clone();
        for claim in RESERVED_CLAIMS {
            identity.extra.remove(claim);
        }

        let claims = Claims {
            identity,
            iat: issued_at,
            exp: issued_at + EXPIRATION_TIME,
        };

        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?)
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Identity> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_aud = false;

        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?
            .claims
            .identity)
    }
}
