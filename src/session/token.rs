use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

use super::{
    clock::{Clock, SystemClock},
    types::{IdentityClaims, SessionClaims},
};
use crate::shared::AppError;

/// Lifetime of an issued session token
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// Registered claims owned by the token service, never taken from the caller
const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// Reasons a presented token is rejected
#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token expired")]
    Expired,
}

impl From<TokenError> for AppError {
    fn from(_: TokenError) -> Self {
        AppError::Unauthorized
    }
}

/// Issues and verifies HS256 session tokens keyed by a shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(SESSION_LIFETIME_HOURS),
            clock,
        }
    }

    /// Creates a signed token embedding `identity`, expiring one lifetime from now
    #[instrument(skip(self, identity))]
    pub fn issue(&self, mut identity: IdentityClaims) -> Result<String, AppError> {
        for claim in RESERVED_CLAIMS {
            identity.0.remove(claim);
        }

        let now = self.clock.now();
        let claims = SessionClaims {
            identity,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        debug!(exp_timestamp = claims.exp, "Creating session token");

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            debug!(error = %e, "Failed to encode session token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Checks signature and expiry, returning the embedded claims
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        // Expiry is checked against the injected clock below
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Failed to decode session token");
                TokenError::Invalid(e.to_string())
            })?;

        let now = self.clock.now().timestamp();
        if claims.exp <= now {
            debug!(exp = claims.exp, now, "Session token expired");
            return Err(TokenError::Expired);
        }

        debug!(exp = claims.exp, "Session token verified");
        Ok(claims)
    }
}
