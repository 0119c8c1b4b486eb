//! HS512 JWT adapter for session validation.
//!
//! Tokens carry the user id in an `id` claim alongside `exp`, signed with a
//! shared secret. The adapter issues tokens at login, validates signature and
//! expiry on every request and maps the claims to the domain
//! `AuthenticatedUser`.
//!
//! ```ignore
//! let config = JwtConfig::new(secret).with_leeway(Duration::from_secs(30));
//! let validator = JwtSessionValidator::new(config);
//! let user = validator.validate("eyJ...").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::{SessionValidator, TokenIssuer};

const ALGORITHM: Algorithm = Algorithm::HS512;

/// Configuration for the JWT adapter.
#[derive(Clone)]
pub struct JwtConfig {
    secret: SecretString,
    token_ttl: Duration,
    leeway: Duration,
}

impl JwtConfig {
    /// One hour tokens, no clock leeway.
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            token_ttl: Duration::from_secs(3600),
            leeway: Duration::ZERO,
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Tolerated clock skew when checking `exp`.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// The user id.
    id: Uuid,
    /// Expiry (Unix epoch seconds).
    exp: i64,
}

/// Shared-secret session validator.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = config.leeway.as_secs();
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            encoding_key: EncodingKey::from_secret(secret),
            validation,
            token_ttl: config.token_ttl,
        }
    }

    /// Signs a session token for `user_id` that expires after the configured TTL.
    pub fn sign(&self, user_id: UserId) -> Result<String, AuthError> {
        let ttl = chrono::Duration::from_std(self.token_ttl)
            .map_err(|e| AuthError::service_unavailable(format!("Invalid token TTL: {}", e)))?;
        let claims = SessionClaims {
            id: *user_id.as_uuid(),
            exp: (Utc::now() + ttl).timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign session token: {}", e);
            AuthError::service_unavailable(format!("Failed to sign token: {}", e))
        })
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                other => {
                    tracing::debug!(error = ?other, "Token rejected");
                    AuthError::InvalidToken
                }
            },
        )?;

        Ok(AuthenticatedUser::new(UserId::from_uuid(data.claims.id)))
    }
}

impl TokenIssuer for JwtSessionValidator {
    fn issue(&self, user_id: &UserId) -> Result<String, AuthError> {
        self.sign(*user_id)
    }
}
