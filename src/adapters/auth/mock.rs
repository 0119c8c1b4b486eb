//! Mock session validator and password hasher for testing.
//!
//! Maps opaque tokens straight to users so HTTP tests can authenticate
//! without signing JWTs. Tokens issued at login are registered in the same
//! map, so a login followed by an authenticated request works end to end.
//!
//! ```ignore
//! let user_id = UserId::new();
//! let validator = MockSessionValidator::new().with_user("valid-token", user_id);
//! assert!(validator.validate("valid-token").await.is_ok());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, DomainError, ErrorCode, UserId};
use crate::ports::{PasswordHasher, SessionValidator, TokenIssuer};

/// Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Returned for every validation while set.
    force_error: RwLock<Option<AuthError>>,
    issued: AtomicU64,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token that authenticates as `user_id`.
    pub fn with_user(self, token: impl Into<String>, user_id: UserId) -> Self {
        self.add_token(token, user_id);
        self
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self
            .force_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    pub fn clear_error(&self) {
        *self
            .force_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user_id: UserId) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), AuthenticatedUser::new(user_id));
    }

    pub fn remove_token(&self, token: &str) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

impl TokenIssuer for MockSessionValidator {
    fn issue(&self, user_id: &UserId) -> Result<String, AuthError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("issued-{}-{}", n, user_id);
        self.add_token(token.clone(), *user_id);
        Ok(token)
    }
}

/// Stores passwords behind a fixed prefix instead of hashing them.
#[derive(Debug, Default, Clone)]
pub struct MockPasswordHasher;

const MOCK_HASH_PREFIX: &str = "plain$";

impl MockPasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for MockPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        Ok(format!("{}{}", MOCK_HASH_PREFIX, password))
    }

    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, DomainError> {
        password_hash
            .strip_prefix(MOCK_HASH_PREFIX)
            .map(|stored| stored == password)
            .ok_or_else(|| DomainError::new(ErrorCode::InternalError, "Unknown hash format"))
    }
}
