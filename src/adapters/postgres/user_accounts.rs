//! PostgreSQL implementation of the account ports.
//!
//! `users` rows serve two readers: checkout only needs contact details,
//! the account handlers need the password hash as well.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::UserAccount;
use crate::domain::checkout::Customer;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{UserAccountReader, UserAccountRepository};

use super::violated_constraint;

/// Unique email constraint from the initial migration.
const EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct PostgresUserAccounts {
    pool: PgPool,
}

impl PostgresUserAccounts {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    name: String,
    email: String,
    phone: String,
}

#[derive(Debug, sqlx::FromRow)]
struct UserAccountRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserAccountRow> for UserAccount {
    fn from(row: UserAccountRow) -> Self {
        UserAccount {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

fn create_error(
    constraint: Option<&str>,
    email: &str,
    cause: impl std::fmt::Display,
) -> DomainError {
    if constraint == Some(EMAIL_CONSTRAINT) {
        return DomainError::new(
            ErrorCode::EmailTaken,
            format!("Email {} is already registered", email),
        )
        .with_detail("email", email);
    }
    DomainError::database(format!("Failed to create user: {}", cause))
}

#[async_trait]
impl UserAccountReader for PostgresUserAccounts {
    async fn find_customer(&self, user_id: &UserId) -> Result<Option<Customer>, DomainError> {
        let row: Option<CustomerRow> =
            sqlx::query_as("SELECT name, email, phone FROM users WHERE id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to load user: {}", e)))?;

        Ok(row.map(|r| Customer::new(r.name, r.email, r.phone)))
    }
}

#[async_trait]
impl UserAccountRepository for PostgresUserAccounts {
    async fn create(&self, account: &UserAccount) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, phone, password_hash, point, created_at)
            VALUES ($1, $2, $3, $4, $5, 0, $6)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.password_hash)
        .bind(account.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| create_error(violated_constraint(&e), &account.email, &e))?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError> {
        let row: Option<UserAccountRow> = sqlx::query_as(
            "SELECT id, name, email, phone, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load user: {}", e)))?;

        Ok(row.map(UserAccount::from))
    }

    async fn update_password(
        &self,
        user_id: &UserId,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id.as_uuid())
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to update password: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User {} not found", user_id),
            ));
        }
        Ok(())
    }
}
