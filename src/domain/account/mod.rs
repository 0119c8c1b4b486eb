//! Account domain - registered users and their credentials.
//!
//! Passwords never live here in the clear: a [`Registration`] carries the
//! raw password only until the application layer hashes it.

mod errors;

pub use errors::AccountError;

use crate::domain::checkout::Customer;
use crate::domain::foundation::{Timestamp, UserId};

/// Shortest password accepted at registration or reset.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A registered user as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub created_at: Timestamp,
}

impl UserAccount {
    /// Contact details handed to the payment gateway.
    pub fn customer(&self) -> Customer {
        Customer::new(&self.name, &self.email, &self.phone)
    }
}

/// Validated sign-up data, still holding the raw password.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl Registration {
    /// Checks the sign-up form.
    ///
    /// The email is normalised to lower case so that lookups at login are
    /// case-insensitive.
    pub fn new(
        name: &str,
        email: &str,
        phone: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, AccountError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccountError::validation("name", "cannot be empty"));
        }

        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AccountError::validation("email", "is not valid"));
        }

        if password != confirm_password {
            return Err(AccountError::validation(
                "confirm_password",
                "password and confirm password do not match",
            ));
        }
        validate_password(password)?;

        Ok(Self {
            name: name.to_string(),
            email,
            phone: phone.trim().to_string(),
            password: password.to_string(),
        })
    }

    /// The account to store once the password has been hashed.
    pub fn into_account(self, password_hash: String) -> UserAccount {
        UserAccount {
            id: UserId::new(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            password_hash,
            created_at: Timestamp::now(),
        }
    }
}

pub fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::validation(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// One `@`, a non-empty local part and a dotted domain without spaces.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
