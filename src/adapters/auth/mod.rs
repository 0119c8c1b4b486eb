//! Authentication adapters.
//!
//! Implementations of the `SessionValidator`, `TokenIssuer` and
//! `PasswordHasher` ports:
//!
//! - `jwt` - HS512 shared-secret tokens carrying an `id` claim
//! - `argon2_hasher` - Argon2id password hashes in PHC format
//! - `mock` - Token map and plain-text hasher for tests

mod argon2_hasher;
mod jwt;
mod mock;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt::{JwtConfig, JwtSessionValidator};
pub use mock::{MockPasswordHasher, MockSessionValidator};
