//! HTTP adapter for accounts.
//!
//! Sign-up and login are public under `/api`; password reset needs a session
//! and lives under `/api/user`.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{handle_account_error, AccountAppState};
pub use routes::account_routes;
