//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `auth` - Session token validation (HS512 JWT, mock)
//! - `http` - Axum routes, middleware and response envelopes
//! - `memory` - In-memory store for tests and local runs
//! - `payment` - Payment gateways (Midtrans, mock)
//! - `postgres` - PostgreSQL persistence

pub mod auth;
pub mod http;
pub mod memory;
pub mod payment;
pub mod postgres;
