//! Credit Store - loyalty credit shop backend
//!
//! Users collect credit items in a per-user cart, then check out through a
//! payment gateway. A successful charge awards the cart's points, clears the
//! paid-for entries and records a transaction history row in one unit.
//!
//! Layout:
//! - `domain` - cart, catalog and checkout types with no I/O
//! - `ports` - async traits the application depends on
//! - `application` - cart ledger, checkout coordinator and queries
//! - `adapters` - Postgres, in-memory, Midtrans, JWT and HTTP implementations
//! - `config` / `telemetry` - process setup

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
