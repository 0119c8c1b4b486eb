//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, timestamps, traits)
//! - `account` - Registered users and their credentials
//! - `catalog` - Purchasable credit items
//! - `cart` - Per-user cart entries and their aggregation rules
//! - `checkout` - Checkout lifecycle, order ids, settlement and history

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod foundation;
