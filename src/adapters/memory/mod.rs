//! In-memory adapters.

mod credit_store;

pub use credit_store::InMemoryCreditStore;
