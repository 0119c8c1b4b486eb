//! Catalog query handlers.

mod list_credit_items;

pub use list_credit_items::ListCreditItemsHandler;
