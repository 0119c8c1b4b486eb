//! Payment gateway adapters.
//!
//! - `MidtransGateway` - Core API charges (GoPay by default)
//! - `MockPaymentGateway` - Configurable gateway for tests and local runs
//!
//! # Configuration
//!
//! - `CREDIT_STORE__PAYMENT__SERVER_KEY`: Midtrans server key
//! - `CREDIT_STORE__PAYMENT__API_BASE_URL`: sandbox or production endpoint

mod midtrans_gateway;
mod mock_payment_gateway;

pub use midtrans_gateway::{MidtransConfig, MidtransGateway, SANDBOX_BASE_URL};
pub use mock_payment_gateway::MockPaymentGateway;
