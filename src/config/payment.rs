//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::payment::{MidtransConfig, SANDBOX_BASE_URL};

/// Prefix of Midtrans sandbox server keys.
const SANDBOX_KEY_PREFIX: &str = "SB-";

/// Payment gateway configuration (Midtrans Core API)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Server key, sent as the basic-auth user
    pub server_key: SecretString,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Core API `payment_type` (e.g. `gopay`, `qris`)
    #[serde(default = "default_payment_type")]
    pub payment_type: String,

    /// Where e-wallet apps send the payer after approval
    pub callback_url: Option<String>,

    /// Upper bound on a single charge call, in seconds
    #[serde(default = "default_charge_timeout")]
    pub charge_timeout_secs: u64,
}

impl PaymentConfig {
    pub fn charge_timeout(&self) -> Duration {
        Duration::from_secs(self.charge_timeout_secs)
    }

    pub fn is_sandbox(&self) -> bool {
        self.server_key.expose_secret().starts_with(SANDBOX_KEY_PREFIX)
    }

    /// Adapter configuration for `MidtransGateway`.
    pub fn midtrans_config(&self) -> MidtransConfig {
        let config = MidtransConfig::new(self.server_key.clone())
            .with_base_url(&self.api_base_url)
            .with_payment_type(&self.payment_type);
        match &self.callback_url {
            Some(url) => config.with_callback_url(url),
            None => config,
        }
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.server_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__SERVER_KEY"));
        }
        if !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::PaymentUrlMustBeHttps);
        }
        if *environment == Environment::Production && self.is_sandbox() {
            return Err(ValidationError::SandboxKeyInProduction);
        }
        if self.charge_timeout_secs == 0 || self.charge_timeout_secs > 120 {
            return Err(ValidationError::InvalidChargeTimeout);
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    SANDBOX_BASE_URL.to_string()
}

fn default_payment_type() -> String {
    "gopay".to_string()
}

fn default_charge_timeout() -> u64 {
    30
}
