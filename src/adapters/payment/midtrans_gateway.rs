//! Midtrans Core API payment gateway adapter.
//!
//! Submits charges to `POST {base}/v2/charge`, authenticating with the
//! server key as the basic-auth user. The Core API reports most failures
//! with HTTP 200 and a `status_code` in the body, so both are checked.
//!
//! ```ignore
//! let config = MidtransConfig::new(server_key).with_callback_url("https://app/paid");
//! let gateway = MidtransGateway::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ports::{
    ChargeAction, ChargeRequest, ChargeResult, ChargeStatus, PaymentError, PaymentErrorCode,
    PaymentGateway,
};

/// Sandbox endpoint; production deployments override it from config.
pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.midtrans.com";

/// Midtrans API configuration.
#[derive(Clone)]
pub struct MidtransConfig {
    server_key: SecretString,
    api_base_url: String,
    payment_type: String,
    callback_url: Option<String>,
}

impl MidtransConfig {
    /// Create a configuration for GoPay charges against the sandbox.
    pub fn new(server_key: SecretString) -> Self {
        Self {
            server_key,
            api_base_url: SANDBOX_BASE_URL.to_string(),
            payment_type: "gopay".to_string(),
            callback_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_payment_type(mut self, payment_type: impl Into<String>) -> Self {
        self.payment_type = payment_type.into();
        self
    }

    /// Where the e-wallet app returns the payer after approval.
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }
}

/// Midtrans payment gateway adapter.
pub struct MidtransGateway {
    config: MidtransConfig,
    http_client: reqwest::Client,
}

impl MidtransGateway {
    pub fn new(config: MidtransConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn charge_body<'a>(&'a self, request: &'a ChargeRequest) -> ChargeBody<'a> {
        let gopay = match (&self.config.callback_url, self.config.payment_type.as_str()) {
            (Some(callback_url), "gopay") => Some(GopayOptions {
                enable_callback: true,
                callback_url,
            }),
            _ => None,
        };

        ChargeBody {
            payment_type: &self.config.payment_type,
            transaction_details: TransactionDetails {
                order_id: request.order_id.as_str(),
                gross_amount: request.gross_amount,
            },
            customer_details: CustomerDetails {
                first_name: &request.customer.first_name,
                email: &request.customer.email,
                phone: &request.customer.phone,
            },
            gopay,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChargeBody<'a> {
    payment_type: &'a str,
    transaction_details: TransactionDetails<'a>,
    customer_details: CustomerDetails<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gopay: Option<GopayOptions<'a>>,
}

#[derive(Debug, Serialize)]
struct TransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct CustomerDetails<'a> {
    first_name: &'a str,
    email: &'a str,
    phone: &'a str,
}

#[derive(Debug, Serialize)]
struct GopayOptions<'a> {
    enable_callback: bool,
    callback_url: &'a str,
}

/// The subset of the Core API charge response we rely on.
#[derive(Debug, Deserialize)]
struct ChargeResponse {
    status_code: String,
    #[serde(default)]
    status_message: String,
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    transaction_status: Option<String>,
    #[serde(default)]
    actions: Vec<ActionResponse>,
}

#[derive(Debug, Deserialize)]
struct ActionResponse {
    name: String,
    method: String,
    url: String,
}

/// Maps a non-2xx `status_code` onto a payment error.
fn error_for_status_code(status_code: &str, message: &str) -> PaymentError {
    let code = match status_code {
        "401" => PaymentErrorCode::AuthenticationError,
        "429" => PaymentErrorCode::RateLimitExceeded,
        c if c.starts_with('4') => PaymentErrorCode::InvalidRequest,
        c if c.starts_with('5') => PaymentErrorCode::ProviderError,
        _ => PaymentErrorCode::Unknown,
    };
    PaymentError::new(code, format!("Midtrans error: {}", message)).with_provider_code(status_code)
}

/// Turns a decoded charge response into the port's result.
fn interpret(request: &ChargeRequest, response: ChargeResponse) -> Result<ChargeResult, PaymentError> {
    if !response.status_code.starts_with('2') {
        return Err(error_for_status_code(
            &response.status_code,
            &response.status_message,
        ));
    }

    let raw_status = response.transaction_status.unwrap_or_default();
    let status = ChargeStatus::parse(&raw_status).ok_or_else(|| {
        PaymentError::provider(format!("Unexpected transaction status '{}'", raw_status))
            .with_provider_code(response.status_code.clone())
    })?;

    if !status.is_accepted() {
        return Err(
            PaymentError::declined(format!("Charge {}: {}", status, response.status_message))
                .with_provider_code(status.as_str()),
        );
    }

    let transaction_id = response
        .transaction_id
        .ok_or_else(|| PaymentError::provider("Charge response carried no transaction_id"))?;

    Ok(ChargeResult {
        order_id: request.order_id.clone(),
        transaction_id,
        status,
        actions: response
            .actions
            .into_iter()
            .map(|a| ChargeAction {
                name: a.name,
                method: a.method,
                url: a.url,
            })
            .collect(),
    })
}

#[async_trait]
impl PaymentGateway for MidtransGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeResult, PaymentError> {
        let url = format!("{}/v2/charge", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.server_key.expose_secret(), Some(""))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&self.charge_body(&request))
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let http_status = response.status();
        if !http_status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                order_id = %request.order_id,
                status = %http_status,
                error = %error_text,
                "Midtrans charge failed"
            );
            return Err(error_for_status_code(http_status.as_str(), &error_text));
        }

        let body: ChargeResponse = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Midtrans response: {}", e),
            )
        })?;

        let result = interpret(&request, body);
        match &result {
            Ok(charge) => tracing::info!(
                order_id = %request.order_id,
                transaction_id = %charge.transaction_id,
                status = %charge.status,
                "Midtrans charge accepted"
            ),
            Err(e) => tracing::warn!(
                order_id = %request.order_id,
                error = %e,
                "Midtrans charge refused"
            ),
        }
        result
    }
}
