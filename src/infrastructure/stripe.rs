use crate::domain::payment::{PaymentIntent, PaymentIntentParams};
use crate::domain::ports::PaymentProcessor;
use crate::error::{DonationError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";
/// API version the PaymentIntent shape in this crate was written against.
pub const API_VERSION: &str = "2020-08-27";

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: Option<StripeErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// PaymentIntent client for the Stripe REST API.
pub struct StripeProcessor {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeProcessor {
    pub fn new(base_url: &str, secret_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn create_payment_intent(&self, params: &PaymentIntentParams) -> Result<PaymentIntent> {
        let url = format!("{}/v1/payment_intents", self.base_url);
        let form = [
            ("amount", params.amount.to_string()),
            ("currency", params.currency.code().to_string()),
            ("payment_method", params.payment_method.clone()),
            ("confirm", params.confirm.to_string()),
        ];

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .header("Stripe-Version", API_VERSION)
            .form(&form);
        if let Some(key) = &params.idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        debug!(amount = params.amount, currency = %params.currency, "creating payment intent");
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StripeErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.message);
        debug!(%status, "payment intent rejected");
        Err(DonationError::from_vendor(message, DonationError::Processor))
    }
}
