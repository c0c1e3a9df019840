use crate::domain::payment::ChargeRequest;
use crate::domain::ports::ChargeApi;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const CHARGE_PATH: &str = "/api/charge_with_reactor";

/// Posts donations to a running charge endpoint.
///
/// Error envelopes come back as ordinary JSON bodies; only a transport
/// failure or a non-JSON body is an `Err`.
pub struct ChargeApiClient {
    client: Client,
    base_url: String,
}

impl ChargeApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChargeApi for ChargeApiClient {
    async fn charge(&self, request: &ChargeRequest) -> Result<Value> {
        let url = format!("{}{}", self.base_url, CHARGE_PATH);
        let response = self.client.post(&url).json(request).send().await?;
        Ok(response.json().await?)
    }
}
