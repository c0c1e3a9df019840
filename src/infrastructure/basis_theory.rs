use crate::domain::ports::{ReactorResponse, TokenVault, Tokenizer};
use crate::domain::token::{CardDetails, Token};
use crate::error::{DonationError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.basistheory.com";
const API_KEY_HEADER: &str = "BT-API-KEY";

/// Problem-details body the vault returns on failure.
#[derive(Debug, Deserialize)]
struct ProblemDetails {
    title: Option<String>,
    detail: Option<String>,
}

/// Shared HTTP plumbing for both vault clients.
struct VaultHttp {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VaultHttp {
    fn new(base_url: &str, api_key: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ProblemDetails>(&body)
            .ok()
            .and_then(|p| p.detail.or(p.title));
        debug!(%status, "vault request rejected");
        Err(DonationError::from_vendor(message, DonationError::Vault))
    }
}

/// Server-side vault client. Authenticates with the private API key and runs
/// reactors.
pub struct BasisTheoryVault {
    http: VaultHttp,
}

impl BasisTheoryVault {
    pub fn new(base_url: &str, private_api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: VaultHttp::new(base_url, private_api_key.into())?,
        })
    }
}

#[async_trait]
impl TokenVault for BasisTheoryVault {
    async fn react(&self, reactor_id: &str, args: Map<String, Value>) -> Result<ReactorResponse> {
        debug!(%reactor_id, "invoking reactor");
        self.http
            .post(
                &format!("/reactors/{reactor_id}/react"),
                &json!({ "args": args }),
            )
            .await
    }
}

/// Client-side vault client. Authenticates with the public API key and
/// creates card tokens, as the hosted card element does.
pub struct BasisTheoryTokenizer {
    http: VaultHttp,
}

impl BasisTheoryTokenizer {
    pub fn new(base_url: &str, public_api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: VaultHttp::new(base_url, public_api_key.into())?,
        })
    }
}

#[async_trait]
impl Tokenizer for BasisTheoryTokenizer {
    async fn tokenize(&self, card: &CardDetails) -> Result<Token> {
        debug!("creating card token");
        self.http
            .post("/tokens", &json!({ "type": "card", "data": card }))
            .await
    }
}
