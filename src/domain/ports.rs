use super::payment::{ChargeRequest, PaymentIntent, PaymentIntentParams};
use super::token::{CardDetails, Token};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output of a vault reactor run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorResponse {
    #[serde(default)]
    pub raw: Value,
}

impl ReactorResponse {
    /// The payment-method reference produced by the reactor, if any.
    pub fn payment_method_id(&self) -> Option<&str> {
        self.raw.get("id").and_then(Value::as_str)
    }
}

/// Server side of the vault: runs reactors against stored tokens.
#[async_trait]
pub trait TokenVault: Send + Sync {
    async fn react(&self, reactor_id: &str, args: Map<String, Value>) -> Result<ReactorResponse>;
}

/// Creates charges with the payment processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_payment_intent(&self, params: &PaymentIntentParams) -> Result<PaymentIntent>;
}

/// Client side of the vault: turns card fields into a token.
#[async_trait]
pub trait Tokenizer: Send + Sync {
    async fn tokenize(&self, card: &CardDetails) -> Result<Token>;
}

/// The form's view of the charge endpoint. Returns the parsed JSON body
/// whatever the HTTP status was.
#[async_trait]
pub trait ChargeApi: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> Result<Value>;
}

pub type TokenVaultBox = Box<dyn TokenVault>;
pub type PaymentProcessorBox = Box<dyn PaymentProcessor>;
pub type TokenizerBox = Box<dyn Tokenizer>;
pub type ChargeApiBox = Box<dyn ChargeApi>;
