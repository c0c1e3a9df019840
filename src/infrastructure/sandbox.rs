use crate::domain::payment::{PaymentIntent, PaymentIntentParams, PaymentStatus};
use crate::domain::ports::{PaymentProcessor, ReactorResponse, TokenVault, Tokenizer};
use crate::domain::token::{CardDetails, Token};
use crate::error::{DonationError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Payment method the sandbox reactor hands out; the processor's test-mode
/// Visa card.
pub const SANDBOX_PAYMENT_METHOD: &str = "pm_card_visa";

fn record<T>(log: &Mutex<Vec<T>>, entry: T) {
    log.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
}

fn snapshot<T: Clone>(log: &Mutex<Vec<T>>) -> Vec<T> {
    log.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// In-process stand-in for the vault's reactor endpoint.
///
/// Clones share the call log, so a test can keep one handle and give another
/// to the service under test.
#[derive(Clone)]
pub struct SandboxVault {
    raw: Value,
    failure: Option<String>,
    calls: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
}

impl Default for SandboxVault {
    fn default() -> Self {
        Self::with_raw(json!({
            "id": SANDBOX_PAYMENT_METHOD,
            "object": "payment_method",
            "type": "card",
        }))
    }
}

impl SandboxVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reactor that answers every call with `raw`.
    pub fn with_raw(raw: Value) -> Self {
        Self {
            raw,
            failure: None,
            calls: Arc::default(),
        }
    }

    /// Reactor that fails every call with `message`. An empty message yields
    /// an error with no text.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Every `(reactor_id, args)` pair this vault was called with.
    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        snapshot(&self.calls)
    }
}

#[async_trait]
impl TokenVault for SandboxVault {
    async fn react(&self, reactor_id: &str, args: Map<String, Value>) -> Result<ReactorResponse> {
        record(&self.calls, (reactor_id.to_string(), args));
        match &self.failure {
            Some(message) => Err(DonationError::from_vendor(
                Some(message.clone()),
                DonationError::Vault,
            )),
            None => Ok(ReactorResponse {
                raw: self.raw.clone(),
            }),
        }
    }
}

/// In-process stand-in for the payment processor.
#[derive(Clone)]
pub struct SandboxProcessor {
    status: String,
    failure: Option<String>,
    next_id: Arc<AtomicU64>,
    calls: Arc<Mutex<Vec<PaymentIntentParams>>>,
}

impl Default for SandboxProcessor {
    fn default() -> Self {
        Self::with_status(PaymentStatus::Succeeded)
    }
}

impl SandboxProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processor whose PaymentIntents all end up in `status`.
    pub fn with_status(status: PaymentStatus) -> Self {
        Self::with_raw_status(status.as_str())
    }

    /// Processor that reports `status` exactly as given, recognised or not.
    pub fn with_raw_status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            failure: None,
            next_id: Arc::new(AtomicU64::new(1)),
            calls: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PaymentIntentParams> {
        snapshot(&self.calls)
    }
}

#[async_trait]
impl PaymentProcessor for SandboxProcessor {
    async fn create_payment_intent(&self, params: &PaymentIntentParams) -> Result<PaymentIntent> {
        record(&self.calls, params.clone());
        if let Some(message) = &self.failure {
            return Err(DonationError::from_vendor(
                Some(message.clone()),
                DonationError::Processor,
            ));
        }

        let id = format!("pi_sandbox_{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut extra = Map::new();
        extra.insert("object".into(), json!("payment_intent"));
        extra.insert("client_secret".into(), json!(format!("{id}_secret_sandbox")));
        extra.insert("payment_method".into(), json!(params.payment_method));
        extra.insert("confirmation_method".into(), json!("automatic"));
        extra.insert("livemode".into(), json!(false));

        Ok(PaymentIntent {
            id,
            raw_status: self.status.clone(),
            amount: params.amount,
            currency: params.currency.code().to_string(),
            extra,
        })
    }
}

/// In-process stand-in for the vault's card widget.
#[derive(Clone)]
pub struct SandboxTokenizer {
    failure: Option<String>,
    next_id: Arc<AtomicU64>,
}

impl Default for SandboxTokenizer {
    fn default() -> Self {
        Self {
            failure: None,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl SandboxTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }
}

/// Luhn checksum over a string of ASCII digits.
fn passes_luhn(number: &str) -> bool {
    if number.len() < 12 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = number
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[async_trait]
impl Tokenizer for SandboxTokenizer {
    async fn tokenize(&self, card: &CardDetails) -> Result<Token> {
        if let Some(message) = &self.failure {
            return Err(DonationError::from_vendor(
                Some(message.clone()),
                DonationError::Vault,
            ));
        }
        let number: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
        if !passes_luhn(&number) {
            return Err(DonationError::Vault("Card number is invalid.".into()));
        }

        let mut token = Token::new(format!(
            "tok_sandbox_{}",
            self.next_id.fetch_add(1, Ordering::Relaxed)
        ));
        token.extra.insert("type".into(), json!("card"));
        token.extra.insert(
            "mask".into(),
            json!(format!("{}{}", "X".repeat(number.len() - 4), &number[number.len() - 4..])),
        );
        Ok(token)
    }
}
