use super::amount::Currency;
use super::token::Token;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a donation stands, as far as the form is concerned.
///
/// The first two and the last variants belong to the form itself; the rest
/// mirror the processor's PaymentIntent statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Initial,
    Processing,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    RequiresCapture,
    Canceled,
    Succeeded,
    Error,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// States from which the form accepts a new submission.
    pub fn accepts_submission(self) -> bool {
        matches!(self, Self::Initial | Self::Succeeded | Self::Error)
    }

    pub fn headline(self) -> Option<&'static str> {
        match self {
            Self::Processing | Self::RequiresPaymentMethod | Self::RequiresConfirmation => {
                Some("Processing...")
            }
            Self::RequiresAction => Some("Authenticating..."),
            Self::Succeeded => Some("Payment Succeeded 🥳"),
            Self::Error => Some("Error 😭"),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Processing => "processing",
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

/// The processor's PaymentIntent. Fields we do not read are kept in `extra`
/// so the object can be handed back to the caller verbatim. The status is
/// kept as the processor sent it; `status()` interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(rename = "status")]
    pub raw_status: String,
    pub amount: i64,
    pub currency: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentIntent {
    pub fn status(&self) -> PaymentStatus {
        serde_json::from_value(Value::String(self.raw_status.clone()))
            .unwrap_or(PaymentStatus::Unknown)
    }
}

/// Everything needed to create and confirm one PaymentIntent.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentParams {
    /// Amount in the currency's minor unit.
    pub amount: i64,
    pub currency: Currency,
    pub payment_method: String,
    pub confirm: bool,
    pub idempotency_key: Option<String>,
}

/// Body of `POST /api/charge_with_reactor`.
///
/// The amount stays a plain JSON number on the wire; any number, however
/// large, deserializes and is judged by the charge handler's range check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub token: Option<Token>,
}

/// Error body returned by the charge endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub message: String,
}
