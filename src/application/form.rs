use crate::domain::amount::{AmountRules, format_amount_for_display};
use crate::domain::payment::{ChargeRequest, PaymentStatus};
use crate::domain::ports::{ChargeApiBox, TokenizerBox};
use crate::domain::token::{CardDetails, Token};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
use tokio::sync::watch;
use tracing::{error, warn};

const UNKNOWN_ERROR: &str = "Unknown Error";

/// What the donor typed into the form.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationInput {
    pub custom_donation: Decimal,
    pub cardholder_name: String,
}

/// Why `submit` returned without doing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TokenizerNotReady,
    InFlight(PaymentStatus),
    MissingCardholderName,
    AmountOutOfRange,
    AmountOffStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Skipped(SkipReason),
    Completed(PaymentStatus),
}

/// Client-side controller for the donation form.
///
/// Holds the form input and drives the payment status through one submission
/// at a time: tokenize the card, post the token to the charge endpoint, then
/// show whatever status came back. Every status change is published on a
/// watch channel so a renderer can follow along.
pub struct DonationForm {
    rules: AmountRules,
    tokenizer: Option<TokenizerBox>,
    api: ChargeApiBox,
    input: DonationInput,
    payment: Value,
    error_message: String,
    status: watch::Sender<PaymentStatus>,
}

impl DonationForm {
    /// Creates a form in the `initial` state. Pass `None` for `tokenizer`
    /// while the card widget is still loading.
    pub fn new(rules: AmountRules, tokenizer: Option<TokenizerBox>, api: ChargeApiBox) -> Self {
        let input = DonationInput {
            custom_donation: rules.default_amount(),
            cardholder_name: String::new(),
        };
        let (status, _) = watch::channel(PaymentStatus::Initial);
        Self {
            rules,
            tokenizer,
            api,
            input,
            payment: json!({ "status": PaymentStatus::Initial }),
            error_message: String::new(),
            status,
        }
    }

    /// Marks the card widget as loaded.
    pub fn attach_tokenizer(&mut self, tokenizer: TokenizerBox) {
        self.tokenizer = Some(tokenizer);
    }

    pub fn input(&self) -> &DonationInput {
        &self.input
    }

    pub fn set_custom_donation(&mut self, amount: Decimal) {
        self.input.custom_donation = amount;
    }

    pub fn set_cardholder_name(&mut self, name: impl Into<String>) {
        self.input.cardholder_name = name.into();
    }

    pub fn status(&self) -> PaymentStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PaymentStatus> {
        self.status.subscribe()
    }

    /// The last payment object, as returned by the charge endpoint.
    pub fn payment(&self) -> &Value {
        &self.payment
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.status().accepts_submission() && self.tokenizer.is_some()
    }

    pub fn donate_label(&self) -> String {
        format!(
            "Donate {}",
            format_amount_for_display(self.input.custom_donation, &self.rules.currency)
        )
    }

    /// Text to render under the form for the current status.
    pub fn status_headline(&self) -> Option<String> {
        let status = self.status();
        let headline = status.headline()?;
        if status == PaymentStatus::Error {
            Some(format!("{headline}\n{}", self.error_message))
        } else {
            Some(headline.to_string())
        }
    }

    /// The browser's native form validation: required name, amount within
    /// bounds and on the step grid.
    pub fn check_validity(&self) -> Result<(), SkipReason> {
        let amount = self.input.custom_donation;
        if self.input.cardholder_name.trim().is_empty() {
            return Err(SkipReason::MissingCardholderName);
        }
        if self.rules.validate(amount).is_err() {
            return Err(SkipReason::AmountOutOfRange);
        }
        if !self.rules.is_on_step(amount) {
            return Err(SkipReason::AmountOffStep);
        }
        Ok(())
    }

    fn set_status(&mut self, status: PaymentStatus) {
        self.payment = json!({ "status": status });
        self.status.send_replace(status);
    }

    fn fail(&mut self, message: String) -> Submission {
        self.error_message = if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        };
        self.set_status(PaymentStatus::Error);
        Submission::Completed(PaymentStatus::Error)
    }

    /// Runs one submission.
    pub async fn submit(&mut self, card: &CardDetails) -> Submission {
        if let Err(reason) = self.check_validity() {
            return Submission::Skipped(reason);
        }
        if self.tokenizer.is_none() {
            return Submission::Skipped(SkipReason::TokenizerNotReady);
        }
        let current = self.status();
        if !current.accepts_submission() {
            return Submission::Skipped(SkipReason::InFlight(current));
        }

        self.set_status(PaymentStatus::Processing);

        let tokenized = match &self.tokenizer {
            Some(tokenizer) => tokenizer.tokenize(card).await,
            None => return Submission::Skipped(SkipReason::TokenizerNotReady),
        };
        let token: Token = match tokenized {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "card tokenization failed");
                return self.fail(e.to_string());
            }
        };

        let request = ChargeRequest {
            amount: self.input.custom_donation.to_f64(),
            token: Some(token),
        };
        let response = match self.api.charge(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "charge request failed");
                return self.fail(e.to_string());
            }
        };

        if response.get("statusCode").is_some() {
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            warn!(%message, "charge endpoint returned an error");
            return self.fail(message);
        }

        let status = response
            .get("status")
            .cloned()
            .and_then(|s| serde_json::from_value(s).ok())
            .unwrap_or(PaymentStatus::Unknown);
        self.payment = response;
        self.status.send_replace(status);
        Submission::Completed(status)
    }
}
