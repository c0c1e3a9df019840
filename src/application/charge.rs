use crate::domain::amount::AmountRules;
use crate::domain::payment::{ChargeRequest, PaymentIntent, PaymentIntentParams};
use crate::domain::ports::{PaymentProcessorBox, TokenVaultBox};
use crate::error::{DonationError, Result};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

/// Turns a vault token into a confirmed charge.
///
/// `ChargeService` owns the vault and processor clients it was constructed
/// with. Each call to `charge` is independent: nothing is cached between
/// requests and no call is retried.
pub struct ChargeService {
    vault: TokenVaultBox,
    processor: PaymentProcessorBox,
    rules: AmountRules,
    reactor_id: String,
}

impl ChargeService {
    /// Creates a new `ChargeService`.
    ///
    /// # Arguments
    ///
    /// * `vault` - Runs the reactor that exchanges a token for a payment method.
    /// * `processor` - Creates and confirms the PaymentIntent.
    /// * `rules` - Accepted amount range and charge currency.
    /// * `reactor_id` - The vault reactor to run.
    pub fn new(
        vault: TokenVaultBox,
        processor: PaymentProcessorBox,
        rules: AmountRules,
        reactor_id: impl Into<String>,
    ) -> Self {
        Self {
            vault,
            processor,
            rules,
            reactor_id: reactor_id.into(),
        }
    }

    pub fn rules(&self) -> &AmountRules {
        &self.rules
    }

    /// Validates the request, runs the reactor, then creates and confirms the
    /// charge. The processor is never called if validation or the reactor
    /// fails.
    pub async fn charge(
        &self,
        request: ChargeRequest,
        idempotency_key: Option<String>,
    ) -> Result<PaymentIntent> {
        // Numbers outside Decimal's range fail conversion and are rejected
        // the same way as any other out-of-range amount.
        let amount = request
            .amount
            .and_then(|value| Decimal::try_from(value).ok())
            .ok_or(DonationError::InvalidAmount)
            .and_then(|value| self.rules.validate(value))
            .inspect_err(|_| warn!(amount = ?request.amount, "rejected donation amount"))?;

        let token = request.token.ok_or_else(|| {
            warn!("rejected charge request without a token");
            DonationError::MissingToken
        })?;

        let mut args = Map::new();
        args.insert("card".to_string(), Value::String(token.reactor_expression()));

        debug!(reactor_id = %self.reactor_id, token_id = %token.id, "running reactor");
        let reaction = self
            .vault
            .react(&self.reactor_id, args)
            .await
            .inspect_err(|e| error!(error = %e, "reactor call failed"))?;

        let payment_method = reaction
            .payment_method_id()
            .ok_or_else(|| {
                error!("reactor response did not include a payment method id");
                DonationError::Vault("Reactor response did not include a payment method.".into())
            })?
            .to_string();

        let params = PaymentIntentParams {
            amount: amount.to_minor_units(&self.rules.currency)?,
            currency: self.rules.currency.clone(),
            payment_method,
            confirm: true,
            idempotency_key,
        };

        let intent = self
            .processor
            .create_payment_intent(&params)
            .await
            .inspect_err(|e| error!(error = %e, "payment intent creation failed"))?;

        info!(
            payment_intent = %intent.id,
            status = %intent.raw_status,
            amount = params.amount,
            currency = %params.currency,
            "donation charged"
        );
        Ok(intent)
    }
}
