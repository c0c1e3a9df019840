//! Process configuration, read from flags or the environment.
//!
//! Vendor clients are built here, once, and handed to the services that use
//! them. Nothing in the crate reads credentials from the environment on its
//! own.

use crate::application::charge::ChargeService;
use crate::domain::amount::{AmountRules, Currency};
use crate::domain::ports::{PaymentProcessorBox, TokenVaultBox, TokenizerBox};
use crate::error::{DonationError, Result};
use crate::infrastructure::basis_theory::{self, BasisTheoryTokenizer, BasisTheoryVault};
use crate::infrastructure::sandbox::{SandboxProcessor, SandboxTokenizer, SandboxVault};
use crate::infrastructure::stripe::{self, StripeProcessor};
use clap::Args;
use rust_decimal::Decimal;
use tracing::warn;

/// Reactor id used when running against the sandbox vault.
pub const SANDBOX_REACTOR_ID: &str = "sandbox-reactor";

fn required(value: &Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(DonationError::Config(format!(
            "{name} is not set (pass --sandbox to run without vendor credentials)"
        ))),
    }
}

/// Donation currency and amount bounds.
#[derive(Debug, Clone, Args)]
pub struct DonationArgs {
    /// Currency donations are charged in.
    #[arg(long, env = "CURRENCY", default_value = "usd")]
    pub currency: Currency,

    /// Smallest accepted donation, in major units.
    #[arg(long, env = "MIN_AMOUNT", default_value = "10")]
    pub min_amount: Decimal,

    /// Largest accepted donation, in major units.
    #[arg(long, env = "MAX_AMOUNT", default_value = "5000")]
    pub max_amount: Decimal,

    /// Granularity of the donation input.
    #[arg(long, env = "AMOUNT_STEP", default_value = "5")]
    pub amount_step: Decimal,
}

impl DonationArgs {
    pub fn rules(&self) -> Result<AmountRules> {
        AmountRules::new(
            self.currency.clone(),
            self.min_amount,
            self.max_amount,
            self.amount_step,
        )
    }
}

/// Credentials and endpoints the charge handler needs.
#[derive(Clone, Args)]
pub struct ServerVendorArgs {
    /// Payment processor secret key.
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: Option<String>,

    /// Vault private API key, used to run the reactor.
    #[arg(long, env = "BT_PRIVATE_API_KEY", hide_env_values = true)]
    pub bt_private_api_key: Option<String>,

    /// Reactor that turns a card token into a processor payment method.
    #[arg(long, env = "BT_REACTOR_ID")]
    pub bt_reactor_id: Option<String>,

    #[arg(long, default_value = stripe::DEFAULT_API_BASE)]
    pub stripe_api_base: String,

    #[arg(long, default_value = basis_theory::DEFAULT_API_BASE)]
    pub bt_api_base: String,

    /// Use in-process sandbox adapters instead of the real vendors.
    #[arg(long, default_value_t = false)]
    pub sandbox: bool,
}

impl ServerVendorArgs {
    /// Builds the charge service with either the real vendor clients or the
    /// sandbox ones.
    pub fn charge_service(&self, rules: AmountRules) -> Result<ChargeService> {
        if self.sandbox {
            warn!("running with sandbox vault and processor; no real charges will be made");
            return Ok(ChargeService::new(
                Box::new(SandboxVault::new()),
                Box::new(SandboxProcessor::new()),
                rules,
                SANDBOX_REACTOR_ID,
            ));
        }

        let secret_key = required(&self.stripe_secret_key, "STRIPE_SECRET_KEY")?;
        let private_key = required(&self.bt_private_api_key, "BT_PRIVATE_API_KEY")?;
        let reactor_id = required(&self.bt_reactor_id, "BT_REACTOR_ID")?;

        let vault: TokenVaultBox = Box::new(BasisTheoryVault::new(&self.bt_api_base, private_key)?);
        let processor: PaymentProcessorBox =
            Box::new(StripeProcessor::new(&self.stripe_api_base, secret_key)?);
        Ok(ChargeService::new(vault, processor, rules, reactor_id))
    }
}

/// Credentials the client-side form needs.
#[derive(Clone, Args)]
pub struct ClientVendorArgs {
    /// Vault public API key, used to tokenize card data.
    #[arg(long, env = "BT_PUBLIC_API_KEY", hide_env_values = true)]
    pub bt_public_api_key: Option<String>,

    #[arg(long, default_value = basis_theory::DEFAULT_API_BASE)]
    pub bt_api_base: String,

    /// Tokenize with the in-process sandbox instead of the real vault.
    #[arg(long, default_value_t = false)]
    pub sandbox: bool,
}

impl ClientVendorArgs {
    pub fn tokenizer(&self) -> Result<TokenizerBox> {
        if self.sandbox {
            warn!("tokenizing with the sandbox vault");
            return Ok(Box::new(SandboxTokenizer::new()));
        }
        let public_key = required(&self.bt_public_api_key, "BT_PUBLIC_API_KEY")?;
        Ok(Box::new(BasisTheoryTokenizer::new(
            &self.bt_api_base,
            public_key,
        )?))
    }
}
