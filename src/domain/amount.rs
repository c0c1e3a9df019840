use crate::error::{DonationError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies the processor charges without a minor unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

/// A lowercase ISO-4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim().to_ascii_lowercase();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code))
        } else {
            Err(DonationError::Config(format!(
                "'{code}' is not a three-letter currency code"
            )))
        }
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Number of decimal places in the currency's minor unit.
    pub fn exponent(&self) -> u32 {
        if ZERO_DECIMAL_CURRENCIES.contains(&self.0.as_str()) {
            0
        } else {
            2
        }
    }

    pub fn symbol(&self) -> String {
        match self.0.as_str() {
            "usd" => "$".to_string(),
            "eur" => "€".to_string(),
            "gbp" => "£".to_string(),
            "jpy" => "¥".to_string(),
            "cad" => "CA$".to_string(),
            "aud" => "A$".to_string(),
            other => format!("{} ", other.to_ascii_uppercase()),
        }
    }
}

impl FromStr for Currency {
    type Err = DonationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = DonationError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A donation amount in major units that has passed range validation.
///
/// Only `AmountRules::validate` hands these out, so holding one means the
/// value lies within the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts to the integer minor-unit amount the processor expects.
    pub fn to_minor_units(&self, currency: &Currency) -> Result<i64> {
        let scale = Decimal::from(10_i64.pow(currency.exponent()));
        self.0
            .checked_mul(scale)
            .map(|v| v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|v| v.to_i64())
            .ok_or(DonationError::InvalidAmount)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Formats a major-unit amount for display, e.g. `$5,000.00`.
pub fn format_amount_for_display(value: Decimal, currency: &Currency) -> String {
    let rounded =
        value.round_dp_with_strategy(currency.exponent(), RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.*}", currency.exponent() as usize, rounded.abs());
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(fraction) => format!("{sign}{}{grouped}.{fraction}", currency.symbol()),
        None => format!("{sign}{}{grouped}", currency.symbol()),
    }
}

/// Donation bounds and currency, shared by the form and the charge handler.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountRules {
    pub currency: Currency,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub amount_step: Decimal,
}

impl AmountRules {
    pub fn new(
        currency: Currency,
        min_amount: Decimal,
        max_amount: Decimal,
        amount_step: Decimal,
    ) -> Result<Self> {
        if min_amount > max_amount {
            return Err(DonationError::Config(format!(
                "minimum amount {min_amount} is greater than maximum amount {max_amount}"
            )));
        }
        if amount_step <= Decimal::ZERO {
            return Err(DonationError::Config(format!(
                "amount step must be positive, got {amount_step}"
            )));
        }
        Ok(Self {
            currency,
            min_amount,
            max_amount,
            amount_step,
        })
    }

    /// Checks `min_amount <= value <= max_amount`.
    pub fn validate(&self, value: Decimal) -> Result<Amount> {
        if value >= self.min_amount && value <= self.max_amount {
            Ok(Amount(value))
        } else {
            Err(DonationError::InvalidAmount)
        }
    }

    /// Whether `value` sits on the step grid anchored at `min_amount`.
    pub fn is_on_step(&self, value: Decimal) -> bool {
        ((value - self.min_amount) % self.amount_step).is_zero()
    }

    /// Initial value of the donation input.
    pub fn default_amount(&self) -> Decimal {
        (self.max_amount / self.amount_step)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rules() -> AmountRules {
        AmountRules::new(Currency::new("usd").unwrap(), dec!(10), dec!(5000), dec!(5)).unwrap()
    }

    #[test]
    fn test_validate_accepts_bounds() {
        let rules = rules();
        assert_eq!(rules.validate(dec!(10)).unwrap().value(), dec!(10));
        assert_eq!(rules.validate(dec!(5000)).unwrap().value(), dec!(5000));
        assert!(matches!(
            rules.validate(dec!(9.99)),
            Err(DonationError::InvalidAmount)
        ));
        assert!(matches!(
            rules.validate(dec!(5000.01)),
            Err(DonationError::InvalidAmount)
        ));
    }

    #[test]
    fn test_rules_reject_inverted_bounds() {
        let usd = Currency::new("usd").unwrap();
        assert!(AmountRules::new(usd.clone(), dec!(100), dec!(10), dec!(5)).is_err());
        assert!(AmountRules::new(usd, dec!(10), dec!(100), dec!(0)).is_err());
    }

    #[test]
    fn test_step_is_anchored_at_minimum() {
        let rules = AmountRules::new(Currency::new("usd").unwrap(), dec!(12), dec!(100), dec!(5))
            .unwrap();
        assert!(rules.is_on_step(dec!(12)));
        assert!(rules.is_on_step(dec!(17)));
        assert!(!rules.is_on_step(dec!(15)));
    }

    #[test]
    fn test_default_amount_rounds_max_over_step() {
        assert_eq!(rules().default_amount(), dec!(1000));
    }

    #[test]
    fn test_minor_units_respect_currency_exponent() {
        let amount = rules().validate(dec!(25.5)).unwrap();
        assert_eq!(amount.to_minor_units(&Currency::new("usd").unwrap()).unwrap(), 2550);
        assert_eq!(amount.to_minor_units(&Currency::new("JPY").unwrap()).unwrap(), 26);
    }

    #[test]
    fn test_currency_code_validation() {
        assert_eq!(Currency::new(" EUR ").unwrap().code(), "eur");
        assert!(Currency::new("dollars").is_err());
        assert!(Currency::new("u$d").is_err());
    }

    #[test]
    fn test_format_amount_for_display() {
        let usd = Currency::new("usd").unwrap();
        assert_eq!(format_amount_for_display(dec!(50), &usd), "$50.00");
        assert_eq!(format_amount_for_display(dec!(5000), &usd), "$5,000.00");
        assert_eq!(format_amount_for_display(dec!(1234567.891), &usd), "$1,234,567.89");

        let jpy = Currency::new("jpy").unwrap();
        assert_eq!(format_amount_for_display(dec!(1500), &jpy), "¥1,500");

        let chf = Currency::new("chf").unwrap();
        assert_eq!(format_amount_for_display(dec!(10), &chf), "CHF 10.00");
    }
}
