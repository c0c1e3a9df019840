use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque vault reference for stored card data.
///
/// Only `id` is interpreted; any other field the vault returned is carried
/// along unchanged so the client can forward the token as it received it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Token {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }

    /// Detokenization expression the reactor resolves back to card data.
    pub fn reactor_expression(&self) -> String {
        format!("{{{{{}}}}}", self.id)
    }
}

/// Card fields as entered in the card widget. Only ever sent to the vault.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub expiration_month: u8,
    pub expiration_year: u16,
    pub cvc: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last4 = self
            .number
            .get(self.number.len().saturating_sub(4)..)
            .unwrap_or_default();
        f.debug_struct("CardDetails")
            .field("number", &format_args!("****{last4}"))
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .field("cvc", &"***")
            .finish()
    }
}
