use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DonationError {
    #[error("Invalid amount.")]
    InvalidAmount,
    #[error("Missing token.")]
    MissingToken,
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
    /// The vault rejected a tokenize or react call.
    #[error("{0}")]
    Vault(String),
    /// The processor rejected the charge.
    #[error("{0}")]
    Processor(String),
    /// A downstream call failed without telling us why.
    #[error("Unknown error")]
    Unknown,
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DonationError {
    /// Builds a downstream error from an optional vendor message, falling back
    /// to `Unknown` when the vendor gave nothing usable.
    pub fn from_vendor(message: Option<String>, wrap: fn(String) -> Self) -> Self {
        match message {
            Some(message) if !message.trim().is_empty() => wrap(message),
            _ => Self::Unknown,
        }
    }

    /// Transport status used when this error is reported to an HTTP caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidAmount | Self::MissingToken | Self::MalformedRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, DonationError>;
