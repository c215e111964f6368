use thiserror::Error;

/// Every failure is reported once to the caller. Nothing in this crate retries.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unable to execute: no connected signing identity")]
    NotConnected,

    #[error("Transport error: {0}")]
    Transport(String),

    /// Rejection reported by the chain or the contract, passed through verbatim.
    #[error("{0}")]
    Contract(String),

    #[error("Signer error: {0}")]
    Signer(String),

    #[error("Page after game {0} did not advance")]
    StalledPage(u64),

    #[error("Transaction {0} was not included in time")]
    TxNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
