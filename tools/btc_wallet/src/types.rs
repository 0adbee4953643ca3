use swap_sdk::{AmountError, ConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BtcWalletError {
    /// The explorer answered with its "refused" status (HTTP 525).
    #[error("{method} {url}: request rejected by provider")]
    ProviderRejected { method: &'static str, url: String },
    #[error("unknown provider error (status {status:?}): {message}")]
    UnknownProvider { status: Option<u16>, message: String },
    #[error("total less than fee: {total} < {fund} + {fee}")]
    InsufficientFunds { total: u64, fund: u64, fee: u64 },
    #[error("no response")]
    NoResponse,
    #[error("{0}")]
    Provider(String),
    #[error("invalid address {address}: {message}")]
    InvalidAddress { address: String, message: String },
    #[error("invalid txid {txid}: {message}")]
    InvalidTxid { txid: String, message: String },
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BtcWalletError>;
