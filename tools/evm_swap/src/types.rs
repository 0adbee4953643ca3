use alloy::primitives::B256;
use swap_sdk::{AmountError, ConfigError, HexError, PollExhausted};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvmSwapError {
    #[error("gas estimation for {call} failed: {message}")]
    GasEstimation { call: &'static str, message: String },
    #[error("{call} reverted in {hash}")]
    Reverted { call: &'static str, hash: B256 },
    #[error("contract call {call} failed: {message}")]
    Contract { call: &'static str, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error(transparent)]
    InvalidHex(#[from] HexError),
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error(transparent)]
    Poll(#[from] PollExhausted),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl EvmSwapError {
    pub fn contract(call: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Contract {
            call,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EvmSwapError>;
