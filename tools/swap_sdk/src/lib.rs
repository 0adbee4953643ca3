//! Shared building blocks for the HTLC settlement clients.
//!
//! - `amount`: exact human-unit <-> base-unit conversion.
//! - `poll`: fixed-delay polling over eventually-consistent reads.
//! - `hex`: prefix normalisation for secrets and hashes.
//! - `config` / `logging`: ambient setup used by `btc_wallet` and `evm_swap`.

pub mod amount;
pub mod config;
pub mod hex;
pub mod logging;
pub mod poll;

pub use amount::{Amount, AmountError, BTC_DECIMALS};
pub use config::{read_env_string, read_env_u64, validate_http_url, validate_nonzero, ConfigError};
pub use hex::HexError;
pub use logging::init_logging;
pub use poll::{repeat_to_result, Attempts, PollExhausted, PollValue};

/// Receives the hash of a submitted transaction before it confirms.
///
/// `FnOnce` so that each mutating operation can notify at most once.
pub type TxHashObserver = Box<dyn FnOnce(String) + Send>;

pub fn notify_tx_hash(observer: Option<TxHashObserver>, hash: &str) {
    if let Some(observer) = observer {
        observer(hash.to_string());
    }
}
