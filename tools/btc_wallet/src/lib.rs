//! Bitcoin side of an HTLC swap.
//!
//! - `account`: WIF-backed signing capability and P2PKH address.
//! - `fee`: fee-rate oracles with mainnet fallback.
//! - `rpc`: explorer gateway (Insight + BlockCypher + Omni) and error
//!   classification.
//! - `tx_builder`: spend-all funding transaction, signed and broadcast.

pub mod account;
pub mod config;
pub mod fee;
pub mod rpc;
pub mod tx_builder;
pub mod types;

pub use account::{parse_address, SigningAccount};
pub use config::{parse_network, BtcNetwork, ExplorerConfig, TxBuilderConfig, DEFAULT_FEE_SATS};
pub use fee::{BlockcypherFees, EarnComFees, FeeEstimator, FeeProvider, FeeRate, Speed};
pub use rpc::{
    classify_error, merge_tx_info, BroadcastReceipt, DEFAULT_OMNI_ASSET_ID, ExplorerGateway, UnspentOutput, UtxoExplorer,
};
pub use tx_builder::{build_transaction, BuiltTransaction, TransactionBuilder, INPUT_SEQUENCE};
pub use types::{BtcWalletError, Result};
