//! ERC20 swap-contract client for the account-chain side of an HTLC swap.
//!
//! - `contract`: ABI, call encoding and the `SwapContract` seam.
//! - `evm`: alloy provider implementation of `SwapContract`.
//! - `client`: lifecycle operations with gas handling and polling.
//! - `secret`: secret recovery from `withdraw` inputs.

pub mod client;
pub mod config;
pub mod contract;
pub mod evm;
pub mod secret;
pub mod state;
pub mod types;

pub use client::{BalanceMismatch, ContractSwapClient, CreateSwapParams};
pub use config::SwapContractConfig;
pub use contract::{CallTarget, GasParams, PendingCall, SwapCall, SwapContract, SwapReceipt};
pub use evm::{connect, EvmSwapContract};
pub use secret::decode_withdraw_secret;
pub use state::{SwapRecord, SwapState};
pub use types::{EvmSwapError, Result};
