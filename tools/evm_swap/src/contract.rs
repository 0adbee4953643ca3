//! Call primitives for the swap contract and its ERC20 token.
//!
//! `SwapContract` is the seam between the lifecycle client and the chain:
//! the alloy-backed implementation lives in `evm`, tests drive the client
//! through in-memory doubles.

use alloy::primitives::{Address, Bytes, FixedBytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::state::SwapRecord;
use crate::types::Result;

sol! {
    #[sol(rpc)]
    contract ISwap {
        function createSwap(bytes20 _secretHash, address _participantAddress, uint256 _value, address _token) public;
        function createSwapTarget(bytes20 _secretHash, address _participantAddress, address _targetWallet, uint256 _value, address _token) public;
        function withdraw(bytes32 _secret, address _ownerAddress) public;
        function refund(address _participantAddress) public;
        function swaps(address _ownerAddress, address _participantAddress) public view returns (address token, address targetWallet, bytes32 secret, bytes20 secretHash, uint256 createdAt, uint256 balance);
        function getBalance(address _ownerAddress) public view returns (uint256);
        function getTargetWallet(address _ownerAddress) public view returns (address);
        function getSecret(address _participantAddress) public view returns (bytes32);
    }
}

sol! {
    #[sol(rpc)]
    contract IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) returns (bool);
    }
}

/// Which deployed contract a call is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
    Swap,
    Token,
}

/// A state-changing call, fully parameterised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapCall {
    Approve {
        spender: Address,
        amount: U256,
    },
    CreateSwap {
        secret_hash: FixedBytes<20>,
        participant: Address,
        amount: U256,
        token: Address,
    },
    CreateSwapTarget {
        secret_hash: FixedBytes<20>,
        participant: Address,
        target_wallet: Address,
        amount: U256,
        token: Address,
    },
    Withdraw {
        secret: B256,
        owner: Address,
    },
    Refund {
        participant: Address,
    },
}

impl SwapCall {
    pub fn name(&self) -> &'static str {
        match self {
            SwapCall::Approve { .. } => "approve",
            SwapCall::CreateSwap { .. } => "createSwap",
            SwapCall::CreateSwapTarget { .. } => "createSwapTarget",
            SwapCall::Withdraw { .. } => "withdraw",
            SwapCall::Refund { .. } => "refund",
        }
    }

    pub fn target(&self) -> CallTarget {
        match self {
            SwapCall::Approve { .. } => CallTarget::Token,
            _ => CallTarget::Swap,
        }
    }

    /// ABI-encoded input for the call.
    pub fn calldata(&self) -> Bytes {
        let encoded = match self.clone() {
            SwapCall::Approve { spender, amount } => IERC20::approveCall {
                spender,
                value: amount,
            }
            .abi_encode(),
            SwapCall::CreateSwap {
                secret_hash,
                participant,
                amount,
                token,
            } => ISwap::createSwapCall {
                _secretHash: secret_hash,
                _participantAddress: participant,
                _value: amount,
                _token: token,
            }
            .abi_encode(),
            SwapCall::CreateSwapTarget {
                secret_hash,
                participant,
                target_wallet,
                amount,
                token,
            } => ISwap::createSwapTargetCall {
                _secretHash: secret_hash,
                _participantAddress: participant,
                _targetWallet: target_wallet,
                _value: amount,
                _token: token,
            }
            .abi_encode(),
            SwapCall::Withdraw { secret, owner } => ISwap::withdrawCall {
                _secret: secret,
                _ownerAddress: owner,
            }
            .abi_encode(),
            SwapCall::Refund { participant } => ISwap::refundCall {
                _participantAddress: participant,
            }
            .abi_encode(),
        };
        Bytes::from(encoded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasParams {
    pub gas_limit: u64,
    pub gas_price: u128,
}

/// A submitted call whose hash is known but which may not be mined yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    pub call: &'static str,
    pub hash: B256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[async_trait]
pub trait SwapContract: Send + Sync {
    /// Address the calls are sent from.
    fn sender(&self) -> Address;
    fn swap_address(&self) -> Address;
    fn token_address(&self) -> Address;

    async fn gas_price(&self) -> Result<u128>;
    /// Gas needed for `call`, bounded by `cap`.
    async fn estimate_gas(&self, call: &SwapCall, cap: u64) -> Result<u64>;
    async fn send(&self, call: &SwapCall, gas: GasParams) -> Result<PendingCall>;
    async fn wait_for_receipt(&self, pending: &PendingCall) -> Result<SwapReceipt>;

    async fn swap(&self, owner: Address, participant: Address) -> Result<SwapRecord>;
    async fn balance(&self, owner: Address) -> Result<U256>;
    async fn target_wallet(&self, owner: Address) -> Result<Address>;
    async fn secret(&self, participant: Address) -> Result<B256>;
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256>;
    /// Input of a transaction, or `None` while the node does not know it.
    async fn transaction_input(&self, hash: B256) -> Result<Option<Bytes>>;
}
