//! alloy-backed implementation of the contract call primitives.

use alloy::consensus::Transaction as _;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use crate::config::SwapContractConfig;
use crate::contract::{CallTarget, GasParams, PendingCall, SwapCall, SwapContract, SwapReceipt, IERC20, ISwap};
use crate::state::SwapRecord;
use crate::types::{EvmSwapError, Result};

pub struct EvmSwapContract<P> {
    provider: P,
    sender: Address,
    swap_address: Address,
    token_address: Address,
}

impl<P: Provider> EvmSwapContract<P> {
    pub fn new(provider: P, sender: Address, swap_address: Address, token_address: Address) -> Self {
        Self {
            provider,
            sender,
            swap_address,
            token_address,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn request(&self, call: &SwapCall) -> TransactionRequest {
        let to = match call.target() {
            CallTarget::Swap => self.swap_address,
            CallTarget::Token => self.token_address,
        };
        TransactionRequest::default()
            .with_from(self.sender)
            .with_to(to)
            .with_input(call.calldata())
    }
}

/// Builds an HTTP provider that signs with `signer`.
pub fn connect(
    config: &SwapContractConfig,
    signer: PrivateKeySigner,
) -> Result<EvmSwapContract<impl Provider>> {
    config.validate()?;
    let url: Url = config
        .rpc_url
        .parse()
        .with_context(|| format!("invalid rpc url: {}", config.rpc_url))?;
    let sender = signer.address();
    debug!(rpc_url = %config.rpc_url, %sender, swap = %config.swap_address, "Connecting swap contract");
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(url);
    Ok(EvmSwapContract::new(
        provider,
        sender,
        config.swap_address,
        config.token_address,
    ))
}

fn transport(err: impl std::fmt::Display) -> EvmSwapError {
    EvmSwapError::Transport(err.to_string())
}

#[async_trait]
impl<P: Provider> SwapContract for EvmSwapContract<P> {
    fn sender(&self) -> Address {
        self.sender
    }

    fn swap_address(&self) -> Address {
        self.swap_address
    }

    fn token_address(&self) -> Address {
        self.token_address
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider.get_gas_price().await.map_err(transport)
    }

    async fn estimate_gas(&self, call: &SwapCall, cap: u64) -> Result<u64> {
        let request = self.request(call).with_gas_limit(cap);
        self.provider
            .estimate_gas(request)
            .await
            .map_err(|err| EvmSwapError::GasEstimation {
                call: call.name(),
                message: err.to_string(),
            })
    }

    async fn send(&self, call: &SwapCall, gas: GasParams) -> Result<PendingCall> {
        let request = self
            .request(call)
            .with_gas_limit(gas.gas_limit)
            .with_gas_price(gas.gas_price);
        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|err| EvmSwapError::contract(call.name(), err))?;
        Ok(PendingCall {
            call: call.name(),
            hash: *pending.tx_hash(),
        })
    }

    async fn wait_for_receipt(&self, pending: &PendingCall) -> Result<SwapReceipt> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), pending.hash)
            .get_receipt()
            .await
            .map_err(|err| EvmSwapError::contract(pending.call, err))?;
        if !receipt.status() {
            return Err(EvmSwapError::Reverted {
                call: pending.call,
                hash: pending.hash,
            });
        }
        Ok(SwapReceipt {
            hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    async fn swap(&self, owner: Address, participant: Address) -> Result<SwapRecord> {
        let entry = ISwap::new(self.swap_address, &self.provider)
            .swaps(owner, participant)
            .from(self.sender)
            .call()
            .await
            .map_err(|err| EvmSwapError::contract("swaps", err))?;
        Ok(SwapRecord {
            token: entry.token,
            target_wallet: entry.targetWallet,
            secret: entry.secret,
            secret_hash: entry.secretHash,
            created_at: entry.createdAt,
            balance: entry.balance,
        })
    }

    async fn balance(&self, owner: Address) -> Result<U256> {
        ISwap::new(self.swap_address, &self.provider)
            .getBalance(owner)
            .from(self.sender)
            .call()
            .await
            .map_err(|err| EvmSwapError::contract("getBalance", err))
    }

    async fn target_wallet(&self, owner: Address) -> Result<Address> {
        ISwap::new(self.swap_address, &self.provider)
            .getTargetWallet(owner)
            .from(self.sender)
            .call()
            .await
            .map_err(|err| EvmSwapError::contract("getTargetWallet", err))
    }

    async fn secret(&self, participant: Address) -> Result<B256> {
        ISwap::new(self.swap_address, &self.provider)
            .getSecret(participant)
            .from(self.sender)
            .call()
            .await
            .map_err(|err| EvmSwapError::contract("getSecret", err))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        IERC20::new(self.token_address, &self.provider)
            .allowance(owner, spender)
            .from(self.sender)
            .call()
            .await
            .map_err(|err| EvmSwapError::contract("allowance", err))
    }

    async fn transaction_input(&self, hash: B256) -> Result<Option<Bytes>> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(transport)?;
        Ok(tx.map(|tx| tx.input().clone()))
    }
}
