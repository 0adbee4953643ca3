//! Swap lifecycle on top of the contract call primitives.
//!
//! Every mutating operation runs the same pipeline: refresh the gas price,
//! estimate gas for the exact call, submit with that estimate as the limit,
//! hand the pending hash to the observer, then wait for the receipt.

use std::fmt;

use alloy::primitives::{Address, FixedBytes, B256, U256};
use swap_sdk::poll::CONFIRMATION_REPOLLS;
use swap_sdk::{notify_tx_hash, repeat_to_result, Amount, Attempts, TxHashObserver};
use tracing::{debug, warn};

use crate::config::SwapContractConfig;
use crate::contract::{GasParams, PendingCall, SwapCall, SwapContract, SwapReceipt};
use crate::secret::decode_withdraw_secret;
use crate::state::SwapRecord;
use crate::types::{EvmSwapError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSwapParams {
    pub secret_hash: String,
    pub participant: Address,
    pub amount: Amount,
    pub target_wallet: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceMismatch {
    pub expected: U256,
    pub actual: U256,
}

impl fmt::Display for BalanceMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expected value: {}, got: {}", self.expected, self.actual)
    }
}

pub struct ContractSwapClient<C> {
    contract: C,
    config: SwapContractConfig,
}

impl<C: SwapContract> ContractSwapClient<C> {
    pub fn new(contract: C, config: SwapContractConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { contract, config })
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub fn config(&self) -> &SwapContractConfig {
        &self.config
    }

    /// Network gas price plus the configured margin, or the fallback price
    /// when the lookup fails.
    pub async fn refresh_gas_price(&self) -> u128 {
        match self.contract.gas_price().await {
            Ok(price) => price.saturating_add(self.config.gas_price_margin),
            Err(err) => {
                warn!(
                    error = %err,
                    fallback = self.config.fallback_gas_price,
                    "Gas price lookup failed; using fallback"
                );
                self.config.fallback_gas_price
            }
        }
    }

    /// Prices, estimates and sends `call`; returns once the hash is known.
    pub async fn submit(&self, call: SwapCall) -> Result<PendingCall> {
        let gas_price = self.refresh_gas_price().await;
        let gas_limit = self
            .contract
            .estimate_gas(&call, self.config.gas_limit)
            .await?;
        debug!(call = call.name(), gas_limit, gas_price, "Submitting contract call");
        let pending = self
            .contract
            .send(
                &call,
                GasParams {
                    gas_limit,
                    gas_price,
                },
            )
            .await?;
        debug!(call = pending.call, hash = %pending.hash, "Contract call pending");
        Ok(pending)
    }

    pub async fn confirm(&self, pending: PendingCall) -> Result<SwapReceipt> {
        let receipt = self.contract.wait_for_receipt(&pending).await?;
        debug!(
            call = pending.call,
            hash = %receipt.hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Contract call confirmed"
        );
        Ok(receipt)
    }

    async fn execute(
        &self,
        call: SwapCall,
        observer: Option<TxHashObserver>,
    ) -> Result<SwapReceipt> {
        let pending = self.submit(call).await?;
        notify_tx_hash(observer, &pending.hash.to_string());
        self.confirm(pending).await
    }

    fn base_units(&self, amount: &Amount) -> Result<U256> {
        Ok(U256::from(amount.to_base_units(self.config.token_decimals)?))
    }

    /// Lets the swap contract move `amount` tokens from the sender.
    pub async fn approve(
        &self,
        amount: &Amount,
        observer: Option<TxHashObserver>,
    ) -> Result<SwapReceipt> {
        let call = SwapCall::Approve {
            spender: self.contract.swap_address(),
            amount: self.base_units(amount)?,
        };
        self.execute(call, observer).await
    }

    /// Tokens `owner` has approved for the swap contract.
    pub async fn check_allowance(&self, owner: Address) -> Result<U256> {
        self.contract
            .allowance(owner, self.contract.swap_address())
            .await
    }

    /// Picks `createSwapTarget` when a target wallet other than the
    /// participant is given, `createSwap` otherwise.
    pub async fn create(
        &self,
        params: CreateSwapParams,
        observer: Option<TxHashObserver>,
    ) -> Result<SwapReceipt> {
        let CreateSwapParams {
            secret_hash,
            participant,
            amount,
            target_wallet,
        } = params;
        match target_wallet {
            Some(target) if target != participant => {
                self.create_swap_target(&secret_hash, participant, target, &amount, observer)
                    .await
            }
            _ => {
                self.create_swap(&secret_hash, participant, &amount, observer)
                    .await
            }
        }
    }

    pub async fn create_swap(
        &self,
        secret_hash: &str,
        participant: Address,
        amount: &Amount,
        observer: Option<TxHashObserver>,
    ) -> Result<SwapReceipt> {
        let call = SwapCall::CreateSwap {
            secret_hash: parse_secret_hash(secret_hash)?,
            participant,
            amount: self.base_units(amount)?,
            token: self.contract.token_address(),
        };
        self.execute(call, observer).await
    }

    pub async fn create_swap_target(
        &self,
        secret_hash: &str,
        participant: Address,
        target_wallet: Address,
        amount: &Amount,
        observer: Option<TxHashObserver>,
    ) -> Result<SwapReceipt> {
        let call = SwapCall::CreateSwapTarget {
            secret_hash: parse_secret_hash(secret_hash)?,
            participant,
            target_wallet,
            amount: self.base_units(amount)?,
            token: self.contract.token_address(),
        };
        self.execute(call, observer).await
    }

    /// Reveals `secret` to release the swap funded by `owner`.
    pub async fn withdraw(
        &self,
        secret: &str,
        owner: Address,
        observer: Option<TxHashObserver>,
    ) -> Result<SwapReceipt> {
        let secret = swap_sdk::hex::normalize_prefixed(secret);
        let call = SwapCall::Withdraw {
            secret: B256::from(swap_sdk::hex::decode_fixed::<32>(&secret)?),
            owner,
        };
        self.execute(call, observer).await
    }

    /// Expiry is enforced by the contract, not here.
    pub async fn refund(
        &self,
        participant: Address,
        observer: Option<TxHashObserver>,
    ) -> Result<SwapReceipt> {
        self.execute(SwapCall::Refund { participant }, observer).await
    }

    pub async fn get_swap(&self, owner: Address, participant: Address) -> Result<SwapRecord> {
        let record = self.contract.swap(owner, participant).await?;
        debug!(%owner, %participant, balance = %record.balance, state = ?record.state(), "Swap entry");
        Ok(record)
    }

    pub async fn check_swap_exists(&self, owner: Address, participant: Address) -> Result<bool> {
        Ok(self.get_swap(owner, participant).await?.is_funded())
    }

    pub async fn get_balance(&self, owner: Address) -> Result<U256> {
        let balance = self.contract.balance(owner).await?;
        debug!(%owner, %balance, "Swap balance");
        Ok(balance)
    }

    /// Waits for a nonzero balance and compares it with `expected`.
    ///
    /// A balance that stays zero through the polling budget counts as zero.
    pub async fn check_balance(
        &self,
        owner: Address,
        expected: U256,
    ) -> Result<Option<BalanceMismatch>> {
        let polled = repeat_to_result(
            "swap balance",
            Attempts::Bounded(CONFIRMATION_REPOLLS),
            self.config.poll_delay,
            || self.get_balance(owner),
        )
        .await;
        let actual = match polled {
            Ok(balance) => balance,
            Err(EvmSwapError::Poll(exhausted)) => {
                debug!(%exhausted, "Balance never appeared");
                U256::ZERO
            }
            Err(err) => return Err(err),
        };
        Ok((expected > actual).then_some(BalanceMismatch { expected, actual }))
    }

    /// Polls until the contract reports a target wallet for `owner`.
    pub async fn get_target_wallet(&self, owner: Address) -> Result<Address> {
        repeat_to_result(
            "target wallet",
            Attempts::Unbounded,
            self.config.poll_delay,
            || async move {
                let wallet = self.contract.target_wallet(owner).await?;
                debug!(%owner, %wallet, "Target wallet");
                Ok(wallet)
            },
        )
        .await
    }

    /// Secret revealed for `participant`, `None` until it is non-zero.
    pub async fn get_secret(&self, participant: Address) -> Result<Option<B256>> {
        let secret = self.contract.secret(participant).await?;
        Ok((!secret.is_zero()).then_some(secret))
    }

    /// Recovers the secret (hex, no `0x`) from a `withdraw` transaction.
    pub async fn get_secret_from_tx_hash(&self, hash: B256) -> Result<String> {
        repeat_to_result(
            "secret from tx",
            Attempts::Bounded(CONFIRMATION_REPOLLS),
            self.config.poll_delay,
            || async move {
                let input = self.contract.transaction_input(hash).await?;
                Ok(input
                    .as_ref()
                    .and_then(|bytes| decode_withdraw_secret(bytes))
                    .unwrap_or_default())
            },
        )
        .await
    }
}

fn parse_secret_hash(value: &str) -> Result<FixedBytes<20>> {
    let normalized = swap_sdk::hex::normalize_prefixed(value);
    Ok(FixedBytes::from(swap_sdk::hex::decode_fixed::<20>(&normalized)?))
}
