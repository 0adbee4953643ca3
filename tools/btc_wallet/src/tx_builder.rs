//! Spend-everything transaction assembly for funding a swap.
//!
//! Every spendable output of the sender is consumed; the payment goes to the
//! destination and whatever is left after the fixed fee returns as change.

use std::str::FromStr;

use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::serialize_hex;
use bitcoin::script::PushBytesBuf;
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{Address, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness};
use swap_sdk::{notify_tx_hash, Amount, TxHashObserver};
use tracing::debug;

use crate::account::SigningAccount;
use crate::config::TxBuilderConfig;
use crate::rpc::{BroadcastReceipt, UnspentOutput, UtxoExplorer};
use crate::types::{BtcWalletError, Result};

/// Sequence on every input; signals replace-by-fee.
pub const INPUT_SEQUENCE: Sequence = Sequence::ENABLE_RBF_NO_LOCKTIME;

#[derive(Debug, Clone)]
pub struct BuiltTransaction {
    pub tx: Transaction,
    pub txid: Txid,
    pub hex: String,
    pub fund_value: u64,
    pub fee_value: u64,
    pub change_value: u64,
}

/// Builds and signs a transaction paying `fund_value` to `to`.
///
/// Fails with `InsufficientFunds` when the outputs cannot cover
/// `fund_value + fee_value`. Change goes back to the account only when
/// nonzero.
pub fn build_transaction(
    account: &SigningAccount,
    unspents: &[UnspentOutput],
    to: &Address,
    fund_value: u64,
    fee_value: u64,
) -> Result<BuiltTransaction> {
    let total = unspents
        .iter()
        .try_fold(0u64, |sum, unspent| sum.checked_add(unspent.amount_satoshis))
        .ok_or(swap_sdk::AmountError::Overflow)?;
    let required = fund_value
        .checked_add(fee_value)
        .ok_or(swap_sdk::AmountError::Overflow)?;
    if total < required {
        return Err(BtcWalletError::InsufficientFunds {
            total,
            fund: fund_value,
            fee: fee_value,
        });
    }
    let change_value = total - required;

    let input = unspents
        .iter()
        .map(|unspent| {
            let txid = Txid::from_str(&unspent.txid).map_err(|err| BtcWalletError::InvalidTxid {
                txid: unspent.txid.clone(),
                message: err.to_string(),
            })?;
            Ok(TxIn {
                previous_output: OutPoint::new(txid, unspent.output_index),
                script_sig: ScriptBuf::new(),
                sequence: INPUT_SEQUENCE,
                witness: Witness::new(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut output = vec![TxOut {
        value: bitcoin::Amount::from_sat(fund_value),
        script_pubkey: to.script_pubkey(),
    }];
    if change_value != 0 {
        output.push(TxOut {
            value: bitcoin::Amount::from_sat(change_value),
            script_pubkey: account.address().script_pubkey(),
        });
    }

    let mut tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input,
        output,
    };

    let spent_script = account.address().script_pubkey();
    let script_sigs = {
        let cache = SighashCache::new(&tx);
        (0..tx.input.len())
            .map(|index| {
                let sighash = cache
                    .legacy_signature_hash(index, &spent_script, EcdsaSighashType::All.to_u32())
                    .map_err(|err| BtcWalletError::Signing(err.to_string()))?;
                let signature = PushBytesBuf::try_from(account.sign(sighash).to_vec())
                    .map_err(|err| BtcWalletError::Signing(err.to_string()))?;
                Ok(ScriptBuf::builder()
                    .push_slice(signature)
                    .push_key(&account.public_key())
                    .into_script())
            })
            .collect::<Result<Vec<_>>>()?
    };
    for (input, script_sig) in tx.input.iter_mut().zip(script_sigs) {
        input.script_sig = script_sig;
    }

    let txid = tx.compute_txid();
    let hex = serialize_hex(&tx);
    Ok(BuiltTransaction {
        tx,
        txid,
        hex,
        fund_value,
        fee_value,
        change_value,
    })
}

pub struct TransactionBuilder<E> {
    explorer: E,
    config: TxBuilderConfig,
}

impl<E: UtxoExplorer> TransactionBuilder<E> {
    pub fn new(explorer: E, config: TxBuilderConfig) -> Self {
        Self { explorer, config }
    }

    pub fn explorer(&self) -> &E {
        &self.explorer
    }

    /// Spends all of the account's outputs to pay `value` BTC to `to`.
    ///
    /// `observer` sees the txid before the broadcast is attempted.
    pub async fn send_transaction(
        &self,
        account: &SigningAccount,
        to: &str,
        value: &Amount,
        observer: Option<TxHashObserver>,
    ) -> Result<BroadcastReceipt> {
        let destination = account.parse_address(to)?;
        let fund_value = value.to_sat()?;
        let sender = account.address().to_string();
        let unspents = self.explorer.fetch_unspents(&sender).await?;

        let built = build_transaction(
            account,
            &unspents,
            &destination,
            fund_value,
            self.config.fee_value,
        )?;
        let txid = built.txid.to_string();
        debug!(
            %txid,
            inputs = unspents.len(),
            fund = built.fund_value,
            change = built.change_value,
            fee = built.fee_value,
            "Built transaction"
        );
        notify_tx_hash(observer, &txid);
        debug!(raw_tx = %built.hex, "Broadcasting transaction");
        self.explorer.broadcast_tx(&built.hex).await
    }
}
