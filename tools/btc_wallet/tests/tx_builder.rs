use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bitcoin::hex::FromHex;
use bitcoin::secp256k1::SecretKey;
use bitcoin::{Address, PrivateKey};
use btc_wallet::{
    build_transaction, BroadcastReceipt, BtcNetwork, BtcWalletError, Result, SigningAccount,
    TransactionBuilder, TxBuilderConfig, UnspentOutput, UtxoExplorer, INPUT_SEQUENCE,
};
use swap_sdk::{Amount, TxHashObserver};

const FUNDING_TXID: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

fn account(seed: u8) -> SigningAccount {
    let secret = SecretKey::from_slice(&[seed; 32]).unwrap();
    SigningAccount::from_private_key(
        PrivateKey::new(secret, bitcoin::Network::Testnet),
        BtcNetwork::Testnet,
    )
}

fn utxo(vout: u32, satoshis: u64) -> UnspentOutput {
    UnspentOutput {
        txid: FUNDING_TXID.to_string(),
        output_index: vout,
        amount_satoshis: satoshis,
    }
}

#[derive(Default, Clone)]
struct MockExplorer {
    unspents: Vec<UnspentOutput>,
    calls: Arc<Mutex<Vec<String>>>,
    broadcasts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl UtxoExplorer for MockExplorer {
    async fn fetch_unspents(&self, address: &str) -> Result<Vec<UnspentOutput>> {
        self.calls.lock().unwrap().push(format!("utxo:{address}"));
        Ok(self.unspents.clone())
    }

    async fn broadcast_tx(&self, raw_tx: &str) -> Result<BroadcastReceipt> {
        self.calls.lock().unwrap().push("broadcast".to_string());
        self.broadcasts.lock().unwrap().push(raw_tx.to_string());
        Ok(BroadcastReceipt {
            txid: "accepted".to_string(),
        })
    }
}

fn decode_tx(raw: &str) -> bitcoin::Transaction {
    let bytes = Vec::<u8>::from_hex(raw).unwrap();
    bitcoin::consensus::deserialize(&bytes).unwrap()
}

fn destination() -> Address {
    account(2).address().clone()
}

#[test]
fn single_output_pays_amount_and_returns_change() {
    let sender = account(1);
    let to = destination();
    let built = build_transaction(&sender, &[utxo(0, 100_000)], &to, 50_000, 1_000).unwrap();

    assert_eq!(built.tx.output.len(), 2);
    assert_eq!(built.tx.output[0].value.to_sat(), 50_000);
    assert_eq!(built.tx.output[0].script_pubkey, to.script_pubkey());
    assert_eq!(built.tx.output[1].value.to_sat(), 49_000);
    assert_eq!(built.tx.output[1].script_pubkey, sender.address().script_pubkey());
    assert_eq!(built.change_value, 49_000);
    assert_eq!(built.txid, built.tx.compute_txid());
}

#[test]
fn exact_balance_has_no_change_output() {
    let sender = account(1);
    let built = build_transaction(
        &sender,
        &[utxo(0, 30_000), utxo(1, 21_000)],
        &destination(),
        50_000,
        1_000,
    )
    .unwrap();

    assert_eq!(built.tx.output.len(), 1);
    assert_eq!(built.change_value, 0);
    let outputs: u64 = built.tx.output.iter().map(|out| out.value.to_sat()).sum();
    assert_eq!(outputs + built.fee_value, 51_000);
}

#[test]
fn all_outputs_are_spent_with_rbf_sequence() {
    let sender = account(1);
    let unspents = [utxo(0, 10_000), utxo(3, 20_000), utxo(7, 40_000)];
    let built = build_transaction(&sender, &unspents, &destination(), 5_000, 1_000).unwrap();

    assert_eq!(built.tx.input.len(), 3);
    let vouts: Vec<u32> = built.tx.input.iter().map(|i| i.previous_output.vout).collect();
    assert_eq!(vouts, vec![0, 3, 7]);
    for input in &built.tx.input {
        assert_eq!(input.sequence, INPUT_SEQUENCE);
        assert!(input.sequence.is_rbf());
        assert!(!input.script_sig.is_empty());
    }
    assert_eq!(built.change_value, 70_000 - 5_000 - 1_000);
}

#[test]
fn short_balance_is_insufficient_funds() {
    let sender = account(1);
    let err = build_transaction(&sender, &[utxo(0, 50_999)], &destination(), 50_000, 1_000)
        .unwrap_err();
    assert!(matches!(
        err,
        BtcWalletError::InsufficientFunds { total: 50_999, fund: 50_000, fee: 1_000 }
    ));
}

#[test]
fn malformed_txid_is_rejected() {
    let sender = account(1);
    let bad = UnspentOutput {
        txid: "zz".to_string(),
        output_index: 0,
        amount_satoshis: 100_000,
    };
    assert!(matches!(
        build_transaction(&sender, &[bad], &destination(), 1_000, 1_000),
        Err(BtcWalletError::InvalidTxid { .. })
    ));
}

#[tokio::test]
async fn send_notifies_txid_before_broadcast() {
    let sender = account(1);
    let explorer = MockExplorer {
        unspents: vec![utxo(0, 100_000)],
        ..MockExplorer::default()
    };
    let calls = explorer.calls.clone();
    let broadcasts = explorer.broadcasts.clone();
    let builder = TransactionBuilder::new(explorer, TxBuilderConfig::default());

    let seen: Arc<Mutex<Vec<(String, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let observer_seen = seen.clone();
    let observer_calls = calls.clone();
    let observer: TxHashObserver = Box::new(move |txid: String| {
        let broadcasts_so_far = observer_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == "broadcast")
            .count();
        observer_seen.lock().unwrap().push((txid, broadcasts_so_far));
    });

    let amount: Amount = "0.0005".parse().unwrap();
    let receipt = builder
        .send_transaction(&sender, &destination().to_string(), &amount, Some(observer))
        .await
        .unwrap();
    assert_eq!(receipt.txid, "accepted");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, 0);

    let raw = broadcasts.lock().unwrap()[0].clone();
    let tx = decode_tx(&raw);
    assert_eq!(seen[0].0, tx.compute_txid().to_string());
    assert_eq!(tx.output[0].value.to_sat(), 50_000);
    assert_eq!(tx.output[1].value.to_sat(), 49_000);
    assert_eq!(
        calls.lock().unwrap().as_slice(),
        &[format!("utxo:{}", sender.address()), "broadcast".to_string()]
    );
}

#[tokio::test]
async fn insufficient_funds_never_broadcasts() {
    let sender = account(1);
    let explorer = MockExplorer {
        unspents: vec![utxo(0, 10_000)],
        ..MockExplorer::default()
    };
    let broadcasts = explorer.broadcasts.clone();
    let builder = TransactionBuilder::new(explorer, TxBuilderConfig::default());

    let notified = Arc::new(Mutex::new(false));
    let flag = notified.clone();
    let amount: Amount = "0.0001".parse().unwrap();
    let result = builder
        .send_transaction(
            &sender,
            &destination().to_string(),
            &amount,
            Some(Box::new(move |_: String| *flag.lock().unwrap() = true)),
        )
        .await;

    assert!(matches!(result, Err(BtcWalletError::InsufficientFunds { .. })));
    assert!(broadcasts.lock().unwrap().is_empty());
    assert!(!*notified.lock().unwrap());
}

#[tokio::test]
async fn fee_comes_from_config() {
    let sender = account(1);
    let explorer = MockExplorer {
        unspents: vec![utxo(0, 100_000)],
        ..MockExplorer::default()
    };
    let broadcasts = explorer.broadcasts.clone();
    let builder = TransactionBuilder::new(explorer, TxBuilderConfig { fee_value: 2_500 });

    builder
        .send_transaction(&sender, &destination().to_string(), &Amount::from_sat(40_000), None)
        .await
        .unwrap();

    let raw = broadcasts.lock().unwrap()[0].clone();
    let tx = decode_tx(&raw);
    assert_eq!(tx.output[1].value.to_sat(), 100_000 - 40_000 - 2_500);
}
