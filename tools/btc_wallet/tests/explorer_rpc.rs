use std::env;

use btc_wallet::{
    ExplorerConfig, ExplorerGateway, FeeEstimator, Speed, UtxoExplorer, DEFAULT_OMNI_ASSET_ID,
};

fn env_or_skip(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            eprintln!("Skipping test: set {} to run explorer tests.", key);
            None
        }
    }
}

#[tokio::test]
#[ignore = "requires network access to public explorers"]
async fn explorer_balance_and_utxos() {
    let address = match env_or_skip("BTC_TEST_ADDRESS") {
        Some(value) => value,
        None => return,
    };
    swap_sdk::init_logging();
    let config = ExplorerConfig::from_env().expect("explorer config");
    let gateway = ExplorerGateway::new(config).expect("gateway");

    let _balance = gateway.fetch_balance(&address).await.expect("balance");
    let unspents = gateway.fetch_unspents(&address).await.expect("utxos");
    for unspent in unspents {
        assert_eq!(unspent.txid.len(), 64);
    }
    let _omni = gateway
        .fetch_omni_balance(&address, DEFAULT_OMNI_ASSET_ID)
        .await
        .expect("omni balance");
}

#[tokio::test]
#[ignore = "requires network access to fee oracles"]
async fn live_fee_rate() {
    if env_or_skip("BTC_NETWORK").is_none() {
        return;
    }
    let config = ExplorerConfig::from_env().expect("explorer config");
    let estimator = FeeEstimator::from_config(&config).expect("estimator");
    let rate = estimator.estimate_fee_rate(Speed::Normal).await.expect("fee rate");
    assert!(rate.value > 0);
}
