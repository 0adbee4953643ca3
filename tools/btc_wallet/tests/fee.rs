use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use btc_wallet::{BtcNetwork, BtcWalletError, FeeEstimator, FeeProvider, FeeRate, Result, Speed};

struct StubProvider {
    name: &'static str,
    value: Option<u64>,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    fn new(name: &'static str, value: Option<u64>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                value,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl FeeProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fee_rate(&self, _speed: Speed) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.value.ok_or(BtcWalletError::UnknownProvider {
            status: Some(503),
            message: format!("{} down", self.name),
        })
    }
}

#[tokio::test]
async fn mainnet_uses_primary_when_healthy() {
    let (primary, primary_calls) = StubProvider::new("primary", Some(25_000));
    let (secondary, secondary_calls) = StubProvider::new("secondary", Some(99_000));
    let estimator = FeeEstimator::new(BtcNetwork::Mainnet, primary, secondary);

    let rate = estimator.estimate_fee_rate(Speed::Fast).await.unwrap();
    assert_eq!(rate, FeeRate { value: 25_000, speed: Speed::Fast });
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn mainnet_falls_back_when_primary_fails() {
    let (primary, primary_calls) = StubProvider::new("primary", None);
    let (secondary, secondary_calls) = StubProvider::new("secondary", Some(20_480));
    let estimator = FeeEstimator::new(BtcNetwork::Mainnet, primary, secondary);

    let rate = estimator.estimate_fee_rate(Speed::Normal).await.unwrap();
    assert_eq!(rate.value, 20_480);
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn mainnet_surfaces_secondary_error_when_both_fail() {
    let (primary, _) = StubProvider::new("primary", None);
    let (secondary, _) = StubProvider::new("secondary", None);
    let estimator = FeeEstimator::new(BtcNetwork::Mainnet, primary, secondary);

    match estimator.estimate_fee_rate(Speed::Slow).await {
        Err(BtcWalletError::UnknownProvider { message, .. }) => assert_eq!(message, "secondary down"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn testnet_never_asks_secondary() {
    let (primary, _) = StubProvider::new("primary", None);
    let (secondary, secondary_calls) = StubProvider::new("secondary", Some(1));
    let estimator = FeeEstimator::new(BtcNetwork::Testnet, primary, secondary);

    assert!(estimator.estimate_fee_rate(Speed::Normal).await.is_err());
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);

    let (primary, _) = StubProvider::new("primary", Some(7_000));
    let (secondary, secondary_calls) = StubProvider::new("secondary", Some(1));
    let estimator = FeeEstimator::new(BtcNetwork::Testnet, primary, secondary);
    assert_eq!(estimator.estimate_fee_rate(Speed::from("unknown")).await.unwrap().value, 7_000);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
}
