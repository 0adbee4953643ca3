use std::env;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use evm_swap::{connect, ContractSwapClient, SwapContractConfig};

fn env_or_skip(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            eprintln!("Skipping test: set {} to run contract RPC tests.", key);
            None
        }
    }
}

#[tokio::test]
#[ignore = "requires an EVM node with the swap contract deployed"]
async fn reads_swap_state_from_node() {
    let key = match env_or_skip("EVM_PRIVATE_KEY") {
        Some(value) => value,
        None => return,
    };
    swap_sdk::init_logging();
    let config = SwapContractConfig::from_env().expect("contract config");
    let signer: PrivateKeySigner = key.trim().parse().expect("private key");
    let sender = signer.address();
    let contract = connect(&config, signer).expect("connect");
    let client = ContractSwapClient::new(contract, config).expect("client");

    let _allowance = client.check_allowance(sender).await.expect("allowance");
    let _balance = client.get_balance(sender).await.expect("balance");
    let _exists = client
        .check_swap_exists(sender, Address::ZERO)
        .await
        .expect("swap exists");
}
