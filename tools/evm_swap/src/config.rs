use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use swap_sdk::amount::MAX_DECIMALS;
use swap_sdk::poll::DEFAULT_POLL_DELAY;
use swap_sdk::{read_env_string, read_env_u64, validate_http_url, validate_nonzero, ConfigError};

/// Upper bound handed to gas estimation.
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;
/// Added on top of the network gas price (1.3 gwei).
pub const GAS_PRICE_MARGIN: u128 = 1_300_000_000;
/// Used when the gas price lookup fails (15 gwei).
pub const FALLBACK_GAS_PRICE: u128 = 15_000_000_000;
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

#[derive(Debug, Clone)]
pub struct SwapContractConfig {
    pub rpc_url: String,
    pub swap_address: Address,
    pub token_address: Address,
    pub token_decimals: u32,
    pub gas_limit: u64,
    pub gas_price_margin: u128,
    pub fallback_gas_price: u128,
    pub poll_delay: Duration,
}

impl SwapContractConfig {
    pub fn new(rpc_url: &str, swap_address: Address, token_address: Address, token_decimals: u32) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            swap_address,
            token_address,
            token_decimals,
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price_margin: GAS_PRICE_MARGIN,
            fallback_gas_price: FALLBACK_GAS_PRICE,
            poll_delay: DEFAULT_POLL_DELAY,
        }
    }

    /// Reads `EVM_RPC_URL`, `SWAP_CONTRACT_ADDRESS`, `SWAP_TOKEN_ADDRESS` and
    /// optional tuning variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_url = require_env("EVM_RPC_URL")?;
        let swap_address = parse_address("SWAP_CONTRACT_ADDRESS", &require_env("SWAP_CONTRACT_ADDRESS")?)?;
        let token_address = parse_address("SWAP_TOKEN_ADDRESS", &require_env("SWAP_TOKEN_ADDRESS")?)?;
        let decimals = read_env_u64("SWAP_TOKEN_DECIMALS", u64::from(DEFAULT_TOKEN_DECIMALS));
        let token_decimals = u32::try_from(decimals).map_err(|_| ConfigError::Invalid {
            label: "SWAP_TOKEN_DECIMALS".to_string(),
            message: "out of range".to_string(),
        })?;

        let mut config = Self::new(&rpc_url, swap_address, token_address, token_decimals);
        config.gas_limit = read_env_u64("SWAP_GAS_LIMIT", DEFAULT_GAS_LIMIT);
        config.poll_delay = Duration::from_millis(read_env_u64(
            "SWAP_POLL_DELAY_MS",
            DEFAULT_POLL_DELAY.as_millis() as u64,
        ));
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("rpc url", &self.rpc_url)?;
        if self.swap_address.is_zero() {
            return Err(ConfigError::Invalid {
                label: "swap contract address".to_string(),
                message: "must not be the zero address".to_string(),
            });
        }
        if self.token_address.is_zero() {
            return Err(ConfigError::Invalid {
                label: "token address".to_string(),
                message: "must not be the zero address".to_string(),
            });
        }
        if self.token_decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid {
                label: "token decimals".to_string(),
                message: format!("at most {MAX_DECIMALS}"),
            });
        }
        validate_nonzero("gas limit", self.gas_limit)?;
        validate_nonzero("poll delay", self.poll_delay.as_millis() as u64)
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    read_env_string(key).ok_or_else(|| ConfigError::Invalid {
        label: key.to_string(),
        message: "not set".to_string(),
    })
}

pub fn parse_address(label: &str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value.trim()).map_err(|err| ConfigError::Invalid {
        label: label.to_string(),
        message: err.to_string(),
    })
}
